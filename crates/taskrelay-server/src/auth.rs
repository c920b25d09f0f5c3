//! Static bearer-token check for run submission.
//!
//! The configured secret is never kept in plaintext - only its SHA-256
//! digest. Presented tokens are hashed and the digests compared, so the
//! comparison time says nothing about how much of the secret matched.

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};

/// Expected submission credential.
#[derive(Clone)]
pub struct AuthToken {
    digest: [u8; 32],
}

impl AuthToken {
    /// Create from the plaintext secret.
    pub fn new(secret: &str) -> Self {
        Self {
            digest: hash_token(secret),
        }
    }

    /// Check a presented token.
    pub fn verify(&self, presented: &str) -> bool {
        hash_token(presented) == self.digest
    }

    /// Check the `Authorization: Bearer <token>` header of a request.
    pub fn verify_headers(&self, headers: &HeaderMap) -> bool {
        bearer_token(headers).is_some_and(|token| self.verify(token))
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Extract the token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Hash a token using SHA-256.
fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_verify() {
        let token = AuthToken::new("s3cret");
        assert!(token.verify("s3cret"));
        assert!(!token.verify("s3cre"));
        assert!(!token.verify(""));
    }

    #[test]
    fn test_bearer_header() {
        let token = AuthToken::new("s3cret");
        assert!(token.verify_headers(&headers("Bearer s3cret")));
        assert!(token.verify_headers(&headers("bearer   s3cret ")));
        assert!(!token.verify_headers(&headers("Basic s3cret")));
        assert!(!token.verify_headers(&headers("Bearer")));
        assert!(!token.verify_headers(&HeaderMap::new()));
    }

    #[test]
    fn test_debug_hides_secret() {
        let token = AuthToken::new("s3cret");
        assert!(!format!("{:?}", token).contains("s3cret"));
    }
}
