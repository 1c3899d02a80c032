//! HS256 token encoding, verification, and refresh.

use crate::claims::Claims;
use crate::error::AuthError;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use tombola_core::{Role, TenantId, UserId};

/// Stateless codec for identity tokens.
///
/// Holds the server's symmetric signing secret and the configured token
/// lifetime. Every operation is pure CPU work; no I/O is performed.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec from the symmetric secret and a token TTL in seconds.
    #[must_use]
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// The configured token lifetime in seconds.
    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issues a signed token for the given identity.
    ///
    /// The signed payload is deterministic in the identity fields; `iat`,
    /// `exp`, and `jti` make each issued token unique.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if serialization fails (which does
    /// not happen for well-formed claims).
    pub fn issue(
        &self,
        subject: &UserId,
        tenant_id: &TenantId,
        username: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        let claims = Claims::new(subject, tenant_id, username, role, self.ttl_secs);
        self.sign(&claims)
    }

    /// Verifies a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// - `AuthError::TokenExpired` — the expiration instant has passed
    /// - `AuthError::InvalidSignature` — signature does not match the secret
    /// - `AuthError::InvalidAlgorithm` — token was signed with another algorithm
    /// - `AuthError::InvalidToken` — the payload is malformed
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data: TokenData<Claims> =
            decode(token, &self.decoding_key, &validation).map_err(map_jwt_error)?;

        Ok(data.claims)
    }

    /// Re-issues a token with the same identity claims and a fresh expiry
    /// window.
    ///
    /// A token that no longer verifies (expired, forged, malformed) is never
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Propagates the verification error of the old token, or an encoding
    /// error for the new one.
    pub fn refresh(&self, token: &str) -> Result<String, AuthError> {
        let old = self.verify(token)?;

        let subject: UserId = old
            .sub
            .parse()
            .map_err(|_| AuthError::MissingClaim("sub".to_string()))?;
        let tenant_id: TenantId = old
            .tid
            .parse()
            .map_err(|_| AuthError::MissingClaim("tid".to_string()))?;

        self.issue(&subject, &tenant_id, &old.username, old.role)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(format!("Encoding failed: {e}")))
    }
}

/// Map jsonwebtoken errors to AuthError.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::InvalidAlgorithm,
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.to_string()),
        _ => AuthError::InvalidToken(format!("Token validation failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TEST_SECRET: &[u8] = b"test-signing-secret-for-unit-tests";
    const OTHER_SECRET: &[u8] = b"a-completely-different-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new(TEST_SECRET, 3600)
    }

    fn issue_sample(codec: &TokenCodec) -> String {
        codec
            .issue(
                &"u1".parse().unwrap(),
                &"t1".parse().unwrap(),
                "alice",
                Role::Admin,
            )
            .unwrap()
    }

    #[test]
    fn test_issue_produces_three_part_token() {
        let token = issue_sample(&codec());
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_issue_then_verify_returns_exact_claims() {
        let codec = codec();
        let token = issue_sample(&codec);

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.tid, "t1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = issue_sample(&codec());
        let other = TokenCodec::new(OTHER_SECRET, 3600);

        let result = other.verify(&token);
        assert!(matches!(result.unwrap_err(), AuthError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let expired = TokenCodec::new(TEST_SECRET, -3600);
        let token = issue_sample(&expired);

        let result = codec().verify(&token);
        assert!(matches!(result.unwrap_err(), AuthError::TokenExpired));
    }

    #[test]
    fn test_verify_rejects_malformed_token() {
        let result = codec().verify("not.a.valid.token");
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let result = codec().verify("garbage");
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_never_panics_on_arbitrary_input() {
        let codec = codec();
        for input in ["", ".", "..", "a.b.c", "ey.ey.ey", "\u{0}\u{1}"] {
            let _ = codec.verify(input);
        }
    }

    #[test]
    fn test_refresh_preserves_identity_with_later_expiry() {
        let codec = codec();
        let token = issue_sample(&codec);
        let old = codec.verify(&token).unwrap();

        let refreshed = codec.refresh(&token).unwrap();
        let new = codec.verify(&refreshed).unwrap();

        assert_eq!(new.sub, old.sub);
        assert_eq!(new.tid, old.tid);
        assert_eq!(new.username, old.username);
        assert_eq!(new.role, old.role);
        assert!(new.exp >= old.exp);
        assert_ne!(new.jti, old.jti);
    }

    #[test]
    fn test_refresh_rejects_expired_token() {
        let expired = TokenCodec::new(TEST_SECRET, -3600);
        let token = issue_sample(&expired);

        let result = codec().refresh(&token);
        assert!(matches!(result.unwrap_err(), AuthError::TokenExpired));
    }

    #[test]
    fn test_refresh_rejects_forged_token() {
        let token = issue_sample(&TokenCodec::new(OTHER_SECRET, 3600));
        let result = codec().refresh(&token);
        assert!(matches!(result.unwrap_err(), AuthError::InvalidSignature));
    }

    #[test]
    fn test_token_valid_until_ttl_elapses() {
        // A token with a short but still-future expiry verifies now.
        let short = TokenCodec::new(TEST_SECRET, 5);
        let token = issue_sample(&short);
        let claims = short.verify(&token).unwrap();
        assert!(claims.exp > Utc::now().timestamp());
    }
}
