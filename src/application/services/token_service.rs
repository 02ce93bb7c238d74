//! Token Service
//!
//! Issues and verifies PASETO `v4.local` tokens. The symmetric key is
//! generated when the service is constructed and never leaves the process.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::{Generate, SymmetricKey};
use pasetors::token::UntrustedToken;
use pasetors::version4::V4;
use pasetors::{local, Local};

use crate::domain::{Payload, User};
use crate::shared::duration::parse_duration;

const PAYLOAD_CLAIM: &str = "payload";

/// Token service trait for dependency injection
pub trait TokenService: Send + Sync {
    /// Issue a token for `user` valid for `duration` (e.g. `"15m"`).
    ///
    /// Returns the opaque token together with the payload it carries.
    fn create_token(&self, user: &User, duration: &str) -> Result<(String, Payload), TokenError>;

    /// Decrypt and authenticate a token, then check that it has not expired.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}

/// Token errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token duration: {0}")]
    InvalidDuration(String),

    #[error("token is invalid")]
    InvalidToken,

    #[error("token has expired at {expired_at}")]
    ExpiredToken { expired_at: DateTime<Utc> },

    #[error("create token: {0}")]
    Creation(String),
}

/// PASETO v4.local implementation of [`TokenService`].
pub struct PasetoTokenService {
    key: SymmetricKey<V4>,
}

impl PasetoTokenService {
    /// Create a service with a freshly generated key.
    pub fn new() -> Result<Self, TokenError> {
        let key = SymmetricKey::<V4>::generate()
            .map_err(|e| TokenError::Creation(format!("generate key: {e}")))?;

        Ok(Self { key })
    }

    fn encrypt(&self, payload: &Payload) -> Result<String, TokenError> {
        let creation = |e: pasetors::errors::Error| TokenError::Creation(e.to_string());
        let payload_claim =
            serde_json::to_value(payload).map_err(|e| TokenError::Creation(e.to_string()))?;

        // Expiry lives in the payload and is checked by `verify_token`; an
        // `exp` claim would make the decryptor reject expired tokens as invalid.
        let mut claims = Claims::new().map_err(creation)?;
        claims.non_expiring();
        claims
            .token_identifier(&payload.id.to_string())
            .map_err(creation)?;
        claims
            .subject(&payload.user_id.to_string())
            .map_err(creation)?;
        claims
            .issued_at(&rfc3339(payload.issued_at))
            .map_err(creation)?;
        claims
            .not_before(&rfc3339(payload.issued_at))
            .map_err(creation)?;
        claims
            .add_additional(PAYLOAD_CLAIM, payload_claim)
            .map_err(creation)?;

        local::encrypt(&self.key, &claims, None, None).map_err(creation)
    }

    fn decrypt(&self, token: &str) -> Option<Payload> {
        let untrusted = UntrustedToken::<Local, V4>::try_from(token).ok()?;

        let mut rules = ClaimsValidationRules::new();
        rules.disable_valid_at();
        rules.allow_non_expiring();

        let trusted = local::decrypt(&self.key, &untrusted, &rules, None, None).ok()?;
        let claim = trusted.payload_claims()?.get_claim(PAYLOAD_CLAIM)?;

        serde_json::from_value(claim.clone()).ok()
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn token_lifetime(spec: &str) -> Result<TimeDelta, TokenError> {
    let duration =
        parse_duration(spec).map_err(|e| TokenError::InvalidDuration(e.to_string()))?;

    if duration <= TimeDelta::zero() {
        return Err(TokenError::InvalidDuration(format!(
            "duration {spec:?} must be positive"
        )));
    }

    Ok(duration)
}

impl TokenService for PasetoTokenService {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id()))]
    fn create_token(&self, user: &User, duration: &str) -> Result<(String, Payload), TokenError> {
        let lifetime = token_lifetime(duration)?;
        let payload = Payload::new(user, lifetime, Utc::now());

        let token = self.encrypt(&payload)?;

        tracing::debug!(token_id = %payload.id, expired_at = %payload.expired_at, "Token issued");
        Ok((token, payload))
    }

    #[tracing::instrument(skip_all)]
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let payload = self.decrypt(token).ok_or(TokenError::InvalidToken)?;

        if payload.is_expired_at(Utc::now()) {
            return Err(TokenError::ExpiredToken {
                expired_at: payload.expired_at,
            });
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use test_case::test_case;

    fn service() -> PasetoTokenService {
        PasetoTokenService::new().expect("key generation")
    }

    // ==========================================================================
    // Issue & Verify
    // ==========================================================================

    #[test]
    fn test_verify_returns_issued_payload() {
        let tokens = service();
        let user = User::fixture("alice", Role::Editor);

        let (token, issued) = tokens.create_token(&user, "30m").unwrap();
        let verified = tokens.verify_token(&token).unwrap();

        assert_eq!(verified, issued);
        assert_eq!(verified.user_id, user.id());
        assert_eq!(verified.role, "Editor");
        assert_eq!(verified.expired_at - verified.issued_at, TimeDelta::minutes(30));
    }

    #[test]
    fn test_token_is_versioned_local_paseto() {
        let (token, _) = service()
            .create_token(&User::fixture("alice", Role::Reader), "1m")
            .unwrap();

        assert!(token.starts_with("v4.local."));
    }

    #[test]
    fn test_each_token_has_a_fresh_identifier() {
        let tokens = service();
        let user = User::fixture("alice", Role::Reader);

        let (_, first) = tokens.create_token(&user, "1m").unwrap();
        let (_, second) = tokens.create_token(&user, "1m").unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_expired_token_reports_expiry() {
        let tokens = service();
        let (token, payload) = tokens
            .create_token(&User::fixture("alice", Role::Reader), "10ms")
            .unwrap();

        std::thread::sleep(Duration::from_millis(15));

        assert_eq!(
            tokens.verify_token(&token),
            Err(TokenError::ExpiredToken {
                expired_at: payload.expired_at
            })
        );
    }

    // ==========================================================================
    // Rejection
    // ==========================================================================

    #[test_case("garbage-string" ; "garbage")]
    #[test_case("" ; "empty")]
    #[test_case("v4.local." ; "empty body")]
    #[test_case("v2.local.AAAA" ; "other version")]
    fn test_malformed_tokens_are_invalid(token: &str) {
        assert_eq!(service().verify_token(token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_token_from_another_key_is_invalid() {
        let (token, _) = service()
            .create_token(&User::fixture("alice", Role::Reader), "30m")
            .unwrap();

        assert_eq!(service().verify_token(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let tokens = service();
        let (token, _) = tokens
            .create_token(&User::fixture("alice", Role::Reader), "30m")
            .unwrap();

        let mut bytes = token.into_bytes();
        let i = "v4.local.".len() + 10;
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(tokens.verify_token(&tampered), Err(TokenError::InvalidToken));
    }

    #[test_case("0" ; "zero")]
    #[test_case("0s" ; "zero with unit")]
    #[test_case("-5m" ; "negative")]
    #[test_case("soon" ; "unparseable")]
    #[test_case("15" ; "missing unit")]
    fn test_create_rejects_invalid_durations(duration: &str) {
        let result = service().create_token(&User::fixture("alice", Role::Reader), duration);

        assert!(matches!(result, Err(TokenError::InvalidDuration(_))));
    }
}
