use crate::domain::{Identity, Role};
use clipsesh_errors::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SESSION_TTL_HOURS: i64 = 24;
const RESET_TTL_HOURS: i64 = 1;
const RESET_PURPOSE: &str = "password_reset";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    id: Uuid,
    username: String,
    roles: Vec<Role>,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    id: Uuid,
    purpose: String,
    iat: i64,
    exp: i64,
}

/// HS256 bearer tokens for sessions and password resets.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_session(&self, identity: &Identity) -> Result<String, AppError> {
        self.issue_session_at(identity, chrono::Utc::now())
    }

    fn issue_session_at(
        &self,
        identity: &Identity,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<String, AppError> {
        let claims = SessionClaims {
            id: identity.id,
            username: identity.username.clone(),
            roles: identity.roles.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AppError::internal)
    }

    /// Verify signature and expiry of a session token.
    pub fn verify_session(&self, token: &str) -> Result<Identity, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map_err(|e| AppError::Unauthorized(format!("Invalid or expired token ({e})")))?;
        Ok(Identity {
            id: data.claims.id,
            username: data.claims.username,
            roles: data.claims.roles,
        })
    }

    pub fn issue_reset(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let claims = ResetClaims {
            id: user_id,
            purpose: RESET_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(RESET_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AppError::internal)
    }

    pub fn verify_reset(&self, token: &str) -> Result<Uuid, AppError> {
        let invalid = || AppError::Validation("Invalid or expired token.".to_string());
        let data =
            decode::<ResetClaims>(token, &self.decoding, &Validation::default()).map_err(|_| invalid())?;
        if data.claims.purpose != RESET_PURPOSE {
            return Err(invalid());
        }
        Ok(data.claims.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "spoekle".into(),
            roles: vec![Role::User, Role::Clipteam],
        }
    }

    #[test]
    fn session_round_trip() {
        let tokens = TokenService::new("test-secret");
        let who = identity();
        let token = tokens.issue_session(&who).unwrap();
        assert_eq!(tokens.verify_session(&token).unwrap(), who);
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = TokenService::new("one").issue_session(&identity()).unwrap();
        let err = TokenService::new("two").verify_session(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn rejects_expired_session() {
        let tokens = TokenService::new("test-secret");
        let two_days_ago = chrono::Utc::now() - chrono::Duration::days(2);
        let token = tokens.issue_session_at(&identity(), two_days_ago).unwrap();
        assert!(matches!(tokens.verify_session(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn reset_and_session_tokens_are_not_interchangeable() {
        let tokens = TokenService::new("test-secret");
        let who = identity();

        let reset = tokens.issue_reset(who.id).unwrap();
        assert_eq!(tokens.verify_reset(&reset).unwrap(), who.id);
        assert!(tokens.verify_session(&reset).is_err());

        let session = tokens.issue_session(&who).unwrap();
        assert!(tokens.verify_reset(&session).is_err());
    }
}
