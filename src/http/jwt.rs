use chrono::{NaiveDateTime, Utc};
use error_stack::{Result, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::id::UserId;

/// Bearer token claims issued by the external auth collaborator.
/// This service only verifies the signature and reads `user_id`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Jwt {
    pub created_at: NaiveDateTime,
    pub issuer: String,
    pub exp_secs_until: u64,
    pub user_id: UserId,
}

#[derive(Debug, Error)]
#[error("failed to decode jwt")]
pub struct DecodeJwtError;

#[derive(Debug, Error)]
#[error("failed to create jwt")]
pub struct EncodeJwtError;

impl Jwt {
    #[tracing::instrument(skip_all)]
    pub fn decode(token: &str, secret: &str) -> Result<Self, DecodeJwtError> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        let data = jsonwebtoken::decode::<Self>(token, &key, &validation)
            .change_context(DecodeJwtError)?;

        Ok(data.claims)
    }

    #[tracing::instrument(skip_all)]
    pub fn encode(user_id: UserId, secret: &str) -> Result<String, EncodeJwtError> {
        let header = Header {
            alg: Algorithm::HS512,
            ..Default::default()
        };
        let claims = Self {
            created_at: Utc::now().naive_utc(),
            issuer: "server".into(),
            exp_secs_until: 1_000_000,
            user_id,
        };
        let key = EncodingKey::from_secret(secret.as_bytes());
        jsonwebtoken::encode(&header, &claims, &key).change_context(EncodeJwtError)
    }
}
