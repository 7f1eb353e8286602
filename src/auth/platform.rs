use axum::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use super::claims::UserTokenClaims;
use crate::config::{PlatformConfig, TokenKey};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Invalid Whop user token.")]
    InvalidToken,

    #[error("platform is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Profile fields the platform exposes for a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformProfile {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// The hosting platform: verifies user tokens and serves user profiles.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Returns the platform user id the token was issued for.
    async fn verify_user_token(&self, token: &str) -> Result<String, PlatformError>;
    async fn fetch_profile(&self, external_id: &str) -> Result<PlatformProfile, PlatformError>;
}

pub struct WhopClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    app_id: String,
    issuer: String,
    algorithm: Algorithm,
    decoding: DecodingKey,
}

impl WhopClient {
    pub fn new(cfg: &PlatformConfig) -> anyhow::Result<Self> {
        let (algorithm, decoding) = match &cfg.token_key {
            TokenKey::EcPem(pem) => {
                (Algorithm::ES256, DecodingKey::from_ec_pem(pem.as_bytes())?)
            }
            TokenKey::Secret(secret) => {
                (Algorithm::HS256, DecodingKey::from_secret(secret.as_bytes()))
            }
        };

        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            api_key: cfg.api_key.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            app_id: cfg.app_id.clone(),
            issuer: cfg.token_issuer.clone(),
            algorithm,
            decoding,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProfileBody {
    email: Option<String>,
    display_name: Option<String>,
    username: Option<String>,
}

#[async_trait]
impl PlatformClient for WhopClient {
    async fn verify_user_token(&self, token: &str) -> Result<String, PlatformError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(std::slice::from_ref(&self.app_id));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let data = decode::<UserTokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "user token rejected");
            PlatformError::InvalidToken
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(PlatformError::InvalidToken);
        }
        Ok(data.claims.sub)
    }

    #[instrument(skip(self))]
    async fn fetch_profile(&self, external_id: &str) -> Result<PlatformProfile, PlatformError> {
        let body: ProfileBody = self
            .http
            .get(format!("{}/users/{}", self.api_base, external_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(PlatformProfile {
            email: body.email,
            display_name: body.display_name.or(body.username),
        })
    }
}

/// Stands in for the platform when its settings are missing.
pub struct UnconfiguredPlatform;

#[async_trait]
impl PlatformClient for UnconfiguredPlatform {
    async fn verify_user_token(&self, _token: &str) -> Result<String, PlatformError> {
        Err(PlatformError::NotConfigured("WHOP_API_KEY, WHOP_APP_ID or token key missing"))
    }

    async fn fetch_profile(&self, _external_id: &str) -> Result<PlatformProfile, PlatformError> {
        Err(PlatformError::NotConfigured("WHOP_API_KEY, WHOP_APP_ID or token key missing"))
    }
}
