use serde::Deserialize;
use time::UtcOffset;
use tracing::warn;

use crate::nutrition::MacroGoals;

/// Key used to check the signature of platform user tokens.
#[derive(Debug, Clone, Deserialize)]
pub enum TokenKey {
    /// ES256 public key in PEM form, as issued by the platform.
    EcPem(String),
    /// Shared HS256 secret, used by local dev proxies.
    Secret(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    pub api_key: String,
    pub app_id: String,
    pub api_base: String,
    pub token_issuer: String,
    pub token_key: TokenKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// `None` when platform credentials are missing; sessions then fail as misconfigured.
    pub platform: Option<PlatformConfig>,
    pub default_targets: MacroGoals,
    pub weight_goal_slope: Option<f64>,
    #[serde(skip, default = "utc")]
    pub utc_offset: UtcOffset,
    pub seed_staple_foods: bool,
}

fn utc() -> UtcOffset {
    UtcOffset::UTC
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let defaults = MacroGoals::default();
        let default_targets = MacroGoals {
            calories: env_f64("DEFAULT_TARGET_CALORIES").unwrap_or(defaults.calories),
            protein: env_f64("DEFAULT_TARGET_PROTEIN").unwrap_or(defaults.protein),
            carbs: env_f64("DEFAULT_TARGET_CARBS").unwrap_or(defaults.carbs),
            fats: env_f64("DEFAULT_TARGET_FATS").unwrap_or(defaults.fats),
        };

        Ok(Self {
            database_url,
            platform: platform_from_env(),
            default_targets,
            weight_goal_slope: env_f64("WEIGHT_GOAL_SLOPE"),
            utc_offset: local_offset(),
            seed_staple_foods: std::env::var("SEED_STAPLE_FOODS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}

fn platform_from_env() -> Option<PlatformConfig> {
    let api_key = std::env::var("WHOP_API_KEY").ok();
    let app_id = std::env::var("WHOP_APP_ID").ok();
    let token_key = std::env::var("WHOP_TOKEN_PUBLIC_KEY")
        .map(TokenKey::EcPem)
        .or_else(|_| std::env::var("WHOP_TOKEN_SECRET").map(TokenKey::Secret))
        .ok();

    let (Some(api_key), Some(app_id), Some(token_key)) = (api_key, app_id, token_key) else {
        warn!("WHOP_API_KEY, WHOP_APP_ID or token key missing; sessions will be unavailable");
        return None;
    };

    Some(PlatformConfig {
        api_key,
        app_id,
        api_base: std::env::var("WHOP_API_BASE")
            .unwrap_or_else(|_| "https://api.whop.com/api/v5".into()),
        token_issuer: std::env::var("WHOP_TOKEN_ISSUER")
            .unwrap_or_else(|_| "urn:whopcom:exp-proxy".into()),
        token_key,
    })
}

fn local_offset() -> UtcOffset {
    if let Some(minutes) = std::env::var("APP_UTC_OFFSET_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i32>().ok())
    {
        match UtcOffset::from_whole_seconds(minutes * 60) {
            Ok(offset) => return offset,
            Err(e) => warn!(error = %e, minutes, "APP_UTC_OFFSET_MINUTES out of range"),
        }
    }
    UtcOffset::current_local_offset().unwrap_or_else(|_| {
        warn!("could not determine local offset; using UTC for calendar days");
        UtcOffset::UTC
    })
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
