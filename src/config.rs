use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use time::UtcOffset;

use crate::dates::parse_offset;

pub const DEFAULT_HUDS_BASE_URL: &str = "https://go.prod.apis.huit.harvard.edu/ats/dining/v3";
const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HudsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub huds: HudsConfig,
    /// Offset used to decide what "today" is.
    pub utc_offset: UtcOffset,
    pub max_photo_bytes: usize,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: var_or("JWT_ISSUER", "crimsonfuel"),
            audience: var_or("JWT_AUDIENCE", "crimsonfuel-users"),
            ttl_minutes: parsed_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parsed_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let storage = StorageConfig {
            endpoint: var_or("MINIO_ENDPOINT", "http://localhost:9000"),
            bucket: var_or("MINIO_BUCKET", "meal-photos"),
            access_key: var_or("MINIO_ACCESS_KEY", "minioadmin"),
            secret_key: var_or("MINIO_SECRET_KEY", "minioadmin"),
            region: var_or("MINIO_REGION", "us-east-1"),
        };
        let huds = HudsConfig {
            base_url: var_or("HUDS_API_BASE_URL", DEFAULT_HUDS_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: var_or("HUDS_API_KEY", ""),
            timeout: Duration::from_secs(parsed_or("HUDS_TIMEOUT_SECS", 10)),
        };
        let utc_offset = parse_offset(&var_or("APP_UTC_OFFSET", "+00:00"))?;
        let max_photo_bytes = parsed_or("MAX_PHOTO_BYTES", DEFAULT_MAX_PHOTO_BYTES);

        Ok(Self {
            database_url,
            jwt,
            storage,
            huds,
            utc_offset,
            max_photo_bytes,
        })
    }
}
