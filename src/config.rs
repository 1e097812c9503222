use tracing::warn;

pub const DEFAULT_SESSION_SECRET: &str = "budgetwise-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    /// Adds `Secure` to the session cookie.
    pub secure_cookie: bool,
}

/// S3-compatible bucket for profile pictures.
#[derive(Debug, Clone)]
pub struct MinioConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
    pub upload_dir: String,
    pub minio: Option<MinioConfig>,
    /// 0 disables the background reminder check.
    pub reminder_check_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = match get("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid APP_PORT {raw:?}: {e}"))?,
            None => 8080,
        };

        let secret = get("SESSION_SECRET").unwrap_or_else(|| {
            warn!("SESSION_SECRET not set; using the built-in development secret");
            DEFAULT_SESSION_SECRET.to_string()
        });
        let session = SessionConfig {
            secret,
            issuer: or("SESSION_ISSUER", "budgetwise"),
            audience: or("SESSION_AUDIENCE", "budgetwise-users"),
            ttl_minutes: get("SESSION_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|m| *m > 0)
                .unwrap_or(60 * 24 * 7),
            secure_cookie: get("APP_ENV").as_deref() == Some("production"),
        };

        let minio = get("MINIO_ENDPOINT").map(|endpoint| MinioConfig {
            endpoint,
            bucket: or("MINIO_BUCKET", "budgetwise"),
            access_key: or("MINIO_ACCESS_KEY", "minioadmin"),
            secret_key: or("MINIO_SECRET_KEY", "minioadmin"),
            region: or("MINIO_REGION", "us-east-1"),
        });

        Ok(Self {
            database_url: get("DATABASE_URL"),
            host: or("APP_HOST", "0.0.0.0"),
            port,
            session,
            upload_dir: or("UPLOAD_DIR", "uploads"),
            minio,
            reminder_check_interval_secs: get("REMINDER_CHECK_INTERVAL_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(3600),
        })
    }
}
