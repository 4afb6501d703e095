/// Configuration for the backend
///
/// Everything is read once from the environment (after `.env` is loaded) and the
/// resulting `Config` is handed to the services at startup.
use std::env;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("JWT_SECRET must be set to a secure, unique value in production")]
    InsecureJwtSecret,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// development, production, test
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Base URL of the public site, used in password reset links
    pub frontend_url: String,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub password_hash_iterations: u32,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// When absent, mails are only logged
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
    /// Recipient of contact / testimonial notifications
    pub admin_email: Option<String>,
}

/// Per-client request budget on `/api`; `max_requests = 0` turns the limiter off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            max_requests: 100,
            window_seconds: 15 * 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = env::var("NODE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let mut allowed_origins: Vec<String> = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:5174".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        if !allowed_origins.contains(&frontend_url) {
            allowed_origins.push(frontend_url.clone());
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        if app_env == "production" && (jwt_secret.is_empty() || jwt_secret == DEFAULT_JWT_SECRET) {
            return Err(ConfigError::InsecureJwtSecret);
        }

        let from_email = env::var("EMAIL_FROM").unwrap_or_else(|_| "no-reply@localhost".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", 5000)?,
                frontend_url,
                allowed_origins,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_var("DB_POOL_MAX", 5)?,
                min_connections: parse_var("DB_POOL_MIN", 0)?,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_var("JWT_EXPIRE_HOURS", 24 * 7)?,
                reset_token_ttl_minutes: parse_var("RESET_TOKEN_TTL_MINUTES", 60)?,
                password_hash_iterations: parse_var("PASSWORD_HASH_ITERATIONS", 260_000)?,
            },
            email: EmailConfig {
                sendgrid_api_key: env::var("SENDGRID_API_KEY").ok().filter(|k| !k.is_empty()),
                from_email,
                from_name: env::var("EMAIL_FROM_NAME")
                    .unwrap_or_else(|_| "Raising African Children".to_string()),
                admin_email: env::var("ADMIN_EMAIL").ok().filter(|e| !e.is_empty()),
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_var("RATE_LIMIT_MAX", RateLimitConfig::default().max_requests)?,
                window_seconds: parse_var("RATE_LIMIT_WINDOW_SECS", RateLimitConfig::default().window_seconds)?,
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.app.env == "development"
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
