//! Logging setup: one tracing subscriber for the whole process.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Initialize the logging system
///
/// `RUST_LOG` wins when present. Production logs are JSON lines, development logs are
/// pretty-printed.
pub fn init(config: &Config) {
    let default_level = if config.is_production() { "info" } else { "debug" };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "rac_backend={},actix_web=info,sea_orm=warn,sqlx=warn",
            default_level
        ))
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.is_production() {
        subscriber
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        subscriber.with(fmt::layer().with_target(true)).init();
    }

    tracing::info!(environment = %config.app.env, "logging initialized");
}
