use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use shared::error::{AppError, Result};

/// Install the global tracing subscriber. Call once at process start.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taslim=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
