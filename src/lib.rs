pub mod api; // HTTP API for the submission flow and admin dashboard
pub mod config;
pub mod pipeline;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiContext, StartupError};
use crate::config::FundexConfig;
use crate::pipeline::analyzer::build_analyzer;

pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = FundexConfig::from_env()?;

    // Blocking HTTP clients must be built outside the async runtime
    let analyzer = build_analyzer(&config)?;
    let ctx = ApiContext::new(Arc::new(analyzer));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(config.bind_addr, ctx))
}
