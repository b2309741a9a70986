//! Shared types for the API layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::pipeline::analyzer::ExpenseAnalyzer;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub analyzer: Arc<ExpenseAnalyzer>,
}

impl ApiContext {
    pub fn new(analyzer: Arc<ExpenseAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Run pipeline work (OCR, registry lookups) on the blocking pool.
    pub async fn run_blocking<F, T>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&ExpenseAnalyzer) -> T + Send + 'static,
        T: Send + 'static,
    {
        let analyzer = Arc::clone(&self.analyzer);
        Ok(tokio::task::spawn_blocking(move || work(&analyzer)).await?)
    }
}
