pub mod gate;
pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshare_kernel::{InitCtx, Module};

use crate::state::AppState;

/// Feedback module: reviews on books in circulation
pub struct FeedbackModule {
    state: AppState,
}

#[async_trait]
impl Module for FeedbackModule {
    fn name(&self) -> &'static str {
        "feedbacks"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "feedback module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(FeedbackModule { state })
}
