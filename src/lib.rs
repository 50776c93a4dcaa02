//! bookshare application library
//!
//! Feature modules for the peer-to-peer lending backend and the bootstrap
//! sequence that wires them to the store, telemetry, and HTTP server.

pub mod modules;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshare_db::{Database, DatabaseModule};
use bookshare_kernel::settings::Settings;
use bookshare_kernel::{InitCtx, ModuleRegistry};

pub use state::AppState;

/// Register core and feature modules against a shared database.
pub fn build_registry(settings: &Settings, database: Arc<Database>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(bookshare_telemetry::create_module());
    registry.register_core(Arc::new(DatabaseModule::new(Arc::clone(&database))));
    modules::register_all(&mut registry, AppState::new(database, settings.pagination));
    registry
}

/// The full HTTP application without binding a socket.
pub fn build_app(registry: &ModuleRegistry, settings: &Settings) -> Router {
    bookshare_http::build_router(registry, settings)
}

/// Initialize every module, serve until shutdown, then stop modules in
/// reverse order.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings, Database::shared());
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;
    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    tracing::info!(
        env = ?settings.environment,
        modules = registry.modules().len(),
        "bookshare bootstrap complete"
    );

    let served = bookshare_http::start_server(&registry, &settings)
        .await
        .context("HTTP server terminated with an error");

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;
    served
}
