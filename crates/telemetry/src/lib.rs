//! Logging bootstrap for bookshare binaries.

use std::sync::Arc;

use async_trait::async_trait;
use bookshare_kernel::settings::{LogFormat, TelemetrySettings};
use bookshare_kernel::{InitCtx, Module};
use tracing_subscriber::EnvFilter;

/// Resolve the filter: `RUST_LOG` wins over the configured directive.
fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns `false` when one was already set,
/// which leaves the existing subscriber in place.
pub fn init(settings: &TelemetrySettings) -> bool {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(settings));
    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().flatten_event(true).try_init().is_ok(),
    };

    if installed {
        tracing::info!(
            target: "bookshare-telemetry",
            format = ?settings.log_format,
            filter = %settings.filter,
            "telemetry initialized"
        );
    }
    installed
}

/// Core module wrapping [`init`] so telemetry comes up first in the lifecycle.
pub struct TelemetryModule;

#[async_trait]
impl Module for TelemetryModule {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        init(&ctx.settings.telemetry);
        Ok(())
    }
}

pub fn create_module() -> Arc<dyn Module> {
    Arc::new(TelemetryModule)
}
