use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};

/// Core module initialization order (excluding HTTP server)
const CORE_MODULE_ORDER: &[&str] = &[
    "telemetry", // Telemetry for logging
    "db",        // Store and role bootstrap
                 // Note: HTTP server is started separately after all modules are initialized
];

#[derive(Clone, Copy)]
enum Phase<'c, 'a> {
    Init(&'c InitCtx<'a>),
    Start(&'c InitCtx<'a>),
    Stop,
}

impl Phase<'_, '_> {
    fn verb(self) -> &'static str {
        match self {
            Phase::Init(_) => "initialize",
            Phase::Start(_) => "start",
            Phase::Stop => "stop",
        }
    }
}

/// Module registry for managing module lifecycle with core/custom separation
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// All registered modules, core first
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .chain(self.custom_modules.iter())
            .collect()
    }

    /// Feature modules in registration order
    pub fn custom_modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.custom_modules.iter()
    }

    /// Get a module by name (searches both core and custom modules)
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules().into_iter().find(|module| module.name() == name)
    }

    pub fn core_module_count(&self) -> usize {
        self.core_modules.len()
    }

    pub fn custom_module_count(&self) -> usize {
        self.custom_modules.len()
    }

    /// Core modules in `CORE_MODULE_ORDER`; unknown core names are skipped.
    fn ordered_core(&self) -> Vec<&Arc<dyn Module>> {
        CORE_MODULE_ORDER
            .iter()
            .filter_map(|&name| self.core_modules.iter().find(|m| m.name() == name))
            .collect()
    }

    async fn run_phase(
        modules: Vec<&Arc<dyn Module>>,
        phase: Phase<'_, '_>,
        kind: &str,
    ) -> anyhow::Result<()> {
        for module in modules {
            tracing::info!(module = module.name(), phase = phase.verb(), "{} module", kind);

            let result = match phase {
                Phase::Init(ctx) => module.init(ctx).await,
                Phase::Start(ctx) => module.start(ctx).await,
                Phase::Stop => module.stop().await,
            };
            result.with_context(|| {
                format!("failed to {} {} module '{}'", phase.verb(), kind, module.name())
            })?;
        }
        Ok(())
    }

    pub async fn init_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing core modules in order: {:?}", CORE_MODULE_ORDER);
        Self::run_phase(self.ordered_core(), Phase::Init(ctx), "core").await
    }

    pub async fn init_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} custom modules", self.custom_modules.len());
        Self::run_phase(self.custom_modules.iter().collect(), Phase::Init(ctx), "custom")
            .await
    }

    pub async fn start_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Self::run_phase(self.ordered_core(), Phase::Start(ctx), "core").await
    }

    pub async fn start_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Self::run_phase(self.custom_modules.iter().collect(), Phase::Start(ctx), "custom")
            .await
    }

    /// Stop custom modules in reverse registration order
    pub async fn stop_custom_modules(&self) -> anyhow::Result<()> {
        Self::run_phase(self.custom_modules.iter().rev().collect(), Phase::Stop, "custom")
            .await
    }

    /// Stop core modules in reverse of `CORE_MODULE_ORDER`
    pub async fn stop_core_modules(&self) -> anyhow::Result<()> {
        let mut core = self.ordered_core();
        core.reverse();
        Self::run_phase(core, Phase::Stop, "core").await
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
