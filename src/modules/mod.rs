pub mod books;
pub mod feedback;

use bookshare_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register all feature modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, state: AppState) {
    registry.register_custom(books::create_module(state.clone()));
    registry.register_custom(feedback::create_module(state));
}
