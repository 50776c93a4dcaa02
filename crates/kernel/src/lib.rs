//! Core types shared by every bookshare crate: the lending domain model,
//! the pagination envelope, the error taxonomy, layered settings, and the
//! module lifecycle.

pub mod error;
pub mod model;
pub mod module;
pub mod page;
pub mod registry;
pub mod settings;

pub use error::{DomainError, ForbiddenReason, StoreError};
pub use module::{InitCtx, Module};
pub use page::{Page, PageRequest};
pub use registry::ModuleRegistry;
