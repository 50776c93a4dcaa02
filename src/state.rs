use std::sync::Arc;

use bookshare_db::Database;
use bookshare_kernel::settings::PaginationSettings;
use bookshare_kernel::{DomainError, PageRequest};
use serde::Deserialize;

/// State shared by every feature router.
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub pagination: PaginationSettings,
}

impl AppState {
    pub fn new(database: Arc<Database>, pagination: PaginationSettings) -> Self {
        Self {
            database,
            pagination,
        }
    }
}

/// `?page=&size=` query parameters of every listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: usize,
    pub size: Option<usize>,
}

impl PageQuery {
    pub fn resolve(&self, pagination: &PaginationSettings) -> Result<PageRequest, DomainError> {
        PageRequest::new(self.page, pagination.resolve_size(self.size))
    }
}
