pub mod catalog;
pub mod circulation;
pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshare_db::Repository;
use bookshare_kernel::model::{Book, BookId};
use bookshare_kernel::{DomainError, InitCtx, Module};

use crate::state::AppState;

/// Books module: listings, circulation, and borrower history
pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            page_size = ctx.settings.pagination.default_size,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }
}

/// Fetch a book or fail with `NotFound`.
pub(crate) fn load_book<R>(repo: &R, id: BookId) -> Result<Book, DomainError>
where
    R: Repository + ?Sized,
{
    repo.find_book_by_id(id)?
        .ok_or_else(|| DomainError::not_found("book", id))
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(state))
}
