//! Persistence collaborator for bookshare: the repository contract, the
//! in-memory store, and the `db` core module that bootstraps default roles.

pub mod memory;
pub mod repository;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use bookshare_kernel::{InitCtx, Module};
use tokio::sync::{Mutex, MutexGuard};

pub use memory::MemoryRepository;
pub use repository::{Repository, StoreResult};

/// Shared handle to the store.
///
/// [`Database::begin`] hands out exclusive access for the duration of one
/// request, so the read checks and the write of an engine call are applied
/// atomically relative to other requests.
#[derive(Debug, Default)]
pub struct Database {
    inner: Mutex<MemoryRepository>,
}

pub type UnitOfWork<'a> = MutexGuard<'a, MemoryRepository>;

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub async fn begin(&self) -> UnitOfWork<'_> {
        self.inner.lock().await
    }
}

/// Idempotently create every role in `roles`. Returns how many were new.
pub fn bootstrap_roles<R>(repo: &mut R, roles: &[String]) -> StoreResult<usize>
where
    R: Repository + ?Sized,
{
    let mut created = 0;
    for role in roles {
        if repo.ensure_role(role)? {
            tracing::info!(target: "bookshare-db", role = %role, "role created");
            created += 1;
        }
    }
    Ok(created)
}

/// Core module owning the store lifecycle.
pub struct DatabaseModule {
    database: Arc<Database>,
}

impl DatabaseModule {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let mut uow = self.database.begin().await;
        let created = bootstrap_roles(&mut *uow, &ctx.settings.database.default_roles)
            .context("failed to bootstrap default roles")?;
        tracing::info!(
            target: "bookshare-db",
            created,
            configured = ctx.settings.database.default_roles.len(),
            "store ready"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let uow = self.database.begin().await;
        tracing::info!(
            target: "bookshare-db",
            books = uow.book_count(),
            transactions = uow.transaction_count(),
            feedback = uow.feedback_count(),
            "store closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshare_kernel::settings::Settings;

    #[tokio::test]
    async fn init_bootstraps_roles_once() {
        let database = Database::shared();
        let module = DatabaseModule::new(Arc::clone(&database));
        let mut settings = Settings::default();
        settings.database.default_roles = vec!["USER".into(), "ADMIN".into()];
        let ctx = InitCtx {
            settings: &settings,
        };

        module.init(&ctx).await.unwrap();
        module.init(&ctx).await.unwrap();

        let uow = database.begin().await;
        assert_eq!(uow.roles().collect::<Vec<_>>(), vec!["ADMIN", "USER"]);
    }

    #[test]
    fn bootstrap_counts_only_new_roles() {
        let mut repo = MemoryRepository::new();
        let roles = vec!["USER".to_string()];
        assert_eq!(bootstrap_roles(&mut repo, &roles).unwrap(), 1);
        assert_eq!(bootstrap_roles(&mut repo, &roles).unwrap(), 0);
    }
}
