//! Business logic services

pub mod admin;
pub mod borrows;
pub mod catalog;
pub mod email;
pub mod redis;
pub mod storage;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowsService,
    pub users: users::UsersService,
    pub admin: admin::AdminService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        redis_service: redis::RedisService,
        storage: Arc<dyn storage::ObjectStore>,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(
                repository.clone(),
                storage,
                config.storage.max_upload_bytes,
            ),
            borrows: borrows::BorrowsService::new(repository.clone(), config.borrows.loan_period_days),
            users: users::UsersService::new(
                repository.clone(),
                config.auth.clone(),
                redis_service,
                email::EmailService::new(config.email.clone()),
            ),
            admin: admin::AdminService::new(repository.clone()),
            repository,
        }
    }
}
