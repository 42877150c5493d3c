// src/services/role_service.rs

use std::sync::Arc;

use crate::common::error::AppError;
use crate::common::formatting::{capitalize, sort_key};
use crate::db::{RoleRepository, WorkerRepository};
use crate::models::dto::MessageResponse;
use crate::models::{Role, Worker};

#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    workers: Arc<dyn WorkerRepository>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleRepository>, workers: Arc<dyn WorkerRepository>) -> Self {
        Self { roles, workers }
    }

    pub async fn list(&self, sorted: bool) -> Result<Vec<Role>, AppError> {
        let mut roles = self.roles.find_all().await?;
        if sorted {
            roles.sort_by_cached_key(|r| sort_key(&r.name));
        }
        Ok(roles)
    }

    pub async fn exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.roles.count_by_name(&capitalize(name.trim())).await? > 0)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        self.roles.find_by_id(id).await
    }

    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.roles.find_by_ids(ids).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        self.roles.find_by_name(&capitalize(name.trim())).await
    }

    /// Lado inverso do muitos-para-muitos: quem possui a permissão.
    pub async fn find_workers(&self, role_id: i64) -> Result<Vec<Worker>, AppError> {
        self.workers.find_by_role(role_id).await
    }

    pub async fn save(&self, role: Role) -> Result<Role, AppError> {
        let saved = self.roles.save(role).await?;
        tracing::info!("Permissão '{}' gravada (id {:?})", saved.name, saved.id);
        Ok(saved)
    }

    pub async fn update(&self, role: Role) -> Result<Role, AppError> {
        if role.id.is_none() {
            return Err(AppError::MissingInput("ID da Permissao não informado!".into()));
        }
        self.save(role).await
    }

    pub async fn delete(&self, role: &Role) -> Result<MessageResponse, AppError> {
        let id = role
            .id
            .ok_or_else(|| AppError::MissingInput("ID da Permissao não informado!".into()))?;

        if !self.roles.delete(id).await? {
            return Err(AppError::exists_or_missing(
                "Entidade nao foi deletada: Permissao com o ID informado não Existe!",
                "PERMISSÃO NÃO CADASTRADA",
            ));
        }
        tracing::info!("Permissão {} removida do sistema", id);
        Ok(MessageResponse::new("Permissao DELETADA no Sistema!"))
    }
}
