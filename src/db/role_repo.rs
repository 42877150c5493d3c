// src/db/role_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::db_utils::{map_constraint_error, stale_version};
use crate::common::error::AppError;
use crate::models::Role;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Role>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;
    async fn count_by_name(&self, name: &str) -> Result<i64, AppError>;
    async fn save(&self, role: Role) -> Result<Role, AppError>;
    /// Remove os vínculos com colaboradores e a permissão, na mesma transação.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

const SELECT_ROLE: &str = "SELECT rules_id, rule_name, versao FROM rules";
const DUPLICATE_ROLE: &str = "Dados nao cadastrados: Permissao já Existe!";

#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_all(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(&format!("{SELECT_ROLE} ORDER BY rules_id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!("{SELECT_ROLE} WHERE rules_id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        // O SQLx lida bem com arrays usando ANY
        let roles = sqlx::query_as::<_, Role>(&format!(
            "{SELECT_ROLE} WHERE rules_id = ANY($1) ORDER BY rules_id"
        ))
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!("{SELECT_ROLE} WHERE rule_name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn count_by_name(&self, name: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rules WHERE rule_name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save(&self, role: Role) -> Result<Role, AppError> {
        let mut saved = role.clone();

        match role.id {
            None => {
                let (id, version): (i64, i64) = sqlx::query_as(
                    "INSERT INTO rules (rule_name) VALUES ($1) RETURNING rules_id, versao",
                )
                    .bind(&role.name)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_constraint_error(e, DUPLICATE_ROLE))?;
                saved.id = Some(id);
                saved.version = version;
            }
            Some(id) => {
                let version: Option<i64> = sqlx::query_scalar(
                    r#"
                    UPDATE rules SET rule_name = $1, versao = versao + 1
                    WHERE rules_id = $2 AND versao = $3
                    RETURNING versao
                    "#,
                )
                    .bind(&role.name)
                    .bind(id)
                    .bind(role.version)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_constraint_error(e, DUPLICATE_ROLE))?;
                saved.version = version.ok_or_else(|| stale_version("Permissão", id, role.version))?;
            }
        }

        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM permissoes_dos_colaboradores WHERE rules_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM rules WHERE rules_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
