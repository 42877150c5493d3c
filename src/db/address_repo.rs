// src/db/address_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};

use crate::common::db_utils::{map_constraint_error, stale_version};
use crate::common::error::AppError;
use crate::models::Address;

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Address>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Address>, AppError>;
    /// Insere (sem id) ou atualiza com checagem de versão.
    async fn save(&self, address: Address) -> Result<Address, AppError>;
    /// Desvincula o colaborador dono e remove o endereço.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

const SELECT_ADDRESS: &str = r#"
    SELECT endereco_id, cep, logradouro, numero, complemento, bairro,
           localidade, estado, ibge, versao
    FROM endereco
"#;

#[derive(Clone)]
pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ---
// Primitiva compartilhada com o repositório de colaboradores
// ---
/// Grava o endereço usando o executor recebido (pool ou transação).
pub(crate) async fn upsert_address<'e, E>(executor: E, address: &Address) -> Result<Address, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut saved = address.clone();

    match address.id {
        None => {
            let (id, version): (i64, i64) = sqlx::query_as(
                r#"
                INSERT INTO endereco (cep, logradouro, numero, complemento, bairro, localidade, estado, ibge)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING endereco_id, versao
                "#,
            )
                .bind(&address.cep)
                .bind(&address.street)
                .bind(&address.number)
                .bind(&address.complement)
                .bind(&address.neighborhood)
                .bind(&address.city)
                .bind(&address.state)
                .bind(&address.ibge)
                .fetch_one(executor)
                .await?;
            saved.id = Some(id);
            saved.version = version;
        }
        Some(id) => {
            let version: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE endereco
                SET cep = $1, logradouro = $2, numero = $3, complemento = $4, bairro = $5,
                    localidade = $6, estado = $7, ibge = $8, versao = versao + 1
                WHERE endereco_id = $9 AND versao = $10
                RETURNING versao
                "#,
            )
                .bind(&address.cep)
                .bind(&address.street)
                .bind(&address.number)
                .bind(&address.complement)
                .bind(&address.neighborhood)
                .bind(&address.city)
                .bind(&address.state)
                .bind(&address.ibge)
                .bind(id)
                .bind(address.version)
                .fetch_optional(executor)
                .await?;

            // Sem linha afetada: id inexistente ou versão desatualizada
            saved.version = version.ok_or_else(|| stale_version("Endereço", id, address.version))?;
        }
    }

    Ok(saved)
}

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn find_all(&self) -> Result<Vec<Address>, AppError> {
        let addresses = sqlx::query_as::<_, Address>(&format!("{SELECT_ADDRESS} ORDER BY endereco_id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(addresses)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Address>, AppError> {
        let address = sqlx::query_as::<_, Address>(&format!("{SELECT_ADDRESS} WHERE endereco_id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(address)
    }

    async fn save(&self, address: Address) -> Result<Address, AppError> {
        upsert_address(&self.pool, &address).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE colaborador SET endereco = NULL, versao = versao + 1 WHERE endereco = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM endereco WHERE endereco_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint_error(e, "Endereço ainda referenciado."))?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
