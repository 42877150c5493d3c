// src/db/institution_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::db_utils::{map_constraint_error, stale_version};
use crate::common::error::AppError;
use crate::models::Institution;

#[async_trait]
pub trait InstitutionRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Institution>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Institution>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Institution>, AppError>;
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Institution>, AppError>;
    async fn find_by_acronym(&self, acronym: &str) -> Result<Option<Institution>, AppError>;
    async fn count_by_cnpj(&self, cnpj: &str) -> Result<i64, AppError>;
    async fn count_by_name(&self, name: &str) -> Result<i64, AppError>;
    async fn save(&self, institution: Institution) -> Result<Institution, AppError>;
    /// Desvincula os participantes e remove a instituição, na mesma transação.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

const SELECT_INSTITUTION: &str = r#"
    SELECT instituicao_id, nome, cnpj, sigla, telefone, endereco_eletronico, google_maps, versao
    FROM instituicao
"#;
const DUPLICATE_INSTITUTION: &str = "Dados nao cadastrados: Instituicao já Existe!";

#[derive(Clone)]
pub struct PgInstitutionRepository {
    pool: PgPool,
}

impl PgInstitutionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one_by(&self, clause: &str, value: &str) -> Result<Option<Institution>, AppError> {
        let institution = sqlx::query_as::<_, Institution>(&format!(
            "{SELECT_INSTITUTION} WHERE {clause} ORDER BY instituicao_id LIMIT 1"
        ))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(institution)
    }
}

#[async_trait]
impl InstitutionRepository for PgInstitutionRepository {
    async fn find_all(&self) -> Result<Vec<Institution>, AppError> {
        let institutions =
            sqlx::query_as::<_, Institution>(&format!("{SELECT_INSTITUTION} ORDER BY instituicao_id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(institutions)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Institution>, AppError> {
        let institution =
            sqlx::query_as::<_, Institution>(&format!("{SELECT_INSTITUTION} WHERE instituicao_id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(institution)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Institution>, AppError> {
        self.find_one_by("nome = $1", name).await
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Institution>, AppError> {
        self.find_one_by("cnpj = $1", cnpj).await
    }

    async fn find_by_acronym(&self, acronym: &str) -> Result<Option<Institution>, AppError> {
        self.find_one_by("sigla = $1", acronym).await
    }

    async fn count_by_cnpj(&self, cnpj: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM instituicao WHERE cnpj = $1")
            .bind(cnpj)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_name(&self, name: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM instituicao WHERE nome = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save(&self, institution: Institution) -> Result<Institution, AppError> {
        let mut saved = institution.clone();

        match institution.id {
            None => {
                let (id, version): (i64, i64) = sqlx::query_as(
                    r#"
                    INSERT INTO instituicao (nome, cnpj, sigla, telefone, endereco_eletronico, google_maps)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING instituicao_id, versao
                    "#,
                )
                    .bind(&institution.name)
                    .bind(&institution.cnpj)
                    .bind(&institution.acronym)
                    .bind(&institution.phone)
                    .bind(&institution.email)
                    .bind(&institution.maps_url)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_constraint_error(e, DUPLICATE_INSTITUTION))?;
                saved.id = Some(id);
                saved.version = version;
            }
            Some(id) => {
                let version: Option<i64> = sqlx::query_scalar(
                    r#"
                    UPDATE instituicao
                    SET nome = $1, cnpj = $2, sigla = $3, telefone = $4,
                        endereco_eletronico = $5, google_maps = $6, versao = versao + 1
                    WHERE instituicao_id = $7 AND versao = $8
                    RETURNING versao
                    "#,
                )
                    .bind(&institution.name)
                    .bind(&institution.cnpj)
                    .bind(&institution.acronym)
                    .bind(&institution.phone)
                    .bind(&institution.email)
                    .bind(&institution.maps_url)
                    .bind(id)
                    .bind(institution.version)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_constraint_error(e, DUPLICATE_INSTITUTION))?;
                saved.version =
                    version.ok_or_else(|| stale_version("Instituição", id, institution.version))?;
            }
        }

        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // Participantes ficam sem instituição
        sqlx::query(
            "UPDATE colaborador SET instituicao = NULL, versao = versao + 1 WHERE instituicao = $1",
        )
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM instituicao WHERE instituicao_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
