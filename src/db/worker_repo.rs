// src/db/worker_repo.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::common::db_utils::{map_constraint_error, stale_version};
use crate::common::error::AppError;
use crate::db::address_repo::upsert_address;
use crate::models::{Address, Gender, Worker};

#[async_trait]
pub trait WorkerRepository: Send + Sync {
    /// Todos os colaboradores, em ordem de id.
    async fn find_all(&self) -> Result<Vec<Worker>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, AppError>;
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Worker>, AppError>;
    async fn find_by_first_name(&self, name: &str) -> Result<Option<Worker>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Worker>, AppError>;
    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Worker>, AppError>;
    async fn find_by_institution(&self, institution_id: i64) -> Result<Vec<Worker>, AppError>;
    async fn find_by_role(&self, role_id: i64) -> Result<Vec<Worker>, AppError>;
    async fn count_by_cpf(&self, cpf: &str) -> Result<i64, AppError>;
    /// Grava o colaborador com endereço e permissões numa única transação.
    /// Sem id insere; com id atualiza checando a versão.
    async fn save(&self, worker: Worker) -> Result<Worker, AppError>;
    /// Remove vínculos, o colaborador e o endereço dele, atomicamente.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

const SELECT_WORKER: &str = r#"
    SELECT c.colaborador_id, c.cpf, c.nome, c.sobrenome, c.email, c.data_nascimento,
           c.whatsapp, c.sexo, c.password, c.verification_code, c.ativo, c.versao,
           c.instituicao,
           e.endereco_id, e.cep, e.logradouro, e.numero, e.complemento, e.bairro,
           e.localidade, e.estado, e.ibge, e.versao AS endereco_versao,
           ARRAY(
               SELECT p.rules_id FROM permissoes_dos_colaboradores p
               WHERE p.colaborador_id = c.colaborador_id
               ORDER BY p.rules_id
           ) AS permissoes
    FROM colaborador c
    LEFT JOIN endereco e ON e.endereco_id = c.endereco
"#;
const DUPLICATE_WORKER: &str = "Dados nao cadastrados: Colaborador já Existe!";

// Linha "achatada" do SELECT acima
#[derive(Debug, FromRow)]
struct WorkerRow {
    colaborador_id: i64,
    cpf: String,
    nome: String,
    sobrenome: String,
    email: String,
    data_nascimento: String,
    whatsapp: String,
    sexo: Gender,
    password: String,
    verification_code: String,
    ativo: bool,
    versao: i64,
    instituicao: Option<i64>,
    endereco_id: Option<i64>,
    cep: Option<String>,
    logradouro: Option<String>,
    numero: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    estado: Option<String>,
    ibge: Option<String>,
    endereco_versao: Option<i64>,
    permissoes: Vec<i64>,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        let address = row.endereco_id.map(|id| Address {
            id: Some(id),
            cep: row.cep.unwrap_or_default(),
            street: row.logradouro.unwrap_or_default(),
            number: row.numero.unwrap_or_default(),
            complement: row.complemento.unwrap_or_default(),
            neighborhood: row.bairro.unwrap_or_default(),
            city: row.localidade.unwrap_or_default(),
            state: row.estado.unwrap_or_default(),
            ibge: row.ibge.unwrap_or_default(),
            version: row.endereco_versao.unwrap_or_default(),
        });

        Worker {
            id: Some(row.colaborador_id),
            cpf: row.cpf,
            first_name: row.nome,
            last_name: row.sobrenome,
            email: row.email,
            birth_date: row.data_nascimento,
            whatsapp: row.whatsapp,
            gender: row.sexo,
            password: row.password,
            verification_code: row.verification_code,
            active: row.ativo,
            version: row.versao,
            role_ids: row.permissoes.into_iter().collect(),
            address,
            institution_id: row.instituicao,
        }
    }
}

#[derive(Clone)]
pub struct PgWorkerRepository {
    pool: PgPool,
}

impl PgWorkerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, clause: &str, id: Option<i64>) -> Result<Vec<Worker>, AppError> {
        let sql = format!("{SELECT_WORKER} {clause}");
        let mut query = sqlx::query_as::<_, WorkerRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<Worker>, AppError> {
        let row = sqlx::query_as::<_, WorkerRow>(&format!(
            "{SELECT_WORKER} WHERE {column} = $1 ORDER BY c.colaborador_id LIMIT 1"
        ))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Worker::from))
    }
}

#[async_trait]
impl WorkerRepository for PgWorkerRepository {
    async fn find_all(&self) -> Result<Vec<Worker>, AppError> {
        self.fetch_many("ORDER BY c.colaborador_id", None).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, AppError> {
        let mut workers = self
            .fetch_many("WHERE c.colaborador_id = $1", Some(id))
            .await?;
        Ok(workers.pop())
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Worker>, AppError> {
        self.fetch_one_by("c.cpf", cpf).await
    }

    async fn find_by_first_name(&self, name: &str) -> Result<Option<Worker>, AppError> {
        self.fetch_one_by("c.nome", name).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Worker>, AppError> {
        self.fetch_one_by("c.email", email).await
    }

    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Worker>, AppError> {
        self.fetch_one_by("c.verification_code", code).await
    }

    async fn find_by_institution(&self, institution_id: i64) -> Result<Vec<Worker>, AppError> {
        self.fetch_many(
            "WHERE c.instituicao = $1 ORDER BY c.colaborador_id",
            Some(institution_id),
        )
            .await
    }

    async fn find_by_role(&self, role_id: i64) -> Result<Vec<Worker>, AppError> {
        self.fetch_many(
            r#"
            WHERE EXISTS (
                SELECT 1 FROM permissoes_dos_colaboradores p
                WHERE p.colaborador_id = c.colaborador_id AND p.rules_id = $1
            )
            ORDER BY c.colaborador_id
            "#,
            Some(role_id),
        )
            .await
    }

    async fn count_by_cpf(&self, cpf: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM colaborador WHERE cpf = $1")
            .bind(cpf)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save(&self, worker: Worker) -> Result<Worker, AppError> {
        let mut saved = worker.clone();

        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Endereço (dono é o colaborador)
        if let Some(address) = &worker.address {
            saved.address = Some(upsert_address(&mut *tx, address).await?);
        }
        let address_id = saved.address.as_ref().and_then(|a| a.id);

        // 3. Linha do colaborador
        let id = match worker.id {
            None => {
                let (id, version): (i64, i64) = sqlx::query_as(
                    r#"
                    INSERT INTO colaborador
                        (cpf, nome, sobrenome, email, data_nascimento, whatsapp, sexo,
                         password, verification_code, ativo, endereco, instituicao)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    RETURNING colaborador_id, versao
                    "#,
                )
                    .bind(&worker.cpf)
                    .bind(&worker.first_name)
                    .bind(&worker.last_name)
                    .bind(&worker.email)
                    .bind(&worker.birth_date)
                    .bind(&worker.whatsapp)
                    .bind(worker.gender)
                    .bind(&worker.password)
                    .bind(&worker.verification_code)
                    .bind(worker.active)
                    .bind(address_id)
                    .bind(worker.institution_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_constraint_error(e, DUPLICATE_WORKER))?;
                saved.version = version;
                id
            }
            Some(id) => {
                let version: Option<i64> = sqlx::query_scalar(
                    r#"
                    UPDATE colaborador
                    SET cpf = $1, nome = $2, sobrenome = $3, email = $4, data_nascimento = $5,
                        whatsapp = $6, sexo = $7, password = $8, verification_code = $9,
                        ativo = $10, endereco = $11, instituicao = $12, versao = versao + 1
                    WHERE colaborador_id = $13 AND versao = $14
                    RETURNING versao
                    "#,
                )
                    .bind(&worker.cpf)
                    .bind(&worker.first_name)
                    .bind(&worker.last_name)
                    .bind(&worker.email)
                    .bind(&worker.birth_date)
                    .bind(&worker.whatsapp)
                    .bind(worker.gender)
                    .bind(&worker.password)
                    .bind(&worker.verification_code)
                    .bind(worker.active)
                    .bind(address_id)
                    .bind(worker.institution_id)
                    .bind(id)
                    .bind(worker.version)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| map_constraint_error(e, DUPLICATE_WORKER))?;
                saved.version = version.ok_or_else(|| stale_version("Colaborador", id, worker.version))?;

                sqlx::query("DELETE FROM permissoes_dos_colaboradores WHERE colaborador_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                id
            }
        };
        saved.id = Some(id);

        // 4. Tabela-ponte (substitui o conjunto inteiro)
        if !worker.role_ids.is_empty() {
            let role_ids: Vec<i64> = worker.role_ids.iter().copied().collect();
            sqlx::query(
                r#"
                INSERT INTO permissoes_dos_colaboradores (colaborador_id, rules_id)
                SELECT $1, unnest($2::bigint[])
                ON CONFLICT DO NOTHING
                "#,
            )
                .bind(id)
                .bind(&role_ids)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_constraint_error(e, "Permissão informada não Existe!"))?;
        }

        // 5. Commit
        tx.commit().await?;

        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM permissoes_dos_colaboradores WHERE colaborador_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let address_id: Option<Option<i64>> =
            sqlx::query_scalar("DELETE FROM colaborador WHERE colaborador_id = $1 RETURNING endereco")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(address_id) = address_id else {
            // Nada foi removido; o rollback acontece no drop
            return Ok(false);
        };

        if let Some(address_id) = address_id {
            sqlx::query("DELETE FROM endereco WHERE endereco_id = $1")
                .bind(address_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
