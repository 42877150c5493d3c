// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::db::{
    AddressRepository, InMemoryStore, InstitutionRepository, PgAddressRepository,
    PgInstitutionRepository, PgRoleRepository, PgWorkerRepository, RoleRepository,
    WorkerRepository,
};
use crate::handlers::web::views::Views;
use crate::services::{AddressService, InstitutionService, RoleService, WorkerService};

/// Configuração lida do ambiente (e do arquivo `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    // Sem DATABASE_URL a aplicação sobe com o armazenamento em memória
    pub database_url: Option<String>,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub bcrypt_cost: u32,
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", name, raw)),
        _ => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Option<PgPool>,
    pub worker_service: WorkerService,
    pub institution_service: InstitutionService,
    pub role_service: RoleService,
    pub views: Arc<Views>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let Some(database_url) = &settings.database_url else {
            tracing::warn!("⚠️ DATABASE_URL não definida: usando armazenamento em memória (dados não persistem)");
            return Self::in_memory(settings.bcrypt_cost);
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_postgres(db_pool, settings.bcrypt_cost)
    }

    pub fn with_postgres(db_pool: PgPool, bcrypt_cost: u32) -> anyhow::Result<Self> {
        let workers: Arc<dyn WorkerRepository> = Arc::new(PgWorkerRepository::new(db_pool.clone()));
        let institutions: Arc<dyn InstitutionRepository> =
            Arc::new(PgInstitutionRepository::new(db_pool.clone()));
        let roles: Arc<dyn RoleRepository> = Arc::new(PgRoleRepository::new(db_pool.clone()));
        let addresses: Arc<dyn AddressRepository> = Arc::new(PgAddressRepository::new(db_pool.clone()));

        Self::assemble(Some(db_pool), workers, institutions, roles, addresses, bcrypt_cost)
    }

    pub fn in_memory(bcrypt_cost: u32) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryStore::new());
        Self::assemble(None, store.clone(), store.clone(), store.clone(), store, bcrypt_cost)
    }

    // --- Monta o gráfico de dependências ---
    fn assemble(
        db_pool: Option<PgPool>,
        workers: Arc<dyn WorkerRepository>,
        institutions: Arc<dyn InstitutionRepository>,
        roles: Arc<dyn RoleRepository>,
        addresses: Arc<dyn AddressRepository>,
        bcrypt_cost: u32,
    ) -> anyhow::Result<Self> {
        let views = Views::new().context("Falha ao carregar os templates")?;

        Ok(Self {
            db_pool,
            worker_service: WorkerService::new(
                workers.clone(),
                roles.clone(),
                institutions.clone(),
                AddressService::new(addresses),
                bcrypt_cost,
            ),
            institution_service: InstitutionService::new(institutions, workers.clone()),
            role_service: RoleService::new(roles, workers),
            views: Arc::new(views),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_state_loads_templates() {
        let state = AppState::in_memory(4).unwrap();
        assert!(state.db_pool.is_none());
    }

    #[test]
    fn numeric_variables_fall_back_to_defaults() {
        assert_eq!(parse_var("OBREIROS_TESTE_VARIAVEL_INEXISTENTE", 7u32).unwrap(), 7);
    }
}
