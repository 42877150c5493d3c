// src/bootstrap.rs

//! Dados mínimos para o primeiro acesso: a permissão de administrador e
//! uma conta que a possua. Pode rodar a cada inicialização.

use crate::common::error::AppError;
use crate::config::AppState;
use crate::models::{Gender, Role, Worker};

pub const ADMIN_ROLE: &str = "Administrador";
pub const ADMIN_CPF: &str = "53376207704";
const ADMIN_EMAIL: &str = "admin@obreiros.com";
const ADMIN_PASSWORD: &str = "admin-obreiro";

fn default_admin() -> Worker {
    let mut worker = Worker::default();
    worker.set_cpf(ADMIN_CPF);
    worker.set_first_name("admin");
    worker.set_last_name("obreiro");
    worker.set_email(ADMIN_EMAIL);
    worker.set_birth_date("01/01/2024");
    worker.gender = Gender::Unspecified;
    worker.active = true;
    worker
}

/// Garante a permissão "Administrador" e pelo menos um colaborador com ela.
pub async fn ensure_admin(app_state: &AppState) -> Result<(), AppError> {
    let roles = &app_state.role_service;
    let role = match roles.find_by_name(ADMIN_ROLE).await? {
        Some(role) => role,
        None => {
            tracing::info!("Criando permissão '{}'", ADMIN_ROLE);
            roles.save(Role::new(ADMIN_ROLE)).await?
        }
    };
    let Some(role_id) = role.id else {
        return Err(AppError::MissingInput(format!(
            "Permissão '{}' gravada sem ID",
            ADMIN_ROLE
        )));
    };

    if !roles.find_workers(role_id).await?.is_empty() {
        tracing::debug!("Administrador já cadastrado");
        return Ok(());
    }

    let workers = &app_state.worker_service;
    let admin = match workers.find_by_cpf(ADMIN_CPF).await? {
        Some(worker) => worker,
        None => {
            tracing::info!("Criando conta padrão de administrador ({})", ADMIN_EMAIL);
            workers.save(default_admin(), Some(ADMIN_PASSWORD)).await?
        }
    };
    let Some(admin_id) = admin.id else {
        return Err(AppError::MissingInput("Administrador gravado sem ID".into()));
    };

    let mut role_ids: Vec<i64> = admin.role_ids.iter().copied().collect();
    role_ids.push(role_id);
    workers.replace_roles(admin_id, &role_ids).await?;

    tracing::warn!(
        "⚠️ Conta de administrador padrão ativa ({}); troque a senha",
        ADMIN_EMAIL
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_role_and_admin_once() {
        let state = AppState::in_memory(4).unwrap();

        ensure_admin(&state).await.unwrap();
        ensure_admin(&state).await.unwrap();

        let roles = state.role_service.list(false).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, ADMIN_ROLE);

        let workers = state.worker_service.list(false).await.unwrap();
        assert_eq!(workers.len(), 1);
        let admin = &workers[0];
        assert_eq!(admin.cpf, ADMIN_CPF);
        assert_eq!(admin.email, ADMIN_EMAIL);
        assert!(admin.active);
        assert!(admin.has_role(roles[0].id.unwrap()));
        assert!(bcrypt::verify(ADMIN_PASSWORD, &admin.password).unwrap());
    }

    #[tokio::test]
    async fn reuses_existing_worker_with_admin_cpf() {
        let state = AppState::in_memory(4).unwrap();
        let mut existing = default_admin();
        existing.set_first_name("fulano");
        state.worker_service.save(existing, None).await.unwrap();

        ensure_admin(&state).await.unwrap();

        let workers = state.worker_service.list(false).await.unwrap();
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].first_name, "Fulano");
        assert_eq!(workers[0].role_ids.len(), 1);
    }
}
