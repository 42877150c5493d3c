// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Helper: tradução das violações de restrição do Postgres
// ---
/// Converte violações de unicidade/chave estrangeira em `IntegrityViolation`
/// com a mensagem informada; os demais erros seguem como `DatabaseError`.
pub(crate) fn map_constraint_error(e: sqlx::Error, detail: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            tracing::warn!(
                "Violação de restrição ({:?}): {}",
                db_err.constraint(),
                detail
            );
            return AppError::IntegrityViolation(detail.to_string());
        }
    }
    e.into()
}

/// Erro padrão para a trava otimista: a linha existe, mas a versão mudou.
pub(crate) fn stale_version(entity: &str, id: i64, version: i64) -> AppError {
    AppError::OptimisticLock(format!(
        "{} {} foi alterado por outra requisição (versão {} desatualizada).",
        entity, id, version
    ))
}
