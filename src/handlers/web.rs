// src/handlers/web.rs

//! Páginas HTML: GET desenha o formulário ou a listagem, POST recebe
//! `application/x-www-form-urlencoded` e redireciona para a listagem.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::common::error::AppError;
use self::flash::Flash;

pub mod flash;
pub mod institutions;
pub mod pages;
pub mod roles;
pub mod views;
pub mod workers;

// Mensagens exibidas na própria página (sem redirecionamento)
pub(crate) const MSG_VALIDATION: &str = "GRAVAÇAO NÃO REALIZADA - Erro na Validacao!";
pub(crate) const MSG_WORKER_EXISTS: &str = "GRAVAÇAO NÃO REALIZADA - Colaborador já Existe!";
pub(crate) const MSG_INSTITUTION_EXISTS: &str = "GRAVAÇAO NÃO REALIZADA - Instituição já Existe!";
pub(crate) const MSG_ROLE_EXISTS: &str = "GRAVAÇAO NÃO REALIZADA - Permissão já Existe!";
pub(crate) const MSG_MISSING_VERSION: &str =
    "GRAVAÇAO NÃO REALIZADA - Versão do registro não informada; recarregue a página!";

/// Redireciona para `to` com a mensagem de sucesso, ou com `failure` quando a
/// entidade referenciada não existe. Demais erros seguem adiante.
pub(crate) fn redirect_after<T>(
    jar: CookieJar,
    to: &str,
    result: Result<T, AppError>,
    success: Flash,
    failure: Flash,
) -> Result<Response, AppError> {
    match result {
        Ok(_) => Ok(flash::redirect(jar, to, success).into_response()),
        Err(AppError::EntityExistsOrMissing { detail, .. }) => {
            tracing::info!("Solicitação recusada: {}", detail);
            Ok(flash::redirect(jar, to, failure).into_response())
        }
        Err(e) => Err(e),
    }
}
