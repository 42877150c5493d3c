use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

// Títulos padrão das respostas (RFC 7807)
pub const TITLE_VALIDATION: &str = "Houve erro na validacao dos parametros enviados!";
pub const TITLE_INCONSISTENT: &str = "Estado Inconsistente da Entidade";
pub const TITLE_NULL_INPUT: &str = "Objeto NULO recebido na requisição";

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    // Entidade já cadastrada, ou ausente quando deveria existir
    #[error("{title}: {detail}")]
    EntityExistsOrMissing { title: String, detail: String },

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Violação de restrição do banco não capturada pela pré-verificação
    #[error("Violação de integridade: {0}")]
    IntegrityViolation(String),

    // Versão desatualizada (atualização concorrente)
    #[error("Conflito de versão: {0}")]
    OptimisticLock(String),

    #[error("Dado obrigatório ausente: {0}")]
    MissingInput(String),

    #[error("Parâmetro inválido: {0}")]
    InvalidParameter(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de template: {0}")]
    TemplateError(#[from] tera::Error),
}

impl AppError {
    /// Atalho para o erro mais comum da aplicação (entidade existente ou ausente).
    pub fn exists_or_missing(detail: impl Into<String>, title: impl Into<String>) -> Self {
        AppError::EntityExistsOrMissing {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

// Corpo JSON ausente ou malformado (tipo errado, enum desconhecido...)
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match &rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::MissingInput(rejection.body_text()),
            _ => AppError::InvalidParameter(rejection.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidParameter(rejection.body_text())
    }
}

// Um parâmetro inválido dentro do corpo "invalid-params"
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidParam {
    pub field_name: String,
    pub reason_error: String,
}

#[derive(Debug, Serialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(rename = "invalid-params", skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<InvalidParam>>,
}

impl ProblemDetail {
    fn bad_request(title: &str, detail: Option<String>) -> Self {
        Self {
            kind: "about:blank",
            title: title.to_string(),
            status: StatusCode::BAD_REQUEST.as_u16(),
            detail,
            invalid_params: None,
        }
    }
}

impl IntoResponse for ProblemDetail {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_REQUEST);
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self),
        )
            .into_response()
    }
}

/// Converte os erros do `validator` na lista de parâmetros inválidos.
pub fn invalid_params(errors: &validator::ValidationErrors) -> Vec<InvalidParam> {
    let mut params: Vec<InvalidParam> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| InvalidParam {
                field_name: field.to_string(),
                reason_error: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    // HashMap não tem ordem; ordenamos para respostas estáveis
    params.sort_by(|a, b| a.field_name.cmp(&b.field_name));
    params
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let problem = match self {
            AppError::EntityExistsOrMissing { title, detail } => {
                tracing::info!("Exception Gerada! Retornando BAD Request: {}", detail);
                ProblemDetail::bad_request(&title, Some(detail))
            }
            AppError::ValidationError(errors) => {
                tracing::info!("Erro de validação: {} - Retornando BAD Request!", errors);
                let mut pd = ProblemDetail::bad_request(TITLE_VALIDATION, None);
                pd.invalid_params = Some(invalid_params(&errors));
                pd
            }
            AppError::IntegrityViolation(detail) | AppError::OptimisticLock(detail) => {
                tracing::info!("Exception Gerada: {} - Retornando BAD Request!", detail);
                ProblemDetail::bad_request(TITLE_INCONSISTENT, Some(detail))
            }
            AppError::MissingInput(detail) | AppError::InvalidParameter(detail) => {
                tracing::info!("Exception Gerada: {} - Retornando BAD Request!", detail);
                ProblemDetail::bad_request(TITLE_NULL_INPUT, Some(detail))
            }

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                let body = Json(json!({ "error": "Ocorreu um erro inesperado." }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        problem.into_response()
    }
}
