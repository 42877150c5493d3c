// src/handlers/api/workers.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{
        extract::{ApiJson, ApiPath},
        parse_flag,
    },
    models::{
        dto::{MessageResponse, PasswordRequest, WorkerDto, WorkerResponse},
        Address,
    },
    services::PasswordService,
};

const TITLE_NOT_REGISTERED: &str = "COLABORADOR NÃO CADASTRADO";

fn not_registered() -> AppError {
    AppError::exists_or_missing(
        "Dados nao cadastrados: Colaborador com o ID informado não Existe!",
        TITLE_NOT_REGISTERED,
    )
}

fn not_found(by: &str) -> AppError {
    AppError::exists_or_missing(
        format!("Entidade nao encontrada: Colaborador com o {} informado não Existe!", by),
        TITLE_NOT_REGISTERED,
    )
}

#[utoipa::path(
    get,
    path = "/v1/colaborador/listar/{ordenar}",
    tag = "Colaborador",
    params(("ordenar" = String, Path, description = "true/false: ordenar pelo nome")),
    responses(
        (status = 200, description = "Colaboradores cadastrados", body = [WorkerResponse]),
        (status = 400, description = "Parâmetro de ordenação inválido")
    )
)]
pub async fn list_workers(
    State(app_state): State<AppState>,
    ApiPath(ordenar): ApiPath<String>,
) -> Result<Json<Vec<WorkerResponse>>, AppError> {
    let sorted = parse_flag(&ordenar)?;
    let workers = app_state.worker_service.list(sorted).await?;
    let response = app_state.worker_service.to_responses(&workers).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/v1/colaborador/cadastrar",
    tag = "Colaborador",
    request_body = WorkerDto,
    responses(
        (status = 201, description = "Colaborador cadastrado", body = WorkerResponse),
        (status = 400, description = "Dados inválidos ou CPF já cadastrado")
    )
)]
pub async fn register_worker(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<WorkerDto>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let service = &app_state.worker_service;
    if service.exists(&payload.cpf).await? {
        tracing::warn!("Cadastro recusado: CPF {} já existe", payload.cpf);
        return Err(AppError::exists_or_missing(
            "Dados nao cadastrados: Colaborador já Existe!",
            "COLABORADOR JÁ CADASTRADO",
        ));
    }

    // O id enviado pelo cliente é descartado
    let password = payload.new_password().map(str::to_string);
    let saved = service
        .save(payload.into_new_worker(), password.as_deref())
        .await?;
    let response = service.to_response(&saved).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/v1/colaborador/atualizar",
    tag = "Colaborador",
    request_body = WorkerDto,
    responses(
        (status = 200, description = "Colaborador atualizado", body = WorkerResponse),
        (status = 400, description = "Colaborador inexistente, versão ausente ou desatualizada")
    )
)]
pub async fn update_worker(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<WorkerDto>,
) -> Result<Json<WorkerResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let id = payload.id.ok_or_else(not_registered)?;
    if payload.version.is_none() {
        return Err(AppError::MissingInput(
            "Versão (versao) do Colaborador não informada!".into(),
        ));
    }

    let service = &app_state.worker_service;
    let mut worker = service.find_by_id(id).await?.ok_or_else(not_registered)?;
    payload.apply_to(&mut worker);

    let saved = service.update(worker, payload.new_password()).await?;
    Ok(Json(service.to_response(&saved).await?))
}

#[utoipa::path(
    delete,
    path = "/v1/colaborador/{id}",
    tag = "Colaborador",
    params(("id" = i64, Path, description = "ID do Colaborador")),
    responses(
        (status = 200, description = "Colaborador removido", body = MessageResponse),
        (status = 400, description = "Colaborador inexistente")
    )
)]
pub async fn delete_worker(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = &app_state.worker_service;
    let worker = service.find_by_id(id).await?.ok_or_else(|| {
        AppError::exists_or_missing(
            "Entidade nao foi deletada: Colaborador com o ID informado não Existe!",
            TITLE_NOT_REGISTERED,
        )
    })?;

    Ok(Json(service.delete(&worker).await?))
}

#[utoipa::path(
    get,
    path = "/v1/colaborador/{id}",
    tag = "Colaborador",
    params(("id" = i64, Path, description = "ID do Colaborador")),
    responses(
        (status = 200, description = "Colaborador encontrado", body = WorkerResponse),
        (status = 400, description = "Colaborador inexistente")
    )
)]
pub async fn get_worker(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<WorkerResponse>, AppError> {
    let service = &app_state.worker_service;
    let worker = service.find_by_id(id).await?.ok_or_else(|| not_found("ID"))?;
    Ok(Json(service.to_response(&worker).await?))
}

#[utoipa::path(
    get,
    path = "/v1/colaborador/nome/{nome}",
    tag = "Colaborador",
    params(("nome" = String, Path, description = "Primeiro nome")),
    responses(
        (status = 200, description = "Colaborador encontrado", body = WorkerResponse),
        (status = 400, description = "Nenhum colaborador com esse nome")
    )
)]
pub async fn get_worker_by_name(
    State(app_state): State<AppState>,
    ApiPath(nome): ApiPath<String>,
) -> Result<Json<WorkerResponse>, AppError> {
    let service = &app_state.worker_service;
    let worker = service.find_by_name(&nome).await?.ok_or_else(|| not_found("NOME"))?;
    Ok(Json(service.to_response(&worker).await?))
}

#[utoipa::path(
    get,
    path = "/v1/colaborador/cpf/{cpf}",
    tag = "Colaborador",
    params(("cpf" = String, Path, description = "CPF, com ou sem pontuação")),
    responses(
        (status = 200, description = "Colaborador encontrado", body = WorkerResponse),
        (status = 400, description = "Nenhum colaborador com esse CPF")
    )
)]
pub async fn get_worker_by_cpf(
    State(app_state): State<AppState>,
    ApiPath(cpf): ApiPath<String>,
) -> Result<Json<WorkerResponse>, AppError> {
    let service = &app_state.worker_service;
    let worker = service.find_by_cpf(&cpf).await?.ok_or_else(|| not_found("CPF"))?;
    Ok(Json(service.to_response(&worker).await?))
}

#[utoipa::path(
    post,
    path = "/v1/colaborador/validar-senha",
    tag = "Colaborador",
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Senha forte"),
        (status = 400, description = "Regras não atendidas", body = Vec<String>)
    )
)]
pub async fn validate_password(ApiJson(payload): ApiJson<PasswordRequest>) -> Response {
    let errors = PasswordService::validate(&payload.password);
    if errors.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    tracing::info!("Senha recusada: {} regra(s) não atendida(s)", errors.len());
    (StatusCode::BAD_REQUEST, Json(errors)).into_response()
}

#[utoipa::path(
    get,
    path = "/v1/colaborador/atribuir/{colaboradorId}/{instituicaoId}",
    tag = "Colaborador",
    params(
        ("colaboradorId" = i64, Path, description = "ID do Colaborador"),
        ("instituicaoId" = i64, Path, description = "ID da Instituição")
    ),
    responses(
        (status = 200, description = "Colaborador vinculado à instituição", body = WorkerResponse),
        (status = 400, description = "Colaborador ou instituição inexistente")
    )
)]
pub async fn assign_institution(
    State(app_state): State<AppState>,
    ApiPath((worker_id, institution_id)): ApiPath<(i64, i64)>,
) -> Result<Json<WorkerResponse>, AppError> {
    let service = &app_state.worker_service;
    let worker = service.assign_institution(worker_id, institution_id).await?;
    Ok(Json(service.to_response(&worker).await?))
}

#[utoipa::path(
    put,
    path = "/v1/colaborador/endereco/{id}",
    tag = "Colaborador",
    params(("id" = i64, Path, description = "ID do Colaborador")),
    request_body = Address,
    responses(
        (status = 200, description = "Endereço gravado", body = WorkerResponse),
        (status = 400, description = "Colaborador inexistente ou endereço inválido")
    )
)]
pub async fn save_address(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(address): ApiJson<Address>,
) -> Result<Json<WorkerResponse>, AppError> {
    address.validate().map_err(AppError::ValidationError)?;

    let service = &app_state.worker_service;
    let worker = service.save_address(id, address).await?;
    Ok(Json(service.to_response(&worker).await?))
}

#[utoipa::path(
    get,
    path = "/v1/colaborador/ativar/{codigo}",
    tag = "Colaborador",
    params(("codigo" = String, Path, description = "Código de verificação recebido no cadastro")),
    responses(
        (status = 200, description = "Conta ativada", body = WorkerResponse),
        (status = 400, description = "Código inválido ou já utilizado")
    )
)]
pub async fn activate_account(
    State(app_state): State<AppState>,
    ApiPath(codigo): ApiPath<String>,
) -> Result<Json<WorkerResponse>, AppError> {
    let service = &app_state.worker_service;
    let worker = service.activate(&codigo).await?;
    Ok(Json(service.to_response(&worker).await?))
}
