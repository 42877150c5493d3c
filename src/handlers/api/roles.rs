// src/handlers/api/roles.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
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
        dto::{MessageResponse, RoleDto, WorkerResponse},
        Role,
    },
};

const TITLE_NOT_REGISTERED: &str = "PERMISSÃO NÃO CADASTRADA";

fn not_registered() -> AppError {
    AppError::exists_or_missing(
        "Dados nao cadastrados: Permissao com o ID informado não Existe!",
        TITLE_NOT_REGISTERED,
    )
}

fn not_found(by: &str) -> AppError {
    AppError::exists_or_missing(
        format!("Entidade nao encontrada: Permissao com o {} informado não Existe!", by),
        TITLE_NOT_REGISTERED,
    )
}

#[utoipa::path(
    get,
    path = "/v1/permissao/listar/{ordenar}",
    tag = "Permissao",
    params(("ordenar" = String, Path, description = "true/false: ordenar pelo nome")),
    responses((status = 200, description = "Permissões cadastradas", body = [Role]))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    ApiPath(ordenar): ApiPath<String>,
) -> Result<Json<Vec<Role>>, AppError> {
    let sorted = parse_flag(&ordenar)?;
    Ok(Json(app_state.role_service.list(sorted).await?))
}

#[utoipa::path(
    put,
    path = "/v1/permissao/cadastrar",
    tag = "Permissao",
    request_body = RoleDto,
    responses(
        (status = 201, description = "Permissão cadastrada", body = Role),
        (status = 400, description = "Nome inválido ou permissão já cadastrada")
    )
)]
pub async fn register_role(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<RoleDto>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let service = &app_state.role_service;
    if service.exists(&payload.name).await? {
        tracing::warn!("Cadastro recusado: permissão '{}' já existe", payload.name);
        return Err(AppError::exists_or_missing(
            "Dados nao cadastrados: Permissao já Existe!",
            "PERMISSÃO JÁ CADASTRADA",
        ));
    }

    let saved = service.save(payload.into_new_role()).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    put,
    path = "/v1/permissao/atualizar",
    tag = "Permissao",
    request_body = RoleDto,
    responses(
        (status = 200, description = "Permissão atualizada", body = Role),
        (status = 400, description = "Permissão inexistente, versão ausente ou desatualizada")
    )
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<RoleDto>,
) -> Result<Json<Role>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let id = payload.id.ok_or_else(not_registered)?;
    if payload.version.is_none() {
        return Err(AppError::MissingInput(
            "Versão (versao) da Permissao não informada!".into(),
        ));
    }

    let service = &app_state.role_service;
    let mut role = service.find_by_id(id).await?.ok_or_else(not_registered)?;
    payload.apply_to(&mut role);

    Ok(Json(service.update(role).await?))
}

#[utoipa::path(
    delete,
    path = "/v1/permissao/{id}",
    tag = "Permissao",
    params(("id" = i64, Path, description = "ID da Permissão")),
    responses(
        (status = 200, description = "Permissão removida dos colaboradores e do sistema", body = MessageResponse),
        (status = 400, description = "Permissão inexistente")
    )
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = &app_state.role_service;
    let role = service.find_by_id(id).await?.ok_or_else(|| {
        AppError::exists_or_missing(
            "Entidade nao foi deletada: Permissao com o ID informado não Existe!",
            TITLE_NOT_REGISTERED,
        )
    })?;

    Ok(Json(service.delete(&role).await?))
}

#[utoipa::path(
    get,
    path = "/v1/permissao/{id}",
    tag = "Permissao",
    params(("id" = i64, Path, description = "ID da Permissão")),
    responses(
        (status = 200, description = "Permissão encontrada", body = Role),
        (status = 400, description = "Permissão inexistente")
    )
)]
pub async fn get_role(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Role>, AppError> {
    let role = app_state
        .role_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("ID"))?;
    Ok(Json(role))
}

#[utoipa::path(
    get,
    path = "/v1/permissao/nome/{nome}",
    tag = "Permissao",
    params(("nome" = String, Path, description = "Nome da Permissão")),
    responses(
        (status = 200, description = "Permissão encontrada", body = Role),
        (status = 400, description = "Nenhuma permissão com esse nome")
    )
)]
pub async fn get_role_by_name(
    State(app_state): State<AppState>,
    ApiPath(nome): ApiPath<String>,
) -> Result<Json<Role>, AppError> {
    let role = app_state
        .role_service
        .find_by_name(&nome)
        .await?
        .ok_or_else(|| not_found("NOME"))?;
    Ok(Json(role))
}

#[utoipa::path(
    get,
    path = "/v1/permissao/colaboradores/{id}",
    tag = "Permissao",
    params(("id" = i64, Path, description = "ID da Permissão")),
    responses(
        (status = 200, description = "Colaboradores que possuem a permissão", body = [WorkerResponse]),
        (status = 400, description = "Permissão inexistente")
    )
)]
pub async fn list_role_workers(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<WorkerResponse>>, AppError> {
    let service = &app_state.role_service;
    if service.find_by_id(id).await?.is_none() {
        return Err(not_found("ID"));
    }

    let workers = service.find_workers(id).await?;
    Ok(Json(app_state.worker_service.to_responses(&workers).await?))
}
