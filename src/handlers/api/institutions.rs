// src/handlers/api/institutions.rs

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
    models::dto::{InstitutionDto, InstitutionResponse, MessageResponse, WorkerResponse},
};

const TITLE_NOT_REGISTERED: &str = "INSTITUIÇÃO NÃO CADASTRADA";

fn not_registered() -> AppError {
    AppError::exists_or_missing(
        "Dados nao cadastrados: Instituicao com o ID informado não Existe!",
        TITLE_NOT_REGISTERED,
    )
}

fn not_found(by: &str) -> AppError {
    AppError::exists_or_missing(
        format!("Entidade nao encontrada: Instituicao com o {} informado não Existe!", by),
        TITLE_NOT_REGISTERED,
    )
}

#[utoipa::path(
    get,
    path = "/v1/instituicao/listar/{ordenar}",
    tag = "Instituicao",
    params(("ordenar" = String, Path, description = "true/false: ordenar pelo nome")),
    responses(
        (status = 200, description = "Instituições cadastradas", body = [InstitutionResponse])
    )
)]
pub async fn list_institutions(
    State(app_state): State<AppState>,
    ApiPath(ordenar): ApiPath<String>,
) -> Result<Json<Vec<InstitutionResponse>>, AppError> {
    let sorted = parse_flag(&ordenar)?;
    let institutions = app_state.institution_service.list(sorted).await?;
    Ok(Json(institutions.iter().map(InstitutionResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/v1/instituicao/cadastrar",
    tag = "Instituicao",
    request_body = InstitutionDto,
    responses(
        (status = 201, description = "Instituição cadastrada", body = InstitutionResponse),
        (status = 400, description = "Dados inválidos ou instituição já cadastrada")
    )
)]
pub async fn register_institution(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<InstitutionDto>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let service = &app_state.institution_service;
    let institution = payload.into_new_institution();
    if service.is_registered(&institution).await? {
        tracing::warn!("Cadastro recusado: instituição '{}' já existe", institution.name);
        return Err(AppError::exists_or_missing(
            "Dados nao cadastrados: Instituicao já Existe!",
            "INSTITUIÇÃO JÁ CADASTRADA",
        ));
    }

    let saved = service.save(institution).await?;
    Ok((StatusCode::CREATED, Json(InstitutionResponse::from(&saved))))
}

#[utoipa::path(
    put,
    path = "/v1/instituicao/atualizar",
    tag = "Instituicao",
    request_body = InstitutionDto,
    responses(
        (status = 200, description = "Instituição atualizada", body = InstitutionResponse),
        (status = 400, description = "Instituição inexistente, versão ausente ou desatualizada")
    )
)]
pub async fn update_institution(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<InstitutionDto>,
) -> Result<Json<InstitutionResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let id = payload.id.ok_or_else(not_registered)?;
    if payload.version.is_none() {
        return Err(AppError::MissingInput(
            "Versão (versao) da Instituicao não informada!".into(),
        ));
    }

    let service = &app_state.institution_service;
    let mut institution = service.find_by_id(id).await?.ok_or_else(not_registered)?;
    payload.apply_to(&mut institution);

    let saved = service.update(institution).await?;
    Ok(Json(InstitutionResponse::from(&saved)))
}

#[utoipa::path(
    delete,
    path = "/v1/instituicao/{id}",
    tag = "Instituicao",
    params(("id" = i64, Path, description = "ID da Instituição")),
    responses(
        (status = 200, description = "Instituição removida; participantes desvinculados", body = MessageResponse),
        (status = 400, description = "Instituição inexistente")
    )
)]
pub async fn delete_institution(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let service = &app_state.institution_service;
    let institution = service.find_by_id(id).await?.ok_or_else(|| {
        AppError::exists_or_missing(
            "Entidade nao foi deletada: Instituicao com o ID informado não Existe!",
            TITLE_NOT_REGISTERED,
        )
    })?;

    Ok(Json(service.delete(&institution).await?))
}

#[utoipa::path(
    get,
    path = "/v1/instituicao/{id}",
    tag = "Instituicao",
    params(("id" = i64, Path, description = "ID da Instituição")),
    responses(
        (status = 200, description = "Instituição encontrada", body = InstitutionResponse),
        (status = 400, description = "Instituição inexistente")
    )
)]
pub async fn get_institution(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let institution = app_state
        .institution_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("ID"))?;
    Ok(Json(InstitutionResponse::from(&institution)))
}

#[utoipa::path(
    get,
    path = "/v1/instituicao/nome/{nome}",
    tag = "Instituicao",
    params(("nome" = String, Path, description = "Nome da Instituição")),
    responses(
        (status = 200, description = "Instituição encontrada", body = InstitutionResponse),
        (status = 400, description = "Nenhuma instituição com esse nome")
    )
)]
pub async fn get_institution_by_name(
    State(app_state): State<AppState>,
    ApiPath(nome): ApiPath<String>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let institution = app_state
        .institution_service
        .find_by_name(&nome)
        .await?
        .ok_or_else(|| not_found("NOME"))?;
    Ok(Json(InstitutionResponse::from(&institution)))
}

#[utoipa::path(
    get,
    path = "/v1/instituicao/cnpj/{cnpj}",
    tag = "Instituicao",
    params(("cnpj" = String, Path, description = "CNPJ, com ou sem pontuação")),
    responses(
        (status = 200, description = "Instituição encontrada", body = InstitutionResponse),
        (status = 400, description = "Nenhuma instituição com esse CNPJ")
    )
)]
pub async fn get_institution_by_cnpj(
    State(app_state): State<AppState>,
    ApiPath(cnpj): ApiPath<String>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let institution = app_state
        .institution_service
        .find_by_cnpj(&cnpj)
        .await?
        .ok_or_else(|| not_found("CNPJ"))?;
    Ok(Json(InstitutionResponse::from(&institution)))
}

#[utoipa::path(
    get,
    path = "/v1/instituicao/sigla/{sigla}",
    tag = "Instituicao",
    params(("sigla" = String, Path, description = "Sigla da Instituição")),
    responses(
        (status = 200, description = "Instituição encontrada", body = InstitutionResponse),
        (status = 400, description = "Nenhuma instituição com essa sigla")
    )
)]
pub async fn get_institution_by_acronym(
    State(app_state): State<AppState>,
    ApiPath(sigla): ApiPath<String>,
) -> Result<Json<InstitutionResponse>, AppError> {
    let institution = app_state
        .institution_service
        .find_by_acronym(&sigla)
        .await?
        .ok_or_else(|| not_found("SIGLA"))?;
    Ok(Json(InstitutionResponse::from(&institution)))
}

#[utoipa::path(
    get,
    path = "/v1/instituicao/participantes/{id}",
    tag = "Instituicao",
    params(("id" = i64, Path, description = "ID da Instituição")),
    responses(
        (status = 200, description = "Colaboradores vinculados", body = [WorkerResponse]),
        (status = 400, description = "Instituição inexistente")
    )
)]
pub async fn list_participants(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<WorkerResponse>>, AppError> {
    let service = &app_state.institution_service;
    if service.find_by_id(id).await?.is_none() {
        return Err(not_found("ID"));
    }

    let workers = service.find_workers(id).await?;
    let response = app_state.worker_service.to_responses(&workers).await?;
    Ok(Json(response))
}
