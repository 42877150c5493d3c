// src/handlers/web/workers.rs

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::{cookie::CookieJar, Form as RepeatedForm};
use serde::Deserialize;
use serde_json::json;
use tera::Context;
use validator::Validate;

use crate::{
    common::error::{invalid_params, AppError, InvalidParam},
    config::AppState,
    handlers::{
        parse_flag,
        web::{
            flash::{self, Flash},
            redirect_after,
            views::{gender_options, message_context},
            MSG_MISSING_VERSION, MSG_VALIDATION, MSG_WORKER_EXISTS,
        },
    },
    models::{
        dto::{InstitutionResponse, WorkerDto},
        Address, Worker,
    },
    services::PasswordService,
};

const LISTING: &str = "/colaborador/listar/0";
const NEW_PAGE: &str = "colaborador/cadastro.html";
const EDIT_PAGE: &str = "colaborador/editar.html";

#[derive(Debug, Deserialize)]
pub struct AssignInstitutionForm {
    #[serde(rename = "colaboradorID")]
    pub worker_id: i64,
    #[serde(rename = "instituicaoID")]
    pub institution_id: i64,
}

// Checkboxes: a chave "roles" se repete, uma vez por permissão marcada
#[derive(Debug, Deserialize)]
pub struct AssignRolesForm {
    #[serde(rename = "colaboradorID")]
    pub worker_id: i64,
    #[serde(default)]
    pub roles: Vec<i64>,
}

fn form_page(
    app_state: &AppState,
    template: &str,
    dto: &WorkerDto,
    mut context: Context,
) -> Result<Response, AppError> {
    let action = if template == NEW_PAGE {
        "/colaborador/cadastrar"
    } else {
        "/colaborador/editar"
    };
    context.insert("colaborador", dto);
    context.insert("generos", &gender_options());
    context.insert("acao", action);
    Ok(app_state.views.render(template, &context)?.into_response())
}

/// Erros de validação do formulário mais as regras de senha, se informada.
fn form_errors(dto: &WorkerDto) -> Vec<InvalidParam> {
    let mut errors = match dto.validate() {
        Ok(()) => Vec::new(),
        Err(e) => invalid_params(&e),
    };
    if let Some(password) = dto.new_password() {
        errors.extend(
            PasswordService::validate(password)
                .into_iter()
                .map(|reason| InvalidParam {
                    field_name: "password".into(),
                    reason_error: reason,
                }),
        );
    }
    errors
}

fn invalid_form(
    app_state: &AppState,
    template: &str,
    dto: &WorkerDto,
    errors: Vec<InvalidParam>,
) -> Result<Response, AppError> {
    tracing::info!("Formulário de colaborador recusado: {} erro(s)", errors.len());
    let mut context = message_context(Some(MSG_VALIDATION), true);
    context.insert("erros", &errors);
    form_page(app_state, template, dto, context)
}

pub async fn list(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(ordenar): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sorted = parse_flag(&ordenar)?;
    let service = &app_state.worker_service;
    let workers = service.to_responses(&service.list(sorted).await?).await?;

    let (jar, pending) = flash::take(jar);
    let mut context = Context::new();
    flash::insert(&mut context, pending);
    context.insert("colaboradores", &workers);
    context.insert("ordenado", &sorted);

    Ok((jar, app_state.views.render("colaborador/listagem.html", &context)?))
}

pub async fn new_form(State(app_state): State<AppState>) -> Result<Response, AppError> {
    form_page(&app_state, NEW_PAGE, &WorkerDto::default(), Context::new())
}

pub async fn create(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<WorkerDto>,
) -> Result<Response, AppError> {
    let errors = form_errors(&form);
    if !errors.is_empty() {
        return invalid_form(&app_state, NEW_PAGE, &form, errors);
    }

    let service = &app_state.worker_service;
    if service.exists(&form.cpf).await? {
        let context = message_context(Some(MSG_WORKER_EXISTS), true);
        return form_page(&app_state, NEW_PAGE, &form, context);
    }

    match service
        .save(form.clone().into_new_worker(), form.new_password())
        .await
    {
        Ok(_) => Ok(flash::redirect(jar, LISTING, Flash::WorkerSaved).into_response()),
        Err(AppError::IntegrityViolation(_)) => {
            let context = message_context(Some(MSG_WORKER_EXISTS), true);
            form_page(&app_state, NEW_PAGE, &form, context)
        }
        Err(e) => Err(e),
    }
}

pub async fn edit_form(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(worker) = app_state.worker_service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };
    form_page(&app_state, EDIT_PAGE, &WorkerDto::from_worker(&worker), Context::new())
}

pub async fn update(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<WorkerDto>,
) -> Result<Response, AppError> {
    let errors = form_errors(&form);
    if !errors.is_empty() {
        return invalid_form(&app_state, EDIT_PAGE, &form, errors);
    }
    // Sem a versão lida não há como detectar edição concorrente
    if form.version.is_none() {
        let context = message_context(Some(MSG_MISSING_VERSION), true);
        return form_page(&app_state, EDIT_PAGE, &form, context);
    }

    let service = &app_state.worker_service;
    let current = match form.id {
        Some(id) => service.find_by_id(id).await?,
        None => None,
    };
    let Some(mut worker) = current else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };

    // O CPF só pode mudar para um que ninguém mais use
    let taken = service
        .find_by_cpf(&form.cpf)
        .await?
        .is_some_and(|other| other.id != worker.id);
    if taken {
        let context = message_context(Some(MSG_WORKER_EXISTS), true);
        return form_page(&app_state, EDIT_PAGE, &form, context);
    }

    form.apply_to(&mut worker);
    match service.update(worker, form.new_password()).await {
        Ok(_) => Ok(flash::redirect(jar, LISTING, Flash::Updated).into_response()),
        Err(AppError::OptimisticLock(detail)) => {
            let context = message_context(Some(&detail), true);
            form_page(&app_state, EDIT_PAGE, &form, context)
        }
        Err(AppError::IntegrityViolation(_)) => {
            let context = message_context(Some(MSG_WORKER_EXISTS), true);
            form_page(&app_state, EDIT_PAGE, &form, context)
        }
        Err(e) => Err(e),
    }
}

pub async fn delete(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let service = &app_state.worker_service;
    let Some(worker) = service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::DeleteFailed).into_response());
    };
    redirect_after(
        jar,
        LISTING,
        service.delete(&worker).await,
        Flash::WorkerDeleted,
        Flash::DeleteFailed,
    )
}

pub async fn toggle_status(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let result = app_state.worker_service.toggle_active(id).await;
    redirect_after(jar, LISTING, result, Flash::StatusChanged, Flash::InvalidReference)
}

// ---
// Endereço
// ---

async fn address_page(
    app_state: &AppState,
    worker: &Worker,
    address: &Address,
    context: Option<Context>,
) -> Result<Response, AppError> {
    let mut context = context.unwrap_or_else(Context::new);
    context.insert("endereco", address);
    context.insert("colaborador", &app_state.worker_service.to_response(worker).await?);
    Ok(app_state
        .views
        .render("colaborador/endereco.html", &context)?
        .into_response())
}

pub async fn address_form(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(worker) = app_state.worker_service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };
    let address = worker.address.clone().unwrap_or_default();
    address_page(&app_state, &worker, &address, None).await
}

pub async fn save_address(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(address): Form<Address>,
) -> Result<Response, AppError> {
    let service = &app_state.worker_service;
    let Some(worker) = service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };

    if let Err(errors) = address.validate() {
        let mut context = message_context(Some(MSG_VALIDATION), true);
        context.insert("erros", &invalid_params(&errors));
        return address_page(&app_state, &worker, &address, Some(context)).await;
    }

    match service.save_address(id, address.clone()).await {
        Err(AppError::OptimisticLock(detail)) => {
            let context = message_context(Some(&detail), true);
            address_page(&app_state, &worker, &address, Some(context)).await
        }
        result => redirect_after(jar, LISTING, result, Flash::Changed, Flash::InvalidReference),
    }
}

// ---
// Instituição e permissões
// ---

pub async fn institution_form(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let service = &app_state.worker_service;
    let Some(worker) = service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };

    let institutions: Vec<InstitutionResponse> = app_state
        .institution_service
        .list(true)
        .await?
        .iter()
        .map(InstitutionResponse::from)
        .collect();

    let mut context = Context::new();
    context.insert("colaborador", &service.to_response(&worker).await?);
    context.insert("instituicoes", &institutions);
    Ok(app_state
        .views
        .render("colaborador/instituicao.html", &context)?
        .into_response())
}

pub async fn assign_institution(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AssignInstitutionForm>,
) -> Result<Response, AppError> {
    let result = app_state
        .worker_service
        .assign_institution(form.worker_id, form.institution_id)
        .await;
    redirect_after(jar, LISTING, result, Flash::Changed, Flash::InvalidReference)
}

pub async fn roles_form(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let service = &app_state.worker_service;
    let Some(worker) = service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };

    let roles: Vec<_> = app_state
        .role_service
        .list(true)
        .await?
        .into_iter()
        .filter_map(|role| {
            let id = role.id?;
            Some(json!({
                "rulesID": id,
                "ruleName": role.name,
                "marcada": worker.has_role(id),
            }))
        })
        .collect();

    let mut context = Context::new();
    context.insert("colaborador", &service.to_response(&worker).await?);
    context.insert("permissoes", &roles);
    Ok(app_state
        .views
        .render("colaborador/permissoes.html", &context)?
        .into_response())
}

pub async fn assign_roles(
    State(app_state): State<AppState>,
    jar: CookieJar,
    RepeatedForm(form): RepeatedForm<AssignRolesForm>,
) -> Result<Response, AppError> {
    let result = app_state
        .worker_service
        .replace_roles(form.worker_id, &form.roles)
        .await;
    redirect_after(jar, LISTING, result, Flash::Changed, Flash::InvalidReference)
}
