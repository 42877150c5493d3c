// src/handlers/web/institutions.rs

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use tera::Context;
use validator::Validate;

use crate::{
    common::error::{invalid_params, AppError},
    config::AppState,
    handlers::{
        parse_flag,
        web::{
            flash::{self, Flash},
            redirect_after,
            views::message_context,
            MSG_INSTITUTION_EXISTS, MSG_MISSING_VERSION, MSG_VALIDATION,
        },
    },
    models::dto::{InstitutionDto, InstitutionResponse},
};

const LISTING: &str = "/instituicao/listar/0";
const NEW_PAGE: &str = "instituicao/cadastrar.html";
const EDIT_PAGE: &str = "instituicao/editar.html";

fn form_page(
    app_state: &AppState,
    template: &str,
    dto: &InstitutionDto,
    mut context: Context,
) -> Result<Response, AppError> {
    context.insert("instituicao", dto);
    Ok(app_state.views.render(template, &context)?.into_response())
}

fn inline_error(
    app_state: &AppState,
    template: &str,
    dto: &InstitutionDto,
    message: &str,
) -> Result<Response, AppError> {
    form_page(app_state, template, dto, message_context(Some(message), true))
}

pub async fn list(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(ordenar): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sorted = parse_flag(&ordenar)?;
    let institutions: Vec<InstitutionResponse> = app_state
        .institution_service
        .list(sorted)
        .await?
        .iter()
        .map(InstitutionResponse::from)
        .collect();

    let (jar, pending) = flash::take(jar);
    let mut context = Context::new();
    flash::insert(&mut context, pending);
    context.insert("instituicoes", &institutions);
    context.insert("ordenado", &sorted);

    Ok((jar, app_state.views.render("instituicao/listagem.html", &context)?))
}

pub async fn new_form(State(app_state): State<AppState>) -> Result<Response, AppError> {
    form_page(&app_state, NEW_PAGE, &InstitutionDto::default(), Context::new())
}

pub async fn create(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<InstitutionDto>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let mut context = message_context(Some(MSG_VALIDATION), true);
        context.insert("erros", &invalid_params(&errors));
        return form_page(&app_state, NEW_PAGE, &form, context);
    }

    let service = &app_state.institution_service;
    let institution = form.clone().into_new_institution();
    if service.is_registered(&institution).await? {
        return inline_error(&app_state, NEW_PAGE, &form, MSG_INSTITUTION_EXISTS);
    }

    match service.save(institution).await {
        Ok(_) => Ok(flash::redirect(jar, LISTING, Flash::InstitutionSaved).into_response()),
        Err(AppError::IntegrityViolation(_)) => {
            inline_error(&app_state, NEW_PAGE, &form, MSG_INSTITUTION_EXISTS)
        }
        Err(AppError::EntityExistsOrMissing { detail, .. }) => {
            inline_error(&app_state, NEW_PAGE, &form, &detail)
        }
        Err(e) => Err(e),
    }
}

pub async fn edit_form(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(institution) = app_state.institution_service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };
    let dto = InstitutionDto::from_institution(&institution);
    form_page(&app_state, EDIT_PAGE, &dto, Context::new())
}

pub async fn update(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<InstitutionDto>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let mut context = message_context(Some(MSG_VALIDATION), true);
        context.insert("erros", &invalid_params(&errors));
        return form_page(&app_state, EDIT_PAGE, &form, context);
    }
    if form.version.is_none() {
        return inline_error(&app_state, EDIT_PAGE, &form, MSG_MISSING_VERSION);
    }

    let service = &app_state.institution_service;
    let current = match form.id {
        Some(id) => service.find_by_id(id).await?,
        None => None,
    };
    let Some(mut institution) = current else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };

    form.apply_to(&mut institution);
    match service.update(institution).await {
        Ok(_) => Ok(flash::redirect(jar, LISTING, Flash::Updated).into_response()),
        Err(AppError::OptimisticLock(detail)) => inline_error(&app_state, EDIT_PAGE, &form, &detail),
        Err(AppError::IntegrityViolation(_)) => {
            inline_error(&app_state, EDIT_PAGE, &form, MSG_INSTITUTION_EXISTS)
        }
        Err(e) => Err(e),
    }
}

pub async fn delete(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let service = &app_state.institution_service;
    let Some(institution) = service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::DeleteFailed).into_response());
    };
    redirect_after(
        jar,
        LISTING,
        service.delete(&institution).await,
        Flash::InstitutionDeleted,
        Flash::DeleteFailed,
    )
}

pub async fn participants(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let service = &app_state.institution_service;
    let Some(institution) = service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };

    let workers = service.find_workers(id).await?;
    let mut context = Context::new();
    context.insert("instituicao", &InstitutionResponse::from(&institution));
    context.insert(
        "colaboradores",
        &app_state.worker_service.to_responses(&workers).await?,
    );
    Ok(app_state
        .views
        .render("instituicao/participantes.html", &context)?
        .into_response())
}
