// src/handlers/web/roles.rs

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
            MSG_MISSING_VERSION, MSG_ROLE_EXISTS, MSG_VALIDATION,
        },
    },
    models::dto::RoleDto,
};

const LISTING: &str = "/permissao/listar/0";
const FORM_PAGE: &str = "permissao/formulario.html";

fn form_page(app_state: &AppState, dto: &RoleDto, mut context: Context) -> Result<Response, AppError> {
    context.insert("permissao", dto);
    Ok(app_state.views.render(FORM_PAGE, &context)?.into_response())
}

fn invalid_form(
    app_state: &AppState,
    dto: &RoleDto,
    errors: &validator::ValidationErrors,
) -> Result<Response, AppError> {
    let mut context = message_context(Some(MSG_VALIDATION), true);
    context.insert("erros", &invalid_params(errors));
    form_page(app_state, dto, context)
}

pub async fn list(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(ordenar): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sorted = parse_flag(&ordenar)?;
    let roles = app_state.role_service.list(sorted).await?;

    let (jar, pending) = flash::take(jar);
    let mut context = Context::new();
    flash::insert(&mut context, pending);
    context.insert("permissoes", &roles);
    context.insert("ordenado", &sorted);

    Ok((jar, app_state.views.render("permissao/listagem.html", &context)?))
}

pub async fn new_form(State(app_state): State<AppState>) -> Result<Response, AppError> {
    form_page(&app_state, &RoleDto::default(), Context::new())
}

pub async fn create(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RoleDto>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return invalid_form(&app_state, &form, &errors);
    }

    let service = &app_state.role_service;
    if service.exists(&form.name).await? {
        return form_page(&app_state, &form, message_context(Some(MSG_ROLE_EXISTS), true));
    }

    match service.save(form.clone().into_new_role()).await {
        Ok(_) => Ok(flash::redirect(jar, LISTING, Flash::RoleSaved).into_response()),
        Err(AppError::IntegrityViolation(_)) => {
            form_page(&app_state, &form, message_context(Some(MSG_ROLE_EXISTS), true))
        }
        Err(e) => Err(e),
    }
}

pub async fn edit_form(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(role) = app_state.role_service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };
    let dto = RoleDto {
        id: role.id,
        name: role.name,
        version: Some(role.version),
    };
    form_page(&app_state, &dto, Context::new())
}

pub async fn update(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RoleDto>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return invalid_form(&app_state, &form, &errors);
    }
    if form.version.is_none() {
        return form_page(&app_state, &form, message_context(Some(MSG_MISSING_VERSION), true));
    }

    let service = &app_state.role_service;
    let current = match form.id {
        Some(id) => service.find_by_id(id).await?,
        None => None,
    };
    let Some(mut role) = current else {
        return Ok(flash::redirect(jar, LISTING, Flash::InvalidReference).into_response());
    };

    form.apply_to(&mut role);
    match service.update(role).await {
        Ok(_) => Ok(flash::redirect(jar, LISTING, Flash::Updated).into_response()),
        Err(AppError::OptimisticLock(detail)) => {
            form_page(&app_state, &form, message_context(Some(&detail), true))
        }
        Err(AppError::IntegrityViolation(_)) => {
            form_page(&app_state, &form, message_context(Some(MSG_ROLE_EXISTS), true))
        }
        Err(e) => Err(e),
    }
}

pub async fn delete(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let service = &app_state.role_service;
    let Some(role) = service.find_by_id(id).await? else {
        return Ok(flash::redirect(jar, LISTING, Flash::DeleteFailed).into_response());
    };
    redirect_after(
        jar,
        LISTING,
        service.delete(&role).await,
        Flash::RoleDeleted,
        Flash::DeleteFailed,
    )
}
