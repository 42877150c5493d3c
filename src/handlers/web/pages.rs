// src/handlers/web/pages.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tera::Context;

use crate::{common::error::AppError, config::AppState};

pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn dashboard(State(app_state): State<AppState>) -> Result<Response, AppError> {
    let workers = app_state.worker_service.list(false).await?;
    let institutions = app_state.institution_service.list(false).await?;
    let roles = app_state.role_service.list(false).await?;

    let mut context = Context::new();
    context.insert("total_colaboradores", &workers.len());
    context.insert("total_ativos", &workers.iter().filter(|w| w.active).count());
    context.insert("total_instituicoes", &institutions.len());
    context.insert("total_permissoes", &roles.len());

    Ok(app_state.views.render("dashboard.html", &context)?.into_response())
}

pub async fn login(State(app_state): State<AppState>) -> Result<Response, AppError> {
    Ok(app_state
        .views
        .render("login.html", &Context::new())?
        .into_response())
}

pub async fn forbidden(State(app_state): State<AppState>) -> Result<Response, AppError> {
    let page = app_state.views.render("Error403.html", &Context::new())?;
    Ok((StatusCode::FORBIDDEN, page).into_response())
}

// Atalho para o documento OpenAPI
pub async fn api_doc() -> Redirect {
    Redirect::to("/api-docs/openapi.json")
}
