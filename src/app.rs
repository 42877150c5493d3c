// src/app.rs

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::handlers::{api, web};

fn worker_api() -> Router<AppState> {
    Router::new()
        .route("/listar/{ordenar}", get(api::workers::list_workers))
        .route("/cadastrar", put(api::workers::register_worker))
        .route("/atualizar", put(api::workers::update_worker))
        .route(
            "/{id}",
            get(api::workers::get_worker).delete(api::workers::delete_worker),
        )
        .route("/nome/{nome}", get(api::workers::get_worker_by_name))
        .route("/cpf/{cpf}", get(api::workers::get_worker_by_cpf))
        .route("/validar-senha", post(api::workers::validate_password))
        .route(
            "/atribuir/{colaboradorId}/{instituicaoId}",
            get(api::workers::assign_institution),
        )
        .route("/endereco/{id}", put(api::workers::save_address))
        .route("/ativar/{codigo}", get(api::workers::activate_account))
}

fn institution_api() -> Router<AppState> {
    Router::new()
        .route("/listar/{ordenar}", get(api::institutions::list_institutions))
        .route("/cadastrar", put(api::institutions::register_institution))
        .route("/atualizar", put(api::institutions::update_institution))
        .route(
            "/{id}",
            get(api::institutions::get_institution).delete(api::institutions::delete_institution),
        )
        .route("/nome/{nome}", get(api::institutions::get_institution_by_name))
        .route("/cnpj/{cnpj}", get(api::institutions::get_institution_by_cnpj))
        .route("/sigla/{sigla}", get(api::institutions::get_institution_by_acronym))
        .route("/participantes/{id}", get(api::institutions::list_participants))
}

fn role_api() -> Router<AppState> {
    Router::new()
        .route("/listar/{ordenar}", get(api::roles::list_roles))
        .route("/cadastrar", put(api::roles::register_role))
        .route("/atualizar", put(api::roles::update_role))
        .route("/{id}", get(api::roles::get_role).delete(api::roles::delete_role))
        .route("/nome/{nome}", get(api::roles::get_role_by_name))
        .route("/colaboradores/{id}", get(api::roles::list_role_workers))
}

fn worker_pages() -> Router<AppState> {
    Router::new()
        .route("/listar/{ordenar}", get(web::workers::list))
        .route(
            "/cadastrar",
            get(web::workers::new_form).post(web::workers::create),
        )
        .route("/editar/{id}", get(web::workers::edit_form))
        .route("/editar", post(web::workers::update))
        .route("/excluir/{id}", get(web::workers::delete))
        .route("/situacao/{id}", get(web::workers::toggle_status))
        .route(
            "/endereco/{id}",
            get(web::workers::address_form).post(web::workers::save_address),
        )
        .route("/instituicao/{id}", get(web::workers::institution_form))
        .route("/permissoes/{id}", get(web::workers::roles_form))
}

fn institution_pages() -> Router<AppState> {
    Router::new()
        .route("/listar/{ordenar}", get(web::institutions::list))
        .route(
            "/cadastrar",
            get(web::institutions::new_form).post(web::institutions::create),
        )
        .route("/editar/{id}", get(web::institutions::edit_form))
        .route("/editar", post(web::institutions::update))
        .route("/excluir/{id}", get(web::institutions::delete))
        .route("/participantes/{id}", get(web::institutions::participants))
        .route("/atribuir", post(web::workers::assign_institution))
}

fn role_pages() -> Router<AppState> {
    Router::new()
        .route("/listar/{ordenar}", get(web::roles::list))
        .route("/cadastrar", get(web::roles::new_form).post(web::roles::create))
        .route("/editar/{id}", get(web::roles::edit_form))
        .route("/editar", post(web::roles::update))
        .route("/excluir/{id}", get(web::roles::delete))
        .route("/atribuir", post(web::workers::assign_roles))
}

/// Monta o roteador completo: API REST em `/v1`, páginas HTML na raiz.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // --- REST ---
        .nest("/v1/colaborador", worker_api())
        .nest("/v1/instituicao", institution_api())
        .nest("/v1/permissao", role_api())
        // --- Páginas ---
        .route("/", get(web::pages::index))
        .route("/dashboard", get(web::pages::dashboard))
        .route("/login", get(web::pages::login))
        .route("/403erro", get(web::pages::forbidden))
        .route("/api-doc", get(web::pages::api_doc))
        .nest("/colaborador", worker_pages())
        .nest("/instituicao", institution_pages())
        .nest("/permissao", role_pages())
        .with_state(app_state)
}
