// src/docs.rs

use utoipa::OpenApi;

use crate::handlers::api;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Obreiros",
        description = "Cadastro de colaboradores, instituições e permissões"
    ),
    paths(
        // --- Colaborador ---
        api::workers::list_workers,
        api::workers::register_worker,
        api::workers::update_worker,
        api::workers::delete_worker,
        api::workers::get_worker,
        api::workers::get_worker_by_name,
        api::workers::get_worker_by_cpf,
        api::workers::validate_password,
        api::workers::assign_institution,
        api::workers::save_address,
        api::workers::activate_account,

        // --- Instituicao ---
        api::institutions::list_institutions,
        api::institutions::register_institution,
        api::institutions::update_institution,
        api::institutions::delete_institution,
        api::institutions::get_institution,
        api::institutions::get_institution_by_name,
        api::institutions::get_institution_by_cnpj,
        api::institutions::get_institution_by_acronym,
        api::institutions::list_participants,

        // --- Permissao ---
        api::roles::list_roles,
        api::roles::register_role,
        api::roles::update_role,
        api::roles::delete_role,
        api::roles::get_role,
        api::roles::get_role_by_name,
        api::roles::list_role_workers,
    ),
    components(
        schemas(
            models::Gender,
            models::Address,
            models::Role,
            models::InstitutionSummary,
            models::dto::WorkerDto,
            models::dto::WorkerResponse,
            models::dto::InstitutionDto,
            models::dto::InstitutionResponse,
            models::dto::RoleDto,
            models::dto::PasswordRequest,
            models::dto::MessageResponse,
        )
    ),
    tags(
        (name = "Colaborador", description = "Cadastro e manutenção de colaboradores"),
        (name = "Instituicao", description = "Instituições e seus participantes"),
        (name = "Permissao", description = "Permissões atribuídas aos colaboradores")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rest_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/v1/colaborador/cadastrar",
            "/v1/colaborador/ativar/{codigo}",
            "/v1/instituicao/participantes/{id}",
            "/v1/permissao/colaboradores/{id}",
        ] {
            assert!(paths.contains_key(path), "rota ausente: {}", path);
        }
    }
}
