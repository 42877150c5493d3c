mod common;

use axum::http::{header, Method, StatusCode};
use common::{send, send_json, test_app, worker_payload};
use serde_json::json;

#[tokio::test]
async fn register_formats_fields_and_rejects_duplicate_cpf() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/cadastrar",
        Some(worker_payload("12345678909", "maria")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cpf"], "123.456.789-09");
    assert_eq!(body["nome"], "Maria");
    assert_eq!(body["ativo"], false);
    assert_eq!(body["versao"], 0);
    assert!(body.get("password").is_none());

    // Mesmo CPF, agora com pontuação
    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/cadastrar",
        Some(worker_payload("123.456.789-09", "joana")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "COLABORADOR JÁ CADASTRADO");
}

#[tokio::test]
async fn invalid_payload_lists_invalid_params() {
    let (app, _) = test_app();
    let mut payload = worker_payload("11111111111", "ana");
    payload["email"] = json!("sem-arroba");

    let (status, body) =
        send_json(&app, Method::PUT, "/v1/colaborador/cadastrar", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let params = body["invalid-params"].as_array().unwrap();
    assert!(params.len() >= 3);
    assert!(params.iter().any(|p| p["reasonError"] == "CPF inválido!"));
}

#[tokio::test]
async fn update_requires_current_version() {
    let (app, _) = test_app();
    let (_, created) = send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/cadastrar",
        Some(worker_payload("98765432100", "pedro")),
    )
    .await;
    let id = created["colaboradorID"].as_i64().unwrap();

    let mut payload = worker_payload("98765432100", "pedro paulo");
    payload["colaboradorID"] = json!(id);

    // Sem versão
    let (status, body) =
        send_json(&app, Method::PUT, "/v1/colaborador/atualizar", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Objeto NULO recebido na requisição");

    payload["versao"] = json!(0);
    let (status, body) =
        send_json(&app, Method::PUT, "/v1/colaborador/atualizar", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nome"], "Pedro Paulo");
    assert_eq!(body["versao"], 1);

    // A mesma versão 0 agora está desatualizada
    let (status, body) =
        send_json(&app, Method::PUT, "/v1/colaborador/atualizar", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Estado Inconsistente da Entidade");
}

#[tokio::test]
async fn update_of_unknown_worker_is_rejected() {
    let (app, _) = test_app();
    let mut payload = worker_payload("98765432100", "pedro");
    payload["colaboradorID"] = json!(999);
    payload["versao"] = json!(0);

    let (status, body) =
        send_json(&app, Method::PUT, "/v1/colaborador/atualizar", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "COLABORADOR NÃO CADASTRADO");
}

#[tokio::test]
async fn lookups_by_id_name_and_cpf() {
    let (app, _) = test_app();
    send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/cadastrar",
        Some(worker_payload("52998224725", "lucas")),
    )
    .await;

    let (status, body) = send_json(&app, Method::GET, "/v1/colaborador/cpf/529.982.247-25", None).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["colaboradorID"].as_i64().unwrap();

    let (status, body) = send_json(&app, Method::GET, "/v1/colaborador/nome/Lucas", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["colaboradorID"], id);

    let (status, _) = send_json(&app, Method::GET, &format!("/v1/colaborador/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, Method::GET, "/v1/colaborador/424242", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "COLABORADOR NÃO CADASTRADO");
}

#[tokio::test]
async fn listing_can_be_sorted_by_name() {
    let (app, _) = test_app();
    for (cpf, nome) in [("12345678909", "zilda"), ("98765432100", "bruna"), ("11144477735", "marta")] {
        send_json(&app, Method::PUT, "/v1/colaborador/cadastrar", Some(worker_payload(cpf, nome))).await;
    }

    let (status, body) = send_json(&app, Method::GET, "/v1/colaborador/listar/true", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["nome"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Bruna", "Marta", "Zilda"]);

    let (status, _) = send_json(&app, Method::GET, "/v1/colaborador/listar/talvez", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_strength_check() {
    let (app, _) = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/v1/colaborador/validar-senha",
        Some(json!({ "password": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.as_array().unwrap().is_empty());

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/v1/colaborador/validar-senha",
        Some(json!({ "password": "Abcdef1!" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn address_is_created_then_updated_in_place() {
    let (app, _) = test_app();
    let (_, created) = send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/cadastrar",
        Some(worker_payload("12345678909", "maria")),
    )
    .await;
    let id = created["colaboradorID"].as_i64().unwrap();
    let uri = format!("/v1/colaborador/endereco/{}", id);

    let address = json!({ "cep": "69000-000", "logradouro": "Rua das Flores", "localidade": "Manaus", "estado": "am" });
    let (status, body) = send_json(&app, Method::PUT, &uri, Some(address)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endereco"]["estado"], "AM");
    let address_id = body["endereco"]["enderecoID"].as_i64().unwrap();

    let address = json!({ "cep": "69000-001", "logradouro": "Rua Nova", "localidade": "Manaus", "estado": "AM", "versao": 0 });
    let (status, body) = send_json(&app, Method::PUT, &uri, Some(address.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endereco"]["enderecoID"], address_id);
    assert_eq!(body["endereco"]["logradouro"], "Rua Nova");
    assert_eq!(body["endereco"]["versao"], 1);

    // versao 0 ficou para trás
    let mut stale = address;
    stale["logradouro"] = json!("Rua C");
    let (status, body) = send_json(&app, Method::PUT, &uri, Some(stale)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Estado Inconsistente da Entidade");
    let (_, body) = send_json(&app, Method::GET, &format!("/v1/colaborador/{}", id), None).await;
    assert_eq!(body["endereco"]["logradouro"], "Rua Nova");

    let (status, _) = send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/endereco/999",
        Some(json!({ "cep": "69000-000" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn account_activation_consumes_the_code() {
    let (app, state) = test_app();
    let (_, created) = send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/cadastrar",
        Some(worker_payload("12345678909", "maria")),
    )
    .await;
    let id = created["colaboradorID"].as_i64().unwrap();

    let worker = state.worker_service.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(worker.verification_code.len(), 64);
    let uri = format!("/v1/colaborador/ativar/{}", worker.verification_code);

    let (status, body) = send_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ativo"], true);

    let (status, _) = send_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_the_worker() {
    let (app, _) = test_app();
    let (_, created) = send_json(
        &app,
        Method::PUT,
        "/v1/colaborador/cadastrar",
        Some(worker_payload("12345678909", "maria")),
    )
    .await;
    let uri = format!("/v1/colaborador/{}", created["colaboradorID"]);

    let (status, body) = send_json(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensagem"], "Colaborador DELETADO do Sistema!");

    let (status, _) = send_json(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let (app, state) = test_app();
    let mut payload = worker_payload("12345678909", "maria");
    payload["nome"] = json!("       ");
    payload["sobrenome"] = json!("  d  a  ");

    let (status, body) =
        send_json(&app, Method::PUT, "/v1/colaborador/cadastrar", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = body["invalid-params"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["fieldName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["first_name", "last_name"]);
    assert!(state.worker_service.list(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn password_that_looks_like_a_hash_is_hashed() {
    let (app, state) = test_app();
    let plain = format!("$2b$12${}", "A".repeat(53));
    let mut payload = worker_payload("12345678909", "maria");
    payload["password"] = json!(plain);

    let (status, body) =
        send_json(&app, Method::PUT, "/v1/colaborador/cadastrar", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["colaboradorID"].as_i64().unwrap();
    let worker = state.worker_service.find_by_id(id).await.unwrap().unwrap();
    assert_ne!(worker.password, plain);
    assert!(bcrypt::verify(&plain, &worker.password).unwrap());
}

#[tokio::test]
async fn malformed_input_is_a_problem_detail() {
    let (app, _) = test_app();
    let mut payload = worker_payload("12345678909", "maria");
    payload["sexo"] = json!("X");

    let response = send(&app, Method::PUT, "/v1/colaborador/cadastrar", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/problem+json");

    let response = send(&app, Method::GET, "/v1/colaborador/abc", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/problem+json");

    let (status, body) = send_json(&app, Method::GET, "/v1/colaborador/atribuir/1/x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Objeto NULO recebido na requisição");
}
