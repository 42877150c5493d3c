#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use obreiros::{app::build_router, config::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Mesmo roteador de produção, sobre o armazenamento em memória.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::in_memory(4).expect("estado em memória");
    (build_router(state.clone()), state)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(app, method, uri, body).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get_page(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// "nome=valor" do primeiro Set-Cookie, pronto para reenviar.
pub fn flash_cookie(response: &Response) -> String {
    let raw = response.headers()[header::SET_COOKIE].to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

pub fn worker_payload(cpf: &str, nome: &str) -> Value {
    json!({
        "cpf": cpf,
        "nome": nome,
        "sobrenome": "das Dores",
        "email": format!("{}@exemplo.com", nome.to_lowercase()),
        "dataNascimento": "15/03/1980",
        "sexo": "F",
        "whatsapp": "(92) 9.8888-7777",
        "password": "Abcdef1!"
    })
}
