// src/handlers/web/views.rs

use axum::response::Html;
use serde_json::json;
use tera::{Context, Tera};

use crate::common::error::AppError;
use crate::models::Gender;

// Templates embutidos no binário
const TEMPLATES: [(&str, &str); 17] = [
    ("base.html", include_str!("../../../templates/base.html")),
    ("dashboard.html", include_str!("../../../templates/dashboard.html")),
    ("login.html", include_str!("../../../templates/login.html")),
    ("Error403.html", include_str!("../../../templates/Error403.html")),
    ("colaborador/listagem.html", include_str!("../../../templates/colaborador/listagem.html")),
    ("colaborador/formulario.html", include_str!("../../../templates/colaborador/formulario.html")),
    ("colaborador/cadastro.html", include_str!("../../../templates/colaborador/cadastro.html")),
    ("colaborador/editar.html", include_str!("../../../templates/colaborador/editar.html")),
    ("colaborador/endereco.html", include_str!("../../../templates/colaborador/endereco.html")),
    ("colaborador/instituicao.html", include_str!("../../../templates/colaborador/instituicao.html")),
    ("colaborador/permissoes.html", include_str!("../../../templates/colaborador/permissoes.html")),
    ("instituicao/listagem.html", include_str!("../../../templates/instituicao/listagem.html")),
    ("instituicao/cadastrar.html", include_str!("../../../templates/instituicao/cadastrar.html")),
    ("instituicao/editar.html", include_str!("../../../templates/instituicao/editar.html")),
    ("instituicao/participantes.html", include_str!("../../../templates/instituicao/participantes.html")),
    ("permissao/listagem.html", include_str!("../../../templates/permissao/listagem.html")),
    ("permissao/formulario.html", include_str!("../../../templates/permissao/formulario.html")),
];

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        // Todos de uma vez: os "extends" precisam do base.html registrado junto
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, AppError> {
        Ok(Html(self.tera.render(name, context)?))
    }
}

/// Contexto com a mensagem inline e a lista de erros por campo.
pub fn message_context(mensagem: Option<&str>, erro: bool) -> Context {
    let mut context = Context::new();
    if let Some(mensagem) = mensagem {
        context.insert("mensagem", mensagem);
        context.insert("erro", &erro);
    }
    context
}

pub fn gender_options() -> serde_json::Value {
    Gender::ALL
        .iter()
        .map(|g| json!({ "codigo": g.code(), "descricao": g.display_value() }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_compiles() {
        let views = Views::new().unwrap();
        let mut context = message_context(Some("Alteração realizada com sucesso!"), false);
        context.insert("colaboradores", &Vec::<serde_json::Value>::new());
        context.insert("ordenado", &false);
        let html = views.render("colaborador/listagem.html", &context).unwrap();
        assert!(html.0.contains("Alteração realizada com sucesso!"));
    }

    #[test]
    fn gender_options_list_all_codes() {
        let options = gender_options();
        let codes: Vec<_> = options
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["codigo"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["N", "M", "F"]);
    }
}
