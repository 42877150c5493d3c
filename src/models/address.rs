// src/models/address.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Endereço de um colaborador (relação 1:1, o colaborador é o dono)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema, Validate)]
#[serde(default)]
pub struct Address {
    #[serde(rename = "enderecoID")]
    #[sqlx(rename = "endereco_id")]
    pub id: Option<i64>,

    #[schema(example = "69000-000")]
    #[validate(length(max = 45, message = "CEP inválido"))]
    pub cep: String,

    #[serde(rename = "logradouro")]
    #[sqlx(rename = "logradouro")]
    #[schema(example = "Rua das Flores")]
    #[validate(length(max = 45))]
    pub street: String,

    #[serde(rename = "numero")]
    #[sqlx(rename = "numero")]
    #[validate(length(max = 45))]
    pub number: String,

    #[serde(rename = "complemento")]
    #[sqlx(rename = "complemento")]
    #[validate(length(max = 45))]
    pub complement: String,

    #[serde(rename = "bairro")]
    #[sqlx(rename = "bairro")]
    #[validate(length(max = 45))]
    pub neighborhood: String,

    #[serde(rename = "localidade")]
    #[sqlx(rename = "localidade")]
    #[schema(example = "Manaus")]
    #[validate(length(max = 45))]
    pub city: String,

    #[serde(rename = "estado")]
    #[sqlx(rename = "estado")]
    #[schema(example = "AM")]
    #[validate(length(max = 45))]
    pub state: String,

    #[validate(length(max = 45))]
    pub ibge: String,

    #[serde(rename = "versao")]
    #[sqlx(rename = "versao")]
    pub version: i64,
}

impl Address {
    /// Apara os espaços de todos os campos de texto.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.cep,
            &mut self.street,
            &mut self.number,
            &mut self.complement,
            &mut self.neighborhood,
            &mut self.city,
            &mut self.state,
            &mut self.ibge,
        ] {
            *field = field.trim().to_string();
        }
        self.state = self.state.to_uppercase();
        self
    }

    /// "Rua das Flores, 10 - Centro, Manaus/AM"
    pub fn one_line(&self) -> String {
        let mut line = self.street.clone();
        if !self.number.is_empty() {
            line.push_str(&format!(", {}", self.number));
        }
        if !self.neighborhood.is_empty() {
            line.push_str(&format!(" - {}", self.neighborhood));
        }
        if !self.city.is_empty() {
            line.push_str(&format!(", {}/{}", self.city, self.state));
        }
        line
    }
}
