// src/models/institution.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::formatting::{clean_cnpj, clean_phone, format_cnpj, format_name, format_phone};

// Centro espírita ou grupo de estudos.
// Os participantes são os colaboradores cuja chave `instituicao` aponta para cá.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct Institution {
    #[sqlx(rename = "instituicao_id")]
    pub id: Option<i64>,
    #[sqlx(rename = "nome")]
    pub name: String,
    pub cnpj: String,
    #[sqlx(rename = "sigla")]
    pub acronym: String,
    #[sqlx(rename = "telefone")]
    pub phone: String,
    #[sqlx(rename = "endereco_eletronico")]
    pub email: String,
    #[sqlx(rename = "google_maps")]
    pub maps_url: String,
    #[sqlx(rename = "versao")]
    pub version: i64,
}

impl Institution {
    pub fn set_name(&mut self, raw: &str) {
        self.name = format_name(raw);
    }

    pub fn set_cnpj(&mut self, raw: &str) {
        self.cnpj = clean_cnpj(raw);
    }

    pub fn set_acronym(&mut self, raw: &str) {
        self.acronym = raw.trim().to_uppercase();
    }

    pub fn set_phone(&mut self, raw: &str) {
        self.phone = clean_phone(raw);
    }

    pub fn set_email(&mut self, raw: &str) {
        self.email = raw.trim().to_lowercase();
    }

    pub fn set_maps_url(&mut self, raw: &str) {
        self.maps_url = raw.trim().to_string();
    }

    pub fn formatted_cnpj(&self) -> String {
        format_cnpj(&self.cnpj)
    }

    pub fn formatted_phone(&self) -> String {
        format_phone(&self.phone)
    }
}

// Resumo embutido na resposta do colaborador
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstitutionSummary {
    #[serde(rename = "instituicaoID")]
    pub id: i64,
    pub nome: String,
    pub sigla: String,
}

impl InstitutionSummary {
    pub fn from_institution(institution: &Institution) -> Option<Self> {
        Some(Self {
            id: institution.id?,
            nome: institution.name.clone(),
            sigla: institution.acronym.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_normalize_input() {
        let mut inst = Institution::default();
        inst.set_name("centro espírita DA luz");
        inst.set_cnpj("11222333000181");
        inst.set_acronym(" cel ");
        inst.set_phone("(92) 3333-4444");
        inst.set_email(" Contato@CEL.org ");

        assert_eq!(inst.name, "Centro Espírita da Luz");
        assert_eq!(inst.cnpj, "011222333000181");
        assert_eq!(inst.formatted_cnpj(), "011.222.333/0001-81");
        assert_eq!(inst.acronym, "CEL");
        assert_eq!(inst.formatted_phone(), "(92)3333-4444");
        assert_eq!(inst.email, "contato@cel.org");
    }

    #[test]
    fn summary_requires_a_persisted_institution() {
        assert!(InstitutionSummary::from_institution(&Institution::default()).is_none());
    }
}
