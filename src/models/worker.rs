// src/models/worker.rs

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::formatting::{
    age_on, clean_birth_date, clean_cpf, clean_phone, format_birth_date, format_cpf, format_name,
    format_phone,
};
use crate::models::address::Address;

// Mapeia o ENUM 'genero' do Postgres
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "genero")]
pub enum Gender {
    #[default]
    #[serde(rename = "N")]
    #[sqlx(rename = "N")]
    Unspecified,
    #[serde(rename = "M")]
    #[sqlx(rename = "M")]
    Male,
    #[serde(rename = "F")]
    #[sqlx(rename = "F")]
    Female,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Unspecified, Gender::Male, Gender::Female];

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Unspecified => "N",
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    pub fn display_value(&self) -> &'static str {
        match self {
            Gender::Unspecified => "Prefiro não informar",
            Gender::Male => "Masculino",
            Gender::Female => "Feminino",
        }
    }
}

/// Colaborador (voluntário cadastrado).
///
/// Os campos de documento ficam sempre limpos (só dígitos); a formatação
/// acontece apenas na apresentação. Relacionamentos são guardados por id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worker {
    pub id: Option<i64>,
    pub cpf: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: String,
    pub whatsapp: String,
    pub gender: Gender,
    // hash bcrypt; vazio quando a conta ainda não tem senha
    pub password: String,
    pub verification_code: String,
    pub active: bool,
    pub version: i64,
    pub role_ids: BTreeSet<i64>,
    pub address: Option<Address>,
    pub institution_id: Option<i64>,
}

impl Worker {
    // --- Setters que normalizam a entrada ---

    pub fn set_cpf(&mut self, raw: &str) {
        self.cpf = clean_cpf(raw);
    }

    pub fn set_first_name(&mut self, raw: &str) {
        self.first_name = format_name(raw);
    }

    pub fn set_last_name(&mut self, raw: &str) {
        self.last_name = format_name(raw);
    }

    pub fn set_email(&mut self, raw: &str) {
        self.email = raw.trim().to_lowercase();
    }

    pub fn set_birth_date(&mut self, raw: &str) {
        self.birth_date = clean_birth_date(raw);
    }

    pub fn set_whatsapp(&mut self, raw: &str) {
        self.whatsapp = clean_phone(raw);
    }

    // --- Apresentação ---

    pub fn formatted_cpf(&self) -> String {
        format_cpf(&self.cpf)
    }

    pub fn formatted_birth_date(&self) -> String {
        format_birth_date(&self.birth_date)
    }

    pub fn formatted_whatsapp(&self) -> String {
        format_phone(&self.whatsapp)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn age(&self) -> Option<u32> {
        self.age_on(Local::now().date_naive())
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        age_on(&self.birth_date, today)
    }

    // --- Relacionamentos (por id) ---

    pub fn add_role(&mut self, role_id: i64) -> bool {
        self.role_ids.insert(role_id)
    }

    pub fn remove_role(&mut self, role_id: i64) -> bool {
        self.role_ids.remove(&role_id)
    }

    pub fn has_role(&self, role_id: i64) -> bool {
        self.role_ids.contains(&role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> Worker {
        let mut w = Worker::default();
        w.set_cpf("533.762.077-04");
        w.set_first_name("  maria DAS dores ");
        w.set_last_name("de souza");
        w.set_email(" Maria@Exemplo.COM ");
        w.set_birth_date("15/03/1980");
        w.set_whatsapp("(92) 9.8888-7777");
        w
    }

    #[test]
    fn setters_store_clean_values() {
        let w = worker();
        assert_eq!(w.cpf, "53376207704");
        assert_eq!(w.first_name, "Maria das Dores");
        assert_eq!(w.last_name, "De Souza");
        assert_eq!(w.email, "maria@exemplo.com");
        assert_eq!(w.birth_date, "15031980");
        assert_eq!(w.whatsapp, "92988887777");
    }

    #[test]
    fn getters_format_for_display() {
        let w = worker();
        assert_eq!(w.formatted_cpf(), "533.762.077-04");
        assert_eq!(w.formatted_birth_date(), "15/03/1980");
        assert_eq!(w.formatted_whatsapp(), "(92)9.8888-7777");
        assert_eq!(w.full_name(), "Maria das Dores De Souza");
        let today = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        assert_eq!(w.age_on(today), Some(43));
    }

    #[test]
    fn role_membership_is_a_set() {
        let mut w = worker();
        assert!(w.add_role(2));
        assert!(!w.add_role(2));
        assert!(w.has_role(2));
        assert!(w.remove_role(2));
        assert!(w.role_ids.is_empty());
    }

    #[test]
    fn gender_codes_and_labels() {
        assert_eq!(Gender::default(), Gender::Unspecified);
        assert_eq!(Gender::Female.code(), "F");
        assert_eq!(Gender::Unspecified.display_value(), "Prefiro não informar");
        let parsed: Gender = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(parsed, Gender::Male);
    }
}
