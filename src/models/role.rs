// src/models/role.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::formatting::capitalize;

// Permissão (tabela rules). Os colaboradores que a possuem são resolvidos
// pela tabela-ponte, nunca guardados aqui.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    #[serde(rename = "rulesID")]
    #[sqlx(rename = "rules_id")]
    #[schema(example = 1)]
    pub id: Option<i64>,

    #[serde(rename = "ruleName")]
    #[sqlx(rename = "rule_name")]
    #[schema(example = "Administrador")]
    pub name: String,

    #[serde(rename = "versao")]
    #[sqlx(rename = "versao")]
    pub version: i64,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: capitalize(name.trim()),
            version: 0,
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = capitalize(name.trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_capitalized_and_trimmed() {
        let role = Role::new("  tesoureiro ");
        assert_eq!(role.name, "Tesoureiro");
        assert_eq!(role.id, None);
    }

    #[test]
    fn serializes_with_legacy_field_names() {
        let role = Role {
            id: Some(3),
            name: "Secretaria".into(),
            version: 1,
        };
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["rulesID"], 3);
        assert_eq!(json["ruleName"], "Secretaria");
        assert_eq!(json["versao"], 1);
    }
}
