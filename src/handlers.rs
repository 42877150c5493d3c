pub mod api;
pub mod extract;
pub mod web;

use crate::common::error::AppError;

/// Interpreta o parâmetro `ordenar` das listagens.
pub(crate) fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "sim" => Ok(true),
        "false" | "0" | "no" | "off" | "nao" => Ok(false),
        other => Err(AppError::InvalidParameter(format!(
            "Valor inválido para ordenação: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(parse_flag(" ON ").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(!parse_flag("False").unwrap());
        assert!(matches!(parse_flag("talvez"), Err(AppError::InvalidParameter(_))));
    }
}
