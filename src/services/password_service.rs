// src/services/password_service.rs

pub struct PasswordService;

impl PasswordService {
    /// Lista o que falta na senha; vazia quando ela é forte o bastante.
    pub fn validate(password: &str) -> Vec<String> {
        let checks: [(bool, &str); 5] = [
            (
                password.chars().count() >= 8,
                "A senha deve possuir pelo menos 08 caracteres.",
            ),
            (
                password.chars().any(|c| c.is_ascii_uppercase()),
                "A senha deve possuir pelo menos uma letra maiúscula.",
            ),
            (
                password.chars().any(|c| c.is_ascii_lowercase()),
                "A senha deve possuir pelo menos uma letra minúscula.",
            ),
            (
                password.chars().any(|c| c.is_ascii_digit()),
                "A senha deve possuir pelo menos um numero.",
            ),
            // Caractere "não-palavra": fora de [A-Za-z0-9_]
            (
                password.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_'),
                "A senha deve possuir pelo menos um caractere especial.",
            ),
        ];

        checks
            .into_iter()
            .filter(|(ok, _)| !ok)
            .map(|(_, message)| message.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_password_lists_every_missing_rule() {
        let errors = PasswordService::validate("abc");
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&"A senha deve possuir pelo menos 08 caracteres.".to_string()));
        assert!(!errors.iter().any(|e| e.contains("minúscula")));
    }

    #[test]
    fn strong_password_has_no_errors() {
        assert!(PasswordService::validate("Abcdef1!").is_empty());
    }

    #[test]
    fn underscore_is_not_special() {
        let errors = PasswordService::validate("Abcdef1_");
        assert_eq!(
            errors,
            vec!["A senha deve possuir pelo menos um caractere especial.".to_string()]
        );
    }

    #[test]
    fn empty_password_fails_all_checks() {
        assert_eq!(PasswordService::validate("").len(), 5);
    }
}
