// src/common/formatting.rs

//! Normalização e apresentação de documentos brasileiros (CPF, CNPJ),
//! telefones, datas e nomes próprios.
//!
//! Todas as funções são puras e nunca falham: entradas malformadas geram
//! string vazia ou são devolvidas como vieram.

use chrono::{Datelike, NaiveDate};
use rand::Rng;

// Conectivos que ficam em minúsculo no meio de um nome
const NAME_CONNECTORS: [&str; 8] = ["da", "de", "do", "di", "dos", "das", "e", "d'"];

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Formata um nome: iniciais maiúsculas, conectivos em minúsculo.
///
/// `"joão  DA silva"` vira `"João da Silva"`.
pub fn format_name(raw: &str) -> String {
    raw.split(' ')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            let lower = part.to_lowercase();
            if i > 0 && NAME_CONNECTORS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize_word(part)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Primeira letra maiúscula, o resto intacto (nome de permissões).
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Chave de ordenação alfabética: ignora caixa e acentos, como a
/// collation do banco (`"Ávila"` fica antes de `"Bruna"`).
pub fn sort_key(raw: &str) -> String {
    raw.chars().flat_map(char::to_lowercase).map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

// ---
// CPF
// ---

pub fn clean_cpf(raw: &str) -> String {
    digits_only(raw)
}

/// `53376207704` -> `533.762.077-04`
pub fn format_cpf(clean: &str) -> String {
    let clean = clean.trim();
    if clean.len() != 11 || !clean.chars().all(|c| c.is_ascii_digit()) {
        return clean.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &clean[0..3],
        &clean[3..6],
        &clean[6..9],
        &clean[9..11]
    )
}

/// Verifica os dígitos verificadores do CPF (aceita entrada formatada).
pub fn is_valid_cpf(raw: &str) -> bool {
    let digits: Vec<u32> = clean_cpf(raw).chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 { 0 } else { rest }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

// ---
// CNPJ
// ---

/// Limpa o CNPJ para gravar no banco.
///
/// Valores em branco ou zerados viram vazio; os demais são completados com
/// zeros à esquerda até 15 posições (padrão legado) antes de retirar a
/// pontuação.
pub fn clean_cnpj(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "000000000000000" {
        return String::new();
    }
    let padding = 15usize.saturating_sub(trimmed.chars().count());
    let padded = format!("{}{}", "0".repeat(padding), trimmed);
    digits_only(&padded)
}

/// Agrupa um CNPJ limpo (15 dígitos) no padrão 3-3-3-4-2.
pub fn format_cnpj(clean: &str) -> String {
    let clean = clean.trim();
    if clean.len() != 15 || !clean.chars().all(|c| c.is_ascii_digit()) {
        return String::new();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &clean[0..3],
        &clean[3..6],
        &clean[6..9],
        &clean[9..13],
        &clean[13..15]
    )
}

// ---
// Telefone
// ---

pub fn clean_phone(raw: &str) -> String {
    let clean = digits_only(raw.trim());
    // máscara do formulário deixa um dígito solto quando o campo fica vazio
    if clean.len() == 1 {
        return String::new();
    }
    clean
}

/// 10 dígitos: fixo `(DD)NNNN-NNNN`; demais: celular `(DD)D.NNNN-NNNN`.
pub fn format_phone(clean: &str) -> String {
    let fone = clean.trim();
    if !fone.chars().all(|c| c.is_ascii_digit()) {
        return fone.to_string();
    }
    if fone.len() == 10 {
        format!("({}){}-{}", &fone[0..2], &fone[2..6], &fone[6..])
    } else if fone.len() >= 8 {
        format!("({}){}.{}-{}", &fone[0..2], &fone[2..3], &fone[3..7], &fone[7..])
    } else {
        fone.to_string()
    }
}

// ---
// Data de nascimento
// ---

/// `01/02/1990` -> `01021990`
pub fn clean_birth_date(raw: &str) -> String {
    digits_only(raw)
}

/// `01021990` -> `01/02/1990`
pub fn format_birth_date(clean: &str) -> String {
    let clean = clean.trim();
    if clean.len() != 8 || !clean.chars().all(|c| c.is_ascii_digit()) {
        return clean.to_string();
    }
    format!("{}/{}/{}", &clean[0..2], &clean[2..4], &clean[4..8])
}

pub fn parse_birth_date(clean: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format_birth_date(clean), "%d/%m/%Y").ok()
}

/// Idade completa em `today`; `None` se a data armazenada for inválida.
pub fn age_on(birth_date: &str, today: NaiveDate) -> Option<u32> {
    let born = parse_birth_date(birth_date)?;
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

// ---
// Código de verificação
// ---

/// String aleatória alfanumérica (A–Z, a–z, 0–9) gerada com RNG criptográfico.
pub fn generate_verification_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn name_connectors_are_lowercased() {
        assert_eq!(format_name("joão  DA silva"), "João da Silva");
        assert_eq!(format_name("  MARIA DOS santos e souza "), "Maria dos Santos e Souza");
        assert_eq!(format_name("da costa"), "Da Costa");
        assert_eq!(format_name("ana D' avila"), "Ana d' Avila");
        assert_eq!(format_name("   "), "");
    }

    #[test]
    fn capitalize_touches_only_first_letter() {
        assert_eq!(capitalize("administrador"), "Administrador");
        assert_eq!(capitalize("tESOUREIRO"), "TESOUREIRO");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn sort_key_ignores_case_and_accents() {
        assert_eq!(sort_key("Ávila"), "avila");
        assert_eq!(sort_key("JOÃO"), "joao");
        assert_eq!(sort_key("Conceição"), "conceicao");

        let mut names = vec!["Zuleica", "Ávila", "bruna", "Érica"];
        names.sort_by_cached_key(|n| sort_key(n));
        assert_eq!(names, vec!["Ávila", "bruna", "Érica", "Zuleica"]);
    }

    #[test]
    fn cpf_round_trip() {
        assert_eq!(format_cpf("53376207704"), "533.762.077-04");
        assert_eq!(format_cpf(&clean_cpf("533.762.077-04")), "533.762.077-04");
        assert_eq!(format_cpf("123"), "123");
    }

    #[test]
    fn cpf_checksum() {
        assert!(is_valid_cpf("53376207704"));
        assert!(is_valid_cpf("533.762.077-04"));
        assert!(!is_valid_cpf("53376207705"));
        assert!(!is_valid_cpf("11111111111"));
        assert!(!is_valid_cpf("5337620770"));
    }

    #[test]
    fn cnpj_is_padded_and_cleaned() {
        assert_eq!(clean_cnpj("11222333000181"), "011222333000181");
        // O preenchimento considera o texto com pontuação
        assert_eq!(clean_cnpj("11.222.333/0001-81"), "11222333000181");
        assert_eq!(clean_cnpj("011222333000181"), "011222333000181");
        assert_eq!(clean_cnpj("000000000000000"), "");
        assert_eq!(clean_cnpj("   "), "");
        assert_eq!(format_cnpj("011222333000181"), "011.222.333/0001-81");
        assert_eq!(format_cnpj("12345"), "");
    }

    #[test]
    fn phone_cleaning_and_display() {
        assert_eq!(clean_phone("(92) 9.8888-7777"), "92988887777");
        assert_eq!(clean_phone("("), "");
        assert_eq!(clean_phone("9"), "");
        assert_eq!(format_phone("9233334444"), "(92)3333-4444");
        assert_eq!(format_phone("92988887777"), "(92)9.8888-7777");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn birth_date_and_age() {
        assert_eq!(clean_birth_date("01/02/1990"), "01021990");
        assert_eq!(format_birth_date("01021990"), "01/02/1990");

        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(age_on("01021990", today), Some(34));
        let day_before = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(age_on("01021990", day_before), Some(33));
        assert_eq!(age_on("99999999", today), None);
    }

    #[test]
    fn verification_code_uses_alphanumeric_alphabet() {
        let code = generate_verification_code(64);
        assert_eq!(code.len(), 64);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, generate_verification_code(64));
    }

    proptest! {
        #[test]
        fn any_eleven_digits_round_trip(digits in "[0-9]{11}") {
            let formatted = format_cpf(&digits);
            prop_assert_eq!(formatted.len(), 14);
            prop_assert_eq!(format_cpf(&clean_cpf(&formatted)), formatted);
        }

        #[test]
        fn formatted_names_have_no_stray_spaces(raw in "[a-zA-Z ]{0,40}") {
            let name = format_name(&raw);
            prop_assert_eq!(name.trim(), name.as_str());
            prop_assert!(!name.contains("  "));
        }

        #[test]
        fn cleaned_phones_are_digits(raw in "[0-9() .-]{0,20}") {
            let phone = clean_phone(&raw);
            prop_assert!(phone.chars().all(|c| c.is_ascii_digit()));
            prop_assert_ne!(phone.len(), 1);
        }
    }
}
