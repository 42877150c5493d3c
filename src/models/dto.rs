// src/models/dto.rs

//! Formatos de entrada e saída da API e dos formulários.
//!
//! Os nomes dos campos no fio seguem o cadastro legado (`colaboradorID`,
//! `dataNascimento`, `versao`...). As entidades nunca são expostas diretamente.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::formatting::{
    capitalize, clean_birth_date, format_name, is_valid_cpf, parse_birth_date,
};
use crate::models::{
    address::Address,
    institution::{Institution, InstitutionSummary},
    role::Role,
    worker::{Gender, Worker},
};

// ---
// Validadores customizados
// ---

fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if is_valid_cpf(cpf) {
        return Ok(());
    }
    let mut err = ValidationError::new("cpf");
    err.message = Some("CPF inválido!".into());
    Err(err)
}

fn validate_birth_date(raw: &str) -> Result<(), ValidationError> {
    if parse_birth_date(&clean_birth_date(raw)).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("data_nascimento");
    err.message = Some("Data de nascimento inválida".into());
    Err(err)
}

// O tamanho vale para o nome já normalizado: espaços soltos não contam
fn name_length(normalized: &str, message: &'static str) -> Result<(), ValidationError> {
    if (5..=50).contains(&normalized.chars().count()) {
        return Ok(());
    }
    let mut err = ValidationError::new("length");
    err.message = Some(message.into());
    Err(err)
}

fn validate_first_name(raw: &str) -> Result<(), ValidationError> {
    name_length(&format_name(raw), "Nome precisa ter no mínimo 5 caracteres")
}

fn validate_last_name(raw: &str) -> Result<(), ValidationError> {
    name_length(&format_name(raw), "Sobrenome precisa ter no mínimo 5 caracteres")
}

fn validate_institution_name(raw: &str) -> Result<(), ValidationError> {
    name_length(&format_name(raw), "Nome precisa ter no mínimo 5 caracteres")
}

fn validate_role_name(raw: &str) -> Result<(), ValidationError> {
    name_length(
        &capitalize(raw.trim()),
        "Nome da permissão precisa ter no mínimo 5 caracteres",
    )
}

// ---
// Colaborador
// ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct WorkerDto {
    #[serde(rename = "colaboradorID")]
    pub id: Option<i64>,

    #[schema(example = "533.762.077-04")]
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: String,

    #[serde(rename = "nome")]
    #[schema(example = "Maria")]
    #[validate(custom(function = "validate_first_name"))]
    pub first_name: String,

    #[serde(rename = "sobrenome")]
    #[schema(example = "das Dores")]
    #[validate(custom(function = "validate_last_name"))]
    pub last_name: String,

    #[schema(example = "maria@exemplo.com")]
    #[validate(
        email(message = "Email inválido"),
        length(min = 6, max = 45, message = "Email inválido")
    )]
    pub email: String,

    #[serde(rename = "dataNascimento")]
    #[schema(example = "15/03/1980")]
    #[validate(
        length(min = 8, max = 10, message = "Data de nascimento inválida"),
        custom(function = "validate_birth_date")
    )]
    pub birth_date: String,

    #[serde(rename = "sexo")]
    pub gender: Gender,

    #[schema(example = "(92)9.8888-7777")]
    #[validate(length(max = 20, message = "Whatsapp inválido"))]
    pub whatsapp: String,

    // Só entra; nunca volta na resposta
    #[serde(skip_serializing)]
    pub password: Option<String>,

    #[serde(rename = "versao")]
    pub version: Option<i64>,
}

impl WorkerDto {
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Novo colaborador (sem id) a partir do formulário.
    pub fn into_new_worker(self) -> Worker {
        let mut worker = Worker::default();
        self.apply_to(&mut worker);
        worker.id = None;
        worker.version = 0;
        worker
    }

    /// Aplica os campos editáveis sobre a entidade gravada. Permissões,
    /// endereço, instituição, senha e situação são mantidos; a senha nova
    /// segue à parte (`new_password`) para o serviço gerar o hash.
    pub fn apply_to(&self, worker: &mut Worker) {
        worker.set_cpf(&self.cpf);
        worker.set_first_name(&self.first_name);
        worker.set_last_name(&self.last_name);
        worker.set_email(&self.email);
        worker.set_birth_date(&self.birth_date);
        worker.set_whatsapp(&self.whatsapp);
        worker.gender = self.gender;
        if let Some(version) = self.version {
            worker.version = version;
        }
    }

    /// Pré-preenche o formulário de edição.
    pub fn from_worker(worker: &Worker) -> Self {
        Self {
            id: worker.id,
            cpf: worker.formatted_cpf(),
            first_name: worker.first_name.clone(),
            last_name: worker.last_name.clone(),
            email: worker.email.clone(),
            birth_date: worker.formatted_birth_date(),
            gender: worker.gender,
            whatsapp: worker.formatted_whatsapp(),
            password: None,
            version: Some(worker.version),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkerResponse {
    #[serde(rename = "colaboradorID")]
    pub id: i64,
    #[schema(example = "533.762.077-04")]
    pub cpf: String,
    pub nome: String,
    pub sobrenome: String,
    pub email: String,
    #[serde(rename = "dataNascimento")]
    #[schema(example = "15/03/1980")]
    pub data_nascimento: String,
    pub sexo: Gender,
    #[serde(rename = "sexoDescricao")]
    pub sexo_descricao: String,
    #[schema(example = "(92)9.8888-7777")]
    pub whatsapp: String,
    pub idade: Option<u32>,
    pub ativo: bool,
    pub versao: i64,
    pub permissoes: Vec<Role>,
    pub endereco: Option<Address>,
    pub instituicao: Option<InstitutionSummary>,
}

impl WorkerResponse {
    pub fn new(
        worker: &Worker,
        roles: Vec<Role>,
        institution: Option<InstitutionSummary>,
    ) -> Self {
        Self {
            id: worker.id.unwrap_or_default(),
            cpf: worker.formatted_cpf(),
            nome: worker.first_name.clone(),
            sobrenome: worker.last_name.clone(),
            email: worker.email.clone(),
            data_nascimento: worker.formatted_birth_date(),
            sexo: worker.gender,
            sexo_descricao: worker.gender.display_value().to_string(),
            whatsapp: worker.formatted_whatsapp(),
            idade: worker.age(),
            ativo: worker.active,
            versao: worker.version,
            permissoes: roles,
            endereco: worker.address.clone(),
            instituicao: institution,
        }
    }
}

// ---
// Instituição
// ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct InstitutionDto {
    #[serde(rename = "instituicaoID")]
    pub id: Option<i64>,

    #[serde(rename = "nome")]
    #[schema(example = "Centro Espírita da Luz")]
    #[validate(custom(function = "validate_institution_name"))]
    pub name: String,

    #[schema(example = "11.222.333/0001-81")]
    #[validate(length(max = 20, message = "CNPJ inválido"))]
    pub cnpj: String,

    #[serde(rename = "sigla")]
    #[schema(example = "CEL")]
    #[validate(length(max = 20, message = "Sigla deve ter no máximo 20 caracteres"))]
    pub acronym: String,

    #[serde(rename = "telefone")]
    #[validate(length(max = 20, message = "Telefone inválido"))]
    pub phone: String,

    #[serde(rename = "enderecoEletronico")]
    #[validate(length(max = 120, message = "Email inválido"))]
    pub email: String,

    #[serde(rename = "googleMaps")]
    #[validate(length(max = 200, message = "Link do mapa muito longo"))]
    pub maps_url: String,

    #[serde(rename = "versao")]
    pub version: Option<i64>,
}

impl InstitutionDto {
    pub fn into_new_institution(self) -> Institution {
        let mut institution = Institution::default();
        self.apply_to(&mut institution);
        institution.id = None;
        institution.version = 0;
        institution
    }

    pub fn apply_to(&self, institution: &mut Institution) {
        institution.set_name(&self.name);
        institution.set_cnpj(&self.cnpj);
        institution.set_acronym(&self.acronym);
        institution.set_phone(&self.phone);
        institution.set_email(&self.email);
        institution.set_maps_url(&self.maps_url);
        if let Some(version) = self.version {
            institution.version = version;
        }
    }

    pub fn from_institution(institution: &Institution) -> Self {
        Self {
            id: institution.id,
            name: institution.name.clone(),
            cnpj: institution.formatted_cnpj(),
            acronym: institution.acronym.clone(),
            phone: institution.formatted_phone(),
            email: institution.email.clone(),
            maps_url: institution.maps_url.clone(),
            version: Some(institution.version),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstitutionResponse {
    #[serde(rename = "instituicaoID")]
    pub id: i64,
    pub nome: String,
    #[schema(example = "011222333000181")]
    pub cnpj: String,
    #[serde(rename = "cnpjFormatado")]
    #[schema(example = "011.222.333/0001-81")]
    pub cnpj_formatado: String,
    pub sigla: String,
    pub telefone: String,
    #[serde(rename = "enderecoEletronico")]
    pub endereco_eletronico: String,
    #[serde(rename = "googleMaps")]
    pub google_maps: String,
    pub versao: i64,
}

impl From<&Institution> for InstitutionResponse {
    fn from(institution: &Institution) -> Self {
        Self {
            id: institution.id.unwrap_or_default(),
            nome: institution.name.clone(),
            cnpj: institution.cnpj.clone(),
            cnpj_formatado: institution.formatted_cnpj(),
            sigla: institution.acronym.clone(),
            telefone: institution.formatted_phone(),
            endereco_eletronico: institution.email.clone(),
            google_maps: institution.maps_url.clone(),
            versao: institution.version,
        }
    }
}

// ---
// Permissão
// ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct RoleDto {
    #[serde(rename = "rulesID")]
    pub id: Option<i64>,

    #[serde(rename = "ruleName")]
    #[schema(example = "Tesoureiro")]
    #[validate(custom(function = "validate_role_name"))]
    pub name: String,

    #[serde(rename = "versao")]
    pub version: Option<i64>,
}

impl RoleDto {
    pub fn into_new_role(self) -> Role {
        Role::new(&self.name)
    }

    pub fn apply_to(&self, role: &mut Role) {
        role.set_name(&self.name);
        if let Some(version) = self.version {
            role.version = version;
        }
    }
}

// ---
// Auxiliares
// ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PasswordRequest {
    #[schema(example = "Abcdef1!")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Colaborador DELETADO do Sistema!")]
    pub mensagem: String,
}

impl MessageResponse {
    pub fn new(mensagem: impl Into<String>) -> Self {
        Self {
            mensagem: mensagem.into(),
        }
    }
}
