// src/handlers/web/flash.rs

//! Mensagem de uma única leitura, levada num cookie até a próxima página.
//!
//! O cookie guarda apenas a chave; o texto fica no servidor.

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tera::Context;

const FLASH_COOKIE: &str = "obreiros_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    WorkerSaved,
    WorkerDeleted,
    InstitutionSaved,
    InstitutionDeleted,
    RoleSaved,
    RoleDeleted,
    Updated,
    Changed,
    StatusChanged,
    InvalidReference,
    DeleteFailed,
}

impl Flash {
    const ALL: [Flash; 11] = [
        Flash::WorkerSaved,
        Flash::WorkerDeleted,
        Flash::InstitutionSaved,
        Flash::InstitutionDeleted,
        Flash::RoleSaved,
        Flash::RoleDeleted,
        Flash::Updated,
        Flash::Changed,
        Flash::StatusChanged,
        Flash::InvalidReference,
        Flash::DeleteFailed,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Flash::WorkerSaved => "colaborador-salvo",
            Flash::WorkerDeleted => "colaborador-excluido",
            Flash::InstitutionSaved => "instituicao-salva",
            Flash::InstitutionDeleted => "instituicao-excluida",
            Flash::RoleSaved => "permissao-salva",
            Flash::RoleDeleted => "permissao-excluida",
            Flash::Updated => "atualizado",
            Flash::Changed => "alterado",
            Flash::StatusChanged => "situacao-alterada",
            Flash::InvalidReference => "referencia-invalida",
            Flash::DeleteFailed => "exclusao-falhou",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Flash::WorkerSaved => "Colaborador salvo com sucesso!",
            Flash::WorkerDeleted => "Colaborador EXCLUíDO do sistema!",
            Flash::InstitutionSaved => "Instituicao salva com sucesso!",
            Flash::InstitutionDeleted => "Instituição EXCLUíDA do sistema!",
            Flash::RoleSaved => "Permissão salva com sucesso!",
            Flash::RoleDeleted => "Permissão EXCLUíDA do sistema!",
            Flash::Updated => "ATUALIZAÇÃO realizada com sucesso!",
            Flash::Changed => "Alteração realizada com sucesso!",
            Flash::StatusChanged => "Situação do usuário atualizada no Banco de Dados!",
            Flash::InvalidReference => "SOLICITAÇÃO NÃO REALIZADA - Referencia Invalida!",
            Flash::DeleteFailed => "Erro na Exclusão: Referencia Inválida!",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Flash::InvalidReference | Flash::DeleteFailed)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.key() == key)
    }
}

/// Redireciona (303) deixando a mensagem para a próxima página.
pub fn redirect(jar: CookieJar, to: &str, flash: Flash) -> (CookieJar, Redirect) {
    let cookie = Cookie::build((FLASH_COOKIE, flash.key()))
        .path("/")
        .http_only(true);
    (jar.add(cookie), Redirect::to(to))
}

/// Lê e consome a mensagem pendente.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = Flash::from_key(cookie.value());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}

pub fn insert(context: &mut Context, flash: Option<Flash>) {
    if let Some(flash) = flash {
        context.insert("mensagem", flash.text());
        context.insert("erro", &flash.is_error());
    }
}
