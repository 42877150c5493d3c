// src/services/institution_service.rs

use std::sync::Arc;

use crate::common::error::AppError;
use crate::common::formatting::{clean_cnpj, format_name, sort_key};
use crate::db::{InstitutionRepository, WorkerRepository};
use crate::models::dto::MessageResponse;
use crate::models::{Institution, Worker};

#[derive(Clone)]
pub struct InstitutionService {
    institutions: Arc<dyn InstitutionRepository>,
    workers: Arc<dyn WorkerRepository>,
}

impl InstitutionService {
    pub fn new(
        institutions: Arc<dyn InstitutionRepository>,
        workers: Arc<dyn WorkerRepository>,
    ) -> Self {
        Self {
            institutions,
            workers,
        }
    }

    pub async fn list(&self, sorted: bool) -> Result<Vec<Institution>, AppError> {
        let mut institutions = self.institutions.find_all().await?;
        if sorted {
            institutions.sort_by_cached_key(|i| sort_key(&i.name));
        }
        Ok(institutions)
    }

    pub async fn exists_by_cnpj(&self, cnpj: &str) -> Result<bool, AppError> {
        let cnpj = clean_cnpj(cnpj);
        if cnpj.is_empty() {
            return Ok(false);
        }
        Ok(self.institutions.count_by_cnpj(&cnpj).await? > 0)
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.institutions.count_by_name(&format_name(name)).await? > 0)
    }

    /// Chave natural: o CNPJ, ou o nome quando a instituição não tem CNPJ.
    pub async fn is_registered(&self, institution: &Institution) -> Result<bool, AppError> {
        if institution.cnpj.is_empty() {
            self.exists_by_name(&institution.name).await
        } else {
            self.exists_by_cnpj(&institution.cnpj).await
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Institution>, AppError> {
        self.institutions.find_by_id(id).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Institution>, AppError> {
        self.institutions.find_by_name(&format_name(name)).await
    }

    pub async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Institution>, AppError> {
        let cnpj = clean_cnpj(cnpj);
        if cnpj.is_empty() {
            return Ok(None);
        }
        self.institutions.find_by_cnpj(&cnpj).await
    }

    pub async fn find_by_acronym(&self, acronym: &str) -> Result<Option<Institution>, AppError> {
        self.institutions
            .find_by_acronym(&acronym.trim().to_uppercase())
            .await
    }

    /// Participantes: colaboradores vinculados à instituição.
    pub async fn find_workers(&self, institution_id: i64) -> Result<Vec<Worker>, AppError> {
        let mut workers = self.workers.find_by_institution(institution_id).await?;
        workers.sort_by_cached_key(|w| sort_key(&w.first_name));
        Ok(workers)
    }

    pub async fn save(&self, institution: Institution) -> Result<Institution, AppError> {
        if institution.name.is_empty() {
            return Err(AppError::exists_or_missing(
                "Dados nao cadastrados: NOME da Instituicao precisa ser preenchido!",
                "NOME da Instituicao AUSENTE ou INVÁLIDO",
            ));
        }
        let saved = self.institutions.save(institution).await?;
        tracing::info!("Instituição '{}' gravada (id {:?})", saved.name, saved.id);
        Ok(saved)
    }

    pub async fn update(&self, institution: Institution) -> Result<Institution, AppError> {
        if institution.id.is_none() {
            return Err(AppError::MissingInput("ID da Instituicao não informado!".into()));
        }
        self.save(institution).await
    }

    pub async fn delete(&self, institution: &Institution) -> Result<MessageResponse, AppError> {
        let id = institution
            .id
            .ok_or_else(|| AppError::MissingInput("ID da Instituicao não informado!".into()))?;

        if !self.institutions.delete(id).await? {
            return Err(AppError::exists_or_missing(
                "Entidade nao foi deletada: Instituicao com o ID informado não Existe!",
                "INSTITUIÇÃO NÃO CADASTRADA",
            ));
        }
        tracing::info!("Instituição {} removida; participantes desvinculados", id);
        Ok(MessageResponse::new("Instituicao DELETADA no Sistema!"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    fn institution(name: &str, cnpj: &str, sigla: &str) -> Institution {
        let mut i = Institution::default();
        i.set_name(name);
        i.set_cnpj(cnpj);
        i.set_acronym(sigla);
        i
    }

    fn service() -> (InstitutionService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (InstitutionService::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn natural_key_is_cnpj_or_name() {
        let (service, _) = service();
        service
            .save(institution("centro espírita da luz", "11222333000181", "cel"))
            .await
            .unwrap();
        service
            .save(institution("grupo de estudos allan kardec", "", "geak"))
            .await
            .unwrap();

        assert!(service
            .is_registered(&institution("Outro Nome", "011222333000181", ""))
            .await
            .unwrap());
        assert!(service
            .is_registered(&institution("GRUPO DE ESTUDOS ALLAN KARDEC", "", ""))
            .await
            .unwrap());
        assert!(!service
            .is_registered(&institution("Grupo Novo", "", ""))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn lookups_normalize_their_input() {
        let (service, _) = service();
        service
            .save(institution("centro espírita da luz", "11222333000181", "cel"))
            .await
            .unwrap();

        assert!(service.find_by_acronym(" cel ").await.unwrap().is_some());
        assert!(service.find_by_cnpj("011.222.333/0001-81").await.unwrap().is_some());
        assert!(service.find_by_name("CENTRO ESPÍRITA DA LUZ").await.unwrap().is_some());
        assert!(service.find_by_cnpj("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (service, _) = service();
        let err = service.save(institution("   ", "", "")).await.unwrap_err();
        match err {
            AppError::EntityExistsOrMissing { title, .. } => {
                assert_eq!(title, "NOME da Instituicao AUSENTE ou INVÁLIDO")
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn deleting_detaches_participants() {
        let (service, store) = service();
        let saved = service
            .save(institution("centro espírita da luz", "", "cel"))
            .await
            .unwrap();
        let institution_id = saved.id.unwrap();

        let mut worker = Worker::default();
        worker.set_cpf("53376207704");
        worker.institution_id = Some(institution_id);
        let worker = WorkerRepository::save(store.as_ref(), worker).await.unwrap();
        assert_eq!(service.find_workers(institution_id).await.unwrap().len(), 1);

        let msg = service.delete(&saved).await.unwrap();
        assert_eq!(msg.mensagem, "Instituicao DELETADA no Sistema!");

        let reloaded = WorkerRepository::find_by_id(store.as_ref(), worker.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.institution_id, None);
        assert!(service.find_by_id(institution_id).await.unwrap().is_none());
    }
}
