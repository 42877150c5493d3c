// src/services/worker_service.rs

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::common::error::AppError;
use crate::common::formatting::{clean_cpf, format_name, generate_verification_code, sort_key};
use crate::db::{InstitutionRepository, RoleRepository, WorkerRepository};
use crate::models::dto::{MessageResponse, WorkerResponse};
use crate::models::{Address, InstitutionSummary, Worker};
use crate::services::AddressService;

const VERIFICATION_CODE_LENGTH: usize = 64;

fn worker_not_found() -> AppError {
    AppError::exists_or_missing(
        "Dados nao cadastrados: Colaborador com o ID informado não Existe!",
        "COLABORADOR NÃO CADASTRADO",
    )
}

#[derive(Clone)]
pub struct WorkerService {
    workers: Arc<dyn WorkerRepository>,
    roles: Arc<dyn RoleRepository>,
    institutions: Arc<dyn InstitutionRepository>,
    addresses: AddressService,
    bcrypt_cost: u32,
}

impl WorkerService {
    pub fn new(
        workers: Arc<dyn WorkerRepository>,
        roles: Arc<dyn RoleRepository>,
        institutions: Arc<dyn InstitutionRepository>,
        addresses: AddressService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            workers,
            roles,
            institutions,
            addresses,
            bcrypt_cost,
        }
    }

    // ---
    // Consultas
    // ---

    pub async fn list(&self, sorted: bool) -> Result<Vec<Worker>, AppError> {
        let mut workers = self.workers.find_all().await?;
        if sorted {
            workers.sort_by_cached_key(|w| sort_key(&w.first_name));
        }
        Ok(workers)
    }

    pub async fn exists(&self, cpf: &str) -> Result<bool, AppError> {
        Ok(self.workers.count_by_cpf(&clean_cpf(cpf)).await? > 0)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, AppError> {
        self.workers.find_by_id(id).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Worker>, AppError> {
        self.workers.find_by_first_name(&format_name(name)).await
    }

    pub async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Worker>, AppError> {
        self.workers.find_by_cpf(&clean_cpf(cpf)).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Worker>, AppError> {
        self.workers
            .find_by_email(&email.trim().to_lowercase())
            .await
    }

    pub async fn find_by_verification_code(&self, code: &str) -> Result<Option<Worker>, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        self.workers.find_by_verification_code(code).await
    }

    pub async fn find_by_institution(&self, institution_id: i64) -> Result<Vec<Worker>, AppError> {
        self.workers.find_by_institution(institution_id).await
    }

    // ---
    // Gravação
    // ---

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.bcrypt_cost;
        // bcrypt é custoso para a CPU: roda fora do executor assíncrono
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    /// Grava o colaborador; `password` é a senha em texto puro recebida
    /// agora. Sem ela, o hash já gravado é mantido.
    async fn persist(&self, mut worker: Worker, password: Option<&str>) -> Result<Worker, AppError> {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            worker.password = self.hash_password(password.to_string()).await?;
        }
        self.workers.save(worker).await
    }

    /// Cadastra um novo colaborador com código de verificação para ativação.
    pub async fn save(&self, mut worker: Worker, password: Option<&str>) -> Result<Worker, AppError> {
        if worker.id.is_none() && worker.verification_code.is_empty() {
            worker.verification_code = generate_verification_code(VERIFICATION_CODE_LENGTH);
        }
        let saved = self.persist(worker, password).await?;
        tracing::info!("Colaborador {:?} cadastrado", saved.id);
        Ok(saved)
    }

    pub async fn update(&self, worker: Worker, password: Option<&str>) -> Result<Worker, AppError> {
        if worker.id.is_none() {
            return Err(AppError::MissingInput("ID do Colaborador não informado!".into()));
        }
        let saved = self.persist(worker, password).await?;
        tracing::info!("Colaborador {:?} atualizado (versão {})", saved.id, saved.version);
        Ok(saved)
    }

    pub async fn delete(&self, worker: &Worker) -> Result<MessageResponse, AppError> {
        let id = worker
            .id
            .ok_or_else(|| AppError::MissingInput("ID do Colaborador não informado!".into()))?;

        if !self.workers.delete(id).await? {
            return Err(AppError::exists_or_missing(
                "Entidade nao foi deletada: Colaborador com o ID informado não Existe!",
                "COLABORADOR NÃO CADASTRADO",
            ));
        }
        tracing::info!("Colaborador {} removido do sistema", id);
        Ok(MessageResponse::new("Colaborador DELETADO do Sistema!"))
    }

    // ---
    // Relacionamentos
    // ---

    pub async fn assign_institution(
        &self,
        worker_id: i64,
        institution_id: i64,
    ) -> Result<Worker, AppError> {
        let worker = self.workers.find_by_id(worker_id).await?;
        let institution = self.institutions.find_by_id(institution_id).await?;

        let (Some(mut worker), Some(_)) = (worker, institution) else {
            return Err(AppError::exists_or_missing(
                "Associação não realizada: Instituicao ou Participante não Existe!",
                "ATRIBUIÇÃO NÃO REALIZADA",
            ));
        };

        worker.institution_id = Some(institution_id);
        let saved = self.workers.save(worker).await?;
        tracing::info!("Colaborador {} vinculado à instituição {}", worker_id, institution_id);
        Ok(saved)
    }

    /// Substitui o conjunto inteiro de permissões. Ids desconhecidos são
    /// ignorados (e registrados no log).
    pub async fn replace_roles(&self, worker_id: i64, role_ids: &[i64]) -> Result<Worker, AppError> {
        let mut worker = self
            .workers
            .find_by_id(worker_id)
            .await?
            .ok_or_else(worker_not_found)?;

        let known: BTreeSet<i64> = if role_ids.is_empty() {
            BTreeSet::new()
        } else {
            self.roles
                .find_by_ids(role_ids)
                .await?
                .into_iter()
                .filter_map(|r| r.id)
                .collect()
        };

        for id in role_ids.iter().filter(|id| !known.contains(id)) {
            tracing::warn!("Permissão {} não encontrada; ignorada na atribuição", id);
        }

        worker.role_ids = known;
        self.workers.save(worker).await
    }

    /// Grava o endereço do colaborador. O primeiro endereço é criado junto
    /// com o colaborador; os seguintes são atualizados na versão enviada
    /// pelo cliente (`OptimisticLock` se estiver desatualizada).
    pub async fn save_address(&self, worker_id: i64, address: Address) -> Result<Worker, AppError> {
        let mut worker = self
            .workers
            .find_by_id(worker_id)
            .await?
            .ok_or_else(worker_not_found)?;

        match worker.address.as_ref().and_then(|current| current.id) {
            Some(address_id) => {
                let saved = self
                    .addresses
                    .update(Address {
                        id: Some(address_id),
                        ..address
                    })
                    .await?;
                tracing::info!("Endereço {} do colaborador {} atualizado", address_id, worker_id);
                worker.address = Some(saved);
                Ok(worker)
            }
            None => {
                worker.address = Some(Address {
                    id: None,
                    version: 0,
                    ..address.normalized()
                });
                self.workers.save(worker).await
            }
        }
    }

    // ---
    // Situação da conta
    // ---

    pub async fn activate(&self, code: &str) -> Result<Worker, AppError> {
        let mut worker = self
            .find_by_verification_code(code)
            .await?
            .ok_or_else(|| {
                AppError::exists_or_missing(
                    "Entidade nao encontrada: Código de verificação inválido ou já utilizado!",
                    "CÓDIGO DE VERIFICAÇÃO INVÁLIDO",
                )
            })?;

        worker.active = true;
        worker.verification_code.clear();
        let saved = self.workers.save(worker).await?;
        tracing::info!("Conta do colaborador {:?} ativada", saved.id);
        Ok(saved)
    }

    pub async fn toggle_active(&self, worker_id: i64) -> Result<Worker, AppError> {
        let mut worker = self
            .workers
            .find_by_id(worker_id)
            .await?
            .ok_or_else(worker_not_found)?;
        worker.active = !worker.active;
        self.workers.save(worker).await
    }

    // ---
    // Apresentação
    // ---

    pub async fn to_response(&self, worker: &Worker) -> Result<WorkerResponse, AppError> {
        let role_ids: Vec<i64> = worker.role_ids.iter().copied().collect();
        let roles = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.roles.find_by_ids(&role_ids).await?
        };

        let institution = match worker.institution_id {
            Some(id) => self
                .institutions
                .find_by_id(id)
                .await?
                .as_ref()
                .and_then(InstitutionSummary::from_institution),
            None => None,
        };

        Ok(WorkerResponse::new(worker, roles, institution))
    }

    /// Versão em lote: carrega permissões e instituições uma única vez.
    pub async fn to_responses(&self, workers: &[Worker]) -> Result<Vec<WorkerResponse>, AppError> {
        let roles: HashMap<i64, _> = self
            .roles
            .find_all()
            .await?
            .into_iter()
            .filter_map(|r| r.id.map(|id| (id, r)))
            .collect();
        let institutions: HashMap<i64, _> = self
            .institutions
            .find_all()
            .await?
            .iter()
            .filter_map(|i| InstitutionSummary::from_institution(i).map(|s| (s.id, s)))
            .collect();

        Ok(workers
            .iter()
            .map(|w| {
                let worker_roles = w
                    .role_ids
                    .iter()
                    .filter_map(|id| roles.get(id).cloned())
                    .collect();
                let institution = w.institution_id.and_then(|id| institutions.get(&id).cloned());
                WorkerResponse::new(w, worker_roles, institution)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::models::{Institution, Role};

    struct Fixture {
        service: WorkerService,
        store: Arc<InMemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let service = WorkerService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            AddressService::new(store.clone()),
            4,
        );
        Fixture { service, store }
    }

    fn worker(cpf: &str, name: &str) -> Worker {
        let mut w = Worker::default();
        w.set_cpf(cpf);
        w.set_first_name(name);
        w.set_last_name("de souza");
        w.set_email(&format!("{}@exemplo.com", name.to_lowercase()));
        w.set_birth_date("15/03/1980");
        w
    }

    async fn role(store: &InMemoryStore, name: &str) -> i64 {
        RoleRepository::save(store, Role::new(name))
            .await
            .unwrap()
            .id
            .unwrap()
    }

    #[tokio::test]
    async fn registering_assigns_id_code_and_hashes_password() {
        let f = fixture();
        let saved = f
            .service
            .save(worker("53376207704", "maria"), Some("Abcdef1!"))
            .await
            .unwrap();
        assert!(saved.id.is_some());
        assert_eq!(saved.verification_code.len(), 64);
        assert_ne!(saved.password, "Abcdef1!");
        assert!(bcrypt::verify("Abcdef1!", &saved.password).unwrap());
        assert!(f.service.exists("533.762.077-04").await.unwrap());
    }

    #[tokio::test]
    async fn password_shaped_like_a_hash_is_still_hashed() {
        let f = fixture();
        let plain = format!("$2b$12${}", "A".repeat(53));
        assert_eq!(plain.len(), 60);

        let saved = f
            .service
            .save(worker("53376207704", "maria"), Some(&plain))
            .await
            .unwrap();
        assert_ne!(saved.password, plain);
        assert!(bcrypt::verify(&plain, &saved.password).unwrap());
    }

    #[tokio::test]
    async fn update_without_password_keeps_the_stored_hash() {
        let f = fixture();
        let saved = f
            .service
            .save(worker("53376207704", "maria"), Some("Abcdef1!"))
            .await
            .unwrap();
        let hash = saved.password.clone();

        let updated = f.service.update(saved, None).await.unwrap();
        assert_eq!(updated.password, hash);

        let changed = f.service.update(updated, Some("Outra#Senha9")).await.unwrap();
        assert_ne!(changed.password, hash);
        assert!(bcrypt::verify("Outra#Senha9", &changed.password).unwrap());
    }

    #[tokio::test]
    async fn role_replacement_is_symmetric() {
        let f = fixture();
        let a = role(&f.store, "tesoureiro").await;
        let b = role(&f.store, "secretaria").await;
        let c = role(&f.store, "palestrante").await;
        let id = f.service.save(worker("53376207704", "maria"), None).await.unwrap().id.unwrap();

        f.service.replace_roles(id, &[a, b]).await.unwrap();
        let w = f.service.replace_roles(id, &[b, c]).await.unwrap();

        assert_eq!(w.role_ids, BTreeSet::from([b, c]));
        assert!(f.store.find_by_role(a).await.unwrap().is_empty());
        let holders_of_c = f.store.find_by_role(c).await.unwrap();
        assert_eq!(holders_of_c.len(), 1);
        assert_eq!(holders_of_c[0].id, Some(id));
    }

    #[tokio::test]
    async fn unknown_roles_are_skipped() {
        let f = fixture();
        let a = role(&f.store, "tesoureiro").await;
        let id = f.service.save(worker("53376207704", "maria"), None).await.unwrap().id.unwrap();

        let w = f.service.replace_roles(id, &[a, 999]).await.unwrap();
        assert_eq!(w.role_ids, BTreeSet::from([a]));
    }

    #[tokio::test]
    async fn assigning_an_unknown_institution_fails() {
        let f = fixture();
        let id = f.service.save(worker("53376207704", "maria"), None).await.unwrap().id.unwrap();

        let err = f.service.assign_institution(id, 77).await.unwrap_err();
        match err {
            AppError::EntityExistsOrMissing { title, .. } => {
                assert_eq!(title, "ATRIBUIÇÃO NÃO REALIZADA")
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn assigning_an_institution_is_visible_from_both_sides() {
        let f = fixture();
        let institution = InstitutionRepository::save(
            f.store.as_ref(),
            Institution {
                name: "Centro Espírita da Luz".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let institution_id = institution.id.unwrap();
        let id = f.service.save(worker("53376207704", "maria"), None).await.unwrap().id.unwrap();

        let w = f.service.assign_institution(id, institution_id).await.unwrap();
        assert_eq!(w.institution_id, Some(institution_id));
        assert_eq!(f.service.find_by_institution(institution_id).await.unwrap().len(), 1);

        let response = f.service.to_response(&w).await.unwrap();
        assert_eq!(response.instituicao.unwrap().nome, "Centro Espírita da Luz");
    }

    #[tokio::test]
    async fn address_is_updated_in_place() {
        let f = fixture();
        let id = f.service.save(worker("53376207704", "maria"), None).await.unwrap().id.unwrap();

        let first = f
            .service
            .save_address(id, Address { street: "Rua A".into(), ..Default::default() })
            .await
            .unwrap()
            .address
            .unwrap();
        let second = f
            .service
            .save_address(id, Address { street: " Rua B ".into(), ..first.clone() })
            .await
            .unwrap()
            .address
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.street, "Rua B");
        assert_eq!(second.version, first.version + 1);

        let stored = f.service.find_by_id(id).await.unwrap().unwrap().address.unwrap();
        assert_eq!(stored, second);
    }

    #[tokio::test]
    async fn stale_address_version_is_rejected() {
        let f = fixture();
        let id = f.service.save(worker("53376207704", "maria"), None).await.unwrap().id.unwrap();
        let first = f
            .service
            .save_address(id, Address { street: "Rua A".into(), ..Default::default() })
            .await
            .unwrap()
            .address
            .unwrap();
        f.service
            .save_address(id, Address { street: "Rua B".into(), ..first.clone() })
            .await
            .unwrap();

        // Mesmo versao da primeira leitura: outra escrita já passou na frente
        let err = f
            .service
            .save_address(id, Address { street: "Rua C".into(), ..first })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OptimisticLock(_)));

        let stored = f.service.find_by_id(id).await.unwrap().unwrap().address.unwrap();
        assert_eq!(stored.street, "Rua B");
    }

    #[tokio::test]
    async fn activation_consumes_the_code() {
        let f = fixture();
        let saved = f.service.save(worker("53376207704", "maria"), None).await.unwrap();
        let code = saved.verification_code.clone();

        let active = f.service.activate(&code).await.unwrap();
        assert!(active.active);
        assert!(active.verification_code.is_empty());
        assert!(f.service.activate(&code).await.is_err());
        assert!(f.service.activate("").await.is_err());
    }

    #[tokio::test]
    async fn lookups_normalize_input() {
        let f = fixture();
        f.service.save(worker("53376207704", "maria"), None).await.unwrap();

        assert!(f.service.find_by_cpf("533.762.077-04").await.unwrap().is_some());
        assert!(f.service.find_by_name("  MARIA ").await.unwrap().is_some());
        assert!(f.service.find_by_email("Maria@Exemplo.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sorted_listing_orders_by_first_name() {
        let f = fixture();
        f.service.save(worker("53376207704", "zuleica"), None).await.unwrap();
        f.service.save(worker("11144477735", "amanda"), None).await.unwrap();
        f.service.save(worker("12345678909", "ávila"), None).await.unwrap();

        let names: Vec<_> = f
            .service
            .list(true)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.first_name)
            .collect();
        assert_eq!(names, vec!["Amanda", "Ávila", "Zuleica"]);
    }
}
