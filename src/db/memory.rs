// src/db/memory.rs

//! Armazenamento em memória com as mesmas regras do Postgres (unicidade,
//! versão otimista, desvinculação na exclusão).
//!
//! Usado em desenvolvimento (sem `DATABASE_URL`) e nos testes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::common::db_utils::stale_version;
use crate::common::error::AppError;
use crate::db::{AddressRepository, InstitutionRepository, RoleRepository, WorkerRepository};
use crate::models::{Address, Institution, Role, Worker};

// Colaborador sem endereço nem permissões embutidos (são resolvidos na leitura)
#[derive(Debug, Clone)]
struct WorkerRecord {
    worker: Worker,
    address_id: Option<i64>,
}

#[derive(Debug, Default)]
struct Tables {
    workers: BTreeMap<i64, WorkerRecord>,
    addresses: BTreeMap<i64, Address>,
    institutions: BTreeMap<i64, Institution>,
    roles: BTreeMap<i64, Role>,
    // (colaborador_id, rules_id)
    worker_roles: BTreeSet<(i64, i64)>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn hydrate(&self, id: i64, record: &WorkerRecord) -> Worker {
        let mut worker = record.worker.clone();
        worker.id = Some(id);
        worker.address = record
            .address_id
            .and_then(|address_id| self.addresses.get(&address_id).cloned());
        worker.role_ids = self
            .worker_roles
            .iter()
            .filter(|(worker_id, _)| *worker_id == id)
            .map(|(_, role_id)| *role_id)
            .collect();
        worker
    }

    fn workers_where(&self, predicate: impl Fn(i64, &WorkerRecord) -> bool) -> Vec<Worker> {
        self.workers
            .iter()
            .filter(|(id, record)| predicate(**id, *record))
            .map(|(id, record)| self.hydrate(*id, record))
            .collect()
    }

    fn upsert_address(&mut self, address: &Address) -> Result<Address, AppError> {
        let mut saved = address.clone();
        match address.id {
            None => {
                let id = self.next_id();
                saved.id = Some(id);
                saved.version = 0;
                self.addresses.insert(id, saved.clone());
            }
            Some(id) => {
                let stored = self
                    .addresses
                    .get_mut(&id)
                    .filter(|stored| stored.version == address.version)
                    .ok_or_else(|| stale_version("Endereço", id, address.version))?;
                saved.version = address.version + 1;
                *stored = saved.clone();
            }
        }
        Ok(saved)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("lock poisoned")))
    }
}

// ---
// Colaboradores
// ---

#[async_trait]
impl WorkerRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Worker>, AppError> {
        Ok(self.read()?.workers_where(|_, _| true))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, AppError> {
        let tables = self.read()?;
        Ok(tables.workers.get(&id).map(|record| tables.hydrate(id, record)))
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Worker>, AppError> {
        Ok(self
            .read()?
            .workers_where(|_, r| r.worker.cpf == cpf)
            .into_iter()
            .next())
    }

    async fn find_by_first_name(&self, name: &str) -> Result<Option<Worker>, AppError> {
        Ok(self
            .read()?
            .workers_where(|_, r| r.worker.first_name == name)
            .into_iter()
            .next())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Worker>, AppError> {
        Ok(self
            .read()?
            .workers_where(|_, r| r.worker.email == email)
            .into_iter()
            .next())
    }

    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Worker>, AppError> {
        Ok(self
            .read()?
            .workers_where(|_, r| r.worker.verification_code == code)
            .into_iter()
            .next())
    }

    async fn find_by_institution(&self, institution_id: i64) -> Result<Vec<Worker>, AppError> {
        Ok(self
            .read()?
            .workers_where(|_, r| r.worker.institution_id == Some(institution_id)))
    }

    async fn find_by_role(&self, role_id: i64) -> Result<Vec<Worker>, AppError> {
        let tables = self.read()?;
        Ok(tables.workers_where(|id, _| tables.worker_roles.contains(&(id, role_id))))
    }

    async fn count_by_cpf(&self, cpf: &str) -> Result<i64, AppError> {
        let tables = self.read()?;
        Ok(tables.workers.values().filter(|r| r.worker.cpf == cpf).count() as i64)
    }

    async fn save(&self, worker: Worker) -> Result<Worker, AppError> {
        let mut tables = self.write()?;

        // Restrições checadas antes de qualquer escrita: a operação é tudo ou nada
        if tables
            .workers
            .iter()
            .any(|(id, r)| r.worker.cpf == worker.cpf && Some(*id) != worker.id)
        {
            return Err(AppError::IntegrityViolation(
                "Dados nao cadastrados: Colaborador já Existe!".into(),
            ));
        }
        if let Some(institution_id) = worker.institution_id {
            if !tables.institutions.contains_key(&institution_id) {
                return Err(AppError::IntegrityViolation(
                    "Instituição informada não Existe!".into(),
                ));
            }
        }
        if worker.role_ids.iter().any(|id| !tables.roles.contains_key(id)) {
            return Err(AppError::IntegrityViolation(
                "Permissão informada não Existe!".into(),
            ));
        }
        if let Some(id) = worker.id {
            match tables.workers.get(&id) {
                Some(r) if r.worker.version == worker.version => {}
                _ => return Err(stale_version("Colaborador", id, worker.version)),
            }
        }
        if let Some(Address { id: Some(address_id), version, .. }) = &worker.address {
            match tables.addresses.get(address_id) {
                Some(stored) if stored.version == *version => {}
                _ => return Err(stale_version("Endereço", *address_id, *version)),
            }
        }

        let mut saved = worker.clone();
        if let Some(address) = &worker.address {
            saved.address = Some(tables.upsert_address(address)?);
        }

        let id = match worker.id {
            Some(id) => {
                saved.version = worker.version + 1;
                id
            }
            None => {
                saved.version = 0;
                tables.next_id()
            }
        };
        saved.id = Some(id);

        let record = WorkerRecord {
            worker: Worker {
                address: None,
                role_ids: BTreeSet::new(),
                ..saved.clone()
            },
            address_id: saved.address.as_ref().and_then(|a| a.id),
        };
        tables.workers.insert(id, record);

        tables.worker_roles.retain(|(worker_id, _)| *worker_id != id);
        for role_id in &worker.role_ids {
            tables.worker_roles.insert((id, *role_id));
        }

        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        let Some(record) = tables.workers.remove(&id) else {
            return Ok(false);
        };
        tables.worker_roles.retain(|(worker_id, _)| *worker_id != id);
        if let Some(address_id) = record.address_id {
            tables.addresses.remove(&address_id);
        }
        Ok(true)
    }
}

// ---
// Instituições
// ---

#[async_trait]
impl InstitutionRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Institution>, AppError> {
        Ok(self.read()?.institutions.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Institution>, AppError> {
        Ok(self.read()?.institutions.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Institution>, AppError> {
        Ok(self.read()?.institutions.values().find(|i| i.name == name).cloned())
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Institution>, AppError> {
        Ok(self.read()?.institutions.values().find(|i| i.cnpj == cnpj).cloned())
    }

    async fn find_by_acronym(&self, acronym: &str) -> Result<Option<Institution>, AppError> {
        Ok(self
            .read()?
            .institutions
            .values()
            .find(|i| i.acronym == acronym)
            .cloned())
    }

    async fn count_by_cnpj(&self, cnpj: &str) -> Result<i64, AppError> {
        let tables = self.read()?;
        Ok(tables.institutions.values().filter(|i| i.cnpj == cnpj).count() as i64)
    }

    async fn count_by_name(&self, name: &str) -> Result<i64, AppError> {
        let tables = self.read()?;
        Ok(tables.institutions.values().filter(|i| i.name == name).count() as i64)
    }

    async fn save(&self, institution: Institution) -> Result<Institution, AppError> {
        let mut tables = self.write()?;

        // CNPJ vazio não participa da unicidade (índice parcial no Postgres)
        if !institution.cnpj.is_empty()
            && tables
                .institutions
                .values()
                .any(|i| i.cnpj == institution.cnpj && i.id != institution.id)
        {
            return Err(AppError::IntegrityViolation(
                "Dados nao cadastrados: Instituicao já Existe!".into(),
            ));
        }

        let mut saved = institution.clone();
        match institution.id {
            Some(id) => {
                match tables.institutions.get(&id) {
                    Some(stored) if stored.version == institution.version => {}
                    _ => return Err(stale_version("Instituição", id, institution.version)),
                }
                saved.version = institution.version + 1;
            }
            None => {
                saved.id = Some(tables.next_id());
                saved.version = 0;
            }
        }

        if let Some(id) = saved.id {
            tables.institutions.insert(id, saved.clone());
        }
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        if tables.institutions.remove(&id).is_none() {
            return Ok(false);
        }
        for record in tables.workers.values_mut() {
            if record.worker.institution_id == Some(id) {
                record.worker.institution_id = None;
                record.worker.version += 1;
            }
        }
        Ok(true)
    }
}

// ---
// Permissões
// ---

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Role>, AppError> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .roles
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(_, role)| role.clone())
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        Ok(self.read()?.roles.values().find(|r| r.name == name).cloned())
    }

    async fn count_by_name(&self, name: &str) -> Result<i64, AppError> {
        let tables = self.read()?;
        Ok(tables.roles.values().filter(|r| r.name == name).count() as i64)
    }

    async fn save(&self, role: Role) -> Result<Role, AppError> {
        let mut tables = self.write()?;

        if tables
            .roles
            .values()
            .any(|r| r.name == role.name && r.id != role.id)
        {
            return Err(AppError::IntegrityViolation(
                "Dados nao cadastrados: Permissao já Existe!".into(),
            ));
        }

        let mut saved = role.clone();
        match role.id {
            Some(id) => {
                match tables.roles.get(&id) {
                    Some(stored) if stored.version == role.version => {}
                    _ => return Err(stale_version("Permissão", id, role.version)),
                }
                saved.version = role.version + 1;
            }
            None => {
                saved.id = Some(tables.next_id());
                saved.version = 0;
            }
        }

        if let Some(id) = saved.id {
            tables.roles.insert(id, saved.clone());
        }
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        if tables.roles.remove(&id).is_none() {
            return Ok(false);
        }
        tables.worker_roles.retain(|(_, role_id)| *role_id != id);
        Ok(true)
    }
}

// ---
// Endereços
// ---

#[async_trait]
impl AddressRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Address>, AppError> {
        Ok(self.read()?.addresses.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Address>, AppError> {
        Ok(self.read()?.addresses.get(&id).cloned())
    }

    async fn save(&self, address: Address) -> Result<Address, AppError> {
        self.write()?.upsert_address(&address)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        if tables.addresses.remove(&id).is_none() {
            return Ok(false);
        }
        for record in tables.workers.values_mut() {
            if record.address_id == Some(id) {
                record.address_id = None;
                record.worker.version += 1;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(cpf: &str) -> Worker {
        let mut w = Worker::default();
        w.set_cpf(cpf);
        w.set_first_name("maria");
        w.set_last_name("das dores");
        w.set_email("maria@exemplo.com");
        w.set_birth_date("15/03/1980");
        w
    }

    #[tokio::test]
    async fn duplicate_cpf_is_an_integrity_violation() {
        let store = InMemoryStore::new();
        WorkerRepository::save(&store, worker("53376207704")).await.unwrap();

        let err = WorkerRepository::save(&store, worker("53376207704"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IntegrityViolation(_)));
        assert_eq!(store.count_by_cpf("53376207704").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = InMemoryStore::new();
        let saved = WorkerRepository::save(&store, worker("53376207704")).await.unwrap();

        let mut first = saved.clone();
        first.set_first_name("mariana");
        let updated = WorkerRepository::save(&store, first).await.unwrap();
        assert_eq!(updated.version, 1);

        // Segunda edição ainda com a versão 0
        let err = WorkerRepository::save(&store, saved).await.unwrap_err();
        assert!(matches!(err, AppError::OptimisticLock(_)));
        let stored = WorkerRepository::find_by_id(&store, updated.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.first_name, "Mariana");
    }

    #[tokio::test]
    async fn address_is_owned_by_the_worker() {
        let store = InMemoryStore::new();
        let mut w = worker("53376207704");
        w.address = Some(Address {
            street: "Rua das Flores".into(),
            ..Default::default()
        });
        let saved = WorkerRepository::save(&store, w).await.unwrap();
        let address_id = saved.address.as_ref().and_then(|a| a.id).unwrap();

        assert!(WorkerRepository::delete(&store, saved.id.unwrap()).await.unwrap());
        assert!(AddressRepository::find_by_id(&store, address_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn deleting_a_role_detaches_it_from_workers() {
        let store = InMemoryStore::new();
        let role = RoleRepository::save(&store, Role::new("secretaria")).await.unwrap();
        let role_id = role.id.unwrap();

        let mut w = worker("53376207704");
        w.add_role(role_id);
        let saved = WorkerRepository::save(&store, w).await.unwrap();
        assert_eq!(store.find_by_role(role_id).await.unwrap().len(), 1);

        assert!(RoleRepository::delete(&store, role_id).await.unwrap());
        let reloaded = WorkerRepository::find_by_id(&store, saved.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.role_ids.is_empty());
    }

    #[tokio::test]
    async fn empty_cnpj_does_not_collide() {
        let store = InMemoryStore::new();
        let group = |name: &str| Institution {
            name: name.into(),
            ..Default::default()
        };
        InstitutionRepository::save(&store, group("Grupo de Estudos A")).await.unwrap();
        InstitutionRepository::save(&store, group("Grupo de Estudos B")).await.unwrap();
        assert_eq!(store.count_by_cnpj("").await.unwrap(), 2);
    }
}
