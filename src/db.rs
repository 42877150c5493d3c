pub mod address_repo;
pub use address_repo::{AddressRepository, PgAddressRepository};
pub mod institution_repo;
pub use institution_repo::{InstitutionRepository, PgInstitutionRepository};
pub mod role_repo;
pub use role_repo::{PgRoleRepository, RoleRepository};
pub mod worker_repo;
pub use worker_repo::{PgWorkerRepository, WorkerRepository};
pub mod memory;
pub use memory::InMemoryStore;
