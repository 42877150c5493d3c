pub mod address_service;
pub mod institution_service;
pub mod password_service;
pub mod role_service;
pub mod worker_service;

pub use address_service::AddressService;
pub use institution_service::InstitutionService;
pub use password_service::PasswordService;
pub use role_service::RoleService;
pub use worker_service::WorkerService;
