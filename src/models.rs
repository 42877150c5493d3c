pub mod address;
pub mod dto;
pub mod institution;
pub mod role;
pub mod worker;

pub use address::Address;
pub use institution::{Institution, InstitutionSummary};
pub use role::Role;
pub use worker::{Gender, Worker};
