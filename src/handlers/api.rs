pub mod institutions;
pub mod roles;
pub mod workers;
