pub mod audit;
pub mod projects;
