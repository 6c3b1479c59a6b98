pub mod event;
pub mod repository;
pub mod types;
