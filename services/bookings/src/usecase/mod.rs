pub mod cancel;
pub mod customer;
pub mod feedback;
pub mod ingest;
pub mod lifecycle;
pub mod matcher;
pub mod message;
pub mod notify;
pub mod restore;
