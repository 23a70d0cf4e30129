pub mod credential_store;
pub mod result_store;
