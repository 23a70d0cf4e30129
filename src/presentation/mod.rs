pub mod encryption;
pub mod serialization;
