use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::any::type_name;

pub trait Serializable: Serialize + for<'de> Deserialize<'de> {}

impl<T> Serializable for T where T: Serialize + for<'de> Deserialize<'de> {}

pub struct Serializer;

impl Serializer {
    pub fn to_json<T: Serializable>(value: &T) -> Result<String> {
        serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize {} to JSON", type_name::<T>()))
    }

    pub fn from_json<T: Serializable>(json: &str) -> Result<T> {
        serde_json::from_str(json)
            .with_context(|| format!("Failed to deserialize {} from JSON", type_name::<T>()))
    }
}
