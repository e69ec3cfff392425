//! Typed models

mod catalog;
mod fleet;
mod orders;
mod record;
pub mod timestamp;
mod value;

pub use catalog::*;
pub use fleet::*;
pub use orders::*;
pub use record::*;
pub use value::*;

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Validate;

/// A backend-owned entity exposed through REST CRUD endpoints.
pub trait Resource: Serialize + DeserializeOwned + Validate + Clone + Debug + Send + Sync {
    /// Collection path relative to the API root, without slashes.
    const PATH: &'static str;
    /// Singular display name used in messages.
    const NAME: &'static str;

    /// The backend id, absent before creation.
    fn id(&self) -> Option<i64>;
}

/// Unknown backend fields and nested relations, kept verbatim.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Looks up `field` in `extra`, following dots into nested objects
/// (`"customer.name"`).
pub(crate) fn extra_value(extra: &Extra, field: &str) -> Value {
    let mut parts = field.split('.');
    let Some(first) = parts.next() else {
        return Value::Null;
    };
    let mut current = match extra.get(first) {
        Some(v) => v,
        None => return Value::Null,
    };
    for part in parts {
        current = match current.get(part) {
            Some(v) => v,
            None => return Value::Null,
        };
    }
    Value::from(current)
}
