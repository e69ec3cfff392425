//! Restaurants, products and menus

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

use super::Extra;
use super::Resource;
use super::Value;
use super::extra_value;
use super::timestamp;
use crate::error::Validate;
use crate::error::ValidationError;
use crate::error::Validator;
use crate::table::TableRow;

/// A restaurant offering menus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Restaurant {
    const PATH: &'static str = "restaurants";
    const NAME: &'static str = "restaurant";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Restaurant {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("name", &self.name)
            .required("address", &self.address)
            .required("phone", &self.phone)
            .email("email", self.email.as_deref().unwrap_or_default())
            .finish()
    }
}

impl TableRow for Restaurant {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "name" => (&self.name).into(),
            "address" => (&self.address).into(),
            "phone" => (&self.phone).into(),
            "email" => self.email.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// A product that can be placed on menus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Product {
    const PATH: &'static str = "products";
    const NAME: &'static str = "product";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("name", &self.name)
            .non_negative("price", self.price)
            .finish()
    }
}

impl TableRow for Product {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "name" => (&self.name).into(),
            "description" => self.description.clone().into(),
            "price" => self.price.into(),
            "category" => self.category.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// A product offered by a restaurant at a given price.
///
/// The backend may embed the related `product` and `restaurant` objects,
/// which end up in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub restaurant_id: i64,
    pub product_id: i64,
    pub price: f64,
    #[serde(default = "default_availability")]
    pub availability: bool,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_availability() -> bool {
    true
}

impl Menu {
    /// Name of the embedded product, when the backend included it.
    pub fn product_name(&self) -> Option<&str> {
        self.extra.get("product")?.get("name")?.as_str()
    }
}

impl Resource for Menu {
    const PATH: &'static str = "menus";
    const NAME: &'static str = "menu";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Menu {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .min("restaurant_id", self.restaurant_id, 1)
            .min("product_id", self.product_id, 1)
            .non_negative("price", self.price)
            .finish()
    }
}

impl TableRow for Menu {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "restaurant_id" => self.restaurant_id.into(),
            "product_id" => self.product_id.into(),
            "price" => self.price.into(),
            "availability" => self.availability.into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}
