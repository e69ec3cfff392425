//! Orders, customers and delivery addresses

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

/// A customer placing orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Customer {
    const PATH: &'static str = "customers";
    const NAME: &'static str = "customer";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Customer {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("name", &self.name)
            .required("email", &self.email)
            .email("email", &self.email)
            .required("phone", &self.phone)
            .finish()
    }
}

impl TableRow for Customer {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "name" => (&self.name).into(),
            "email" => (&self.email).into(),
            "phone" => (&self.phone).into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// An order of a menu item by a customer.
///
/// Related `customer`, `menu`, `address` and `motorcycle` objects embedded by
/// the backend are kept in `extra` and readable through dotted field names
/// such as `customer.name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub customer_id: i64,
    pub menu_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<i64>,
    #[serde(default)]
    pub motorcycle_id: Option<i64>,
    pub quantity: i64,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Order {
    /// Name of the embedded customer, when present.
    pub fn customer_name(&self) -> Option<&str> {
        self.extra.get("customer")?.get("name")?.as_str()
    }

    /// Street of the embedded delivery address, when present.
    pub fn street(&self) -> Option<&str> {
        self.extra.get("address")?.get("street")?.as_str()
    }

    /// Short description of what was ordered (`2 x Pizza`).
    pub fn items(&self) -> String {
        let product = self
            .extra
            .get("menu")
            .and_then(|m| m.get("product"))
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str());
        match product {
            Some(name) => format!("{} x {}", self.quantity, name),
            None => format!("{} x menu #{}", self.quantity, self.menu_id),
        }
    }

    /// Returns `true` if a motorcycle has been assigned.
    pub fn is_assigned(&self) -> bool {
        self.motorcycle_id.is_some()
    }
}

impl Resource for Order {
    const PATH: &'static str = "orders";
    const NAME: &'static str = "order";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Order {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .min("customer_id", self.customer_id, 1)
            .min("menu_id", self.menu_id, 1)
            .min("quantity", self.quantity, 1)
            .finish()
    }
}

impl TableRow for Order {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "customer_id" => self.customer_id.into(),
            "menu_id" => self.menu_id.into(),
            "address_id" => self.address_id.into(),
            "motorcycle_id" => self.motorcycle_id.into(),
            "quantity" => self.quantity.into(),
            "total_price" => self.total_price.into(),
            "status" => self.status.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// Delivery address attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub order_id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Address {
    const PATH: &'static str = "addresses";
    const NAME: &'static str = "address";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Address {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .min("order_id", self.order_id, 1)
            .required("street", &self.street)
            .required("city", &self.city)
            .required("state", &self.state)
            .required("postal_code", &self.postal_code)
            .finish()
    }
}

impl TableRow for Address {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "order_id" => self.order_id.into(),
            "street" => (&self.street).into(),
            "city" => (&self.city).into(),
            "state" => (&self.state).into(),
            "postal_code" => (&self.postal_code).into(),
            "additional_info" => self.additional_info.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}
