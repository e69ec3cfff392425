//! Drivers, motorcycles, shifts, incidents and incident photos

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

/// A delivery driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub license_number: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// `available`, `on_shift` or `unavailable`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Driver {
    const PATH: &'static str = "drivers";
    const NAME: &'static str = "driver";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Driver {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("name", &self.name)
            .required("license_number", &self.license_number)
            .required("phone", &self.phone)
            .email("email", self.email.as_deref().unwrap_or_default())
            .finish()
    }
}

impl TableRow for Driver {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "name" => (&self.name).into(),
            "license_number" => (&self.license_number).into(),
            "phone" => (&self.phone).into(),
            "email" => self.email.clone().into(),
            "status" => self.status.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// A delivery motorcycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Motorcycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub license_plate: String,
    pub brand: String,
    pub year: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Motorcycle {
    const PATH: &'static str = "motorcycles";
    const NAME: &'static str = "motorcycle";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Motorcycle {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("license_plate", &self.license_plate)
            .required("brand", &self.brand)
            .min("year", self.year, 1900)
            .finish()
    }
}

impl TableRow for Motorcycle {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "license_plate" => (&self.license_plate).into(),
            "brand" => (&self.brand).into(),
            "year" => self.year.into(),
            "status" => self.status.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// A driver's shift on a motorcycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub driver_id: i64,
    pub motorcycle_id: i64,
    #[serde(default, with = "timestamp")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Shift {
    const PATH: &'static str = "shifts";
    const NAME: &'static str = "shift";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Shift {
    fn validate(&self) -> Result<(), ValidationError> {
        let ends_after_start = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end >= start,
            _ => true,
        };
        Validator::new()
            .min("driver_id", self.driver_id, 1)
            .min("motorcycle_id", self.motorcycle_id, 1)
            .present("start_time", self.start_time)
            .check("end_time", ends_after_start, "must not be before start_time")
            .finish()
    }
}

impl TableRow for Shift {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "driver_id" => self.driver_id.into(),
            "motorcycle_id" => self.motorcycle_id.into(),
            "start_time" => self.start_time.into(),
            "end_time" => self.end_time.into(),
            "status" => self.status.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// An incident reported for a motorcycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub motorcycle_id: i64,
    pub description: String,
    pub issue_type: String,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub date_reported: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Issue {
    const PATH: &'static str = "issues";
    const NAME: &'static str = "issue";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Issue {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .min("motorcycle_id", self.motorcycle_id, 1)
            .required("description", &self.description)
            .required("issue_type", &self.issue_type)
            .finish()
    }
}

impl TableRow for Issue {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "motorcycle_id" => self.motorcycle_id.into(),
            "description" => (&self.description).into(),
            "issue_type" => (&self.issue_type).into(),
            "date_reported" => self.date_reported.into(),
            "status" => self.status.clone().into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

/// A photo attached to an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub issue_id: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Resource for Photo {
    const PATH: &'static str = "photos";
    const NAME: &'static str = "photo";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Validate for Photo {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .min("issue_id", self.issue_id, 1)
            .required("image_url", &self.image_url)
            .finish()
    }
}

impl TableRow for Photo {
    fn value(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "issue_id" => self.issue_id.into(),
            "image_url" => (&self.image_url).into(),
            "caption" => self.caption.clone().into(),
            "taken_at" => self.taken_at.into(),
            "created_at" => self.created_at.into(),
            _ => extra_value(&self.extra, field),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_shift_end_before_start_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let shift = Shift {
            driver_id: 1,
            motorcycle_id: 2,
            start_time: Some(start),
            end_time: Some(start - chrono::Duration::hours(1)),
            ..Default::default()
        };
        assert!(shift.validate().unwrap_err().has_field("end_time"));
    }

    #[test]
    fn test_shift_requires_start() {
        let shift = Shift {
            driver_id: 1,
            motorcycle_id: 2,
            ..Default::default()
        };
        assert!(shift.validate().unwrap_err().has_field("start_time"));
    }

    #[test]
    fn test_photo_caption_nullable() {
        let photo: Photo = serde_json::from_value(serde_json::json!({
            "id": 5,
            "issue_id": 2,
            "image_url": "/uploads/a.jpg",
            "caption": null
        }))
        .unwrap();
        assert_eq!(photo.value("caption"), Value::Null);
        assert_eq!(photo.value("image_url"), Value::from("/uploads/a.jpg"));
    }
}
