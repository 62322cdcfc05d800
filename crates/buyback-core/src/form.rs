//! # Sell Form Module
//!
//! Validation for the storefront's multi-step sell form.
//!
//! The form guarantees the categorical fields are known literals and the
//! required text fields are non-empty. It deliberately does not check that
//! the year or the storage capacity parse: the engine's parse-or-default
//! rules handle those.

use crate::device::{Condition, DeviceDescription, DeviceType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the device reaches the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Pickup,
    Parcel,
}

impl DeliveryMethod {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pickup" => Some(Self::Pickup),
            "parcel" => Some(Self::Parcel),
            _ => None,
        }
    }
}

/// The raw sell form, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellForm {
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub year_of_purchase: String,
    pub condition: String,
    pub storage_capacity: String,
    pub defects: Vec<String>,
    pub serial_number: Option<String>,
    pub delivery_method: String,
}

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name, as on the wire.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every problem found in one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("sell form has {} invalid field(s): {}", .errors.len(), summary(.errors))]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormErrors {
    /// Check whether a given field was rejected.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedSellForm {
    pub device: DeviceDescription,
    pub model: String,
    pub serial_number: Option<String>,
    pub delivery_method: DeliveryMethod,
}

impl SellForm {
    /// Validate every field, collecting all errors.
    pub fn validate(&self) -> Result<ValidatedSellForm, FormErrors> {
        let mut errors = Vec::new();
        let mut reject = |field: &'static str, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            });
        };

        let device_type = DeviceType::parse(&self.device_type);
        if !device_type.is_recognized() {
            reject(
                "deviceType",
                "Device type must be one of smartphone, laptop, tablet",
            );
        }
        if self.brand.is_empty() {
            reject("brand", "Brand is required");
        }
        if self.model.is_empty() {
            reject("model", "Model is required");
        }
        let condition = Condition::parse(&self.condition);
        if !condition.is_recognized() {
            reject("condition", "Condition must be one of new, used, damaged");
        }
        if self.storage_capacity.is_empty() {
            reject("storageCapacity", "Storage capacity is required");
        }
        if self.serial_number.as_deref() == Some("") {
            reject("serialNumber", "Serial number or IMEI is required");
        }
        let delivery_method = DeliveryMethod::parse(&self.delivery_method);
        if delivery_method.is_none() {
            reject(
                "deliveryMethod",
                "Delivery method must be one of pickup, parcel",
            );
        }

        match delivery_method {
            Some(delivery_method) if errors.is_empty() => Ok(ValidatedSellForm {
                device: DeviceDescription {
                    device_type,
                    brand: self.brand.clone(),
                    storage_capacity: self.storage_capacity.clone(),
                    year_of_purchase: self.year_of_purchase.clone(),
                    condition,
                    defects: self.defects.clone(),
                },
                model: self.model.clone(),
                serial_number: self.serial_number.clone(),
                delivery_method,
            }),
            _ => Err(FormErrors { errors }),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
