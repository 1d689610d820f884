//! Request schemas and boundary validation.
//!
//! Each `*Input` type is the raw shape accepted on the wire; `validate()`
//! turns it into the matching `*Fields` type or a list of field-level errors.
//! Store code only ever sees `*Fields`, so nothing unvalidated reaches it.

use core::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Amount, CustomerId, DeliveryTime, Email, parse_iso_date};

/// Maximum customer / item name length.
pub const MAX_NAME_LENGTH: usize = 200;
/// Maximum phone length.
pub const MAX_PHONE_LENGTH: usize = 50;
/// Maximum customer address length.
pub const MAX_ADDRESS_LENGTH: usize = 500;
/// Maximum unit-of-measure length.
pub const MAX_UNIT_LENGTH: usize = 50;

/// Default page size for listings.
pub const DEFAULT_LIMIT: u32 = 100;
/// Largest page a caller may request.
pub const MAX_LIMIT: u32 = 1000;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All validation failures for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Create an empty error list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an error list with a single entry.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_owned(),
            message: message.into(),
        });
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(value)` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

// =============================================================================
// Field helpers
// =============================================================================

/// Trim a required text field, recording an error when it is blank or too long.
fn required(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    missing: &str,
    max: Option<usize>,
) -> String {
    let value = value.as_deref().map(str::trim).unwrap_or_default().to_owned();
    if value.is_empty() {
        errors.push(field, missing);
    } else if let Some(max) = max
        && value.chars().count() > max
    {
        errors.push(field, format!("{} must not exceed {max} characters", label(field)));
    }
    value
}

/// Trim an optional text field; blank becomes `None`.
fn optional(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    let value = value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)?;
    if value.chars().count() > max {
        errors.push(field, format!("{} must not exceed {max} characters", label(field)));
    }
    Some(value)
}

fn label(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn parse_amount(errors: &mut ValidationErrors, value: Option<Value>) -> Amount {
    const MESSAGE: &str = "Amount must be a positive number";
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().and_then(|f| Amount::from_f64(f).ok()),
        Some(Value::String(s)) => s.parse::<Amount>().ok(),
        _ => None,
    };
    match parsed.map(Amount::to_cents) {
        Some(amount) if amount > Amount::MAX => {
            errors.push("amount", format!("Amount must not exceed {}", Amount::MAX));
            Amount::ZERO
        }
        Some(amount) => amount,
        None => {
            errors.push("amount", MESSAGE);
            Amount::ZERO
        }
    }
}

/// Check that a signature is base64 raster data, optionally wrapped in a
/// `data:image/...;base64,` URL.
fn valid_signature(value: &str) -> bool {
    let payload = match value.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((meta, data)) if meta.starts_with("image/") && meta.ends_with(";base64") => data,
            _ => return false,
        },
        None => value,
    };
    STANDARD.decode(payload.trim()).is_ok()
}

// =============================================================================
// Customer
// =============================================================================

/// Customer request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Validated customer fields (full replacement set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerInput {
    /// Validate the body.
    ///
    /// # Errors
    ///
    /// Returns every field-level failure found.
    pub fn validate(self) -> Result<CustomerFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(
            &mut errors,
            "name",
            self.name,
            "Customer name is required",
            Some(MAX_NAME_LENGTH),
        );
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| match Email::parse(v) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push("email", "Valid email is required");
                    None
                }
            });
        let phone = optional(&mut errors, "phone", self.phone, MAX_PHONE_LENGTH);
        let address = optional(&mut errors, "address", self.address, MAX_ADDRESS_LENGTH);

        errors.into_result(CustomerFields {
            name,
            email,
            phone,
            address,
        })
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Submission request body.
///
/// `amount` is taken as raw JSON so a bad value yields a field error rather
/// than rejecting the whole body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub customer_name: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub address: Option<String>,
    #[serde(alias = "orderDetails")]
    pub order: Option<String>,
    pub amount: Option<Value>,
    pub rego: Option<String>,
    pub signature_image: Option<String>,
}

/// Validated submission fields (full replacement set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFields {
    pub customer_name: String,
    pub customer_id: Option<CustomerId>,
    pub date: NaiveDate,
    pub time: DeliveryTime,
    pub address: String,
    pub order_details: String,
    pub amount: Amount,
    pub rego: String,
    pub signature_image: Option<String>,
}

impl SubmissionInput {
    /// Validate the body.
    ///
    /// # Errors
    ///
    /// Returns every field-level failure found.
    pub fn validate(self) -> Result<SubmissionFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let customer_name = required(
            &mut errors,
            "customerName",
            self.customer_name,
            "Customer name is required",
            Some(MAX_NAME_LENGTH),
        );

        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => {
                errors.push("date", "Date is required");
                None
            }
            Some(raw) => parse_iso_date(raw).map_or_else(
                |_| {
                    errors.push("date", "Date must be in YYYY-MM-DD format");
                    None
                },
                Some,
            ),
        };

        let time = DeliveryTime::new(self.time.as_deref().unwrap_or_default());
        if time.is_none() {
            errors.push("time", "Time is required");
        }

        let address = required(&mut errors, "address", self.address, "Address is required", None);
        let order_details = required(
            &mut errors,
            "order",
            self.order,
            "Order details are required",
            None,
        );
        let amount = parse_amount(&mut errors, self.amount);
        let rego = required(&mut errors, "rego", self.rego, "Rego is required", None);

        let signature_image = self
            .signature_image
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        if let Some(signature) = &signature_image
            && !valid_signature(signature)
        {
            errors.push("signatureImage", "Signature must be a base64-encoded image");
        }

        match (date, time) {
            (Some(date), Some(time)) if errors.is_empty() => Ok(SubmissionFields {
                customer_name,
                customer_id: self.customer_id,
                date,
                time,
                address,
                order_details,
                amount,
                rego,
                signature_image,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// Catalog item request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub name: Option<String>,
    pub unit: Option<String>,
}

/// Validated item fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub unit: String,
}

impl ItemInput {
    /// Validate the body.
    ///
    /// # Errors
    ///
    /// Returns every field-level failure found.
    pub fn validate(self) -> Result<ItemFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(
            &mut errors,
            "name",
            self.name,
            "Item name is required",
            Some(MAX_NAME_LENGTH),
        );
        let unit = required(
            &mut errors,
            "unit",
            self.unit,
            "Unit is required",
            Some(MAX_UNIT_LENGTH),
        );
        errors.into_result(ItemFields { name, unit })
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Raw `?limit&offset` query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// A page large enough to hold every record of an owner.
    pub const ALL: Self = Self {
        limit: u32::MAX,
        offset: 0,
    };

    /// Slice an already-sorted collection to this window.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl PageQuery {
    /// Validate the window.
    ///
    /// # Errors
    ///
    /// Returns field errors for a limit outside `1..=1000` or a negative offset.
    pub fn validate(self) -> Result<Page, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let limit = match self.limit {
            None => DEFAULT_LIMIT,
            Some(l) => u32::try_from(l)
                .ok()
                .filter(|l| (1..=MAX_LIMIT).contains(l))
                .unwrap_or_else(|| {
                    errors.push("limit", format!("Limit must be between 1 and {MAX_LIMIT}"));
                    DEFAULT_LIMIT
                }),
        };
        let offset = match self.offset {
            None => 0,
            Some(o) => u32::try_from(o).unwrap_or_else(|_| {
                errors.push("offset", "Offset must be a non-negative integer");
                0
            }),
        };
        errors.into_result(Page { limit, offset })
    }

    /// Validate the window, covering every record when no `limit` is given.
    ///
    /// # Errors
    ///
    /// Same as [`PageQuery::validate`].
    pub fn validate_or_all(self) -> Result<Page, ValidationErrors> {
        let unbounded = self.limit.is_none();
        let page = self.validate()?;
        if unbounded {
            Ok(Page {
                limit: Page::ALL.limit,
                ..page
            })
        } else {
            Ok(page)
        }
    }
}
