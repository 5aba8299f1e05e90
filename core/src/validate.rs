//! Pre-flight validation of business-unit records.
//!
//! Rule classes run in a fixed order and stop at the first class that fails,
//! so a report carries at most one error. No I/O.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::BusinessUnit;

static RE_COUNTRY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("static regex"));

pub const ADDRESS_ERROR: &str = "Address must include street, city, and postalCode";
pub const LOCATION_ERROR: &str =
    "Location must be a valid ISO 3166-1 alpha-2 country code (e.g. \"DK\")";

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn fail(error: String) -> Self {
        Self {
            valid: false,
            errors: vec![error],
        }
    }

    /// Attach the record's position and id to a failing report.
    pub fn into_result(self, index: usize, unit: &BusinessUnit) -> Result<(), ValidationError> {
        if self.valid {
            return Ok(());
        }
        Err(ValidationError {
            index,
            id: unit.id,
            errors: self.errors,
        })
    }
}

/// Names of absent mandatory fields, in wire naming and declaration order.
fn missing_fields(unit: &BusinessUnit) -> Vec<&'static str> {
    let checks = [
        ("id", unit.id == 0),
        ("name", unit.name.is_empty()),
        ("company", unit.company.is_none()),
        ("companyNameForInvoice", unit.company_name_for_invoice.is_empty()),
        ("address", unit.address.is_none()),
        ("location", unit.location.is_empty()),
        ("region", unit.region.is_none()),
        ("currency", unit.currency.is_empty()),
    ];
    checks
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
}

pub fn validate(unit: &BusinessUnit) -> ValidationReport {
    let missing = missing_fields(unit);
    if !missing.is_empty() {
        return ValidationReport::fail(format!("Missing required fields: {}", missing.join(", ")));
    }

    if let Some(address) = &unit.address {
        if address.street.is_empty() || address.city.is_empty() || address.postal_code.is_empty() {
            return ValidationReport::fail(ADDRESS_ERROR.to_string());
        }
    }

    if !RE_COUNTRY_CODE.is_match(&unit.location) {
        return ValidationReport::fail(LOCATION_ERROR.to_string());
    }

    ValidationReport::ok()
}

/// Validate every record, returning the first one that fails.
pub fn validate_catalog(units: &[BusinessUnit]) -> Result<(), ValidationError> {
    units
        .iter()
        .enumerate()
        .try_for_each(|(index, unit)| validate(unit).into_result(index, unit))
}
