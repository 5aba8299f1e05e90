//! Domain DTOs for the business-unit (gym) collection.
//!
//! # Design
//! Mandatory fields deserialize to "empty" defaults (`0`, `""`, `None`) rather
//! than failing, so an incomplete candidate can still reach the validator and
//! get a precise list of what is missing. JSON `null` counts as absent too. The
//! mock-server crate defines its own
//! copy of the schema; integration tests catch drift between the two.

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a business unit. Supplied by the caller, never generated by
/// the server.
pub type UnitId = u64;

/// Deserialize `null` as the type's empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A `{id, name}` reference to another remote entity (company, region).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl Reference {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Postal address of a business unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// One gym record: the unit of synchronization.
///
/// `release_suspension_product` and `settings` are opaque to this crate and
/// forwarded verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: UnitId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub company: Option<Reference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name_for_invoice: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub region: Option<Reference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_suspension_product: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_register_unit_for_internet: bool,
}

impl BusinessUnit {
    /// Fields searched by `search_by_text`, in match order.
    pub(crate) fn searchable_text(&self) -> [&str; 3] {
        let (city, street) = match &self.address {
            Some(address) => (address.city.as_str(), address.street.as_str()),
            None => ("", ""),
        };
        [self.name.as_str(), city, street]
    }
}
