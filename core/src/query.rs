//! Read-only lookups layered on `ResourceClient::list`.
//!
//! Each call fetches a fresh snapshot; there is no cache. Absence is a normal
//! result, transport failures propagate unchanged.

use serde::Serialize;

use crate::error::TransportError;
use crate::http::Transport;
use crate::resource::ResourceClient;
use crate::types::{BusinessUnit, UnitId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum Lookup {
    Found(BusinessUnit),
    NotFound(UnitId),
}

impl Lookup {
    pub fn found(self) -> Option<BusinessUnit> {
        match self {
            Lookup::Found(unit) => Some(unit),
            Lookup::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Case-insensitive substring match over name, city and street.
pub fn matches_text(unit: &BusinessUnit, query: &str) -> bool {
    let needle = query.to_lowercase();
    unit.searchable_text()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

impl<T: Transport> ResourceClient<T> {
    pub async fn find_by_id(&self, id: UnitId) -> Result<Lookup, TransportError> {
        let units = self.list().await?;
        Ok(units
            .into_iter()
            .find(|unit| unit.id == id)
            .map_or(Lookup::NotFound(id), Lookup::Found))
    }

    pub async fn search_by_text(&self, query: &str) -> Result<Vec<BusinessUnit>, TransportError> {
        let units = self.list().await?;
        Ok(units
            .into_iter()
            .filter(|unit| matches_text(unit, query))
            .collect())
    }
}
