//! Async CRUD operations against the remote collection.
//!
//! # Design
//! `ResourceClient` pairs the pure `BusinessUnitApi` with a `Transport`. It
//! takes `&self` everywhere and holds no mutable state, so operations on
//! different identifiers can run concurrently. There are no internal retries;
//! retry policy belongs to the caller.

use tracing::debug;

use crate::client::BusinessUnitApi;
use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};
use crate::http::Transport;
use crate::transport::ReqwestTransport;
use crate::types::{BusinessUnit, UnitId};

#[derive(Debug, Clone)]
pub struct ResourceClient<T> {
    api: BusinessUnitApi,
    transport: T,
}

impl ResourceClient<ReqwestTransport> {
    /// Client over HTTP with the configured endpoint, token and timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            BusinessUnitApi::from_config(config),
            ReqwestTransport::from_config(config)?,
        ))
    }
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(api: BusinessUnitApi, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &BusinessUnitApi {
        &self.api
    }

    /// Fetch the full current collection.
    pub async fn list(&self) -> Result<Vec<BusinessUnit>, TransportError> {
        let response = self.transport.execute(self.api.build_list()).await?;
        let units = self.api.parse_list(response)?;
        debug!(endpoint = self.api.endpoint(), count = units.len(), "listed business units");
        Ok(units)
    }

    pub async fn create(&self, unit: &BusinessUnit) -> Result<BusinessUnit, TransportError> {
        let request = self.api.build_create(unit)?;
        let response = self.transport.execute(request).await?;
        let created = self.api.parse_create(response, unit)?;
        debug!(id = unit.id, "created business unit");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: UnitId,
        unit: &BusinessUnit,
    ) -> Result<BusinessUnit, TransportError> {
        let request = self.api.build_update(id, unit)?;
        let response = self.transport.execute(request).await?;
        let updated = self.api.parse_update(id, response, unit)?;
        debug!(id, "updated business unit");
        Ok(updated)
    }

    pub async fn delete(&self, id: UnitId) -> Result<bool, TransportError> {
        let response = self.transport.execute(self.api.build_delete(id)).await?;
        let deleted = self.api.parse_delete(id, response)?;
        debug!(id, "deleted business unit");
        Ok(deleted)
    }
}
