//! Reconciliation of a local gym catalog against a remote business-unit API.
//!
//! # Overview
//! A `Reconciler` fetches the remote collection once, routes every local
//! record to create or update by `id`, and returns one `SyncOutcome` per
//! record in input order. One record's failure never stops the others; only a
//! failed snapshot fetch aborts the pass.
//!
//! # Design
//! - `BusinessUnitApi` builds `HttpRequest`s and parses `HttpResponse`s
//!   without touching the network (host-does-IO pattern).
//! - `Transport` is the async fetch seam; `ReqwestTransport` is the HTTP
//!   implementation, tests substitute an in-memory one.
//! - `ResourceClient` joins the two into `list`/`create`/`update`/`delete`
//!   plus the `find_by_id`/`search_by_text` helpers.
//! - `validate` is pure and runs before anything is sent.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod reconcile;
pub mod resource;
pub mod transport;
pub mod types;
pub mod validate;

#[cfg(test)]
mod testing;

pub use client::BusinessUnitApi;
pub use config::{ClientConfig, SyncConfig};
pub use error::{ConfigError, SyncError, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use query::Lookup;
pub use reconcile::{Attempt, Reconciler, SyncAction, SyncOutcome, SyncReport};
pub use resource::ResourceClient;
pub use transport::ReqwestTransport;
pub use types::{Address, BusinessUnit, Reference, UnitId};
pub use validate::{validate, validate_catalog, ValidationReport};
