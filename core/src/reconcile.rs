//! One-shot reconciliation of a local catalog against the remote collection.
//!
//! # Design
//! A pass fetches the remote snapshot exactly once, then decides per record:
//! a remote record with the same `id` means update, otherwise create. A
//! failing snapshot aborts the pass before any write. A failing write is
//! captured in that record's `SyncOutcome` and the pass moves on, so the
//! report always has one entry per input record, in input order.
//!
//! Remote `id` uniqueness is assumed, not enforced: with duplicates the first
//! match decides, and a warning is logged.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::error::{SyncError, TransportError};
use crate::http::Transport;
use crate::resource::ResourceClient;
use crate::types::{BusinessUnit, UnitId};
use crate::validate::validate_catalog;

/// The write a record was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attempt {
    Create,
    Update,
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// Server representation after the create.
    Created(BusinessUnit),
    /// Server representation after the update.
    Updated(BusinessUnit),
    Failed {
        attempted: Attempt,
        error: TransportError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub identifier: UnitId,
    pub action: SyncAction,
}

impl SyncOutcome {
    pub fn success(&self) -> bool {
        !matches!(self.action, SyncAction::Failed { .. })
    }

    pub fn action_name(&self) -> &'static str {
        match self.action {
            SyncAction::Created(_) => "created",
            SyncAction::Updated(_) => "updated",
            SyncAction::Failed { .. } => "failed",
        }
    }

    pub fn payload(&self) -> Option<&BusinessUnit> {
        match &self.action {
            SyncAction::Created(unit) | SyncAction::Updated(unit) => Some(unit),
            SyncAction::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match &self.action {
            SyncAction::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct OutcomeWire<'a> {
    action: &'static str,
    identifier: UnitId,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a BusinessUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempted: Option<Attempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a TransportError>,
}

impl Serialize for SyncOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let attempted = match &self.action {
            SyncAction::Failed { attempted, .. } => Some(*attempted),
            _ => None,
        };
        OutcomeWire {
            action: self.action_name(),
            identifier: self.identifier,
            success: self.success(),
            payload: self.payload(),
            attempted,
            error: self.error(),
        }
        .serialize(serializer)
    }
}

/// Ordered outcomes of one pass plus per-action counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl SyncReport {
    pub fn from_outcomes(outcomes: Vec<SyncOutcome>) -> Self {
        let count = |name: &str| outcomes.iter().filter(|o| o.action_name() == name).count();
        let (created, updated, failed) = (count("created"), count("updated"), count("failed"));
        Self {
            outcomes,
            created,
            updated,
            failed,
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| !o.success())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Route a record by looking up its `id` in the snapshot (first match).
pub fn decide(unit: &BusinessUnit, snapshot: &[BusinessUnit]) -> Attempt {
    match snapshot.iter().find(|remote| remote.id == unit.id) {
        Some(_) => Attempt::Update,
        None => Attempt::Create,
    }
}

fn warn_on_duplicate_ids(snapshot: &[BusinessUnit]) {
    let mut seen = HashSet::new();
    for unit in snapshot {
        if !seen.insert(unit.id) {
            warn!(id = unit.id, "remote snapshot holds duplicate id; first match will be updated");
        }
    }
}

pub struct Reconciler<T> {
    client: ResourceClient<T>,
    config: SyncConfig,
}

impl<T: Transport> Reconciler<T> {
    pub fn new(client: ResourceClient<T>, config: SyncConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &ResourceClient<T> {
        &self.client
    }

    /// Run one reconciliation pass over `units`.
    ///
    /// Fails only when the snapshot cannot be fetched. Per-record transport
    /// failures are reported in the returned `SyncReport`.
    pub async fn sync_all(&self, units: &[BusinessUnit]) -> Result<SyncReport, SyncError> {
        let snapshot = self.client.list().await.map_err(|e| {
            warn!(endpoint = e.endpoint(), status = ?e.status(), "snapshot fetch failed: {e}");
            SyncError::Snapshot(e)
        })?;
        warn_on_duplicate_ids(&snapshot);
        info!(
            records = units.len(),
            remote = snapshot.len(),
            concurrency = self.config.concurrency,
            "starting reconciliation pass"
        );

        // `buffered` yields in input order regardless of completion order.
        let outcomes: Vec<SyncOutcome> = stream::iter(units)
            .map(|unit| self.sync_one(unit, &snapshot))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let report = SyncReport::from_outcomes(outcomes);
        info!(
            created = report.created,
            updated = report.updated,
            failed = report.failed,
            "reconciliation pass finished"
        );
        Ok(report)
    }

    /// Validate every record first; nothing is sent if any record is invalid.
    pub async fn sync_validated(&self, units: &[BusinessUnit]) -> Result<SyncReport, SyncError> {
        validate_catalog(units)?;
        self.sync_all(units).await
    }

    async fn sync_one(&self, unit: &BusinessUnit, snapshot: &[BusinessUnit]) -> SyncOutcome {
        let attempted = decide(unit, snapshot);
        let result = match attempted {
            Attempt::Update => self.client.update(unit.id, unit).await.map(SyncAction::Updated),
            Attempt::Create => self.client.create(unit).await.map(SyncAction::Created),
        };
        let action = result.unwrap_or_else(|error| {
            warn!(
                id = unit.id,
                ?attempted,
                endpoint = error.endpoint(),
                status = ?error.status(),
                "record sync failed: {error}"
            );
            SyncAction::Failed { attempted, error }
        });
        SyncOutcome {
            identifier: unit.id,
            action,
        }
    }
}
