use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::auth::AuthContext;

use super::catalog::SelectionCatalog;
use super::set::StagedRowSet;
use super::submit::{submit, BatchWriter, ParentContext};
use super::{CatalogLoadError, SubmitError};

/// Identifies one catalog request. Only the most recent ticket may update
/// the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLoad {
    /// The catalog now holds this many fetched candidates.
    Applied(usize),
    /// A newer request was started; this response was dropped.
    Stale,
}

/// One open editing form: the parent record, its staged rows and the
/// catalog they are picked from.
pub struct EditingSession<C: SelectionCatalog> {
    parent: ParentContext,
    rows: StagedRowSet<C>,
    latest_ticket: u64,
    upstream: Option<String>,
}

impl<C: SelectionCatalog> EditingSession<C> {
    pub fn open(parent: ParentContext, catalog: C) -> Self {
        debug!(parent = ?parent, "Editing session opened");
        Self {
            parent,
            rows: StagedRowSet::new(catalog),
            latest_ticket: 0,
            upstream: None,
        }
    }

    pub fn parent(&self) -> &ParentContext {
        &self.parent
    }

    pub fn rows(&self) -> &StagedRowSet<C> {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut StagedRowSet<C> {
        &mut self.rows
    }

    /// Upstream selection the catalog was last requested for
    pub fn upstream(&self) -> Option<&str> {
        self.upstream.as_deref()
    }

    /// Record that the upstream selector changed and a fetch is starting.
    /// For an enrollment the upstream is the class, so the batch is posted
    /// against the newly selected class.
    pub fn begin_catalog_load(&mut self, upstream_id: &str) -> LoadTicket {
        self.latest_ticket += 1;
        self.upstream = Some(upstream_id.to_string());
        if let ParentContext::Enrollment { class_id, .. } = &mut self.parent {
            *class_id = Some(upstream_id.to_string());
        }
        LoadTicket(self.latest_ticket)
    }

    /// Apply a finished fetch. Responses for superseded tickets are dropped,
    /// and a failed fetch leaves the catalog as it was.
    pub fn finish_catalog_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<C::Item>, ApiError>,
    ) -> Result<CatalogLoad, CatalogLoadError> {
        if ticket.0 != self.latest_ticket {
            debug!(ticket = ticket.0, latest = self.latest_ticket, "Dropping stale catalog response");
            return Ok(CatalogLoad::Stale);
        }
        let upstream = self.upstream.clone().unwrap_or_default();
        match result {
            Ok(items) => {
                let count = items.len();
                self.rows.reload_catalog(items);
                debug!(upstream = %upstream, count, "Catalog loaded");
                Ok(CatalogLoad::Applied(count))
            }
            Err(source) => {
                warn!(upstream = %upstream, error = %source, "Catalog load failed");
                Err(CatalogLoadError { upstream, source })
            }
        }
    }

    /// Submit the staged rows. On success the rows are cleared and `refresh`
    /// runs once so the caller can reload its list. On failure nothing
    /// changes and the session stays open.
    pub async fn save<W, F>(
        &mut self,
        writer: &W,
        auth: &AuthContext,
        refresh: F,
    ) -> Result<Value, SubmitError>
    where
        W: BatchWriter,
        F: FnOnce(),
    {
        if self.rows.is_editing() {
            return Err(SubmitError::EditInProgress);
        }
        let record = submit(writer, auth, &self.parent, self.rows.rows()).await?;
        info!(rows = self.rows.len(), "Staged rows saved");
        self.rows.clear();
        refresh();
        Ok(record)
    }

    /// Discard staged rows and end the session.
    pub fn close(mut self) {
        self.rows.clear();
        debug!(parent = ?self.parent, "Editing session closed");
    }
}
