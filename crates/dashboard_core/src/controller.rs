//! Dashboard state controller: pagination/sort state, page and summary
//! fetches, and the spreadsheet import flow.

use std::sync::Arc;

use shared::{
    domain::{Record, SortSpec},
    protocol::{PageQuery, RecordPage, SummaryStats},
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    gateway::InventoryGateway,
    summary::{approximate_summary, SummaryProvenance},
    upload::{
        has_allowed_extension, FileInput, SelectedFile, UploadFailure, UploadOutcome, UploadPhase,
    },
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Notice {
    pub fn success(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Severity::Success, summary, detail)
    }

    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Severity::Error, summary, detail)
    }

    fn new(severity: Severity, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    PageLoaded {
        page_index: u32,
        total_elements: u64,
        total_pages: u32,
    },
    SummaryUpdated {
        summary: SummaryStats,
        provenance: SummaryProvenance,
    },
    Notice(Notice),
    UploadFinished(UploadOutcome),
}

/// Callbacks from a lazily loaded table, typed once at the widget boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Offset-based page change. A sort carried along with it is applied
    /// without resetting the page.
    Paginate {
        first: u32,
        rows: u32,
        sort: Option<SortSpec>,
    },
    Sort(SortSpec),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error("page {requested} is out of range ({total_pages} pages available)")]
    PageOutOfRange { requested: u32, total_pages: u32 },
    #[error("an upload is already in progress")]
    UploadInProgress,
}

/// Terminal status of one `load_page` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Applied,
    /// A newer request was issued before this one settled; its result was dropped.
    Stale,
    Failed,
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub page_size: u32,
    pub sort: SortSpec,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortSpec::default(),
        }
    }
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub page_index: u32,
    pub page_size: u32,
    pub sort: SortSpec,
    pub loading: bool,
    pub page: RecordPage,
    pub summary: SummaryStats,
    pub summary_provenance: SummaryProvenance,
    pub upload_phase: UploadPhase,
}

impl ViewState {
    pub fn records(&self) -> &[Record] {
        &self.page.content
    }

    pub fn total_elements(&self) -> u64 {
        self.page.total_elements()
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages()
    }
}

struct DashboardState {
    page_index: u32,
    page_size: u32,
    sort: SortSpec,
    page: RecordPage,
    summary: SummaryStats,
    summary_provenance: SummaryProvenance,
    upload_phase: UploadPhase,
    page_seq: u64,
    inflight_page: Option<u64>,
    summary_seq: u64,
}

impl DashboardState {
    fn loading(&self) -> bool {
        self.inflight_page.is_some() || self.upload_phase == UploadPhase::Submitting
    }

    fn snapshot(&self) -> ViewState {
        ViewState {
            page_index: self.page_index,
            page_size: self.page_size,
            sort: self.sort.clone(),
            loading: self.loading(),
            page: self.page.clone(),
            summary: self.summary,
            summary_provenance: self.summary_provenance,
            upload_phase: self.upload_phase,
        }
    }

    fn check_page_request(&self, page_index: u32, page_size: u32) -> Result<(), ControllerError> {
        if page_size == 0 {
            return Err(ControllerError::InvalidPageSize);
        }
        let total_pages = self.page.total_elements().div_ceil(u64::from(page_size));
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        if page_index > 0 && page_index >= total_pages {
            return Err(ControllerError::PageOutOfRange {
                requested: page_index,
                total_pages,
            });
        }
        Ok(())
    }

    /// Recomputes the page-local approximation unless an authoritative
    /// summary is held. Returns the new figures when anything changed.
    fn refresh_fallback_summary(&mut self) -> Option<SummaryStats> {
        if self.summary_provenance == SummaryProvenance::Authoritative {
            return None;
        }
        let summary = approximate_summary(&self.page)?;
        self.summary = summary;
        self.summary_provenance = SummaryProvenance::Approximated;
        Some(summary)
    }
}

pub struct DashboardController {
    gateway: Arc<dyn InventoryGateway>,
    inner: Mutex<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardController {
    pub fn new(gateway: Arc<dyn InventoryGateway>, options: DashboardOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(DashboardState {
                page_index: 0,
                page_size: options.page_size.max(1),
                sort: options.sort,
                page: RecordPage::empty(),
                summary: SummaryStats::default(),
                summary_provenance: SummaryProvenance::Pending,
                upload_phase: UploadPhase::Idle,
                page_seq: 0,
                inflight_page: None,
                summary_seq: 0,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn view_state(&self) -> ViewState {
        self.inner.lock().await.snapshot()
    }

    /// Issues the first page and summary requests side by side.
    pub async fn initialize(&self) {
        tokio::join!(self.load_page(), self.load_summary());
    }

    pub async fn load_page(&self) -> LoadStatus {
        let (token, query) = {
            let mut state = self.inner.lock().await;
            state.page_seq += 1;
            state.inflight_page = Some(state.page_seq);
            (
                state.page_seq,
                PageQuery::new(state.page_index, state.page_size, &state.sort),
            )
        };
        debug!(
            token,
            page = query.page,
            size = query.size,
            sort = %query.sort,
            dir = %query.dir,
            "requesting page"
        );

        let result = self.gateway.fetch_page(&query).await;

        let mut state = self.inner.lock().await;
        if state.inflight_page != Some(token) {
            debug!(token, latest = state.page_seq, "discarding superseded page response");
            return LoadStatus::Stale;
        }
        state.inflight_page = None;

        match result {
            Ok(page) => {
                info!(
                    page = query.page,
                    records = page.content.len(),
                    total_elements = page.total_elements(),
                    total_pages = page.total_pages(),
                    "page loaded"
                );
                state.page = page;
                let fallback = state.refresh_fallback_summary();
                let _ = self.events.send(DashboardEvent::PageLoaded {
                    page_index: state.page_index,
                    total_elements: state.page.total_elements(),
                    total_pages: state.page.total_pages(),
                });
                if let Some(summary) = fallback {
                    let _ = self.events.send(DashboardEvent::SummaryUpdated {
                        summary,
                        provenance: SummaryProvenance::Approximated,
                    });
                }
                LoadStatus::Applied
            }
            Err(err) => {
                error!(%err, page = query.page, "failed to load products");
                let _ = self.events.send(DashboardEvent::Notice(Notice::error(
                    "Error",
                    "Failed to load products from backend.",
                )));
                LoadStatus::Failed
            }
        }
    }

    pub async fn load_summary(&self) -> SummaryProvenance {
        let token = {
            let mut state = self.inner.lock().await;
            state.summary_seq += 1;
            state.summary_seq
        };

        let result = self.gateway.fetch_summary().await;

        let mut state = self.inner.lock().await;
        if state.summary_seq != token {
            debug!(token, latest = state.summary_seq, "discarding superseded summary response");
            return state.summary_provenance;
        }

        let updated = match result {
            Ok(summary) => {
                state.summary = summary;
                state.summary_provenance = SummaryProvenance::Authoritative;
                Some(summary)
            }
            Err(err) => {
                warn!(%err, "summary endpoint failed, using values calculated from loaded products");
                match approximate_summary(&state.page) {
                    Some(summary) => {
                        state.summary = summary;
                        state.summary_provenance = SummaryProvenance::Approximated;
                        Some(summary)
                    }
                    None => None,
                }
            }
        };

        if let Some(summary) = updated {
            let _ = self.events.send(DashboardEvent::SummaryUpdated {
                summary,
                provenance: state.summary_provenance,
            });
        }
        state.summary_provenance
    }

    pub async fn change_page(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<LoadStatus, ControllerError> {
        {
            let mut state = self.inner.lock().await;
            state.check_page_request(page_index, page_size)?;
            state.page_index = page_index;
            state.page_size = page_size;
        }
        Ok(self.load_page().await)
    }

    /// Changing the order invalidates page positions, so the page resets to 0.
    pub async fn change_sort(&self, sort: SortSpec) -> LoadStatus {
        {
            let mut state = self.inner.lock().await;
            state.sort = sort;
            state.page_index = 0;
        }
        self.load_page().await
    }

    pub async fn handle_table_event(
        &self,
        event: TableEvent,
    ) -> Result<LoadStatus, ControllerError> {
        match event {
            TableEvent::Paginate { first, rows, sort } => {
                if rows == 0 {
                    return Err(ControllerError::InvalidPageSize);
                }
                let page_index = first / rows;
                {
                    let mut state = self.inner.lock().await;
                    state.check_page_request(page_index, rows)?;
                    state.page_index = page_index;
                    state.page_size = rows;
                    if let Some(sort) = sort {
                        state.sort = sort;
                    }
                }
                Ok(self.load_page().await)
            }
            TableEvent::Sort(sort) => Ok(self.change_sort(sort).await),
        }
    }

    /// Uploads whatever the input currently holds and clears it afterwards.
    /// Returns `Ok(None)` when nothing was selected. While another upload is
    /// running the input is left untouched.
    pub async fn upload_selected(
        &self,
        input: &mut dyn FileInput,
    ) -> Result<Option<UploadOutcome>, ControllerError> {
        self.begin_upload().await?;
        let Some(file) = input.take_selected() else {
            self.set_upload_phase(UploadPhase::Idle).await;
            return Ok(None);
        };
        let outcome = self.run_upload(file).await;
        input.reset();
        Ok(Some(outcome))
    }

    /// Runs one upload from validation to its outcome. Only one upload may be
    /// in flight; a second one is refused without touching the first.
    pub async fn upload(&self, file: SelectedFile) -> Result<UploadOutcome, ControllerError> {
        self.begin_upload().await?;
        Ok(self.run_upload(file).await)
    }

    async fn begin_upload(&self) -> Result<(), ControllerError> {
        let mut state = self.inner.lock().await;
        if state.upload_phase != UploadPhase::Idle {
            warn!(phase = ?state.upload_phase, "upload refused, another upload is in progress");
            return Err(ControllerError::UploadInProgress);
        }
        state.upload_phase = UploadPhase::Validating;
        Ok(())
    }

    async fn run_upload(&self, file: SelectedFile) -> UploadOutcome {
        if !has_allowed_extension(&file.filename) {
            warn!(filename = %file.filename, "rejected upload with unsupported extension");
            return self
                .finish_upload(UploadOutcome::Failure(UploadFailure::invalid_file_type()))
                .await;
        }

        self.set_upload_phase(UploadPhase::Submitting).await;
        let filename = file.filename.clone();
        info!(%filename, size_bytes = file.bytes.len(), "submitting inventory file");

        match self.gateway.submit_file(file).await {
            Ok(()) => {
                info!(%filename, "inventory file imported");
                {
                    let mut state = self.inner.lock().await;
                    state.upload_phase = UploadPhase::Refreshing;
                    state.page_index = 0;
                }
                let outcome = UploadOutcome::Success { filename };
                let _ = self
                    .events
                    .send(DashboardEvent::UploadFinished(outcome.clone()));
                tokio::join!(self.load_page(), self.load_summary());
                self.set_upload_phase(UploadPhase::Idle).await;
                outcome
            }
            Err(rejection) => {
                warn!(%filename, status = ?rejection.status, "inventory file rejected");
                self.finish_upload(UploadOutcome::Failure(UploadFailure::from_rejection(
                    rejection,
                )))
                .await
            }
        }
    }

    async fn finish_upload(&self, outcome: UploadOutcome) -> UploadOutcome {
        self.set_upload_phase(UploadPhase::Idle).await;
        let _ = self
            .events
            .send(DashboardEvent::UploadFinished(outcome.clone()));
        outcome
    }

    async fn set_upload_phase(&self, phase: UploadPhase) {
        self.inner.lock().await.upload_phase = phase;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
