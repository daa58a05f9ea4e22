//! Client-side state for the inventory dashboard: keeps pagination and sort
//! in step with the remote listing, reconciles summary figures and turns
//! import responses into user-facing reports.

mod controller;
pub mod gateway;
pub mod summary;
pub mod upload;

pub use controller::{
    ControllerError, DashboardController, DashboardEvent, DashboardOptions, LoadStatus, Notice,
    Severity, TableEvent, ViewState, DEFAULT_PAGE_SIZE,
};
pub use gateway::{ErrorBody, GatewayError, HttpInventoryGateway, InventoryGateway, UploadRejection};
pub use summary::SummaryProvenance;
pub use upload::{
    FileInput, SelectedFile, UploadFailure, UploadFailureKind, UploadOutcome, UploadPhase,
};
