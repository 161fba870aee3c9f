// Application layer - Use case interactors

pub mod export_interactor;
pub mod inspect_interactor;

// Re-export interactors
pub use export_interactor::{ExportInteractor, ExportRequest, ExportResponse};
pub use inspect_interactor::{InspectInteractor, InspectReport, InspectRequest};
