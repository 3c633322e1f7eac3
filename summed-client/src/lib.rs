pub mod canvas;
pub mod chat;
pub mod config;
pub mod error;
pub mod latency;
pub mod models;
pub mod navbar;
pub mod sections;
pub mod service;
pub mod store;
pub mod upload_panel;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use canvas::ImageCanvas;
pub use chat::ChatWidget;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use latency::LatencyPolicy;
pub use models::{
    ChatMessage, ExtractedMetadata, ImageAsset, Sender, UploadFile, UploadResponse,
    UploadedDocument,
};
pub use navbar::{NavBar, NavItem};
pub use sections::{Accordion, AccordionSection, DropdownMenus, ResourceMenu};
pub use service::{DocumentService, HttpDocumentService};
pub use store::{FetchState, MetadataStore};
pub use upload_panel::{PanelView, UploadPanel, UploadStatus};
