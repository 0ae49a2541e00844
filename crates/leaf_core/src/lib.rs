//! Core of the leaf disease diagnosis client.
//!
//! Everything here is independent of the GUI toolkit: the wire model of the
//! diagnosis service, the HTTP client, media sniffing for selected files,
//! the rendering model for a prediction, and the upload session that drives
//! which panels are visible.

pub mod client;
pub mod config;
pub mod error;
pub mod highlight;
pub mod i18n;
pub mod media;
pub mod model;
pub mod render;
pub mod session;

pub use client::{DiagnosisClient, PredictionReply};
pub use config::{AppConfig, UploadMode};
pub use error::{ClientError, InputError};
pub use i18n::{Language, LanguagePreference, Message};
pub use media::SelectedFile;
pub use model::{ClassCatalog, HealthReport, OrderedMap, Prediction, PredictionResponse};
pub use render::{BadgeStyle, BarStyle, ConfidenceBar, HealthBanner, ResultView};
pub use session::{PanelState, PredictionTicket, UiState, UploadSession};
