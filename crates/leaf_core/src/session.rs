//! View-model for the upload-and-predict screen.
//!
//! `UploadSession` owns every piece of state the screen shows: the selected
//! file, the in-flight flag and the result/error panel. Event handlers call
//! into it; the GUI reads it back each frame.

use crate::client::PredictionReply;
use crate::error::{ClientError, InputError};
use crate::i18n::{Language, Message};
use crate::media::SelectedFile;
use crate::model::HealthReport;
use crate::render::ResultView;

/// Which of the mutually exclusive panels is showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelState {
    #[default]
    Hidden,
    Result(Box<ResultView>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Previewing,
    Loading,
    ResultShown,
    ErrorShown,
}

/// Proof that a prediction was started. Must be handed back to
/// [`UploadSession::finish_prediction`] to release the busy state.
#[derive(Debug)]
#[must_use = "an unfinished ticket keeps the predict action disabled"]
pub struct PredictionTicket {
    id: u64,
    file: SelectedFile,
}

impl PredictionTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }
}

#[derive(Debug, Default)]
pub struct UploadSession {
    language: Language,
    selected: Option<SelectedFile>,
    in_flight: Option<u64>,
    next_ticket: u64,
    panel: PanelState,
    /// Set while the panel shows a health probe failure; holds the panel
    /// that failure covered.
    covered_by_probe: Option<PanelState>,
    results_shown: u64,
}

impl UploadSession {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn state(&self) -> UiState {
        if self.in_flight.is_some() {
            return UiState::Loading;
        }
        match (&self.panel, &self.selected) {
            (PanelState::Result(_), _) => UiState::ResultShown,
            (PanelState::Error(_), _) => UiState::ErrorShown,
            (PanelState::Hidden, Some(_)) => UiState::Previewing,
            (PanelState::Hidden, None) => UiState::Idle,
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn result(&self) -> Option<&ResultView> {
        match &self.panel {
            PanelState::Result(view) => Some(view),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.panel {
            PanelState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Predict is enabled only for a previewed image with nothing in flight.
    pub fn can_predict(&self) -> bool {
        self.selected.is_some() && self.in_flight.is_none()
    }

    /// Counter bumped every time a result is shown; lets the view restart
    /// per-result animations.
    pub fn results_shown(&self) -> u64 {
        self.results_shown
    }

    /// A file's content arrived from the picker or a drop.
    pub fn on_file_loaded(&mut self, name: impl Into<String>, bytes: impl Into<std::sync::Arc<[u8]>>) {
        match SelectedFile::sniff(name, bytes) {
            Ok(file) => {
                tracing::info!("previewing {} ({})", file.name(), file.media_type());
                self.selected = Some(file);
                self.set_panel(PanelState::Hidden);
            }
            Err(err) => self.reject(err),
        }
    }

    /// Reading the chosen file failed.
    pub fn on_file_unreadable(&mut self, name: impl Into<String>, source: std::io::Error) {
        self.reject(InputError::Unreadable {
            name: name.into(),
            source,
        });
    }

    fn reject(&mut self, err: InputError) {
        tracing::warn!("rejected selection: {err}");
        let message = match err {
            InputError::NotAnImage { .. } => Message::NotAnImage,
            InputError::Unreadable { .. } => Message::UnreadableFile,
        };
        self.selected = None;
        self.show_error(message.text(self.language));
    }

    /// Start a prediction for the selected file.
    ///
    /// Returns `None`, and changes nothing, when no file is selected or a
    /// prediction is already running.
    pub fn begin_prediction(&mut self) -> Option<PredictionTicket> {
        if self.in_flight.is_some() {
            tracing::debug!("prediction already in flight, ignoring");
            return None;
        }
        let file = self.selected.clone()?;
        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);
        if matches!(self.panel, PanelState::Error(_)) {
            self.set_panel(PanelState::Hidden);
        }
        tracing::info!("submitting {} for diagnosis (request #{id})", file.name());
        Some(PredictionTicket { id, file })
    }

    /// Settle a prediction. The busy state is released before the outcome
    /// is looked at, so every path leaves predict enabled again.
    pub fn finish_prediction(
        &mut self,
        ticket: PredictionTicket,
        outcome: Result<PredictionReply, ClientError>,
    ) {
        if self.in_flight == Some(ticket.id) {
            self.in_flight = None;
        } else {
            tracing::warn!("stale prediction #{} finished", ticket.id);
        }

        let reply = match outcome {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!("prediction #{} failed: {err}", ticket.id);
                let message = format!("{}: {err}", Message::NetworkError.text(self.language));
                self.show_error(message);
                return;
            }
        };

        let response = &reply.response;
        match (&response.prediction, response.success) {
            (Some(prediction), true) => {
                tracing::info!(
                    "prediction #{}: {} ({:.4})",
                    ticket.id,
                    prediction.predicted_class,
                    prediction.confidence
                );
                let view = ResultView::build(prediction, &reply.raw);
                self.show_result(view);
            }
            _ => {
                let message = response
                    .error
                    .as_deref()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| Message::DiagnosisFailed.text(self.language))
                    .to_string();
                tracing::info!("prediction #{} rejected by service: {message}", ticket.id);
                self.show_error(message);
            }
        }
    }

    /// Outcome of the startup `/api/health` probe.
    pub fn on_health_checked(&mut self, outcome: Result<HealthReport, ClientError>) {
        match outcome {
            Ok(report) if report.is_healthy() => {
                tracing::info!("service healthy");
                if let Some(covered) = self.covered_by_probe.take() {
                    self.panel = covered;
                }
            }
            Ok(report) => {
                tracing::warn!("service status is {:?}", report.status);
                self.show_probe_error(Message::ServiceUnhealthy);
            }
            Err(err) => {
                tracing::warn!("health probe failed: {err}");
                self.show_probe_error(Message::ServiceUnreachable);
            }
        }
    }

    /// A later healthy probe puts back whatever this error replaced.
    fn show_probe_error(&mut self, message: Message) {
        let error = PanelState::Error(message.text(self.language).to_string());
        let covered = std::mem::replace(&mut self.panel, error);
        if self.covered_by_probe.is_none() {
            self.covered_by_probe = Some(covered);
        }
    }

    fn set_panel(&mut self, panel: PanelState) {
        self.covered_by_probe = None;
        self.panel = panel;
    }

    /// Show `message` and hide any result.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.set_panel(PanelState::Error(message.into()));
    }

    /// Show `view` and hide any error.
    pub fn show_result(&mut self, view: ResultView) {
        self.results_shown += 1;
        self.set_panel(PanelState::Result(Box::new(view)));
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.panel, PanelState::Error(_)) {
            self.set_panel(PanelState::Hidden);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictionResponse;
    use rstest::rstest;
    use serde_json::json;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn reply(raw: serde_json::Value) -> PredictionReply {
        PredictionReply {
            response: serde_json::from_value::<PredictionResponse>(raw.clone()).unwrap(),
            raw,
        }
    }

    fn healthy_reply() -> PredictionReply {
        reply(json!({
            "success": true,
            "prediction": {
                "is_healthy": true,
                "predicted_class": "Healthy",
                "confidence": 0.97,
                "all_probabilities": {"Healthy": 0.97, "Blight": 0.03}
            }
        }))
    }

    fn previewing() -> UploadSession {
        let mut s = UploadSession::new(Language::English);
        s.on_file_loaded("leaf.png", PNG_MAGIC.to_vec());
        s
    }

    #[test]
    fn starts_idle_with_predict_disabled() {
        let s = UploadSession::new(Language::English);
        assert_eq!(s.state(), UiState::Idle);
        assert!(!s.can_predict());
    }

    #[rstest]
    #[case("notes.txt", b"plain text".to_vec())]
    #[case("data.json", b"{\"a\": 1}".to_vec())]
    #[case("archive.zip", b"PK\x03\x04".to_vec())]
    fn non_image_keeps_predict_disabled(#[case] name: &str, #[case] bytes: Vec<u8>) {
        let mut s = UploadSession::new(Language::English);
        s.on_file_loaded(name, bytes);
        assert!(!s.can_predict());
        assert_eq!(s.state(), UiState::ErrorShown);
        assert_eq!(s.error(), Some("Please choose a leaf image file"));
    }

    #[test]
    fn non_image_replaces_previous_selection() {
        let mut s = previewing();
        s.on_file_loaded("notes.txt", b"plain text".to_vec());
        assert!(s.selected().is_none());
        assert!(!s.can_predict());
    }

    #[test]
    fn image_enables_predict_and_clears_panels() {
        let mut s = UploadSession::new(Language::English);
        s.show_error("old failure");
        s.on_file_loaded("leaf.png", PNG_MAGIC.to_vec());
        assert_eq!(s.state(), UiState::Previewing);
        assert!(s.can_predict());
        assert_eq!(s.panel(), &PanelState::Hidden);
    }

    #[test]
    fn unreadable_file_reports_error() {
        let mut s = previewing();
        s.on_file_unreadable(
            "leaf.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(s.error(), Some("The selected file could not be read"));
        assert!(!s.can_predict());
    }

    #[test]
    fn predict_without_file_is_a_no_op() {
        let mut s = UploadSession::new(Language::English);
        assert!(s.begin_prediction().is_none());
        assert_eq!(s.state(), UiState::Idle);
    }

    #[test]
    fn overlapping_submission_is_rejected() {
        let mut s = previewing();
        let ticket = s.begin_prediction().unwrap();
        assert_eq!(s.state(), UiState::Loading);
        assert!(!s.can_predict());
        assert!(s.begin_prediction().is_none());
        s.finish_prediction(ticket, Ok(healthy_reply()));
        assert!(s.can_predict());
    }

    #[test]
    fn success_shows_result_and_hides_error() {
        let mut s = previewing();
        s.show_error("stale");
        let ticket = s.begin_prediction().unwrap();
        assert!(s.error().is_none());
        s.finish_prediction(ticket, Ok(healthy_reply()));
        assert_eq!(s.state(), UiState::ResultShown);
        assert!(s.error().is_none());
        let view = s.result().unwrap();
        assert_eq!(view.badge_text, "Healthy");
        assert_eq!(view.confidence_text, "97.00%");
        assert_eq!(s.results_shown(), 1);
    }

    #[test]
    fn application_failure_shows_server_message() {
        let mut s = previewing();
        let ticket = s.begin_prediction().unwrap();
        s.finish_prediction(
            ticket,
            Ok(reply(json!({"success": false, "error": "model unavailable"}))),
        );
        assert_eq!(s.error(), Some("model unavailable"));
        assert!(s.result().is_none());
        assert!(!s.is_loading());
        assert!(s.can_predict());
    }

    #[rstest]
    #[case(json!({"success": false}))]
    #[case(json!({"success": false, "error": ""}))]
    #[case(json!({"success": true}))]
    fn application_failure_without_message_uses_generic_text(#[case] raw: serde_json::Value) {
        let mut s = UploadSession::new(Language::Chinese);
        s.on_file_loaded("leaf.png", PNG_MAGIC.to_vec());
        let ticket = s.begin_prediction().unwrap();
        s.finish_prediction(ticket, Ok(reply(raw)));
        assert_eq!(s.error(), Some("病害诊断失败"));
    }

    #[test]
    fn transport_failure_releases_busy_state() {
        let mut s = previewing();
        let ticket = s.begin_prediction().unwrap();
        s.finish_prediction(ticket, Err(ClientError::WorkerStopped));
        assert!(!s.is_loading());
        assert!(s.can_predict());
        assert!(s.result().is_none());
        let msg = s.error().unwrap();
        assert!(msg.starts_with("Network error: "));
        assert!(msg.contains("worker stopped"));
    }

    #[test]
    fn error_after_result_hides_result() {
        let mut s = previewing();
        let ticket = s.begin_prediction().unwrap();
        s.finish_prediction(ticket, Ok(healthy_reply()));
        s.show_error("boom");
        assert!(s.result().is_none());
        s.show_result(healthy_view());
        assert!(s.error().is_none());
    }

    fn healthy_view() -> ResultView {
        let r = healthy_reply();
        ResultView::build(r.response.prediction.as_ref().unwrap(), &r.raw)
    }

    #[test]
    fn new_selection_hides_previous_result() {
        let mut s = previewing();
        let ticket = s.begin_prediction().unwrap();
        s.finish_prediction(ticket, Ok(healthy_reply()));
        s.on_file_loaded("other.png", PNG_MAGIC.to_vec());
        assert_eq!(s.state(), UiState::Previewing);
    }

    #[test]
    fn selection_during_flight_does_not_enable_predict() {
        let mut s = previewing();
        let ticket = s.begin_prediction().unwrap();
        s.on_file_loaded("second.png", PNG_MAGIC.to_vec());
        assert!(!s.can_predict());
        s.finish_prediction(ticket, Err(ClientError::WorkerStopped));
        assert!(s.can_predict());
        assert_eq!(s.selected().unwrap().name(), "second.png");
    }

    #[rstest]
    #[case(json!({"status": "degraded"}), Some("The diagnosis service reports a problem"))]
    #[case(json!({"status": "healthy", "model_loaded": true}), None)]
    fn health_probe(#[case] body: serde_json::Value, #[case] expected: Option<&str>) {
        let mut s = UploadSession::new(Language::English);
        s.on_health_checked(Ok(serde_json::from_value(body).unwrap()));
        assert_eq!(s.error(), expected);
    }

    #[test]
    fn unreachable_service_shows_fixed_message() {
        let mut s = UploadSession::new(Language::Chinese);
        s.on_health_checked(Err(ClientError::WorkerStopped));
        assert_eq!(s.error(), Some("无法连接到病害诊断服务"));
    }

    #[test]
    fn healthy_reprobe_clears_connection_error() {
        let mut s = UploadSession::new(Language::English);
        s.on_health_checked(Err(ClientError::WorkerStopped));
        assert_eq!(s.error(), Some("Cannot connect to the diagnosis service"));
        s.on_health_checked(Ok(serde_json::from_value(json!({"status": "healthy"})).unwrap()));
        assert!(s.error().is_none());
        assert_eq!(s.state(), UiState::Idle);
    }

    #[test]
    fn healthy_reprobe_restores_covered_result() {
        let mut s = previewing();
        let ticket = s.begin_prediction().unwrap();
        s.finish_prediction(ticket, Ok(healthy_reply()));
        s.on_health_checked(Err(ClientError::WorkerStopped));
        s.on_health_checked(Ok(serde_json::from_value(json!({"status": "degraded"})).unwrap()));
        assert!(s.result().is_none());
        s.on_health_checked(Ok(serde_json::from_value(json!({"status": "healthy"})).unwrap()));
        assert!(s.error().is_none());
        assert_eq!(s.result().unwrap().badge_text, "Healthy");
    }

    #[test]
    fn healthy_probe_keeps_other_errors() {
        let mut s = previewing();
        s.on_health_checked(Err(ClientError::WorkerStopped));
        s.on_file_loaded("notes.txt", b"plain text".to_vec());
        s.on_health_checked(Ok(serde_json::from_value(json!({"status": "healthy"})).unwrap()));
        assert_eq!(s.error(), Some("Please choose a leaf image file"));
    }
}
