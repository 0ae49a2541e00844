//! The egui application: owns the upload session and routes input events,
//! worker results and painting through it.

mod results;
mod settings;
mod upload;
mod worker;

use crate::{fonts, i18n};
use anyhow::Context as _;
use eframe::{App, Frame, egui};
use leaf_core::{
    AppConfig, ClassCatalog, ClientError, DiagnosisClient, HealthReport, Language,
    LanguagePreference, PredictionReply, PredictionTicket, UploadSession,
};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;
use worker::FileLoad;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Diagnose,
    Settings,
}

struct PendingPrediction {
    ticket: PredictionTicket,
    rx: Receiver<Result<PredictionReply, ClientError>>,
}

pub(crate) struct UiApp {
    config: AppConfig,
    config_path: Option<PathBuf>,
    language_preference: LanguagePreference,
    language: Language,
    client: Option<DiagnosisClient>,
    session: UploadSession,
    panel: Panel,
    status: String,
    app_version: &'static str,

    // background jobs
    file_job: Option<Receiver<FileLoad>>,
    /// Display name of the file `file_job` is reading.
    reading: String,
    prediction: Option<PendingPrediction>,
    health_job: Option<Receiver<Result<HealthReport, ClientError>>>,
    info_job: Option<Receiver<Result<serde_json::Value, ClientError>>>,
    classes_job: Option<Receiver<Result<ClassCatalog, ClientError>>>,

    service: Option<HealthReport>,
    catalog: Option<ClassCatalog>,
    preview_uri: Option<String>,
    preview_serial: u64,
    drop_hover: bool,
    /// Result counter and the instant it was first painted, for the bars.
    bars_started: Option<(u64, Instant)>,

    pending_server_url: String,
    pending_timeout_secs: u64,
}

impl UiApp {
    pub(crate) fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        fonts::install_cjk_fallback(&cc.egui_ctx);

        let language_preference = config.language;
        let language = i18n::resolve(language_preference);
        let mut app = Self {
            pending_server_url: config.server_url.clone(),
            pending_timeout_secs: config.request_timeout_secs,
            config,
            config_path,
            language_preference,
            language,
            client: None,
            session: UploadSession::new(language),
            panel: Panel::Diagnose,
            status: String::new(),
            app_version: env!("LEAF_DOCTOR_VERSION"),
            file_job: None,
            reading: String::new(),
            prediction: None,
            health_job: None,
            info_job: None,
            classes_job: None,
            service: None,
            catalog: None,
            preview_uri: None,
            preview_serial: 0,
            drop_hover: false,
            bars_started: None,
        };
        app.start_service_probe(&cc.egui_ctx);
        app
    }

    fn tr(&self, zh: &'static str, en: &'static str) -> &'static str {
        self.language.tr(zh, en)
    }

    /// Shared client for the configured server, built on first use.
    fn client(&mut self) -> Result<DiagnosisClient, ClientError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = DiagnosisClient::from_config(&self.config)?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Health check and info fetch, run once at start and after the server
    /// address changes. Neither blocks the UI.
    fn start_service_probe(&mut self, ctx: &egui::Context) {
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                self.session.on_health_checked(Err(e));
                return;
            }
        };
        tracing::info!("probing {}", client.base_url());
        let health_client = client.clone();
        self.health_job = Some(worker::spawn(ctx, "health", move || health_client.health()));
        self.info_job = Some(worker::spawn(ctx, "info", move || client.info()));
    }

    fn on_predict(&mut self, ctx: &egui::Context) {
        let Some(ticket) = self.session.begin_prediction() else {
            return;
        };
        let mode = self.config.upload_mode;
        match self.client() {
            Ok(client) => {
                let file = ticket.file().clone();
                let rx = worker::spawn(ctx, "predict", move || client.submit(&file, mode));
                self.prediction = Some(PendingPrediction { ticket, rx });
            }
            Err(e) => self.session.finish_prediction(ticket, Err(e)),
        }
    }

    fn on_prediction_finished(
        &mut self,
        ticket: PredictionTicket,
        outcome: Result<PredictionReply, ClientError>,
    ) {
        self.session.finish_prediction(ticket, outcome);
        self.bars_started = None;
    }

    fn on_health_checked(&mut self, outcome: Result<HealthReport, ClientError>) {
        if let Ok(report) = &outcome {
            self.service = Some(report.clone());
        }
        self.session.on_health_checked(outcome);
    }

    fn on_info_loaded(&mut self, outcome: Result<serde_json::Value, ClientError>) {
        match outcome {
            Ok(info) => tracing::info!("service info: {info}"),
            Err(e) => tracing::error!("cannot load service info: {e}"),
        }
    }

    fn on_classes_loaded(&mut self, outcome: Result<ClassCatalog, ClientError>) {
        match outcome {
            Ok(catalog) if catalog.success => {
                self.status = format!(
                    "{}: {}",
                    self.tr("已加载病害类别", "Classes loaded"),
                    catalog.count()
                );
                self.catalog = Some(catalog);
            }
            Ok(catalog) => {
                let reason = catalog
                    .error
                    .unwrap_or_else(|| self.tr("未知错误", "unknown error").to_string());
                self.status = format!("{}: {reason}", self.tr("无法加载类别", "Cannot load classes"));
            }
            Err(e) => {
                self.status = format!("{}: {e}", self.tr("无法加载类别", "Cannot load classes"));
            }
        }
    }

    fn poll_jobs(&mut self, ctx: &egui::Context) {
        if let Some(pending) = self.prediction.take() {
            match pending.rx.try_recv() {
                Ok(outcome) => self.on_prediction_finished(pending.ticket, outcome),
                Err(TryRecvError::Empty) => self.prediction = Some(pending),
                Err(TryRecvError::Disconnected) => {
                    self.on_prediction_finished(pending.ticket, Err(ClientError::WorkerStopped))
                }
            }
        }
        if let Some(loaded) = worker::poll(&mut self.file_job) {
            let reading = std::mem::take(&mut self.reading);
            let loaded = loaded.unwrap_or_else(|_| {
                tracing::error!("file reader stopped without a result");
                FileLoad::stopped(reading)
            });
            match loaded {
                FileLoad { name, bytes: Ok(bytes) } => self.on_file_loaded(ctx, name, bytes.into()),
                FileLoad { name, bytes: Err(e) } => self.session.on_file_unreadable(name, e),
            }
        }
        if let Some(outcome) = worker::poll(&mut self.health_job) {
            self.on_health_checked(outcome.unwrap_or(Err(ClientError::WorkerStopped)));
        }
        if let Some(outcome) = worker::poll(&mut self.info_job) {
            self.on_info_loaded(outcome.unwrap_or(Err(ClientError::WorkerStopped)));
        }
        if let Some(outcome) = worker::poll(&mut self.classes_job) {
            self.on_classes_loaded(outcome.unwrap_or(Err(ClientError::WorkerStopped)));
        }
    }

    fn update_language_preference(&mut self, preference: LanguagePreference) {
        self.language_preference = preference;
        self.language = i18n::resolve(preference);
        self.session.set_language(self.language);
        self.config.language = preference;
        self.persist_config();
    }

    fn persist_config(&mut self) {
        if let Err(e) = self.save_config() {
            tracing::warn!("{e:#}");
            self.status = format!("{}: {e}", self.tr("保存设置失败", "Saving settings failed"));
        }
    }

    fn save_config(&self) -> anyhow::Result<()> {
        let path = self
            .config_path
            .as_ref()
            .context("no configuration directory on this system")?;
        self.config.save(path)
    }

    fn render_error_banner(&mut self, ui: &mut egui::Ui) {
        let Some(message) = self.session.error().map(str::to_string) else {
            return;
        };
        let mut dismissed = false;
        egui::Frame::default()
            .fill(egui::Color32::from_rgb(248, 215, 218))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(220, 53, 69)))
            .corner_radius(egui::CornerRadius::same(6))
            .inner_margin(egui::Margin::same(10))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(message)
                            .color(egui::Color32::from_rgb(132, 32, 41))
                            .strong(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.small_button("✕").clicked();
                    });
                });
            });
        if dismissed {
            self.session.dismiss_error();
        }
        ui.add_space(8.0);
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs(ctx);
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let diagnose = self.tr("病害诊断", "Diagnose");
                let settings = self.tr("设置", "Settings");
                ui.selectable_value(&mut self.panel, Panel::Diagnose, diagnose);
                ui.selectable_value(&mut self.panel, Panel::Settings, settings);
                ui.separator();
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.panel {
                    Panel::Diagnose => self.render_diagnose_panel(ui),
                    Panel::Settings => self.render_settings_panel(ui),
                });
        });
    }
}
