//! Settings panel rendering for language, connection, and the class list.

use super::{UiApp, worker};
use crate::i18n::preference_label;
use eframe::egui;
use leaf_core::{LanguagePreference, UploadMode};

impl UiApp {
    /// Renders the settings screen including the service connection.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.tr("设置", "Settings"));
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(self.tr("语言", "Language"));
            let mut selected = self.language_preference;
            let active = self.language;
            egui::ComboBox::from_id_salt("language-select")
                .selected_text(preference_label(active, selected))
                .show_ui(ui, |ui| {
                    for option in [
                        LanguagePreference::System,
                        LanguagePreference::Chinese,
                        LanguagePreference::English,
                    ] {
                        ui.selectable_value(&mut selected, option, preference_label(active, option));
                    }
                });
            if selected != self.language_preference {
                self.update_language_preference(selected);
                self.status = self.tr("语言已更改。", "Language updated.").to_string();
            }
        });

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading(self.tr("诊断服务", "Diagnosis service"));
        ui.horizontal(|ui| {
            ui.label(self.tr("服务地址", "Server address"));
            ui.text_edit_singleline(&mut self.pending_server_url);
        });
        ui.horizontal(|ui| {
            ui.label(self.tr("请求超时（秒）", "Request timeout (s)"));
            ui.add(
                egui::DragValue::new(&mut self.pending_timeout_secs)
                    .range(1..=600)
                    .speed(1),
            );
        });
        ui.horizontal(|ui| {
            ui.label(self.tr("上传方式", "Upload mode"));
            let mut mode = self.config.upload_mode;
            let multipart = self.tr("表单文件 (multipart)", "File form (multipart)");
            let base64 = self.tr("Base64 编码", "Base64 data URL");
            ui.radio_value(&mut mode, UploadMode::Multipart, multipart);
            ui.radio_value(&mut mode, UploadMode::Base64, base64);
            if mode != self.config.upload_mode {
                self.config.upload_mode = mode;
                self.persist_config();
            }
        });
        ui.add_space(4.0);
        let changed = self.pending_server_url.trim() != self.config.server_url
            || self.pending_timeout_secs != self.config.request_timeout_secs;
        if ui
            .add_enabled(
                changed,
                egui::Button::new(self.tr("保存并重新连接", "Save and reconnect")),
            )
            .clicked()
        {
            self.apply_connection_settings(ui.ctx());
        }

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(6.0);
        self.render_class_catalog(ui);

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading(self.tr("版本", "Versions"));
        ui.label(format!(
            "{}: {}",
            self.tr("客户端版本", "App version"),
            self.app_version
        ));
        let service = match &self.service {
            Some(report) => format!(
                "{} {} ({})",
                report.app_name.as_deref().unwrap_or("-"),
                report.version.as_deref().unwrap_or("-"),
                report.status
            ),
            None => self.tr("未知", "unknown").to_string(),
        };
        ui.label(format!("{}: {service}", self.tr("服务", "Service")));
    }

    fn apply_connection_settings(&mut self, ctx: &egui::Context) {
        self.config.server_url = self.pending_server_url.trim().to_string();
        self.config.request_timeout_secs = self.pending_timeout_secs;
        self.client = None;
        self.service = None;
        self.catalog = None;
        self.persist_config();
        self.status = format!(
            "{}: {}",
            self.tr("正在连接", "Connecting to"),
            self.config.server_url
        );
        self.start_service_probe(ctx);
    }

    fn render_class_catalog(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(self.tr("病害类别", "Known classes"));
            let loading = self.classes_job.is_some();
            if ui
                .add_enabled(!loading, egui::Button::new(self.tr("加载", "Load")))
                .clicked()
            {
                match self.client() {
                    Ok(client) => {
                        self.classes_job =
                            Some(worker::spawn(ui.ctx(), "classes", move || client.classes()));
                    }
                    Err(e) => {
                        self.status = format!(
                            "{}: {e}",
                            self.tr("无法加载类别", "Cannot load classes")
                        );
                    }
                }
            }
            if loading {
                ui.spinner();
            }
        });
        let Some(catalog) = &self.catalog else {
            return;
        };
        ui.label(format!("{}: {}", self.tr("类别数量", "Count"), catalog.count()));
        egui::ScrollArea::vertical()
            .id_salt("class-list")
            .max_height(220.0)
            .show(ui, |ui| {
                for name in &catalog.classes {
                    ui.label(name);
                }
            });
    }
}
