//! File selection: drop zone, file dialog, preview and the predict action.

use super::{Panel, UiApp, worker};
use eframe::egui;
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "webp"];
const PREVIEW_MAX_HEIGHT: f32 = 280.0;

impl UiApp {
    /// Reacts to files hovering over or dropped onto the window. Only the
    /// first dropped file is used.
    pub(super) fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.first().cloned(),
            )
        });
        self.drop_hover = hovering;
        let Some(file) = dropped else {
            return;
        };
        self.panel = Panel::Diagnose;
        if let Some(bytes) = file.bytes {
            let name = if file.name.is_empty() {
                "dropped image".to_string()
            } else {
                file.name
            };
            self.on_file_loaded(ctx, name, bytes);
        } else if let Some(path) = file.path {
            self.load_file(ctx, path);
        } else {
            tracing::warn!("dropped file carried neither bytes nor a path");
        }
    }

    fn open_file_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = FileDialog::new()
            .add_filter(self.tr("叶片图片", "Leaf images"), &IMAGE_EXTENSIONS)
            .add_filter(self.tr("所有文件", "All files"), &["*"])
            .pick_file()
        {
            self.load_file(ctx, path);
        }
    }

    fn load_file(&mut self, ctx: &egui::Context, path: PathBuf) {
        tracing::debug!("reading {}", path.display());
        self.reading = worker::display_name(&path);
        self.file_job = Some(worker::spawn(ctx, "read", move || worker::read_file(path)));
    }

    pub(super) fn on_file_loaded(&mut self, ctx: &egui::Context, name: String, bytes: Arc<[u8]>) {
        self.session.on_file_loaded(name, bytes);
        self.bars_started = None;
        // A fresh URI per selection keeps egui's loader cache from serving
        // an older picture that had the same name.
        if let Some(old) = self.preview_uri.take() {
            ctx.forget_image(&old);
        }
        if let Some(file) = self.session.selected() {
            self.preview_serial += 1;
            self.preview_uri = Some(format!(
                "bytes://preview/{}/{}",
                self.preview_serial,
                file.name()
            ));
        }
    }

    pub(super) fn render_diagnose_panel(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        ui.heading(self.tr("植物叶片病害识别", "Leaf disease diagnosis"));
        ui.add_space(8.0);
        self.render_error_banner(ui);

        let (stroke_color, fill) = if self.drop_hover {
            (
                egui::Color32::from_rgb(25, 135, 84),
                egui::Color32::from_rgba_unmultiplied(25, 135, 84, 24),
            )
        } else {
            (ui.visuals().weak_text_color(), egui::Color32::TRANSPARENT)
        };
        let zone = egui::Frame::default()
            .fill(fill)
            .stroke(egui::Stroke::new(1.5, stroke_color))
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::same(24))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("🍃").size(32.0));
                    ui.label(self.tr(
                        "拖放叶片图片到此处，或点击选择文件",
                        "Drop a leaf image here, or click to browse",
                    ));
                    ui.label(
                        egui::RichText::new(self.tr(
                            "支持 PNG、JPG、JPEG、BMP、GIF",
                            "PNG, JPG, JPEG, BMP and GIF are supported",
                        ))
                        .small()
                        .weak(),
                    );
                });
            })
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand);
        if zone.clicked() && !self.session.is_loading() {
            self.open_file_dialog(&ctx);
        }

        ui.add_space(10.0);
        if let Some(file) = self.session.selected().cloned()
            && let Some(uri) = self.preview_uri.clone()
        {
            ui.vertical_centered(|ui| {
                ui.add(
                    egui::Image::from_bytes(uri, egui::load::Bytes::Shared(file.bytes().clone()))
                        .max_height(PREVIEW_MAX_HEIGHT)
                        .maintain_aspect_ratio(true),
                );
                ui.label(egui::RichText::new(file.name()).small().weak());
            });
            ui.add_space(8.0);
        }

        ui.horizontal(|ui| {
            let label = self.tr("开始诊断", "Diagnose");
            if ui
                .add_enabled(self.session.can_predict(), egui::Button::new(label))
                .clicked()
            {
                self.on_predict(&ctx);
            }
            if self.session.is_loading() {
                ui.spinner();
                ui.label(self.tr("正在分析叶片图片...", "Analysing the leaf image..."));
            }
        });

        ui.add_space(12.0);
        self.render_result_panel(ui);
    }
}
