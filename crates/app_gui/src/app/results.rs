//! Painting of a successful prediction.

use super::UiApp;
use eframe::egui;
use leaf_core::highlight::TokenKind;
use leaf_core::{BadgeStyle, BarStyle, HealthBanner, Language, ResultView};
use std::time::{Duration, Instant};

const SUCCESS: egui::Color32 = egui::Color32::from_rgb(25, 135, 84);
const DANGER: egui::Color32 = egui::Color32::from_rgb(220, 53, 69);
const INFO: egui::Color32 = egui::Color32::from_rgb(13, 202, 240);

/// Bars stay empty this long before growing to their value.
const BAR_DELAY: Duration = Duration::from_millis(100);
const BAR_ANIMATION_SECS: f32 = 0.6;

impl UiApp {
    pub(super) fn render_result_panel(&mut self, ui: &mut egui::Ui) {
        let generation = self.session.results_shown();
        let Some(view) = self.session.result() else {
            return;
        };
        let started = match self.bars_started {
            Some((shown, at)) if shown == generation => at,
            _ => {
                let now = Instant::now();
                self.bars_started = Some((generation, now));
                now
            }
        };
        let lang = self.language;

        render_banner(ui, view.banner, lang);
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(lang.tr("诊断结果", "Prediction"));
            badge(ui, &view.badge_text, view.badge_style());
            ui.separator();
            ui.label(lang.tr("置信度", "Confidence"));
            ui.label(egui::RichText::new(&view.confidence_text).strong());
        });

        if let Some(recommendation) = &view.recommendation {
            ui.add_space(8.0);
            egui::Frame::default()
                .fill(INFO.gamma_multiply(0.15))
                .corner_radius(egui::CornerRadius::same(6))
                .inner_margin(egui::Margin::same(10))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(egui::RichText::new(lang.tr("防治建议", "Recommendation")).strong());
                    ui.label(recommendation);
                });
        }

        if !view.disease_info.is_empty() {
            ui.add_space(8.0);
            ui.label(egui::RichText::new(lang.tr("病害信息", "Disease information")).strong());
            for line in &view.disease_info {
                ui.label(line);
            }
        }

        ui.add_space(12.0);
        ui.label(egui::RichText::new(lang.tr("各类别置信度", "Confidence per class")).strong());
        render_bars(ui, view, generation, started);

        ui.add_space(12.0);
        egui::CollapsingHeader::new(lang.tr("原始响应 (JSON)", "Raw response (JSON)"))
            .id_salt("raw-json")
            .show(ui, |ui| {
                if ui.small_button(lang.tr("复制", "Copy")).clicked() {
                    ui.ctx().copy_text(view.raw_json.clone());
                }
                egui::ScrollArea::both()
                    .id_salt("raw-json-scroll")
                    .max_height(320.0)
                    .show(ui, |ui| {
                        ui.label(json_layout(ui, view));
                    });
            });
    }
}

fn render_banner(ui: &mut egui::Ui, banner: HealthBanner, lang: Language) {
    let (icon, color) = match banner {
        HealthBanner::Healthy => ("✔", SUCCESS),
        HealthBanner::DiseaseDetected => ("⚠", DANGER),
    };
    egui::Frame::default()
        .fill(color.gamma_multiply(0.15))
        .stroke(egui::Stroke::new(1.0, color))
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(format!("{icon} {}", banner.label(lang)))
                    .color(color)
                    .size(20.0)
                    .strong(),
            );
        });
}

fn badge(ui: &mut egui::Ui, text: &str, style: BadgeStyle) {
    let fill = match style {
        BadgeStyle::Success => SUCCESS,
        BadgeStyle::Danger => DANGER,
    };
    egui::Frame::default()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(4))
        .inner_margin(egui::Margin::symmetric(8, 3))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE).strong());
        });
}

fn render_bars(ui: &mut egui::Ui, view: &ResultView, generation: u64, started: Instant) {
    let elapsed = started.elapsed();
    let grown = elapsed >= BAR_DELAY;
    for (idx, bar) in view.bars.iter().enumerate() {
        let target = if grown { bar.fill() } else { 0.0 };
        let id = egui::Id::new(("confidence-bar", generation, idx));
        let fill = ui.ctx().animate_value_with_time(id, target, BAR_ANIMATION_SECS);
        ui.horizontal(|ui| {
            ui.label(&bar.label);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(&bar.percent_text);
            });
        });
        let color = match bar.style {
            BarStyle::Healthy => SUCCESS,
            BarStyle::Disease => DANGER,
        };
        let mut progress = egui::ProgressBar::new(fill).fill(color).desired_height(16.0);
        if grown {
            progress = progress.text(bar.percent_text.as_str());
        }
        ui.add(progress);
        ui.add_space(4.0);
    }
    if !grown {
        ui.ctx().request_repaint_after(BAR_DELAY - elapsed);
    }
}

fn json_layout(ui: &egui::Ui, view: &ResultView) -> egui::text::LayoutJob {
    let font_id = egui::TextStyle::Monospace.resolve(ui.style());
    let plain = ui.visuals().text_color();
    let mut job = egui::text::LayoutJob::default();
    for span in &view.json_spans {
        let color = match span.kind {
            Some(TokenKind::Key) => egui::Color32::from_rgb(255, 193, 7),
            Some(TokenKind::String) => SUCCESS,
            Some(TokenKind::Number) => egui::Color32::from_rgb(13, 110, 253),
            Some(TokenKind::Boolean) => INFO,
            Some(TokenKind::Null) => DANGER,
            None => plain,
        };
        job.append(
            &span.text,
            0.0,
            egui::TextFormat {
                font_id: font_id.clone(),
                color,
                ..Default::default()
            },
        );
    }
    job
}
