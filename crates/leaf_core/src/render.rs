//! Display model for a successful prediction.
//!
//! [`ResultView::build`] is a pure function of the response; the GUI only
//! paints what it finds here.

use crate::highlight::{self, Span};
use crate::i18n::{Language, Message};
use crate::model::Prediction;

/// Class-name fragments that mark a class as healthy. Matching is a
/// substring test; an unfamiliar vocabulary falls back to the disease style.
pub const HEALTHY_MARKERS: [&str; 2] = ["健康", "healthy"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBanner {
    Healthy,
    DiseaseDetected,
}

impl HealthBanner {
    pub fn from_flag(is_healthy: bool) -> Self {
        if is_healthy {
            HealthBanner::Healthy
        } else {
            HealthBanner::DiseaseDetected
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        match self {
            HealthBanner::Healthy => Message::LeafHealthy.text(lang),
            HealthBanner::DiseaseDetected => Message::DiseaseDetected.text(lang),
        }
    }

    pub fn badge_style(self) -> BadgeStyle {
        match self {
            HealthBanner::Healthy => BadgeStyle::Success,
            HealthBanner::DiseaseDetected => BadgeStyle::Danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarStyle {
    Healthy,
    Disease,
}

impl BarStyle {
    pub fn for_label(label: &str) -> Self {
        if is_healthy_label(label) {
            BarStyle::Healthy
        } else {
            BarStyle::Disease
        }
    }
}

pub fn is_healthy_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    HEALTHY_MARKERS.iter().any(|m| lower.contains(m))
}

/// One row of the confidence chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBar {
    pub label: String,
    pub probability: f64,
    /// Percentage with one decimal, e.g. `97.0%`.
    pub percent_text: String,
    pub style: BarStyle,
}

impl ConfidenceBar {
    /// Target fill of the bar in [0,1].
    pub fn fill(&self) -> f32 {
        if self.probability.is_finite() {
            self.probability.clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub banner: HealthBanner,
    pub badge_text: String,
    /// Confidence with two decimals, e.g. `97.00%`.
    pub confidence_text: String,
    pub recommendation: Option<String>,
    /// `key: value` lines.
    pub disease_info: Vec<String>,
    /// Sorted by probability, highest first.
    pub bars: Vec<ConfidenceBar>,
    /// The whole response, two-space indented.
    pub raw_json: String,
    pub json_spans: Vec<Span>,
}

impl ResultView {
    /// `raw` is the response body exactly as received, used for the debug
    /// panel so fields unknown to [`Prediction`] still show up.
    pub fn build(prediction: &Prediction, raw: &serde_json::Value) -> Self {
        let banner = HealthBanner::from_flag(prediction.is_healthy);
        let recommendation = prediction
            .recommendation
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let disease_info = prediction
            .disease_info
            .iter()
            .map(|(key, value)| format!("{key}: {}", display_value(value)))
            .collect();
        let printable = integral_floats_as_ints(raw);
        let raw_json = serde_json::to_string_pretty(&printable).unwrap_or_else(|e| {
            tracing::warn!("cannot pretty-print response: {e}");
            printable.to_string()
        });
        let json_spans = highlight::tokenize(&raw_json);

        Self {
            banner,
            badge_text: prediction.predicted_class.clone(),
            confidence_text: format_percent(prediction.confidence, 2),
            recommendation,
            disease_info,
            bars: sorted_bars(prediction),
            raw_json,
            json_spans,
        }
    }

    pub fn badge_style(&self) -> BadgeStyle {
        self.banner.badge_style()
    }

    /// Debug panel as HTML, escaped before colouring.
    pub fn json_html(&self) -> String {
        highlight::to_html(&self.raw_json)
    }
}

/// `value` in [0,1] as a percentage with `decimals` places.
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

fn sorted_bars(prediction: &Prediction) -> Vec<ConfidenceBar> {
    let mut bars: Vec<ConfidenceBar> = prediction
        .all_probabilities
        .iter()
        .map(|(label, &probability)| ConfidenceBar {
            label: label.to_string(),
            probability,
            percent_text: format_percent(probability, 1),
            style: BarStyle::for_label(label),
        })
        .collect();
    // sort_by is stable: equal probabilities keep server order
    bars.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    bars
}

/// Copy of `value` where whole-number floats such as `1.0` print as `1`,
/// the way a browser serialises them.
fn integral_floats_as_ints(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0)
            .map(|f| Value::from(f as i64))
            .unwrap_or_else(|| value.clone()),
        Value::Array(items) => Value::Array(items.iter().map(integral_floats_as_ints).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), integral_floats_as_ints(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictionResponse;
    use serde_json::json;

    fn build(raw: serde_json::Value) -> ResultView {
        let resp: PredictionResponse = serde_json::from_value(raw.clone()).unwrap();
        ResultView::build(resp.prediction.as_ref().unwrap(), &raw)
    }

    #[test]
    fn healthy_scenario() {
        let view = build(json!({
            "success": true,
            "prediction": {
                "is_healthy": true,
                "predicted_class": "Healthy",
                "confidence": 0.97,
                "all_probabilities": {"Healthy": 0.97, "Blight": 0.03}
            }
        }));
        assert_eq!(view.banner, HealthBanner::Healthy);
        assert_eq!(view.badge_style(), BadgeStyle::Success);
        assert_eq!(view.badge_text, "Healthy");
        assert_eq!(view.confidence_text, "97.00%");
        let bars: Vec<(&str, &str, BarStyle)> = view
            .bars
            .iter()
            .map(|b| (b.label.as_str(), b.percent_text.as_str(), b.style))
            .collect();
        assert_eq!(
            bars,
            vec![
                ("Healthy", "97.0%", BarStyle::Healthy),
                ("Blight", "3.0%", BarStyle::Disease),
            ]
        );
        assert!(view.recommendation.is_none());
        assert!(view.disease_info.is_empty());
    }

    #[test]
    fn disease_scenario_with_panels() {
        let view = build(json!({
            "success": true,
            "prediction": {
                "is_healthy": false,
                "predicted_class": "番茄早疫病",
                "confidence": 0.5512,
                "recommendation": "及时清除病叶",
                "disease_info": {"病原": "茄链格孢", "severity": 3},
                "all_probabilities": {"番茄健康": 0.2, "番茄早疫病": 0.5512, "番茄晚疫病": 0.2488}
            }
        }));
        assert_eq!(view.banner, HealthBanner::DiseaseDetected);
        assert_eq!(view.badge_style(), BadgeStyle::Danger);
        assert_eq!(view.confidence_text, "55.12%");
        assert_eq!(view.recommendation.as_deref(), Some("及时清除病叶"));
        assert_eq!(view.disease_info, vec!["病原: 茄链格孢", "severity: 3"]);
        let labels: Vec<&str> = view.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["番茄早疫病", "番茄晚疫病", "番茄健康"]);
        assert_eq!(view.bars[2].style, BarStyle::Healthy);
    }

    #[test]
    fn blank_recommendation_is_hidden() {
        let view = build(json!({
            "success": true,
            "prediction": {
                "is_healthy": true,
                "predicted_class": "healthy",
                "confidence": 1.0,
                "recommendation": "   ",
                "all_probabilities": {"healthy": 1.0}
            }
        }));
        assert!(view.recommendation.is_none());
    }

    #[test]
    fn bars_are_non_increasing_and_ties_keep_source_order() {
        let view = build(json!({
            "success": true,
            "prediction": {
                "is_healthy": false,
                "predicted_class": "b",
                "confidence": 0.3,
                "all_probabilities": {"a": 0.1, "b": 0.3, "c": 0.1, "d": 0.3, "e": 0.2}
            }
        }));
        let labels: Vec<&str> = view.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "d", "e", "a", "c"]);
        assert!(
            view.bars
                .windows(2)
                .all(|w| w[0].probability >= w[1].probability)
        );
    }

    #[test]
    fn healthy_marker_is_case_insensitive() {
        assert!(is_healthy_label("Tomato___HEALTHY"));
        assert!(is_healthy_label("苹果健康"));
        assert!(!is_healthy_label("Apple scab"));
    }

    #[test]
    fn fill_is_clamped() {
        let bar = ConfidenceBar {
            label: "x".into(),
            probability: 1.2,
            percent_text: format_percent(1.2, 1),
            style: BarStyle::Disease,
        };
        assert_eq!(bar.fill(), 1.0);
        assert_eq!(bar.percent_text, "120.0%");
    }

    #[test]
    fn debug_json_round_trips() {
        let raw = json!({
            "success": true,
            "prediction": {
                "is_healthy": true,
                "predicted_class": "Healthy",
                "confidence": 0.97,
                "all_probabilities": {"Healthy": 0.97, "Blight": 0.03}
            },
            "timestamp": "2025-10-31 20:26:00"
        });
        let view = build(raw.clone());
        let joined: String = view.json_spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, view.raw_json);
        let reparsed: serde_json::Value = serde_json::from_str(&view.raw_json).unwrap();
        assert_eq!(reparsed, raw);
        assert!(view.raw_json.starts_with("{\n  \"success\": true"));
    }

    #[test]
    fn whole_number_floats_print_without_fraction() {
        let view = build(json!({
            "success": true,
            "prediction": {
                "is_healthy": true,
                "predicted_class": "Healthy",
                "confidence": 1.0,
                "all_probabilities": {"Healthy": 1.0, "Blight": 0.0, "Rust": 0.25}
            }
        }));
        assert!(view.raw_json.contains("\"confidence\": 1,"));
        assert!(view.raw_json.contains("\"Healthy\": 1,"));
        assert!(view.raw_json.contains("\"Blight\": 0,"));
        assert!(view.raw_json.contains("\"Rust\": 0.25"));
        assert!(!view.raw_json.contains("1.0"));
    }
}
