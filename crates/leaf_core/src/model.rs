//! Wire model of the diagnosis service.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// JSON object decoded into a list of entries, keeping document order.
///
/// Probability tables are sorted for display with a stable sort, so ties
/// must keep the order the server sent them in.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }

            // The server sends `{}` or omits the field, but `null` shows up too.
            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }
        }

        deserializer.deserialize_any(OrderedVisitor(PhantomData))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// Body returned by `POST /api/predict` and `POST /api/predict_base64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Classification of one submitted leaf image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub is_healthy: bool,
    pub predicted_class: String,
    /// Probability of `predicted_class` in [0,1].
    pub confidence: f64,
    #[serde(default)]
    pub recommendation: Option<String>,
    /// Free-form facts about the predicted disease. Values are usually
    /// strings but are kept as JSON so nothing the server adds is lost.
    #[serde(default)]
    pub disease_info: OrderedMap<serde_json::Value>,
    #[serde(default)]
    pub all_probabilities: OrderedMap<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_index: Option<usize>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: Option<bool>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthReport {
    pub const HEALTHY: &'static str = "healthy";

    /// Only the exact marker counts; `"Healthy"` or `"ok"` do not.
    pub fn is_healthy(&self) -> bool {
        self.status == Self::HEALTHY
    }
}

/// Body of `GET /api/classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCatalog {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub num_classes: Option<usize>,
    #[serde(default)]
    pub disease_info: serde_json::Value,
}

impl ClassCatalog {
    /// Number of classes, trusting the server's count when it sends one.
    pub fn count(&self) -> usize {
        self.num_classes.unwrap_or(self.classes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn probabilities_keep_document_order() {
        let raw = r#"{
            "is_healthy": false,
            "predicted_class": "Blight",
            "confidence": 0.5,
            "all_probabilities": {"Rust": 0.25, "Blight": 0.5, "Healthy": 0.25}
        }"#;
        let p: Prediction = serde_json::from_str(raw).unwrap();
        let keys: Vec<&str> = p.all_probabilities.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Rust", "Blight", "Healthy"]);
        assert_relative_eq!(*p.all_probabilities.get("Blight").unwrap(), 0.5);
        assert!(p.disease_info.is_empty());
        assert!(p.recommendation.is_none());
    }

    #[test]
    fn null_disease_info_is_empty() {
        let raw = r#"{
            "is_healthy": true,
            "predicted_class": "Healthy",
            "confidence": 0.9,
            "disease_info": null,
            "all_probabilities": {}
        }"#;
        let p: Prediction = serde_json::from_str(raw).unwrap();
        assert!(p.disease_info.is_empty());
    }

    #[test]
    fn failure_response_without_prediction() {
        let r: PredictionResponse =
            serde_json::from_str(r#"{"success": false, "error": "model unavailable"}"#).unwrap();
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("model unavailable"));
        assert!(r.prediction.is_none());
    }

    #[test]
    fn health_marker_is_exact() {
        let ok: HealthReport = serde_json::from_str(r#"{"status": "healthy"}"#).unwrap();
        let degraded: HealthReport = serde_json::from_str(r#"{"status": "degraded"}"#).unwrap();
        let shouty: HealthReport = serde_json::from_str(r#"{"status": "Healthy"}"#).unwrap();
        let empty: HealthReport = serde_json::from_str("{}").unwrap();
        assert!(ok.is_healthy());
        assert!(!degraded.is_healthy());
        assert!(!shouty.is_healthy());
        assert!(!empty.is_healthy());
    }

    #[test]
    fn catalog_count_falls_back_to_list_length() {
        let c: ClassCatalog =
            serde_json::from_str(r#"{"success": true, "classes": ["a", "b"]}"#).unwrap();
        assert_eq!(c.count(), 2);
    }
}
