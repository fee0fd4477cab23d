/// Analysis results, verdicts and the danger classification rule
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action name carried by the background → content-script warning message
pub const SHOW_WARNING_ACTION: &str = "show_warning";

/// Score at or above which a result is dangerous regardless of verdict
pub const DANGER_SCORE_THRESHOLD: f64 = 0.5;

/// Browser tab identifier
pub type TabId = i32;

/// Categorical classification returned by the analysis API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    Suspicious,
    Phishing,
    /// Missing, non-string, or a value this extension does not know
    Unrecognized,
}

impl Verdict {
    pub fn parse(s: &str) -> Verdict {
        match s {
            "safe" => Verdict::Safe,
            "suspicious" => Verdict::Suspicious,
            "phishing" => Verdict::Phishing,
            _ => Verdict::Unrecognized,
        }
    }
}

/// A response body from the analysis API.
///
/// Only `verdict` and `score` are interpreted here; every other field is
/// opaque and forwarded to the page overlay exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    /// Wrap a decoded JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Option<AnalysisResult> {
        if value.is_object() {
            Some(AnalysisResult(value))
        } else {
            None
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.0
            .get("verdict")
            .and_then(Value::as_str)
            .map_or(Verdict::Unrecognized, Verdict::parse)
    }

    /// Risk score; a missing or non-numeric score reads as 0
    pub fn score(&self) -> f64 {
        self.0.get("score").and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Model confidence: top-level `confidence`, else the classifier's
    /// `model_details.confidence`
    pub fn confidence(&self) -> Option<f64> {
        self.0
            .get("confidence")
            .or_else(|| self.0.pointer("/model_details/confidence"))
            .and_then(Value::as_f64)
    }

    /// Human-readable reasons for the verdict.
    ///
    /// Taken from the first non-empty of `reasons`, `detailed_analysis` and
    /// `recommendations`. Entries are plain strings or localized objects, of
    /// which the English (`en`) text is used.
    pub fn reasons(&self) -> Vec<String> {
        ["reasons", "detailed_analysis", "recommendations"]
            .iter()
            .map(|key| self.text_list(key))
            .find(|texts| !texts.is_empty())
            .unwrap_or_default()
    }

    fn text_list(&self, key: &str) -> Vec<String> {
        let Some(items) = self.0.get(key).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.as_str()),
                Value::Object(localized) => localized.get("en").and_then(Value::as_str),
                _ => None,
            })
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Dangerous when the verdict is phishing or suspicious, or the score
    /// alone reaches the threshold.
    pub fn is_dangerous(&self) -> bool {
        matches!(self.verdict(), Verdict::Phishing | Verdict::Suspicious)
            || self.score() >= DANGER_SCORE_THRESHOLD
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Visible per-tab state, recomputed from scratch on every dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabVisualState {
    Unknown,
    Safe,
    Dangerous,
    Error,
}

impl TabVisualState {
    pub fn from_result(result: &AnalysisResult) -> TabVisualState {
        if result.is_dangerous() {
            TabVisualState::Dangerous
        } else {
            TabVisualState::Safe
        }
    }
}

/// Message sent into the page's content-script context for dangerous results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningMessage {
    pub action: String,
    pub data: AnalysisResult,
    pub url: String,
}

impl WarningMessage {
    pub fn new(data: AnalysisResult, url: String) -> WarningMessage {
        WarningMessage {
            action: SHOW_WARNING_ACTION.to_string(),
            data,
            url,
        }
    }

    pub fn is_show_warning(&self) -> bool {
        self.action == SHOW_WARNING_ACTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(value: Value) -> AnalysisResult {
        AnalysisResult::from_value(value).unwrap()
    }

    #[test]
    fn test_classification_truth_table() {
        assert!(result(json!({"verdict": "phishing", "score": 0.0})).is_dangerous());
        assert!(result(json!({"verdict": "suspicious", "score": 0.0})).is_dangerous());
        assert!(result(json!({"verdict": "safe", "score": 0.9})).is_dangerous());
        assert!(!result(json!({"verdict": "safe", "score": 0.49})).is_dangerous());
        assert!(result(json!({"verdict": "safe", "score": 0.5})).is_dangerous());
    }

    #[test]
    fn test_partial_results() {
        // Missing score reads as 0
        assert!(!result(json!({"verdict": "safe"})).is_dangerous());
        assert!(result(json!({"verdict": "phishing"})).is_dangerous());

        // Unknown verdict only counts through the score
        assert!(!result(json!({"verdict": "weird", "score": 0.2})).is_dangerous());
        assert!(result(json!({"verdict": "weird", "score": 0.7})).is_dangerous());
        assert!(!result(json!({})).is_dangerous());
        assert!(!result(json!({"score": "0.9"})).is_dangerous());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(AnalysisResult::from_value(json!([1, 2])).is_none());
        assert!(AnalysisResult::from_value(json!("phishing")).is_none());
        assert!(AnalysisResult::from_value(Value::Null).is_none());
    }

    #[test]
    fn test_verdict_parse() {
        assert_eq!(Verdict::parse("safe"), Verdict::Safe);
        assert_eq!(Verdict::parse("suspicious"), Verdict::Suspicious);
        assert_eq!(Verdict::parse("phishing"), Verdict::Phishing);
        assert_eq!(Verdict::parse("PHISHING"), Verdict::Unrecognized);
        assert_eq!(result(json!({"verdict": 3})).verdict(), Verdict::Unrecognized);
    }

    #[test]
    fn test_reasons_keep_only_strings() {
        let r = result(json!({"reasons": ["typosquatting", 7, "new domain"]}));
        assert_eq!(r.reasons(), vec!["typosquatting".to_string(), "new domain".to_string()]);
        assert!(result(json!({})).reasons().is_empty());
    }

    #[test]
    fn test_backend_response_reasons_and_confidence() {
        let r = result(json!({
            "score": 0.93,
            "verdict": "phishing",
            "risk_level": "high",
            "model_details": {"confidence": 0.86, "analysis_method": "ML + Heuristic Ensemble"},
            "detailed_analysis": [
                {"kz": "Домен жаңа", "ru": "Домен новый", "en": "Domain was registered recently"},
                {"kz": "", "ru": "", "en": ""},
                {"en": "Login form posts to another host"}
            ],
            "recommendations": [{"en": "Do not enter your password"}],
            "timestamp": "2024-05-01T10:00:00"
        }));

        assert_eq!(
            r.reasons(),
            vec![
                "Domain was registered recently".to_string(),
                "Login form posts to another host".to_string()
            ]
        );
        assert_eq!(r.confidence(), Some(0.86));
    }

    #[test]
    fn test_reasons_fall_back_to_recommendations() {
        let r = result(json!({
            "verdict": "suspicious",
            "detailed_analysis": [],
            "recommendations": [{"kz": "Абай болыңыз", "ru": "Будьте осторожны", "en": "Be careful"}]
        }));
        assert_eq!(r.reasons(), vec!["Be careful".to_string()]);

        let explicit = result(json!({
            "reasons": ["typosquatting"],
            "recommendations": [{"en": "Be careful"}]
        }));
        assert_eq!(explicit.reasons(), vec!["typosquatting".to_string()]);
    }

    #[test]
    fn test_top_level_confidence_wins() {
        let r = result(json!({"confidence": 0.5, "model_details": {"confidence": 0.9}}));
        assert_eq!(r.confidence(), Some(0.5));
        assert_eq!(result(json!({"model_details": {}})).confidence(), None);
    }

    #[test]
    fn test_warning_message_forwards_payload_unmodified() {
        let payload = json!({
            "verdict": "phishing",
            "score": 0.97,
            "risk_level": "high",
            "model_details": {"analysis_method": "ML + Heuristic Ensemble"}
        });
        let message = WarningMessage::new(result(payload.clone()), "http://a.test/".to_string());

        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["action"], "show_warning");
        assert_eq!(json["data"], payload);
        assert_eq!(json["url"], "http://a.test/");

        let back: WarningMessage = serde_json::from_value(json).unwrap();
        assert!(back.is_show_warning());
    }
}
