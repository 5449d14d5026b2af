use crate::domain::error::{AppError, Result};
use crate::domain::question::Question;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Created,
    Questioned,
    Resolved,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Created => "created",
            CaseStatus::Questioned => "questioned",
            CaseStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "created" => Ok(CaseStatus::Created),
            "questioned" => Ok(CaseStatus::Questioned),
            "resolved" => Ok(CaseStatus::Resolved),
            other => Err(AppError::ParseError(format!("Unknown case status: {}", other))),
        }
    }
}

/// Intake payload for a new diagnosis case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    #[serde(default)]
    #[validate(length(max = 4096))]
    pub symptoms: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}

impl NewCase {
    pub fn new(symptoms: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            symptoms: Some(symptoms.into()),
            image_url: Some(image_url.into()),
        }
    }

    /// Length limits plus the rule that at least one of symptoms or image is given.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if self.symptoms().is_none() && self.image_url().is_none() {
            return Err(AppError::ValidationError(
                "symptoms: describe the symptoms or attach a photo".to_string(),
            ));
        }
        Ok(())
    }

    pub fn symptoms(&self) -> Option<&str> {
        non_blank(self.symptoms.as_deref())
    }

    pub fn image_url(&self) -> Option<&str> {
        non_blank(self.image_url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub symptoms: Option<String>,
    pub image_url: Option<String>,
    pub status: CaseStatus,
    pub questions: Option<Vec<Question>>,
    pub answers: Option<Map<String, Value>>,
    pub cards: Option<ResultCards>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Case {
    pub fn from_intake(input: &NewCase) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symptoms: input.symptoms().map(str::to_string),
            image_url: input.image_url().map(str::to_string),
            status: CaseStatus::Created,
            questions: None,
            answers: None,
            cards: None,
            created_at: now,
            updated_at: now,
        }
    }
}

const SUMMARY_MAX_CHARS: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    pub case_id: String,
    pub created_at: i64,
    pub image_url: Option<String>,
    pub status: CaseStatus,
    pub summary_line: String,
}

impl From<&Case> for CaseSummary {
    fn from(case: &Case) -> Self {
        let summary_line = match &case.cards {
            Some(cards) => cards
                .likely_condition()
                .map(|text| text.chars().take(SUMMARY_MAX_CHARS).collect())
                .unwrap_or_else(|| "Analysis complete".to_string()),
            None => "Analysis pending".to_string(),
        };
        Self {
            case_id: case.id.clone(),
            created_at: case.created_at,
            image_url: case.image_url.clone(),
            status: case.status,
            summary_line,
        }
    }
}

/// The three display cards. Their contents are model-authored and free-form.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ResultCards {
    #[serde(default = "empty_card")]
    pub diagnosis: Value,
    #[serde(default = "empty_card")]
    pub care: Value,
    #[serde(default = "empty_card")]
    pub costs: Value,
}

fn empty_card() -> Value {
    Value::Object(Map::new())
}

impl ResultCards {
    /// Accepts `{diagnosis, care, costs}` or the same wrapped in `{"cards": ...}`.
    /// Missing cards become empty objects; anything but an object is rejected.
    pub fn from_model_value(value: Value) -> Result<Self> {
        let mut root = match value {
            Value::Object(map) => map,
            other => {
                return Err(AppError::ParseError(format!(
                    "Expected a JSON object with result cards, got {}",
                    json_kind(&other)
                )))
            }
        };
        if let Some(Value::Object(inner)) = root.remove("cards") {
            root = inner;
        }

        let mut take = |key: &str| match root.remove(key) {
            Some(card @ Value::Object(_)) => card,
            Some(Value::Null) | None => empty_card(),
            Some(other) => {
                let mut wrapped = Map::new();
                wrapped.insert("text".to_string(), other);
                Value::Object(wrapped)
            }
        };

        Ok(Self {
            diagnosis: take("diagnosis"),
            care: take("care"),
            costs: take("costs"),
        })
    }

    pub fn likely_condition(&self) -> Option<&str> {
        self.diagnosis
            .get("likely_condition")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn intake_requires_symptoms_or_image() {
        let empty = NewCase::default();
        assert!(matches!(empty.check(), Err(AppError::ValidationError(_))));

        let blank = NewCase::new("   ", "");
        assert!(blank.check().is_err());

        assert!(NewCase::new("limping", "").check().is_ok());
        assert!(NewCase::new("", "/x.jpg").check().is_ok());
        assert!(NewCase::new("limping", "/x.jpg").check().is_ok());
    }

    #[test]
    fn intake_rejects_oversized_symptoms() {
        let input = NewCase::new("a".repeat(5000), "");
        assert!(matches!(input.check(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn new_case_trims_and_drops_blank_fields() {
        let case = Case::from_intake(&NewCase::new("  limping  ", " "));
        assert_eq!(case.symptoms.as_deref(), Some("limping"));
        assert_eq!(case.image_url, None);
        assert_eq!(case.status, CaseStatus::Created);
    }

    #[test]
    fn cards_fill_missing_sections() {
        let cards = ResultCards::from_model_value(json!({
            "diagnosis": { "likely_condition": "Sprain" }
        }))
        .unwrap();
        assert_eq!(cards.likely_condition(), Some("Sprain"));
        assert_eq!(cards.care, json!({}));
        assert_eq!(cards.costs, json!({}));
    }

    #[test]
    fn cards_unwrap_envelope_and_reject_non_objects() {
        let cards = ResultCards::from_model_value(json!({
            "cards": { "diagnosis": {}, "care": { "tips": [] }, "costs": {} }
        }))
        .unwrap();
        assert_eq!(cards.care, json!({ "tips": [] }));

        let err = ResultCards::from_model_value(json!(["nope"])).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[test]
    fn summary_line_reflects_lifecycle() {
        let mut case = Case::from_intake(&NewCase::new("limping", "/x.jpg"));
        assert_eq!(CaseSummary::from(&case).summary_line, "Analysis pending");

        case.cards = Some(
            ResultCards::from_model_value(json!({
                "diagnosis": { "likely_condition": "x".repeat(150) }
            }))
            .unwrap(),
        );
        assert_eq!(CaseSummary::from(&case).summary_line.len(), 100);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            CaseStatus::Created,
            CaseStatus::Questioned,
            CaseStatus::Resolved,
        ] {
            assert_eq!(status.as_str().parse::<CaseStatus>().unwrap(), status);
        }
        assert!("answered".parse::<CaseStatus>().is_err());
    }
}
