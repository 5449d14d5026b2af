use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// A follow-up question produced by the model for one case.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Question {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Select {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
    },
    Radio {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
    },
    Checkbox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
    },
    YesNo {},
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
}

impl Question {
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::Select { options }
            | QuestionKind::Radio { options }
            | QuestionKind::Checkbox { options } => options.as_deref(),
            _ => None,
        }
    }

    pub fn is_multi_select(&self) -> bool {
        matches!(self.kind, QuestionKind::Checkbox { .. })
    }

    /// Parses an untrusted model reply into questions.
    ///
    /// Accepts a bare array or an object carrying `questions` (or
    /// `suggested_questions`). Entries without an id, without a label, of an
    /// unknown type, or repeating an earlier id are dropped.
    pub fn from_model_value(value: &Value) -> Vec<Question> {
        let items = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => match map
                .get("questions")
                .or_else(|| map.get("suggested_questions"))
            {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[],
            },
            _ => &[],
        };

        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match parse_question(item) {
                Some(question) if seen.insert(question.id.clone()) => questions.push(question),
                Some(question) => debug!(id = %question.id, "Dropping duplicate question id"),
                None => debug!(index, "Dropping malformed question entry"),
            }
        }
        questions
    }
}

fn parse_question(item: &Value) -> Option<Question> {
    let map = item.as_object()?;

    let id = match map.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let label = ["label", "question", "text"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();
    let required = map.get("required").and_then(Value::as_bool).unwrap_or(false);
    let options = map.get("options").map(parse_options);

    let kind_name = map
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let kind = match kind_name.as_str() {
        "select" | "dropdown" => QuestionKind::Select { options },
        "radio" => QuestionKind::Radio { options },
        "checkbox" | "multiselect" => QuestionKind::Checkbox { options },
        "yesno" | "yes_no" | "yes/no" | "boolean" => QuestionKind::YesNo {},
        "text" | "textbox" => QuestionKind::Text {
            placeholder: map
                .get("placeholder")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        "number" => QuestionKind::Number {
            min: map.get("min").and_then(Value::as_f64),
            max: map.get("max").and_then(Value::as_f64),
            step: map.get("step").and_then(Value::as_f64),
        },
        _ => return None,
    };

    Some(Question {
        id,
        label,
        required,
        kind,
    })
}

fn parse_options(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
