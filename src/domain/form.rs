use crate::domain::question::{Question, QuestionKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const YES_NO_OPTIONS: [&str; 2] = ["Yes", "No"];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Dropdown,
    RadioGroup,
    CheckboxGroup,
    TextInput,
    NumberInput,
}

/// Render-ready description of one question.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormControl {
    pub id: String,
    pub label: String,
    pub kind: ControlKind,
    pub options: Vec<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// Maps questions to controls. Choice questions without options render empty.
pub fn render_form(questions: &[Question]) -> Vec<FormControl> {
    questions.iter().map(render_control).collect()
}

fn render_control(question: &Question) -> FormControl {
    let mut control = FormControl {
        id: question.id.clone(),
        label: question.label.clone(),
        kind: ControlKind::TextInput,
        options: Vec::new(),
        required: question.required,
        placeholder: None,
        min: None,
        max: None,
        step: None,
    };

    match &question.kind {
        QuestionKind::Select { options } => {
            control.kind = ControlKind::Dropdown;
            control.options = options.clone().unwrap_or_default();
        }
        QuestionKind::Radio { options } => {
            control.kind = ControlKind::RadioGroup;
            control.options = options.clone().unwrap_or_default();
        }
        QuestionKind::Checkbox { options } => {
            control.kind = ControlKind::CheckboxGroup;
            control.options = options.clone().unwrap_or_default();
        }
        QuestionKind::YesNo {} => {
            control.kind = ControlKind::RadioGroup;
            control.options = YES_NO_OPTIONS.iter().map(|s| s.to_string()).collect();
        }
        QuestionKind::Text { placeholder } => {
            control.placeholder = placeholder.clone();
        }
        QuestionKind::Number { min, max, step } => {
            control.kind = ControlKind::NumberInput;
            control.min = *min;
            control.max = *max;
            control.step = *step;
        }
    }

    control
}

/// Flat answer map keyed by question id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Answers(Map<String, Value>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn set(&mut self, id: impl Into<String>, value: Value) {
        self.0.insert(id.into(), value);
    }

    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.0.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds `option` to the array answer for `id`, or removes it if present.
    ///
    /// Other selections keep their order. A key created by the toggle is
    /// removed again once its selection becomes empty. Toggling the same
    /// option twice restores the map when `id` is absent or already holds an
    /// array; a scalar answer is first turned into a one-item selection and
    /// stays an array afterwards.
    pub fn toggle(&mut self, id: &str, option: &str) {
        let created = !self.0.contains_key(id);
        let entry = self
            .0
            .entry(id.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            // A scalar left behind by another control becomes a one-item selection.
            let previous = std::mem::take(entry);
            *entry = match previous {
                Value::Null => Value::Array(Vec::new()),
                other => Value::Array(vec![other]),
            };
        }
        let Value::Array(selected) = entry else {
            return;
        };

        match selected.iter().position(|v| v.as_str() == Some(option)) {
            Some(index) => {
                selected.remove(index);
            }
            None => selected.push(Value::String(option.to_string())),
        }

        if created && selected.is_empty() {
            self.0.remove(id);
        }
    }

    pub fn is_selected(&self, id: &str, option: &str) -> bool {
        match self.0.get(id) {
            Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(option)),
            Some(Value::String(s)) => s == option,
            _ => false,
        }
    }

    /// Required questions with no usable answer, keyed by question id.
    pub fn missing_required(&self, questions: &[Question]) -> BTreeMap<String, String> {
        questions
            .iter()
            .filter(|q| q.required && !self.has_answer(&q.id))
            .map(|q| (q.id.clone(), format!("{} is required", q.label)))
            .collect()
    }

    fn has_answer(&self, id: &str) -> bool {
        match self.0.get(id) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Answers {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
