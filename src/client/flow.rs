use crate::client::api::DiagnoseApi;
use crate::client::history::HistoryStore;
use crate::domain::case::NewCase;
use crate::domain::error::AppError;
use crate::domain::form::{render_form, Answers, FormControl};
use crate::domain::normalize::normalize_owned;
use crate::domain::question::Question;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};

const BANNER_MESSAGE: &str = "We couldn't complete the analysis. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    Intake,
    Questions,
    Results,
}

/// Intake, follow-up questions, then results, against any [`DiagnoseApi`].
///
/// Failures never escape: validation problems land in [`field_errors`],
/// an unknown case restarts at intake, and anything else raises a banner
/// while keeping the current step so the call can be retried.
///
/// [`field_errors`]: DiagnoseFlow::field_errors
pub struct DiagnoseFlow<A> {
    api: A,
    history: HistoryStore,
    step: FlowStep,
    intake: NewCase,
    case_id: Option<String>,
    questions: Vec<Question>,
    answers: Answers,
    cards: Option<Value>,
    field_errors: BTreeMap<String, String>,
    banner: Option<String>,
}

impl<A: DiagnoseApi + Send + Sync> DiagnoseFlow<A> {
    pub fn new(api: A, history: HistoryStore) -> Self {
        Self {
            api,
            history,
            step: FlowStep::Intake,
            intake: NewCase::default(),
            case_id: None,
            questions: Vec::new(),
            answers: Answers::new(),
            cards: None,
            field_errors: BTreeMap::new(),
            banner: None,
        }
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn case_id(&self) -> Option<&str> {
        self.case_id.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn controls(&self) -> Vec<FormControl> {
        render_form(&self.questions)
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Normalized result cards once the flow reaches [`FlowStep::Results`].
    pub fn cards(&self) -> Option<&Value> {
        self.cards.as_ref()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Creates the case and loads its questions. With no questions the flow
    /// goes straight on to results.
    pub async fn start(&mut self, symptoms: &str, image_url: &str) -> FlowStep {
        self.field_errors.clear();
        self.banner = None;

        let intake = NewCase::new(symptoms, image_url);
        if let Err(err) = intake.check() {
            self.handle_error(err);
            return self.step;
        }
        self.intake = intake;
        self.case_id = None;
        self.questions.clear();
        self.answers = Answers::new();
        self.cards = None;

        let case_id = match self.api.create_case(&self.intake).await {
            Ok(case_id) => case_id,
            Err(err) => {
                self.handle_error(err);
                return self.step;
            }
        };
        info!(case_id = %case_id, "Case started");
        self.case_id = Some(case_id.clone());
        self.load_questions(&case_id).await;
        self.step
    }

    /// Loads the questions again for a case whose question request failed,
    /// without creating a new case. Does nothing once questions are loaded.
    pub async fn retry(&mut self) -> FlowStep {
        let Some(case_id) = self.case_id.clone() else {
            return self.step;
        };
        if self.step != FlowStep::Intake {
            return self.step;
        }
        self.banner = None;
        self.load_questions(&case_id).await;
        self.step
    }

    async fn load_questions(&mut self, case_id: &str) {
        match self.api.get_questions(case_id).await {
            Ok(questions) if questions.is_empty() => {
                info!(case_id = %case_id, "No follow-up questions, requesting results");
                self.request_results(false).await;
            }
            Ok(questions) => {
                self.questions = questions;
                self.step = FlowStep::Questions;
            }
            Err(err) => self.handle_error(err),
        }
    }

    pub fn set_answer(&mut self, id: &str, value: Value) {
        self.field_errors.remove(id);
        self.answers.set(id, value);
    }

    pub fn toggle_option(&mut self, id: &str, option: &str) {
        self.field_errors.remove(id);
        self.answers.toggle(id, option);
    }

    /// Submits the answers; required questions left blank stay on this step.
    pub async fn submit(&mut self) -> FlowStep {
        self.field_errors = self.answers.missing_required(&self.questions);
        if !self.field_errors.is_empty() {
            return self.step;
        }
        self.request_results(true).await;
        self.step
    }

    pub async fn skip(&mut self) -> FlowStep {
        self.field_errors.clear();
        self.request_results(false).await;
        self.step
    }

    pub fn restart(&mut self) {
        self.step = FlowStep::Intake;
        self.intake = NewCase::default();
        self.case_id = None;
        self.questions.clear();
        self.answers = Answers::new();
        self.cards = None;
        self.field_errors.clear();
        self.banner = None;
    }

    pub fn dismiss_error(&mut self) {
        self.banner = None;
    }

    async fn request_results(&mut self, with_answers: bool) {
        let Some(case_id) = self.case_id.clone() else {
            self.restart();
            return;
        };
        self.banner = None;

        let answers = with_answers.then(|| self.answers.as_map());
        let raw = match self.api.submit_results(&case_id, answers).await {
            Ok(raw) => raw,
            Err(err) => {
                self.handle_error(err);
                return;
            }
        };

        let cards = normalize_owned(raw);
        let submitted = if with_answers {
            Value::Object(self.answers.as_map().clone())
        } else {
            Value::Null
        };
        let form = json!({
            "symptoms": self.intake.symptoms().unwrap_or_default(),
            "imageUrl": self.intake.image_url().unwrap_or_default(),
            "answers": submitted,
        });
        self.history.add_entry(form, cards.clone());

        info!(case_id = %case_id, skipped = !with_answers, "Results ready");
        self.cards = Some(cards);
        self.step = FlowStep::Results;
    }

    fn handle_error(&mut self, err: AppError) {
        match err {
            AppError::ValidationError(message) => {
                let (field, text) = match message.split_once(": ") {
                    Some((field, text)) if !field.contains(' ') => (field.to_string(), text.to_string()),
                    _ => ("form".to_string(), message),
                };
                self.field_errors.insert(field, text);
            }
            AppError::NotFound(message) => {
                warn!(message = %message, "Case no longer exists, restarting");
                self.restart();
            }
            other => {
                warn!(error = %other, step = ?self.step, "Diagnose request failed");
                self.banner = Some(BANNER_MESSAGE.to_string());
            }
        }
    }
}
