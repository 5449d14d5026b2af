mod prompts;
#[cfg(test)]
mod tests;

use crate::domain::case::{Case, CaseStatus, CaseSummary, NewCase, ResultCards};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::question::Question;
use crate::infrastructure::db::cases::CaseRepository;
use crate::infrastructure::llm_clients::{resolve_image_url, LLMClient};
use crate::infrastructure::response::parse_json_reply;
use prompts::{
    build_questions_user_prompt, build_results_user_prompt, QUESTIONS_SYSTEM_PROMPT,
    RESULTS_SYSTEM_PROMPT,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CASE_LIST_LIMIT: i64 = 50;

/// Create case, generate questions, synthesize result cards.
pub struct DiagnoseUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    repository: Arc<CaseRepository>,
    config: LLMConfig,
    public_base_url: Option<String>,
}

impl DiagnoseUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        repository: Arc<CaseRepository>,
        config: LLMConfig,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            llm_client,
            repository,
            config,
            public_base_url,
        }
    }

    pub async fn create_case(&self, input: &NewCase) -> Result<String> {
        input.check()?;

        let case = Case::from_intake(input);
        self.repository.insert_case(&case).await?;
        info!(
            case_id = %case.id,
            has_symptoms = case.symptoms.is_some(),
            has_image = case.image_url.is_some(),
            "Case created"
        );
        Ok(case.id)
    }

    /// Returns the stored questions when already generated; otherwise asks the model.
    /// An empty list means the caller should go straight to results.
    pub async fn get_questions(&self, case_id: &str) -> Result<Vec<Question>> {
        let case = self.repository.get_case(case_id).await?;
        if let Some(questions) = case.questions {
            debug!(case_id = %case_id, count = questions.len(), "Returning stored questions");
            return Ok(questions);
        }

        let image_url = self.model_image_url(&case);
        let user_prompt = build_questions_user_prompt(case.symptoms.as_deref(), image_url.is_some());
        let raw = self
            .llm_client
            .generate(
                &self.config,
                QUESTIONS_SYSTEM_PROMPT,
                &user_prompt,
                image_url.as_deref(),
            )
            .await
            .map_err(|err| {
                warn!(case_id = %case_id, error = %err, "Question generation failed");
                err
            })?;

        let value = parse_json_reply(&raw)?;
        let questions = Question::from_model_value(&value);
        self.repository.save_questions(case_id, &questions).await?;

        info!(case_id = %case_id, count = questions.len(), "Questions generated");
        Ok(questions)
    }

    /// `answers` is `None` on the skip path. Nothing is written unless the
    /// model reply parses; a failed call leaves the case as it was.
    pub async fn submit_results(
        &self,
        case_id: &str,
        answers: Option<Map<String, Value>>,
    ) -> Result<ResultCards> {
        let case = self.repository.get_case(case_id).await?;

        let image_url = self.model_image_url(&case);
        let questions = case.questions.unwrap_or_default();
        let user_prompt = build_results_user_prompt(
            case.symptoms.as_deref(),
            image_url.is_some(),
            &questions,
            answers.as_ref(),
        );

        let raw = self
            .llm_client
            .generate(
                &self.config,
                RESULTS_SYSTEM_PROMPT,
                &user_prompt,
                image_url.as_deref(),
            )
            .await
            .map_err(|err| {
                warn!(case_id = %case_id, error = %err, "Result synthesis failed");
                err
            })?;

        let cards = ResultCards::from_model_value(parse_json_reply(&raw)?)?;
        self.repository
            .save_resolution(case_id, answers.as_ref(), &cards)
            .await?;

        info!(
            case_id = %case_id,
            skipped = answers.is_none(),
            likely_condition = cards.likely_condition().unwrap_or("-"),
            "Results synthesized"
        );
        Ok(cards)
    }

    pub async fn get_results(&self, case_id: &str) -> Result<ResultCards> {
        let case = self.repository.get_case(case_id).await?;
        match (case.status, case.cards) {
            (CaseStatus::Resolved, Some(cards)) => Ok(cards),
            _ => Err(AppError::NotFound(format!(
                "No results for case: {}",
                case_id
            ))),
        }
    }

    pub async fn list_cases(&self) -> Result<Vec<CaseSummary>> {
        let cases = self.repository.list_cases(CASE_LIST_LIMIT).await?;
        Ok(cases.iter().map(CaseSummary::from).collect())
    }

    pub async fn get_case(&self, case_id: &str) -> Result<Case> {
        self.repository.get_case(case_id).await
    }

    fn model_image_url(&self, case: &Case) -> Option<String> {
        let raw = case.image_url.as_deref()?;
        let resolved = resolve_image_url(self.public_base_url.as_deref(), raw);
        if resolved.is_none() {
            debug!(case_id = %case.id, image_url = %raw, "Image reference not resolvable, sending text only");
        }
        resolved
    }
}
