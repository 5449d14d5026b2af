use super::DiagnoseUseCase;
use crate::domain::case::{CaseStatus, NewCase};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::db::cases::CaseRepository;
use crate::infrastructure::db::sqlite::init_pool;
use crate::infrastructure::llm_clients::LLMClient;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned replies in order and records each call's user prompt and image.
#[derive(Default)]
struct ScriptedLLM {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedLLM {
    fn with(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn generate(
        &self,
        _config: &LLMConfig,
        _system: &str,
        user: &str,
        image_url: Option<&str>,
    ) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((user.to_string(), image_url.map(str::to_string)));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::LLMError("no scripted reply".to_string())))
    }
}

async fn use_case(llm: Arc<ScriptedLLM>) -> DiagnoseUseCase {
    let pool = init_pool("sqlite::memory:").await.unwrap();
    DiagnoseUseCase::new(
        llm,
        Arc::new(CaseRepository::new(pool)),
        LLMConfig::default(),
        Some("https://hellodogtor.com".to_string()),
    )
}

fn questions_reply() -> String {
    "<think>pick questions</think>\n```json\n{\"questions\":[{\"id\":\"days\",\"type\":\"number\",\"label\":\"How many days?\",\"required\":true},{\"id\":\"signs\",\"type\":\"checkbox\",\"label\":\"Signs\",\"options\":[\"Swelling\",\"Bleeding\"]}]}\n```".to_string()
}

fn cards_reply() -> String {
    json!({
        "diagnosis": {
            "title": "Possible diagnosis",
            "likely_condition": "Soft tissue sprain",
            "other_possibilities": [{ "name": "Paw injury", "likelihood": "Medium" }],
            "urgency": { "badge": "Monitor", "level": "low", "note": "See a vet if it lasts 48h" }
        },
        "care": { "title": "Care at home", "tips": [{ "icon": "rest", "text": "Limit activity" }] },
        "costs": { "title": "Estimated costs", "steps": [] }
    })
    .to_string()
}

#[tokio::test]
async fn limping_case_end_to_end() {
    let llm = ScriptedLLM::with(vec![Ok(questions_reply()), Ok(cards_reply())]);
    let use_case = use_case(llm.clone()).await;

    let case_id = use_case
        .create_case(&NewCase::new("limping", "/x.jpg"))
        .await
        .unwrap();
    assert!(!case_id.is_empty());

    let questions = use_case.get_questions(&case_id).await.unwrap();
    assert_eq!(questions.len(), 2);
    assert!(questions[1].is_multi_select());

    let answers = json!({ "days": 2, "signs": ["Swelling"] })
        .as_object()
        .cloned();
    let cards = use_case.submit_results(&case_id, answers).await.unwrap();
    assert_eq!(cards.likely_condition(), Some("Soft tissue sprain"));
    assert!(cards.diagnosis.is_object());
    assert!(cards.care.is_object());
    assert!(cards.costs.is_object());

    let calls = llm.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1.as_deref(), Some("https://hellodogtor.com/x.jpg"));
    assert!(calls[1].0.contains("- How many days?: 2"));
    assert!(calls[1].0.contains("- Signs: Swelling"));

    assert_eq!(use_case.get_results(&case_id).await.unwrap(), cards);
    let case = use_case.get_case(&case_id).await.unwrap();
    assert_eq!(case.status, CaseStatus::Resolved);
}

#[tokio::test]
async fn create_case_rejects_empty_intake() {
    let llm = ScriptedLLM::with(vec![]);
    let use_case = use_case(llm.clone()).await;

    let err = use_case
        .create_case(&NewCase::new("  ", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(use_case.list_cases().await.unwrap().is_empty());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn empty_questions_allow_skip_to_results() {
    let llm = ScriptedLLM::with(vec![Ok("{\"questions\": []}".to_string()), Ok(cards_reply())]);
    let use_case = use_case(llm.clone()).await;
    let case_id = use_case
        .create_case(&NewCase::new("not eating", ""))
        .await
        .unwrap();

    let questions = use_case.get_questions(&case_id).await.unwrap();
    assert!(questions.is_empty());

    let cards = use_case.submit_results(&case_id, None).await.unwrap();
    assert_eq!(cards.likely_condition(), Some("Soft tissue sprain"));

    let calls = llm.calls.lock().unwrap().clone();
    assert_eq!(calls[0].1, None);
    assert!(calls[1].0.contains("skipped"));
}

#[tokio::test]
async fn questions_are_generated_once() {
    let llm = ScriptedLLM::with(vec![Ok(questions_reply())]);
    let use_case = use_case(llm.clone()).await;
    let case_id = use_case
        .create_case(&NewCase::new("limping", ""))
        .await
        .unwrap();

    let first = use_case.get_questions(&case_id).await.unwrap();
    let second = use_case.get_questions(&case_id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn unknown_case_is_not_found() {
    let llm = ScriptedLLM::with(vec![]);
    let use_case = use_case(llm.clone()).await;

    assert!(matches!(
        use_case.get_questions("missing").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        use_case.submit_results("missing", None).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        use_case.get_results("missing").await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn results_not_found_until_resolved() {
    let llm = ScriptedLLM::with(vec![]);
    let use_case = use_case(llm).await;
    let case_id = use_case
        .create_case(&NewCase::new("limping", ""))
        .await
        .unwrap();

    assert!(matches!(
        use_case.get_results(&case_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn model_failures_surface_as_upstream_errors() {
    let llm = ScriptedLLM::with(vec![
        Ok("I am not sure what to ask.".to_string()),
        Ok("[1, 2, 3]".to_string()),
    ]);
    let use_case = use_case(llm).await;
    let case_id = use_case
        .create_case(&NewCase::new("limping", ""))
        .await
        .unwrap();

    let err = use_case.get_questions(&case_id).await.unwrap_err();
    assert!(err.is_upstream());
    assert_eq!(
        use_case.get_case(&case_id).await.unwrap().status,
        CaseStatus::Created
    );

    let err = use_case.submit_results(&case_id, None).await.unwrap_err();
    assert!(err.is_upstream());
    let case = use_case.get_case(&case_id).await.unwrap();
    assert_eq!(case.status, CaseStatus::Created);
    assert_eq!(case.answers, None);
    assert_eq!(case.cards, None);
    assert!(matches!(
        use_case.get_results(&case_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn failed_resubmit_keeps_earlier_results() {
    let llm = ScriptedLLM::with(vec![
        Ok(cards_reply()),
        Err(AppError::LLMError("timeout".to_string())),
        Ok("not json at all".to_string()),
    ]);
    let use_case = use_case(llm).await;
    let case_id = use_case
        .create_case(&NewCase::new("limping", ""))
        .await
        .unwrap();
    let answers = json!({ "days": 2 }).as_object().cloned();
    let cards = use_case
        .submit_results(&case_id, answers.clone())
        .await
        .unwrap();
    let resolved = use_case.get_case(&case_id).await.unwrap();

    let retry = json!({ "days": 5 }).as_object().cloned();
    let err = use_case.submit_results(&case_id, retry).await.unwrap_err();
    assert!(err.is_upstream());
    let err = use_case.submit_results(&case_id, None).await.unwrap_err();
    assert!(err.is_upstream());

    let case = use_case.get_case(&case_id).await.unwrap();
    assert_eq!(case.status, CaseStatus::Resolved);
    assert_eq!(case.answers, answers);
    assert_eq!(case.updated_at, resolved.updated_at);
    assert_eq!(use_case.get_results(&case_id).await.unwrap(), cards);
}

#[tokio::test]
async fn list_cases_summarizes_newest_first() {
    let llm = ScriptedLLM::with(vec![Ok(cards_reply())]);
    let use_case = use_case(llm).await;
    let first = use_case
        .create_case(&NewCase::new("limping", ""))
        .await
        .unwrap();
    use_case.submit_results(&first, None).await.unwrap();
    let second = use_case
        .create_case(&NewCase::new("itching", ""))
        .await
        .unwrap();

    let summaries = use_case.list_cases().await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].case_id, second);
    assert_eq!(summaries[0].summary_line, "Analysis pending");
    assert_eq!(summaries[1].summary_line, "Soft tissue sprain");
}
