use crate::domain::case::{Case, CaseStatus, ResultCards};
use crate::domain::error::{AppError, Result};
use crate::domain::question::Question;
use crate::infrastructure::db::sqlite::{from_json_text, to_json_text};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

const CASE_COLUMNS: &str =
    "id, symptoms, image_url, status, questions_json, answers_json, cards_json, created_at, updated_at";

pub struct CaseRepository {
    pool: SqlitePool,
}

impl CaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_case(&self, case: &Case) -> Result<()> {
        sqlx::query(
            "INSERT INTO cases (id, symptoms, image_url, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&case.id)
        .bind(&case.symptoms)
        .bind(&case.image_url)
        .bind(case.status.as_str())
        .bind(case.created_at)
        .bind(case.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert case: {e}")))?;

        Ok(())
    }

    pub async fn get_case(&self, case_id: &str) -> Result<Case> {
        let entity = sqlx::query_as::<_, CaseEntity>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = ?"
        ))
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch case: {e}")))?;

        match entity {
            Some(entity) => entity.try_into(),
            None => Err(AppError::NotFound(format!("Case not found: {}", case_id))),
        }
    }

    pub async fn list_cases(&self, limit: i64) -> Result<Vec<Case>> {
        let entities = sqlx::query_as::<_, CaseEntity>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases ORDER BY created_at DESC, rowid DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list cases: {e}")))?;

        entities.into_iter().map(Case::try_from).collect()
    }

    pub async fn save_questions(&self, case_id: &str, questions: &[Question]) -> Result<()> {
        let result = sqlx::query(
            "UPDATE cases SET questions_json = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(to_json_text(&questions)?)
        .bind(CaseStatus::Questioned.as_str())
        .bind(now_millis())
        .bind(case_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to save questions: {e}")))?;

        ensure_updated(result.rows_affected(), case_id)
    }

    /// Stores the answers (or the skip) together with the result cards and
    /// marks the case resolved in one statement.
    pub async fn save_resolution(
        &self,
        case_id: &str,
        answers: Option<&Map<String, Value>>,
        cards: &ResultCards,
    ) -> Result<()> {
        let answers_json = answers.map(to_json_text).transpose()?;

        let result = sqlx::query(
            "UPDATE cases SET answers_json = ?, cards_json = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(answers_json)
        .bind(to_json_text(cards)?)
        .bind(CaseStatus::Resolved.as_str())
        .bind(now_millis())
        .bind(case_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to save results: {e}")))?;

        ensure_updated(result.rows_affected(), case_id)
    }
}

fn ensure_updated(rows: u64, case_id: &str) -> Result<()> {
    if rows == 0 {
        return Err(AppError::NotFound(format!("Case not found: {}", case_id)));
    }
    Ok(())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(sqlx::FromRow)]
struct CaseEntity {
    id: String,
    symptoms: Option<String>,
    image_url: Option<String>,
    status: String,
    questions_json: Option<String>,
    answers_json: Option<String>,
    cards_json: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CaseEntity> for Case {
    type Error = AppError;

    fn try_from(entity: CaseEntity) -> Result<Self> {
        Ok(Self {
            status: entity.status.parse()?,
            questions: from_json_text("questions_json", entity.questions_json)?,
            answers: from_json_text("answers_json", entity.answers_json)?,
            cards: from_json_text("cards_json", entity.cards_json)?,
            id: entity.id,
            symptoms: entity.symptoms,
            image_url: entity.image_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::case::NewCase;
    use crate::infrastructure::db::sqlite::init_pool;
    use serde_json::json;

    async fn repository() -> CaseRepository {
        CaseRepository::new(init_pool("sqlite::memory:").await.unwrap())
    }

    #[tokio::test]
    async fn walks_the_case_lifecycle() {
        let repo = repository().await;
        let case = Case::from_intake(&NewCase::new("limping", "/x.jpg"));
        repo.insert_case(&case).await.unwrap();

        let stored = repo.get_case(&case.id).await.unwrap();
        assert_eq!(stored, case);

        let questions = Question::from_model_value(&json!([
            { "id": "days", "type": "number", "label": "Days?" }
        ]));
        repo.save_questions(&case.id, &questions).await.unwrap();
        let stored = repo.get_case(&case.id).await.unwrap();
        assert_eq!(stored.status, CaseStatus::Questioned);
        assert_eq!(stored.questions.as_deref(), Some(questions.as_slice()));

        let answers = json!({ "days": 3 }).as_object().cloned().unwrap();
        let cards = ResultCards::from_model_value(json!({ "diagnosis": { "likely_condition": "Sprain" } })).unwrap();
        repo.save_resolution(&case.id, Some(&answers), &cards).await.unwrap();
        let stored = repo.get_case(&case.id).await.unwrap();
        assert_eq!(stored.status, CaseStatus::Resolved);
        assert_eq!(stored.cards, Some(cards));
        assert_eq!(stored.answers, Some(answers));
    }

    #[tokio::test]
    async fn skipped_resolution_clears_answers() {
        let repo = repository().await;
        let case = Case::from_intake(&NewCase::new("", "/x.jpg"));
        repo.insert_case(&case).await.unwrap();
        let answers = json!({ "days": 3 }).as_object().cloned().unwrap();
        let cards = ResultCards::from_model_value(json!({})).unwrap();
        repo.save_resolution(&case.id, Some(&answers), &cards).await.unwrap();

        repo.save_resolution(&case.id, None, &cards).await.unwrap();
        let stored = repo.get_case(&case.id).await.unwrap();
        assert_eq!(stored.status, CaseStatus::Resolved);
        assert_eq!(stored.answers, None);
    }

    #[tokio::test]
    async fn unknown_case_is_not_found() {
        let repo = repository().await;
        assert!(matches!(repo.get_case("missing").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.save_questions("missing", &[]).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn lists_most_recent_first() {
        let repo = repository().await;
        let mut first = Case::from_intake(&NewCase::new("a", ""));
        first.created_at = 1;
        let mut second = Case::from_intake(&NewCase::new("b", ""));
        second.created_at = 2;
        repo.insert_case(&first).await.unwrap();
        repo.insert_case(&second).await.unwrap();

        let cases = repo.list_cases(10).await.unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].id, second.id);
    }
}
