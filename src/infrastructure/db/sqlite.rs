use crate::domain::error::{AppError, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const SCHEMA: &str = include_str!("../../../resources/schema.sql");

/// Opens the pool and applies the schema.
///
/// In-memory URLs get a single, never-recycled connection so every query
/// sees the same database.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse connection string: {}", e)))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

    apply_schema(&pool).await?;
    info!(database_url, "Database ready");

    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA.split(';') {
        let stmt = statement.trim();
        if stmt.is_empty() {
            continue;
        }
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema statement: {}", e)))?;
    }
    Ok(())
}

pub(crate) fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize column: {}", e)))
}

pub(crate) fn from_json_text<T: serde::de::DeserializeOwned>(
    column: &str,
    text: Option<String>,
) -> Result<Option<T>> {
    text.map(|raw| {
        serde_json::from_str(&raw).map_err(|e| {
            AppError::DatabaseError(format!("Corrupt JSON in column {}: {}", column, e))
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_has_schema() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('cases', 'pets', 'assessments', 'vet_clinics', 'profiles')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn schema_is_reapplicable() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        apply_schema(&pool).await.unwrap();
    }

    #[test]
    fn json_columns_round_trip() {
        let text = to_json_text(&vec!["a", "b"]).unwrap();
        let back: Option<Vec<String>> = from_json_text("c", Some(text)).unwrap();
        assert_eq!(back, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(from_json_text::<Vec<String>>("c", Some("{".into())).is_err());
        assert_eq!(from_json_text::<Vec<String>>("c", None).unwrap(), None);
    }
}
