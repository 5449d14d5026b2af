use crate::domain::error::{AppError, Result};
use crate::domain::profile::UserProfile;
use sqlx::SqlitePool;

pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let entity = sqlx::query_as::<_, ProfileEntity>(
            "SELECT user_id, first_name, last_name, pet_name, pet_breed, pet_birth_month, pet_birth_year, pet_gender, updated_at
             FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch profile: {e}")))?;

        Ok(entity.map(UserProfile::from))
    }

    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO profiles (user_id, first_name, last_name, pet_name, pet_breed, pet_birth_month, pet_birth_year, pet_gender, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                pet_name = excluded.pet_name,
                pet_breed = excluded.pet_breed,
                pet_birth_month = excluded.pet_birth_month,
                pet_birth_year = excluded.pet_birth_year,
                pet_gender = excluded.pet_gender,
                updated_at = excluded.updated_at",
        )
        .bind(&profile.user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.pet_name)
        .bind(&profile.pet_breed)
        .bind(profile.pet_birth_month.map(i64::from))
        .bind(profile.pet_birth_year.map(i64::from))
        .bind(&profile.pet_gender)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to save profile: {e}")))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProfileEntity {
    user_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    pet_name: Option<String>,
    pet_breed: Option<String>,
    pet_birth_month: Option<i64>,
    pet_birth_year: Option<i64>,
    pet_gender: Option<String>,
    updated_at: i64,
}

impl From<ProfileEntity> for UserProfile {
    fn from(e: ProfileEntity) -> Self {
        Self {
            user_id: e.user_id,
            first_name: e.first_name,
            last_name: e.last_name,
            pet_name: e.pet_name,
            pet_breed: e.pet_breed,
            pet_birth_month: e.pet_birth_month.and_then(|m| u32::try_from(m).ok()),
            pet_birth_year: e.pet_birth_year.and_then(|y| i32::try_from(y).ok()),
            pet_gender: e.pet_gender,
            updated_at: e.updated_at,
        }
    }
}
