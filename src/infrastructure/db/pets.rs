use crate::domain::error::{AppError, Result};
use crate::domain::pet::{Assessment, NewAssessment, NewPet, Pet, VetClinic};
use crate::infrastructure::db::sqlite::{from_json_text, to_json_text};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Owner id used when a pet is created without an authenticated owner.
pub const DEFAULT_OWNER: &str = "default";

/// Pets, assessments and vet clinics. Plain create/read, no business rules.
pub struct PetRepository {
    pool: SqlitePool,
}

impl PetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_pet(&self, input: &NewPet) -> Result<Pet> {
        let pet = Pet {
            id: Uuid::new_v4().to_string(),
            owner_id: input
                .owner_id
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OWNER.to_string()),
            name: input.name.trim().to_string(),
            breed: input.breed.clone(),
            birth_month: input.birth_month,
            birth_year: input.birth_year,
            gender: input.gender.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        sqlx::query(
            "INSERT INTO pets (id, owner_id, name, breed, birth_month, birth_year, gender, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&pet.id)
        .bind(&pet.owner_id)
        .bind(&pet.name)
        .bind(&pet.breed)
        .bind(pet.birth_month.map(i64::from))
        .bind(pet.birth_year.map(i64::from))
        .bind(&pet.gender)
        .bind(pet.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create pet: {e}")))?;

        Ok(pet)
    }

    pub async fn get_pet(&self, pet_id: &str) -> Result<Pet> {
        sqlx::query_as::<_, PetEntity>(
            "SELECT id, owner_id, name, breed, birth_month, birth_year, gender, created_at
             FROM pets WHERE id = ?",
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch pet: {e}")))?
        .map(Pet::from)
        .ok_or_else(|| AppError::NotFound(format!("Pet not found: {}", pet_id)))
    }

    pub async fn list_pets(&self, owner_id: &str) -> Result<Vec<Pet>> {
        let pets = sqlx::query_as::<_, PetEntity>(
            "SELECT id, owner_id, name, breed, birth_month, birth_year, gender, created_at
             FROM pets WHERE owner_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list pets: {e}")))?;

        Ok(pets.into_iter().map(Pet::from).collect())
    }

    pub async fn create_assessment(&self, input: &NewAssessment) -> Result<Assessment> {
        let assessment = Assessment {
            id: Uuid::new_v4().to_string(),
            pet_id: input.pet_id.clone(),
            symptoms: input.symptoms.clone(),
            image_url: input.image_url.clone(),
            urgency: input.urgency.clone(),
            triage: input.triage.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        let triage_json = assessment.triage.as_ref().map(to_json_text).transpose()?;

        sqlx::query(
            "INSERT INTO assessments (id, pet_id, symptoms, image_url, urgency, triage_json, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&assessment.id)
        .bind(&assessment.pet_id)
        .bind(&assessment.symptoms)
        .bind(&assessment.image_url)
        .bind(&assessment.urgency)
        .bind(triage_json)
        .bind(assessment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create assessment: {e}")))?;

        Ok(assessment)
    }

    /// Assessments for one pet, newest first.
    pub async fn list_assessments(&self, pet_id: &str) -> Result<Vec<Assessment>> {
        let entities = sqlx::query_as::<_, AssessmentEntity>(
            "SELECT id, pet_id, symptoms, image_url, urgency, triage_json, created_at
             FROM assessments WHERE pet_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list assessments: {e}")))?;

        entities.into_iter().map(Assessment::try_from).collect()
    }

    pub async fn list_vet_clinics(&self) -> Result<Vec<VetClinic>> {
        let clinics = sqlx::query_as::<_, VetClinicEntity>(
            "SELECT id, name, address, phone, rating, distance, status FROM vet_clinics ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list vet clinics: {e}")))?;

        Ok(clinics.into_iter().map(VetClinic::from).collect())
    }

    /// Inserts the sample clinics when the table is empty.
    pub async fn seed_vet_clinics(&self) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vet_clinics")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count vet clinics: {e}")))?;
        if count > 0 {
            return Ok(0);
        }

        let samples = [
            (
                "Valley Animal Hospital",
                "123 Oak Street, Springfield",
                "(555) 123-4567",
                "4.8",
                "0.8 miles",
                "open",
            ),
            (
                "Pet Care Central",
                "456 Main Ave, Springfield",
                "(555) 987-6543",
                "4.6",
                "1.2 miles",
                "busy",
            ),
        ];
        for (name, address, phone, rating, distance, status) in samples {
            sqlx::query(
                "INSERT INTO vet_clinics (id, name, address, phone, rating, distance, status)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .bind(address)
            .bind(phone)
            .bind(rating)
            .bind(distance)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to seed vet clinic: {e}")))?;
        }

        Ok(samples.len())
    }
}

#[derive(sqlx::FromRow)]
struct PetEntity {
    id: String,
    owner_id: String,
    name: String,
    breed: Option<String>,
    birth_month: Option<i64>,
    birth_year: Option<i64>,
    gender: Option<String>,
    created_at: i64,
}

impl From<PetEntity> for Pet {
    fn from(e: PetEntity) -> Self {
        Self {
            id: e.id,
            owner_id: e.owner_id,
            name: e.name,
            breed: e.breed,
            birth_month: e.birth_month.and_then(|m| u32::try_from(m).ok()),
            birth_year: e.birth_year.and_then(|y| i32::try_from(y).ok()),
            gender: e.gender,
            created_at: e.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssessmentEntity {
    id: String,
    pet_id: String,
    symptoms: String,
    image_url: Option<String>,
    urgency: Option<String>,
    triage_json: Option<String>,
    created_at: i64,
}

impl TryFrom<AssessmentEntity> for Assessment {
    type Error = AppError;

    fn try_from(e: AssessmentEntity) -> Result<Self> {
        Ok(Self {
            triage: from_json_text("triage_json", e.triage_json)?,
            id: e.id,
            pet_id: e.pet_id,
            symptoms: e.symptoms,
            image_url: e.image_url,
            urgency: e.urgency,
            created_at: e.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VetClinicEntity {
    id: String,
    name: String,
    address: String,
    phone: String,
    rating: Option<String>,
    distance: Option<String>,
    status: Option<String>,
}

impl From<VetClinicEntity> for VetClinic {
    fn from(e: VetClinicEntity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            address: e.address,
            phone: e.phone,
            rating: e.rating,
            distance: e.distance,
            status: e.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::sqlite::init_pool;
    use serde_json::json;

    async fn repository() -> PetRepository {
        PetRepository::new(init_pool("sqlite::memory:").await.unwrap())
    }

    fn new_pet(name: &str) -> NewPet {
        serde_json::from_value(json!({ "name": name, "breed": "Beagle", "birthMonth": 4 })).unwrap()
    }

    #[tokio::test]
    async fn creates_and_reads_pets() {
        let repo = repository().await;
        let pet = repo.create_pet(&new_pet(" Rex ")).await.unwrap();
        assert_eq!(pet.name, "Rex");
        assert_eq!(pet.owner_id, DEFAULT_OWNER);

        assert_eq!(repo.get_pet(&pet.id).await.unwrap(), pet);
        assert_eq!(repo.list_pets(DEFAULT_OWNER).await.unwrap(), vec![pet]);
        assert!(repo.list_pets("someone-else").await.unwrap().is_empty());
        assert!(matches!(repo.get_pet("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn assessments_are_listed_newest_first() {
        let repo = repository().await;
        let pet = repo.create_pet(&new_pet("Rex")).await.unwrap();
        for symptoms in ["cough", "limp"] {
            let input: NewAssessment = serde_json::from_value(json!({
                "petId": pet.id, "symptoms": symptoms, "triage": { "urgency_level": "Low" }
            }))
            .unwrap();
            repo.create_assessment(&input).await.unwrap();
        }

        let listed = repo.list_assessments(&pet.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].symptoms, "limp");
        assert_eq!(listed[0].triage, Some(json!({ "urgency_level": "Low" })));
    }

    #[tokio::test]
    async fn seeds_clinics_once() {
        let repo = repository().await;
        assert_eq!(repo.seed_vet_clinics().await.unwrap(), 2);
        assert_eq!(repo.seed_vet_clinics().await.unwrap(), 0);
        let clinics = repo.list_vet_clinics().await.unwrap();
        assert_eq!(clinics.len(), 2);
        assert_eq!(clinics[0].name, "Pet Care Central");
    }
}
