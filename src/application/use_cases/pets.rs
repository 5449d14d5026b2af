use crate::domain::error::Result;
use crate::domain::pet::{Assessment, NewAssessment, NewPet, Pet, VetClinic};
use crate::infrastructure::db::pets::{PetRepository, DEFAULT_OWNER};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Plain pet, assessment and clinic records.
pub struct PetsUseCase {
    repository: Arc<PetRepository>,
}

impl PetsUseCase {
    pub fn new(repository: Arc<PetRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_pet(&self, input: NewPet) -> Result<Pet> {
        input.validate()?;
        let pet = self.repository.create_pet(&input).await?;
        info!(pet_id = %pet.id, owner_id = %pet.owner_id, "Pet created");
        Ok(pet)
    }

    pub async fn get_pet(&self, pet_id: &str) -> Result<Pet> {
        self.repository.get_pet(pet_id).await
    }

    pub async fn list_pets(&self, owner_id: Option<&str>) -> Result<Vec<Pet>> {
        let owner_id = owner_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_OWNER);
        self.repository.list_pets(owner_id).await
    }

    pub async fn create_assessment(&self, input: NewAssessment) -> Result<Assessment> {
        input.validate()?;
        let assessment = self.repository.create_assessment(&input).await?;
        info!(assessment_id = %assessment.id, pet_id = %assessment.pet_id, "Assessment recorded");
        Ok(assessment)
    }

    pub async fn list_assessments(&self, pet_id: &str) -> Result<Vec<Assessment>> {
        self.repository.list_assessments(pet_id).await
    }

    pub async fn list_vet_clinics(&self) -> Result<Vec<VetClinic>> {
        self.repository.list_vet_clinics().await
    }
}
