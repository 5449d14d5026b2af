use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub breed: Option<String>,
    pub birth_month: Option<u32>,
    pub birth_year: Option<i32>,
    pub gender: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    #[serde(default)]
    pub owner_id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub breed: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 12))]
    pub birth_month: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 1980, max = 2100))]
    pub birth_year: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub pet_id: String,
    pub symptoms: String,
    pub image_url: Option<String>,
    pub urgency: Option<String>,
    pub triage: Option<Value>,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAssessment {
    #[validate(length(min = 1))]
    pub pet_id: String,
    #[validate(length(min = 1, max = 4096))]
    pub symptoms: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub urgency: Option<String>,
    #[serde(default)]
    pub triage: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VetClinic {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub rating: Option<String>,
    pub distance: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_pet_validates_ranges() {
        let pet: NewPet = serde_json::from_value(json!({
            "name": "Buddy", "birthMonth": 13, "birthYear": 2020
        }))
        .unwrap();
        assert!(pet.validate().is_err());

        let pet: NewPet = serde_json::from_value(json!({ "name": "Buddy", "birthMonth": 6 })).unwrap();
        assert!(pet.validate().is_ok());
    }

    #[test]
    fn new_assessment_requires_symptoms() {
        let assessment: NewAssessment =
            serde_json::from_value(json!({ "petId": "p1", "symptoms": "" })).unwrap();
        assert!(assessment.validate().is_err());
    }
}
