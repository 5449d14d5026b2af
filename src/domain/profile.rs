use chrono::Datelike;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identity as reported by the external auth provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub pet_name: Option<String>,
    pub pet_breed: Option<String>,
    pub pet_birth_month: Option<u32>,
    pub pet_birth_year: Option<i32>,
    pub pet_gender: Option<String>,
    pub updated_at: i64,
}

impl UserProfile {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Pet name, breed, birth month and birth year are all present.
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.trim().is_empty());
        filled(&self.pet_name)
            && filled(&self.pet_breed)
            && self.pet_birth_month.is_some()
            && self.pet_birth_year.is_some()
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self.first_name = clean(update.first_name);
        self.last_name = clean(update.last_name);
        self.pet_name = clean(update.pet_name);
        self.pet_breed = clean(update.pet_breed);
        self.pet_birth_month = update.pet_birth_month;
        self.pet_birth_year = update.pet_birth_year;
        self.pet_gender = clean(update.pet_gender);
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    pub fn pet_age(&self, today: chrono::NaiveDate) -> Option<String> {
        Some(format_pet_age(
            self.pet_birth_month?,
            self.pet_birth_year?,
            today,
        ))
    }

    /// Fixed profile served in demo mode.
    pub fn demo(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            first_name: Some("Demo".to_string()),
            last_name: Some("User".to_string()),
            pet_name: Some("Buddy".to_string()),
            pet_breed: Some("Mixed Breed".to_string()),
            pet_birth_month: Some(6),
            pet_birth_year: Some(2020),
            pet_gender: Some("Male".to_string()),
            updated_at: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub pet_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub pet_breed: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 12))]
    pub pet_birth_month: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 1980, max = 2100))]
    pub pet_birth_year: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub pet_gender: Option<String>,
}

/// Human-readable age from a birth month (1-12) and year, as of `today`.
pub fn format_pet_age(birth_month: u32, birth_year: i32, today: chrono::NaiveDate) -> String {
    let mut years = today.year() - birth_year;
    let mut months = today.month() as i32 - birth_month as i32;
    if months < 0 {
        years -= 1;
        months += 12;
    }

    if years > 0 {
        if months > 0 {
            format!("{} years, {} months", years, months)
        } else {
            format!("{} years", years)
        }
    } else if months > 0 {
        format!("{} months", months)
    } else {
        "Less than 1 month".to_string()
    }
}
