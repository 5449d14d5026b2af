use crate::domain::error::Result;
use crate::domain::profile::{Identity, ProfileUpdate, UserProfile};
use crate::infrastructure::db::profiles::ProfileRepository;
use crate::infrastructure::identity::IdentityProvider;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user: Identity,
    #[serde(flatten)]
    pub view: ProfileView,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub profile: UserProfile,
    pub profile_complete: bool,
    /// "2 years, 3 months" style age; `None` until birth month and year are set.
    pub pet_age: Option<String>,
}

impl ProfileView {
    pub fn new(profile: UserProfile, today: chrono::NaiveDate) -> Self {
        Self {
            profile_complete: profile.is_complete(),
            pet_age: profile.pet_age(today),
            profile,
        }
    }
}

pub struct ProfileUseCase {
    identity: Arc<dyn IdentityProvider + Send + Sync>,
    repository: Arc<ProfileRepository>,
}

impl ProfileUseCase {
    pub fn new(
        identity: Arc<dyn IdentityProvider + Send + Sync>,
        repository: Arc<ProfileRepository>,
    ) -> Self {
        Self {
            identity,
            repository,
        }
    }

    pub async fn current_user(&self, token: Option<&str>) -> Result<CurrentUser> {
        let user = self.identity.resolve(token).await?;
        let profile = self.load_profile(&user).await?;
        Ok(CurrentUser {
            user,
            view: ProfileView::new(profile, today()),
        })
    }

    pub async fn update_profile(
        &self,
        token: Option<&str>,
        update: ProfileUpdate,
    ) -> Result<ProfileView> {
        update.validate()?;
        let user = self.identity.resolve(token).await?;

        let mut profile = self.load_profile(&user).await?;
        profile.apply(update);
        self.repository.upsert_profile(&profile).await?;

        info!(
            user_id = %user.id,
            complete = profile.is_complete(),
            "Profile updated"
        );
        Ok(ProfileView::new(profile, today()))
    }

    /// Stored profile, or the fixed demo profile, or an empty one.
    async fn load_profile(&self, user: &Identity) -> Result<UserProfile> {
        Ok(match self.repository.find_profile(&user.id).await? {
            Some(profile) => profile,
            None if user.demo => UserProfile::demo(&user.id),
            None => UserProfile::empty(&user.id),
        })
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::infrastructure::db::sqlite::init_pool;
    use crate::infrastructure::identity::{DemoIdentity, DEMO_USER_ID};
    use async_trait::async_trait;

    struct TokenIdentity;

    #[async_trait]
    impl IdentityProvider for TokenIdentity {
        async fn resolve(&self, token: Option<&str>) -> Result<Identity> {
            match token {
                Some(token) => Ok(Identity {
                    id: format!("user-{}", token),
                    email: None,
                    full_name: None,
                    demo: false,
                }),
                None => Err(AppError::Unauthorized("Missing bearer token".to_string())),
            }
        }
    }

    async fn use_case(identity: Arc<dyn IdentityProvider + Send + Sync>) -> ProfileUseCase {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        ProfileUseCase::new(identity, Arc::new(ProfileRepository::new(pool)))
    }

    #[tokio::test]
    async fn demo_user_gets_complete_demo_profile() {
        let use_case = use_case(Arc::new(DemoIdentity)).await;
        let current = use_case.current_user(None).await.unwrap();
        assert_eq!(current.user.id, DEMO_USER_ID);
        assert_eq!(current.view.profile.pet_name.as_deref(), Some("Buddy"));
        assert!(current.view.profile_complete);
        assert!(current.view.pet_age.is_some());
    }

    #[tokio::test]
    async fn new_user_starts_incomplete_until_updated() {
        let use_case = use_case(Arc::new(TokenIdentity)).await;
        let current = use_case.current_user(Some("a")).await.unwrap();
        assert_eq!(current.view.profile.user_id, "user-a");
        assert!(!current.view.profile_complete);
        assert_eq!(current.view.pet_age, None);

        let view = use_case
            .update_profile(
                Some("a"),
                ProfileUpdate {
                    pet_name: Some("Rex".into()),
                    pet_breed: Some("Beagle".into()),
                    pet_birth_month: Some(4),
                    pet_birth_year: Some(2021),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(view.profile_complete);
        assert!(view.pet_age.is_some());
        assert!(use_case.current_user(Some("a")).await.unwrap().view.profile_complete);
    }

    #[test]
    fn view_reports_pet_age() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let view = ProfileView::new(UserProfile::demo("d"), today);
        assert_eq!(view.pet_age.as_deref(), Some("6 years, 4 months"));
        assert_eq!(ProfileView::new(UserProfile::empty("e"), today).pet_age, None);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let use_case = use_case(Arc::new(TokenIdentity)).await;
        assert!(matches!(
            use_case.current_user(None).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn invalid_update_is_rejected() {
        let use_case = use_case(Arc::new(TokenIdentity)).await;
        let err = use_case
            .update_profile(
                Some("a"),
                ProfileUpdate {
                    pet_birth_month: Some(13),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
