use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{DiagnoseUseCase, PetsUseCase, ProfileUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::cases::CaseRepository;
use crate::infrastructure::db::pets::PetRepository;
use crate::infrastructure::db::profiles::ProfileRepository;
use crate::infrastructure::db::sqlite::init_pool;
use crate::infrastructure::identity::{DemoIdentity, IdentityProvider, RemoteIdentity};
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::interfaces::http::HttpState;

/// Wires the database, model client, identity provider and use cases.
pub async fn build_state(config: &AppConfig) -> Result<HttpState> {
    let pool = init_pool(&config.database_url).await?;
    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new());
    build_state_with(config, pool, llm_client).await
}

/// Same as [`build_state`] with an injected pool and model client.
pub async fn build_state_with(
    config: &AppConfig,
    pool: sqlx::SqlitePool,
    llm_client: Arc<dyn LLMClient + Send + Sync>,
) -> Result<HttpState> {
    if config.llm.api_key.is_none() {
        warn!(
            provider = ?config.llm.provider,
            env = config.llm.api_key_env(),
            "No model API key configured; diagnosis calls will fail"
        );
    }

    let pet_repository = Arc::new(PetRepository::new(pool.clone()));
    let seeded = pet_repository.seed_vet_clinics().await?;
    if seeded > 0 {
        info!(count = seeded, "Seeded sample vet clinics");
    }

    let identity = identity_provider(config);

    Ok(HttpState {
        diagnose_use_case: Arc::new(DiagnoseUseCase::new(
            llm_client,
            Arc::new(CaseRepository::new(pool.clone())),
            config.llm.clone(),
            config.public_base_url.clone(),
        )),
        pets_use_case: Arc::new(PetsUseCase::new(pet_repository)),
        profile_use_case: Arc::new(ProfileUseCase::new(
            identity,
            Arc::new(ProfileRepository::new(pool)),
        )),
    })
}

fn identity_provider(config: &AppConfig) -> Arc<dyn IdentityProvider + Send + Sync> {
    match (&config.auth.provider_url, config.auth.demo_mode) {
        (Some(url), false) => Arc::new(RemoteIdentity::new(url.clone(), config.auth.api_key.clone())),
        (None, false) => {
            warn!("No auth provider configured; falling back to demo identity");
            Arc::new(DemoIdentity)
        }
        (_, true) => {
            info!("Demo mode enabled; serving the demo identity");
            Arc::new(DemoIdentity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_state_and_seeds_clinics_once() {
        let mut config = AppConfig::default();
        config.database_url = "sqlite::memory:".to_string();
        config.auth.demo_mode = true;
        let pool = init_pool(&config.database_url).await.unwrap();
        let llm: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new());

        let state = build_state_with(&config, pool.clone(), llm.clone()).await.unwrap();
        let _again = build_state_with(&config, pool, llm).await.unwrap();

        assert_eq!(state.pets_use_case.list_vet_clinics().await.unwrap().len(), 2);
        let current = state.profile_use_case.current_user(None).await.unwrap();
        assert!(current.user.demo);
    }
}
