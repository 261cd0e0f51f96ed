use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::db;
use crate::users::repo::{PgUserRepo, UserRepo};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database).await?;
        db::migrate(&pool).await;

        let users = Arc::new(PgUserRepo::new(pool)) as Arc<dyn UserRepo>;
        Ok(Self::from_parts(users, JwtKeys::from_config(&config.jwt)))
    }

    pub fn from_parts(users: Arc<dyn UserRepo>, jwt: JwtKeys) -> Self {
        Self { users, jwt }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::users::memory::MemoryUserRepo;

        Self::from_parts(
            Arc::new(MemoryUserRepo::default()),
            JwtKeys::new("test-secret", std::time::Duration::from_secs(60 * 60)),
        )
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
