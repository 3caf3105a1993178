use crate::core::code::{generate_user_code, normalize_code};
use crate::models::{Answer, UserData, UserInfo};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::firestore::{FirestoreClient, FirestoreError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Store(#[from] FirestoreError),

    #[error("Could not allocate a free code after {0} attempts")]
    CodeSpaceExhausted(u32),
}

/// Users collection with the cache in front of it
///
/// Reads go through the cache and fall back to Firestore; cache failures are
/// logged and never fail a request. Writes go to Firestore first and then
/// drop every cached view of the record.
pub struct UserDirectory {
    store: Arc<FirestoreClient>,
    cache: Option<Arc<CacheManager>>,
}

impl UserDirectory {
    pub fn new(store: Arc<FirestoreClient>, cache: Option<Arc<CacheManager>>) -> Self {
        Self { store, cache }
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn remember<T: Serialize>(&self, key: &str, value: &T) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(key, value).await {
                tracing::warn!("Cache write failed for {}: {}", key, e);
            }
        }
    }

    async fn forget(&self, keys: Vec<String>) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(&keys).await {
                tracing::warn!("Cache invalidation failed: {}", e);
            }
        }
    }

    /// Every submitted record
    pub async fn archive(&self) -> Result<Vec<UserData>, DirectoryError> {
        let key = CacheKey::archive();
        if let Some(archive) = self.cached::<Vec<UserData>>(&key).await {
            return Ok(archive);
        }

        let archive = self.store.list_users().await?;
        self.remember(&key, &archive).await;
        Ok(archive)
    }

    pub async fn by_uid(&self, uid: &str) -> Result<Option<UserData>, DirectoryError> {
        let key = CacheKey::user_by_uid(uid);
        if let Some(user) = self.cached::<UserData>(&key).await {
            return Ok(Some(user));
        }

        let user = self.store.get_user(uid).await?;
        if let Some(user) = &user {
            self.remember(&key, user).await;
        }
        Ok(user)
    }

    /// Case-insensitive lookup by public code
    pub async fn by_code(&self, code: &str) -> Result<Option<UserData>, DirectoryError> {
        let Some(code) = normalize_code(code) else {
            return Ok(None);
        };

        let key = CacheKey::user_by_code(&code);
        if let Some(user) = self.cached::<UserData>(&key).await {
            return Ok(Some(user));
        }

        let user = self.store.find_by_code(&code).await?;
        if let Some(user) = &user {
            self.remember(&key, user).await;
        }
        Ok(user)
    }

    /// Store a completed quiz under `uid`
    ///
    /// A returning respondent keeps the code they already have. New
    /// respondents get a freshly drawn code, redrawn while it is taken.
    pub async fn submit(
        &self,
        uid: &str,
        user_info: UserInfo,
        answers: Vec<Answer>,
        max_attempts: u32,
    ) -> Result<UserData, DirectoryError> {
        let code = match self.store.get_user(uid).await? {
            Some(existing) => existing.code,
            None => self.allocate_code(max_attempts).await?,
        };

        let user = UserData {
            uid: uid.to_string(),
            user_info,
            code,
            answers,
        };
        self.store.save_user(&user).await?;

        self.forget(vec![
            CacheKey::archive(),
            CacheKey::user_by_uid(uid),
            CacheKey::user_by_code(&user.code),
        ])
        .await;

        tracing::info!("Stored quiz for {} with code {}", uid, user.code);
        Ok(user)
    }

    async fn allocate_code(&self, max_attempts: u32) -> Result<String, DirectoryError> {
        for attempt in 1..=max_attempts {
            let candidate = generate_user_code(&mut rand::thread_rng());
            if self.store.find_by_code(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::debug!("Code {} already taken (attempt {})", candidate, attempt);
        }
        Err(DirectoryError::CodeSpaceExhausted(max_attempts))
    }
}
