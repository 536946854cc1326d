//! Persistence for posts.
//!
//! Handlers talk to storage only through [`PostStore`]; the concrete backend
//! is chosen from [`DatabaseSettings`] at bootstrap by [`connect`].

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use quill_kernel::settings::DatabaseSettings;
use sea_orm::{Condition, DbErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod post;
pub mod store;

pub use sea_orm;
pub use store::SeaOrmStore;

pub type PostId = i32;

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
}

/// A post that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no post with id {0}")]
    Missing(PostId),

    #[error("database operation failed: {0}")]
    Db(#[from] DbErr),
}

/// Storage collaborator for posts.
///
/// Every mutating call commits on its own; callers never see a half-applied
/// change.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Posts matching `condition` on the [`post`] columns, ascending by id.
    async fn list(&self, condition: Condition) -> Result<Vec<Post>, StoreError>;

    async fn get(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    /// Insert a post, assigning the next id.
    async fn add(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Overwrite title and body of an existing post.
    async fn save(&self, post: &Post) -> Result<(), StoreError>;

    async fn delete(&self, id: PostId) -> Result<(), StoreError>;
}

/// Open the store described by `settings.url`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn PostStore>> {
    let (scheme, _) = settings
        .url
        .split_once(':')
        .with_context(|| format!("malformed database url '{}'", settings.url))?;

    if scheme != "sqlite" {
        anyhow::bail!("unsupported database scheme '{}'", scheme);
    }

    let store = SeaOrmStore::connect(&settings.url)
        .await
        .with_context(|| format!("failed to open database '{}'", settings.url))?;

    tracing::info!(target: "quill-db", backend = scheme, "post store ready");
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_default_url() {
        let settings = DatabaseSettings::default();
        let store = connect(&settings).await.unwrap();
        assert!(store.list(Condition::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn connect_rejects_other_schemes() {
        let settings = DatabaseSettings {
            url: "postgres://localhost/blog".to_string(),
        };
        let err = connect(&settings).await.err().unwrap();
        assert_eq!(err.to_string(), "unsupported database scheme 'postgres'");
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let settings = DatabaseSettings {
            url: "posts.db".to_string(),
        };
        assert!(connect(&settings).await.is_err());
    }

    #[test]
    fn post_serializes_in_field_order() {
        let post = Post {
            id: 3,
            title: "Example Post".to_string(),
            body: "Just a test".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&post).unwrap(),
            r#"{"id":3,"title":"Example Post","body":"Just a test"}"#
        );
    }
}
