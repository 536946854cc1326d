use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ActiveValue::Unchanged, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Schema,
    SqlxSqliteConnector,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{post, NewPost, Post, PostId, PostStore, StoreError};

impl From<post::Model> for Post {
    fn from(value: post::Model) -> Self {
        Self {
            id: value.id,
            title: value.title,
            body: value.body,
        }
    }
}

/// [`PostStore`] over a sea-orm connection.
#[derive(Clone, Debug)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    /// Open the SQLite database at `url` and make sure the `posts` table
    /// exists.
    ///
    /// `LIKE` is case-sensitive on every pooled connection. An in-memory
    /// database lives on one connection that is never recycled.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?;

        let mut pool = SqlitePoolOptions::new().after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA case_sensitive_like = ON")
                    .execute(conn)
                    .await?;
                Ok(())
            })
        });
        if url.contains(":memory:") {
            pool = pool
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }
        let pool = pool.connect_with(options).await?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Ok(Self::from_connection(db).await?)
    }

    pub async fn from_connection(db: DatabaseConnection) -> Result<Self, DbErr> {
        let backend = db.get_database_backend();
        let mut table = Schema::new(backend).create_table_from_entity(post::Entity);
        table.if_not_exists();
        db.execute(backend.build(&table)).await?;

        Ok(Self { db })
    }
}

#[async_trait]
impl PostStore for SeaOrmStore {
    async fn list(&self, condition: Condition) -> Result<Vec<Post>, StoreError> {
        let rows = post::Entity::find()
            .filter(condition)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let row = post::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Post::from))
    }

    async fn add(&self, post: NewPost) -> Result<Post, StoreError> {
        let model = post::ActiveModel {
            title: Set(post.title),
            body: Set(post.body),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(target: "quill-db", post_id = model.id, "post inserted");
        Ok(model.into())
    }

    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        let updated = post::ActiveModel {
            id: Unchanged(post.id),
            title: Set(post.title.clone()),
            body: Set(post.body.clone()),
        }
        .update(&self.db)
        .await;

        match updated {
            Ok(_) => {
                tracing::debug!(target: "quill-db", post_id = post.id, "post updated");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(StoreError::Missing(post.id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: PostId) -> Result<(), StoreError> {
        let result = post::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::Missing(id));
        }

        tracing::debug!(target: "quill-db", post_id = id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ColumnTrait;

    async fn store() -> SeaOrmStore {
        SeaOrmStore::connect("sqlite::memory:").await.unwrap()
    }

    fn new_post(title: &str, body: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increment() {
        let store = store().await;
        let a = store.add(new_post("A", "a")).await.unwrap();
        let b = store.add(new_post("B", "b")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.get(2).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = store().await;
        store.add(new_post("A", "a")).await.unwrap();
        store.delete(1).await.unwrap();

        let next = store.add(new_post("B", "b")).await.unwrap();
        assert_eq!(next.id, 2);
        assert_eq!(store.get(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites_text_fields() {
        let store = store().await;
        let mut post = store.add(new_post("Draft", "old")).await.unwrap();
        post.title = "Final".to_string();
        post.body = String::new();
        store.save(&post).await.unwrap();

        assert_eq!(store.get(post.id).await.unwrap(), Some(post));
    }

    #[tokio::test]
    async fn mutating_missing_rows_fails() {
        let store = store().await;
        let ghost = Post {
            id: 9,
            title: String::new(),
            body: String::new(),
        };

        assert!(matches!(
            store.save(&ghost).await,
            Err(StoreError::Missing(9))
        ));
        assert!(matches!(store.delete(9).await, Err(StoreError::Missing(9))));
    }

    #[tokio::test]
    async fn list_filters_and_orders_by_id() {
        let store = store().await;
        store.add(new_post("Post with whistles", "x")).await.unwrap();
        store.add(new_post("Post with bells", "y")).await.unwrap();
        store
            .add(new_post("Post with bells and whistles", "z"))
            .await
            .unwrap();

        let condition = Condition::all().add(post::Column::Title.contains("whistles"));
        let ids: Vec<PostId> = store
            .list(condition)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        let everything = store.list(Condition::all()).await.unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn reopening_the_schema_keeps_rows() {
        let store = store().await;
        store.add(new_post("Kept", "k")).await.unwrap();

        let reopened = SeaOrmStore::from_connection(store.db.clone()).await.unwrap();
        assert_eq!(reopened.list(Condition::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn title_containment_is_case_sensitive() {
        let store = store().await;
        store.add(new_post("Whistles", "a")).await.unwrap();
        store.add(new_post("tin whistles", "b")).await.unwrap();

        let condition = Condition::all().add(post::Column::Title.contains("whistles"));
        let titles: Vec<String> = store
            .list(condition)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["tin whistles".to_string()]);
    }

    #[tokio::test]
    async fn stores_do_not_share_memory_databases() {
        let first = store().await;
        let second = store().await;
        first.add(new_post("Only here", "x")).await.unwrap();

        assert!(second.list(Condition::all()).await.unwrap().is_empty());
    }
}
