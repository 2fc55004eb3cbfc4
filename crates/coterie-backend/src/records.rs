//! Record store contract and its HTTP implementation.
//!
//! Three relations: `Users`, `Posts`, `Comments`.  Posts and comments
//! are fetched joined with their author row and ordered by
//! `created_at` descending; row order is the store's and is kept
//! verbatim by the consumer.

use async_trait::async_trait;
use tracing::debug;

use coterie_shared::types::{PostId, UserId};

use crate::error::StoreError;
use crate::http::{service_message, HttpBackend};
use crate::rows::{CommentRow, NewComment, NewPost, NewUser, PostRow, UserRow};

const POST_COLUMNS: &str = "id,content,image_url,user_id,created_at,Users(username,profile_image)";
const COMMENT_COLUMNS: &str =
    "id,post_id,user_id,comment_text,created_at,Users(username,profile_image)";

/// The hosted relational record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_user(&self, id: UserId) -> Result<Option<UserRow>, StoreError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError>;

    async fn insert_user(&self, user: &NewUser) -> Result<(), StoreError>;

    async fn delete_user_by_email(&self, email: &str) -> Result<(), StoreError>;

    async fn update_user_profile(
        &self,
        id: UserId,
        username: &str,
        profile_image: &str,
    ) -> Result<(), StoreError>;

    /// All posts joined with their authors, newest first.
    async fn fetch_posts(&self) -> Result<Vec<PostRow>, StoreError>;

    /// One post's comments joined with their authors, newest first.
    async fn fetch_comments(&self, post_id: PostId) -> Result<Vec<CommentRow>, StoreError>;

    /// Insert a post; the returned row carries the store-assigned id
    /// and timestamp but may lack the author join.
    async fn insert_post(&self, post: &NewPost) -> Result<PostRow, StoreError>;

    /// Insert a comment; same response caveats as [`insert_post`].
    ///
    /// [`insert_post`]: RecordStore::insert_post
    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentRow, StoreError>;
}

impl HttpBackend {
    async fn select<T: serde::de::DeserializeOwned>(
        &self,
        relation: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .authed(self.http.get(self.config.rest_url(relation)).query(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Service(service_message(response).await));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn insert_returning<T, R>(&self, relation: &str, payload: &T) -> Result<R, StoreError>
    where
        T: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .authed(
                self.http
                    .post(self.config.rest_url(relation))
                    .header("Prefer", "return=representation")
                    .json(payload),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Service(service_message(response).await));
        }

        let body = response.text().await?;
        let mut rows: Vec<R> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }
}

#[async_trait]
impl RecordStore for HttpBackend {
    async fn fetch_user(&self, id: UserId) -> Result<Option<UserRow>, StoreError> {
        let id_filter = format!("eq.{id}");
        let mut rows: Vec<UserRow> = self
            .select("Users", &[("select", "*"), ("id", id_filter.as_str())])
            .await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        let email_filter = format!("eq.{email}");
        let mut rows: Vec<UserRow> = self
            .select("Users", &[("select", "*"), ("email", email_filter.as_str())])
            .await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn insert_user(&self, user: &NewUser) -> Result<(), StoreError> {
        let response = self
            .authed(
                self.http
                    .post(self.config.rest_url("Users"))
                    .header("Prefer", "return=minimal")
                    .json(user),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Service(service_message(response).await));
        }
        debug!(user_id = %user.id, "Inserted user record");
        Ok(())
    }

    async fn delete_user_by_email(&self, email: &str) -> Result<(), StoreError> {
        let email_filter = format!("eq.{email}");
        let response = self
            .authed(
                self.http
                    .delete(self.config.rest_url("Users"))
                    .query(&[("email", email_filter.as_str())]),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Service(service_message(response).await));
        }
        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: UserId,
        username: &str,
        profile_image: &str,
    ) -> Result<(), StoreError> {
        let id_filter = format!("eq.{id}");
        let response = self
            .authed(
                self.http
                    .patch(self.config.rest_url("Users"))
                    .query(&[("id", id_filter.as_str())])
                    .json(&serde_json::json!({
                        "username": username,
                        "profile_image": profile_image,
                    })),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Service(service_message(response).await));
        }
        debug!(user_id = %id, "Updated user profile");
        Ok(())
    }

    async fn fetch_posts(&self) -> Result<Vec<PostRow>, StoreError> {
        self.select(
            "Posts",
            &[("select", POST_COLUMNS), ("order", "created_at.desc")],
        )
        .await
    }

    async fn fetch_comments(&self, post_id: PostId) -> Result<Vec<CommentRow>, StoreError> {
        let post_filter = format!("eq.{post_id}");
        self.select(
            "Comments",
            &[
                ("select", COMMENT_COLUMNS),
                ("post_id", post_filter.as_str()),
                ("order", "created_at.desc"),
            ],
        )
        .await
    }

    async fn insert_post(&self, post: &NewPost) -> Result<PostRow, StoreError> {
        self.insert_returning("Posts", post).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentRow, StoreError> {
        self.insert_returning("Comments", comment).await
    }
}
