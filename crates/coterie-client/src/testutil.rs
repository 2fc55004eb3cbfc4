//! In-memory fakes of the backend service contracts, shared by the
//! unit tests in this crate.  Writes are recorded so tests can assert
//! on exactly what reached the "remote" services.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use coterie_backend::rows::{AuthorJoin, CommentRow, NewComment, NewPost, NewUser, PostRow, UserRow};
use coterie_backend::{
    AuthError, AuthUser, IdentityProvider, ObjectStore, RecordStore, SignUpProfile, StoreError,
    UploadError,
};
use coterie_shared::models::Author;
use coterie_shared::types::{CommentId, PostId, UserId};

use crate::session::SessionContext;

#[derive(Default)]
pub struct MemoryBackend {
    pub users: Mutex<Vec<UserRow>>,
    pub posts: Mutex<Vec<PostRow>>,
    pub comments: Mutex<Vec<CommentRow>>,

    /// email -> (password, principal id)
    accounts: Mutex<HashMap<String, (String, UserId)>>,
    principal: Mutex<Option<AuthUser>>,

    next_post_id: AtomicI64,
    next_comment_id: AtomicI64,

    pub insert_post_calls: AtomicUsize,
    insert_post_delay_ms: AtomicU64,
    fail_upload: AtomicBool,

    pub uploaded: Mutex<Vec<(String, String)>>,
    pub removed: Mutex<Vec<(String, String)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            next_post_id: AtomicI64::new(1),
            next_comment_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Authenticate a principal that has no `Users` row.
    pub fn force_principal(&self, email: &str) {
        *self.principal.lock().unwrap() = Some(AuthUser {
            id: UserId(Uuid::new_v4()),
            email: email.to_string(),
        });
    }

    pub fn sign_out(&self) {
        *self.principal.lock().unwrap() = None;
    }

    /// A `Users` row under an id that matches no principal.
    pub fn seed_user_with_email(&self, email: &str) {
        self.users.lock().unwrap().push(UserRow {
            id: UserId(Uuid::new_v4()),
            first_name: "Old".into(),
            last_name: "Row".into(),
            username: Some("stale".into()),
            email: email.to_string(),
            profile_image: None,
        });
    }

    /// Authenticated principal with a matching profile row; returns the
    /// resolved session the way the resolver would build it.
    pub fn seed_session(&self, username: &str, avatar_url: &str) -> SessionContext {
        let id = UserId(Uuid::new_v4());
        let email = format!("{username}@example.com");
        self.users.lock().unwrap().push(UserRow {
            id,
            first_name: String::new(),
            last_name: String::new(),
            username: Some(username.to_string()),
            email: email.clone(),
            profile_image: Some(avatar_url.to_string()),
        });
        *self.principal.lock().unwrap() = Some(AuthUser { id, email });

        SessionContext::new(Author {
            id,
            display_name: username.to_string(),
            avatar_url: avatar_url.to_string(),
        })
    }

    /// A store-confirmed post by `author`, `age_secs` in the past.
    pub fn seed_post(&self, author: &SessionContext, content: &str, age_secs: i64) -> PostId {
        let id = PostId(self.next_post_id.fetch_add(1, Ordering::SeqCst));
        self.posts.lock().unwrap().push(PostRow {
            id,
            content: Some(content.to_string()),
            image_url: None,
            user_id: author.user_id,
            created_at: Utc::now() - chrono::Duration::seconds(age_secs),
            author: None,
        });
        id
    }

    pub fn seed_comment(&self, author: &SessionContext, post_id: PostId, body: &str) -> CommentId {
        let id = CommentId(self.next_comment_id.fetch_add(1, Ordering::SeqCst));
        self.comments.lock().unwrap().push(CommentRow {
            id,
            post_id,
            user_id: author.user_id,
            comment_text: body.to_string(),
            created_at: Utc::now(),
            author: None,
        });
        id
    }

    pub fn fail_uploads(&self) {
        self.fail_upload.store(true, Ordering::SeqCst);
    }

    pub fn set_insert_post_delay_ms(&self, ms: u64) {
        self.insert_post_delay_ms.store(ms, Ordering::SeqCst);
    }

    fn join_for(&self, user_id: UserId) -> Option<AuthorJoin> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| AuthorJoin {
                username: u.username.clone(),
                profile_image: u.profile_image.clone(),
            })
    }

    fn sorted_desc<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
    where
        F: Fn(&T) -> DateTime<Utc>,
    {
        // Stable sort: equal timestamps keep insertion order, matching
        // the store's stable tie-break.
        rows.sort_by(|a, b| key(b).cmp(&key(a)));
        rows
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.principal.lock().unwrap().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored, id)) if stored == password => {
                let user = AuthUser {
                    id: *id,
                    email: email.to_string(),
                };
                *self.principal.lock().unwrap() = Some(user.clone());
                Ok(user)
            }
            _ => Err(AuthError::InvalidCredentials("bad email or password".into())),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _profile: &SignUpProfile,
    ) -> Result<AuthUser, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::AlreadyRegistered);
        }
        let id = UserId(Uuid::new_v4());
        accounts.insert(email.to_string(), (password.to_string(), id));
        let user = AuthUser {
            id,
            email: email.to_string(),
        };
        *self.principal.lock().unwrap() = Some(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn fetch_user(&self, id: UserId) -> Result<Option<UserRow>, StoreError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<(), StoreError> {
        self.users.lock().unwrap().push(UserRow {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: Some(user.username.clone()),
            email: user.email.clone(),
            profile_image: Some(user.profile_image.clone()),
        });
        Ok(())
    }

    async fn delete_user_by_email(&self, email: &str) -> Result<(), StoreError> {
        self.users.lock().unwrap().retain(|u| u.email != email);
        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: UserId,
        username: &str,
        profile_image: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        let row = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        row.username = Some(username.to_string());
        row.profile_image = Some(profile_image.to_string());
        Ok(())
    }

    async fn fetch_posts(&self) -> Result<Vec<PostRow>, StoreError> {
        let rows: Vec<PostRow> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|mut row| {
                row.author = self.join_for(row.user_id);
                row
            })
            .collect();
        Ok(Self::sorted_desc(rows, |r| r.created_at))
    }

    async fn fetch_comments(&self, post_id: PostId) -> Result<Vec<CommentRow>, StoreError> {
        let rows: Vec<CommentRow> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .map(|mut row| {
                row.author = self.join_for(row.user_id);
                row
            })
            .collect();
        Ok(Self::sorted_desc(rows, |r| r.created_at))
    }

    async fn insert_post(&self, post: &NewPost) -> Result<PostRow, StoreError> {
        let delay = self.insert_post_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        self.insert_post_calls.fetch_add(1, Ordering::SeqCst);

        let row = PostRow {
            id: PostId(self.next_post_id.fetch_add(1, Ordering::SeqCst)),
            content: Some(post.content.clone()),
            image_url: post.image_url.clone(),
            user_id: post.user_id,
            created_at: Utc::now(),
            // Insert responses carry no join.
            author: None,
        };
        self.posts.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentRow, StoreError> {
        let row = CommentRow {
            id: CommentId(self.next_comment_id.fetch_add(1, Ordering::SeqCst)),
            post_id: comment.post_id,
            user_id: comment.user_id,
            comment_text: comment.comment_text.clone(),
            created_at: Utc::now(),
            author: None,
        };
        self.comments.lock().unwrap().push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, UploadError> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(UploadError::Service("upload rejected".into()));
        }
        self.uploaded
            .lock()
            .unwrap()
            .push((bucket.to_string(), path.to_string()));
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("http://localhost/storage/v1/object/public/{bucket}/{path}")
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), UploadError> {
        let mut removed = self.removed.lock().unwrap();
        for p in paths {
            removed.push((bucket.to_string(), p.clone()));
        }
        Ok(())
    }
}
