use async_trait::async_trait;
use uuid::Uuid;

use crate::ads::repo_types::{Ad, AdChanges, NewAd};
use crate::reviews::repo_types::Review;
use crate::users::repo_types::{NewUser, ProfileChanges, User};

#[cfg(test)]
pub mod memory;
pub mod pg;

pub use pg::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users, ads and reviews.
///
/// Deleting a user removes their ads and reviews; deleting an ad removes its
/// reviews. Ads list newest first, reviews oldest first.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> StoreResult<Option<User>>;
    async fn set_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_ads(&self, search: Option<&str>) -> StoreResult<i64>;
    async fn list_ads(&self, search: Option<&str>, limit: i64, offset: i64) -> StoreResult<Vec<Ad>>;
    async fn find_ad(&self, id: Uuid) -> StoreResult<Option<Ad>>;
    async fn create_ad(&self, author_id: Uuid, ad: NewAd) -> StoreResult<Ad>;
    async fn update_ad(&self, id: Uuid, changes: AdChanges) -> StoreResult<Option<Ad>>;
    async fn delete_ad(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_reviews(&self, ad_id: Uuid) -> StoreResult<Vec<Review>>;
    async fn find_review(&self, ad_id: Uuid, id: Uuid) -> StoreResult<Option<Review>>;
    async fn create_review(&self, ad_id: Uuid, author_id: Uuid, text: &str) -> StoreResult<Review>;
    async fn update_review(&self, id: Uuid, text: &str) -> StoreResult<Option<Review>>;
    async fn delete_review(&self, id: Uuid) -> StoreResult<bool>;
}

/// Escape LIKE metacharacters so a search term matches literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
