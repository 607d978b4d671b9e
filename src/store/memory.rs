use std::sync::Mutex;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::ads::repo_types::{Ad, AdChanges, NewAd};
use crate::reviews::repo_types::Review;
use crate::users::repo_types::{NewUser, ProfileChanges, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    ads: Vec<Ad>,
    reviews: Vec<Review>,
    last_ts: Option<OffsetDateTime>,
}

impl Tables {
    // Strictly increasing so ordering assertions are deterministic.
    fn next_ts(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let ts = match self.last_ts {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_ts = Some(ts);
        ts
    }
}

/// In-process store with the same uniqueness and cascade rules as Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ad_count(&self) -> usize {
        self.lock().ads.len()
    }

    pub fn review_count(&self) -> usize {
        self.lock().reviews.len()
    }

    pub fn set_active(&self, id: Uuid, active: bool) {
        if let Some(u) = self.lock().users.iter_mut().find(|u| u.id == id) {
            u.is_active = active;
        }
    }
}

fn title_matches(ad: &Ad, search: Option<&str>) -> bool {
    match search {
        Some(term) => ad.title.to_lowercase().contains(&term.to_lowercase()),
        None => true,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email"));
        }
        let created_at = t.next_ts();
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: None,
            role: user.role,
            image: None,
            is_active: true,
            created_at,
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> StoreResult<Option<User>> {
        let mut t = self.lock();
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.phone {
            user.phone = v;
        }
        if let Some(v) = changes.image {
            user.image = v;
        }
        Ok(Some(user.clone()))
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let mut t = self.lock();
        match t.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Ok(false);
        }
        let doomed_ads: Vec<Uuid> = t
            .ads
            .iter()
            .filter(|a| a.author_id == id)
            .map(|a| a.id)
            .collect();
        t.ads.retain(|a| a.author_id != id);
        t.reviews
            .retain(|r| r.author_id != id && !doomed_ads.contains(&r.ad_id));
        Ok(true)
    }

    async fn count_ads(&self, search: Option<&str>) -> StoreResult<i64> {
        let t = self.lock();
        let count = t.ads.iter().filter(|a| title_matches(a, search)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn list_ads(&self, search: Option<&str>, limit: i64, offset: i64) -> StoreResult<Vec<Ad>> {
        let t = self.lock();
        let mut rows: Vec<Ad> = t
            .ads
            .iter()
            .filter(|a| title_matches(a, search))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn find_ad(&self, id: Uuid) -> StoreResult<Option<Ad>> {
        Ok(self.lock().ads.iter().find(|a| a.id == id).cloned())
    }

    async fn create_ad(&self, author_id: Uuid, ad: NewAd) -> StoreResult<Ad> {
        let mut t = self.lock();
        let created_at = t.next_ts();
        let row = Ad {
            id: Uuid::new_v4(),
            title: ad.title,
            price: ad.price,
            description: ad.description,
            author_id,
            created_at,
        };
        t.ads.push(row.clone());
        Ok(row)
    }

    async fn update_ad(&self, id: Uuid, changes: AdChanges) -> StoreResult<Option<Ad>> {
        let mut t = self.lock();
        let Some(ad) = t.ads.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.title {
            ad.title = v;
        }
        if let Some(v) = changes.price {
            ad.price = v;
        }
        if let Some(v) = changes.description {
            ad.description = v;
        }
        Ok(Some(ad.clone()))
    }

    async fn delete_ad(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.ads.len();
        t.ads.retain(|a| a.id != id);
        if t.ads.len() == before {
            return Ok(false);
        }
        t.reviews.retain(|r| r.ad_id != id);
        Ok(true)
    }

    async fn list_reviews(&self, ad_id: Uuid) -> StoreResult<Vec<Review>> {
        let t = self.lock();
        let mut rows: Vec<Review> = t
            .reviews
            .iter()
            .filter(|r| r.ad_id == ad_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn find_review(&self, ad_id: Uuid, id: Uuid) -> StoreResult<Option<Review>> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.id == id && r.ad_id == ad_id)
            .cloned())
    }

    async fn create_review(&self, ad_id: Uuid, author_id: Uuid, text: &str) -> StoreResult<Review> {
        let mut t = self.lock();
        let created_at = t.next_ts();
        let row = Review {
            id: Uuid::new_v4(),
            text: text.to_string(),
            author_id,
            ad_id,
            created_at,
        };
        t.reviews.push(row.clone());
        Ok(row)
    }

    async fn update_review(&self, id: Uuid, text: &str) -> StoreResult<Option<Review>> {
        let mut t = self.lock();
        let Some(review) = t.reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        review.text = text.to_string();
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.reviews.len();
        t.reviews.retain(|r| r.id != id);
        Ok(t.reviews.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::User,
        }
    }

    fn new_ad(title: &str) -> NewAd {
        NewAd {
            title: title.into(),
            price: 10,
            description: "d".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@b.co")).await.unwrap();
        let err = store.create_user(new_user("a@b.co")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict("email")));
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_ads_and_reviews() {
        let store = MemoryStore::new();
        let seller = store.create_user(new_user("s@b.co")).await.unwrap();
        let buyer = store.create_user(new_user("b@b.co")).await.unwrap();
        let ad = store.create_ad(seller.id, new_ad("bike")).await.unwrap();
        let other = store.create_ad(buyer.id, new_ad("lamp")).await.unwrap();
        store.create_review(ad.id, buyer.id, "nice").await.unwrap();
        store.create_review(other.id, seller.id, "meh").await.unwrap();
        store.create_review(other.id, buyer.id, "mine").await.unwrap();

        assert!(store.delete_user(seller.id).await.unwrap());
        assert_eq!(store.ad_count(), 1);
        let left = store.list_reviews(other.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text, "mine");
        assert_eq!(store.review_count(), 1);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let store = MemoryStore::new();
        let u = store.create_user(new_user("s@b.co")).await.unwrap();
        store.create_ad(u.id, new_ad("Red Bike")).await.unwrap();
        store.create_ad(u.id, new_ad("Lamp")).await.unwrap();
        assert_eq!(store.count_ads(Some("bIkE")).await.unwrap(), 1);
        assert_eq!(store.count_ads(None).await.unwrap(), 2);
    }
}
