use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub price: i64,
    pub description: String,
    #[serde(rename = "author")]
    pub author_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAd {
    pub title: String,
    pub price: i64,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct AdChanges {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
}
