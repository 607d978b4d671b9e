use serde::{Deserialize, Serialize};
use validator::Validate;

use super::repo_types::{AdChanges, NewAd};
use crate::{
    error::ApiError,
    validation::{not_blank, trimmed},
};

pub const PAGE_SIZE: i64 = 10;

/// Body for `POST /ads/` and `PUT /ads/{id}/`: every field is required.
/// Any `author` in the body is ignored; the requester becomes the author.
#[derive(Debug, Deserialize, Validate)]
pub struct AdWrite {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "This field is required."),
        range(min = 0, message = "Ensure this value is greater than or equal to 0.")
    )]
    pub price: Option<i64>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub description: Option<String>,
}

impl AdWrite {
    pub fn into_new(self) -> NewAd {
        NewAd {
            title: trimmed(self.title.unwrap_or_default()),
            price: self.price.unwrap_or_default(),
            description: trimmed(self.description.unwrap_or_default()),
        }
    }
}

impl From<AdWrite> for AdChanges {
    fn from(w: AdWrite) -> Self {
        Self {
            title: w.title.map(trimmed),
            price: w.price,
            description: w.description.map(trimmed),
        }
    }
}

/// Body for `PATCH /ads/{id}/`: absent fields are left alone.
#[derive(Debug, Deserialize, Validate)]
pub struct AdPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub title: Option<String>,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub price: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
}

impl From<AdPatch> for AdChanges {
    fn from(p: AdPatch) -> Self {
        Self {
            title: p.title.map(trimmed),
            price: p.price,
            description: p.description.map(trimmed),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

impl AdQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// 1-based page number; missing means the first page.
    pub fn page_number(&self) -> Result<i64, ApiError> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(invalid_page),
        }
    }
}

pub fn invalid_page() -> ApiError {
    ApiError::NotFound("Invalid page.".into())
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

/// Number of the last page; an empty listing still has page 1.
pub fn last_page(count: i64) -> i64 {
    ((count + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}
