//! Object-level permission predicates.
//!
//! A policy answers "may `requester` mutate `entity`?". Policies compose with
//! [`Policy::or`], so "author or admin" is `Policy::<Ad>::or(IsAuthor, IsAdmin)`.

use uuid::Uuid;

use crate::{
    ads::repo_types::Ad, error::ApiError, reviews::repo_types::Review, users::repo_types::User,
};

/// An entity owned by a single user.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

impl Authored for Ad {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Review {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

pub trait Policy<E: ?Sized> {
    fn allows(&self, requester: &User, entity: &E) -> bool;

    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: Policy<E>,
    {
        Or(self, other)
    }
}

/// Requester wrote the entity.
#[derive(Debug, Clone, Copy)]
pub struct IsAuthor;

impl<E: Authored + ?Sized> Policy<E> for IsAuthor {
    fn allows(&self, requester: &User, entity: &E) -> bool {
        entity.author_id() == requester.id
    }
}

/// Requester has the admin role, whatever the entity.
#[derive(Debug, Clone, Copy)]
pub struct IsAdmin;

impl<E: ?Sized> Policy<E> for IsAdmin {
    fn allows(&self, requester: &User, _entity: &E) -> bool {
        requester.is_admin()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

impl<E: ?Sized, A: Policy<E>, B: Policy<E>> Policy<E> for Or<A, B> {
    fn allows(&self, requester: &User, entity: &E) -> bool {
        self.0.allows(requester, entity) || self.1.allows(requester, entity)
    }
}

/// Author-or-admin, the rule for every mutation in the API.
pub fn author_or_admin() -> Or<IsAuthor, IsAdmin> {
    Or(IsAuthor, IsAdmin)
}

pub fn authorize<E: ?Sized, P: Policy<E>>(
    policy: &P,
    requester: &User,
    entity: &E,
) -> Result<(), ApiError> {
    if policy.allows(requester, entity) {
        Ok(())
    } else {
        tracing::warn!(user_id = %requester.id, "permission denied");
        Err(ApiError::forbidden())
    }
}
