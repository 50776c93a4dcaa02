//! Actor identity handed over by the upstream authentication layer.

use axum::{extract::FromRequestParts, http::request::Parts};
use bookshare_kernel::model::UserId;

use crate::error::AppError;

/// Header carrying the authenticated user id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

impl Actor {
    pub fn id(&self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| AppError::unauthorized("missing authenticated user"))?;
        let raw = raw
            .to_str()
            .map_err(|_| AppError::unauthorized("malformed user id header"))?;
        let id = raw
            .trim()
            .parse::<UserId>()
            .map_err(|_| AppError::unauthorized("malformed user id header"))?;
        Ok(Actor(id))
    }
}
