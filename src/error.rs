use rocket::{
    Request,
    http::Status,
    response::{self, Responder},
    serde::json::Json,
};
use thiserror::Error;

use crate::model::server::ErrorBody;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid board dimensions")]
    InvalidDimensions,
    #[error("coordinates outside the board")]
    OutOfBounds,
    #[error("no such game")]
    NotFound,
    #[error("game already ended")]
    SessionEnded,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("too many requests")]
    RateLimited,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self {
            // The client ignores HTTP status codes and only checks the
            // `error` field of the body, so game errors ship as a 200.
            ApiError::Game(err) => Json(ErrorBody {
                error: err.to_string(),
            })
            .respond_to(req),
            ApiError::RateLimited => Err(Status::TooManyRequests),
        }
    }
}
