//! REST API module.
//!
//! Handlers are glue: validate the request shape, call the assembler or
//! reconciler, and wrap the result in the response envelope.

mod blogs;
mod comments;
mod destinations;
mod homepage;
mod load;
mod packages;
mod reviews;
mod theme_pages;

pub use blogs::*;
pub use comments::*;
pub use destinations::*;
pub use homepage::*;
pub use load::*;
pub use packages::*;
pub use reviews::*;
pub use theme_pages::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}
