//! Request extractors whose rejections answer with the JSON envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::ServerError;

/// `axum::Json` for request bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` for ids in the URL.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct PathParam<T>(pub T);
