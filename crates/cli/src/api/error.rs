//! Mapping from application errors to HTTP responses.

use std::convert::Infallible;
use supportbot_core::AppError;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

/// An [`AppError`] carried through warp's rejection system.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl Reject for ApiError {}

/// Wrap an application error as a rejection.
pub fn reject(err: AppError) -> Rejection {
    warp::reject::custom(ApiError(err))
}

/// HTTP status for an application error.
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        // No index yet: retrieval is unavailable until ingestion runs
        AppError::NotFound(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(status: StatusCode, message: &str, details: String) -> warp::reply::Response {
    let json = warp::reply::json(&serde_json::json!({
        "error": message,
        "details": details,
    }));
    warp::reply::with_status(json, status).into_response()
}

/// Turn every rejection into a JSON error body.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(ApiError(app_err)) = err.find::<ApiError>() {
        let status = status_for(app_err);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", app_err);
        } else {
            tracing::warn!("Request rejected: {}", app_err);
        }
        let message = status.canonical_reason().unwrap_or("Error");
        return Ok(error_reply(status, message, app_err.to_string()));
    }

    if err.is_not_found() {
        return Ok(error_reply(
            StatusCode::NOT_FOUND,
            "Not Found",
            "No such route".to_string(),
        ));
    }

    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "Bad Request",
            e.to_string(),
        ));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Payload Too Large",
            "Request body too large".to_string(),
        ));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
            "Method not allowed for this route".to_string(),
        ));
    }

    tracing::error!("Unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        format!("{:?}", err),
    ))
}
