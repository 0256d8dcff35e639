//! Response classification: raw HTTP responses to decoded payloads or
//! classified errors.

use serde_json::Value;

use crate::error::{ApiError, ErrorDetail};
use crate::transport::RawResponse;

/// Classifies one raw response into a decoded document or an
/// [`ApiError`].
///
/// A body that does not parse as JSON is an [`ApiError::Api`] regardless
/// of status. A 2xx status returns the parsed document as-is. Everything
/// else maps onto the error taxonomy, carrying the status, the raw body,
/// the parsed document, and the request id when the transport surfaced
/// one.
///
/// # Errors
///
/// Returns the classified [`ApiError`] for non-2xx statuses and
/// unparseable bodies.
pub fn interpret_response(response: &RawResponse) -> Result<Value, ApiError> {
    let request_id = response.header("request-id").map(str::to_owned);

    let Ok(parsed) = serde_json::from_str::<Value>(&response.body) else {
        return Err(ApiError::Api {
            detail: ErrorDetail {
                message: Some(format!(
                    "Invalid response body from API: {} (HTTP response code was {})",
                    response.body, response.status
                )),
                http_status: Some(response.status),
                http_body: Some(response.body.clone()),
                json_body: None,
                request_id,
            },
        });
    };

    if (200..300).contains(&response.status) {
        return Ok(parsed);
    }

    Err(classify_error(response, parsed, request_id))
}

/// Maps a non-2xx response onto the error taxonomy.
fn classify_error(response: &RawResponse, parsed: Value, request_id: Option<String>) -> ApiError {
    // The API reports failures as {"error": {"message": ..., ...}}.
    let error_obj = parsed.get("error").cloned().unwrap_or(Value::Null);
    let field = |name: &str| {
        error_obj
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    let detail = ErrorDetail {
        message: field("message"),
        http_status: Some(response.status),
        http_body: Some(response.body.clone()),
        json_body: Some(parsed),
        request_id,
    };

    match response.status {
        401 => ApiError::Authentication { detail },
        402 => ApiError::Card {
            detail,
            code: field("code"),
            param: field("param"),
        },
        429 => ApiError::RateLimit { detail },
        400..=499 => ApiError::InvalidRequest {
            detail,
            param: field("param"),
        },
        _ => ApiError::Api { detail },
    }
}
