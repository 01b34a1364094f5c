use axum::body;
use axum::http::HeaderMap;
use axum::http::header::LOCATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Client-side view of a [BasicErrorResponse][crate::routing_utils::BasicErrorResponse]
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub error_code: String,
    pub extra_info: Option<serde_json::Value>,
}

/// Used in tests to both extract the raw bytes from the HTTP response body and then deserialize them into the
/// requested type. Will panic and fail the test if either step fails somehow.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse body content into data structure! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}

/// Reads the Location header of a response, failing the test if it is missing
pub fn location(headers: &HeaderMap) -> &str {
    headers
        .get(LOCATION)
        .expect("response had no Location header")
        .to_str()
        .expect("Location header was not valid text")
}
