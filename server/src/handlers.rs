use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use inkmath_shared::{RecognizeRequest, RecognizeResponse};

use crate::state::AppState;

/// Upper bound on the encoded snapshot; a full-viewport PNG data URL stays
/// well under this.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Forwards one recognition request to the upstream recognizer. Exactly one
/// upstream attempt per submission; any upstream problem maps to 502 so the
/// client surfaces a recognition failure and keeps its state.
pub async fn calculate_handler(
    State(state): State<AppState>,
    Json(request): Json<RecognizeRequest>,
) -> Response {
    if let Err(reason) = validate_request(&request) {
        eprintln!("Rejecting recognize request: {reason}");
        return (StatusCode::BAD_REQUEST, reason).into_response();
    }
    eprintln!(
        "Recognize forward vars={} image_bytes={}",
        request.variables.len(),
        request.image.len()
    );

    match state
        .http
        .post(&state.recognizer_url)
        .json(&request)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => {
            match response.json::<RecognizeResponse>().await {
                Ok(parsed) => Json(parsed).into_response(),
                Err(error) => {
                    eprintln!("Recognizer response parse failed: {error}");
                    StatusCode::BAD_GATEWAY.into_response()
                }
            }
        }
        Ok(response) => {
            eprintln!("Recognizer returned status {}", response.status());
            StatusCode::BAD_GATEWAY.into_response()
        }
        Err(error) => {
            eprintln!("Recognizer request failed: {error}");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

pub fn validate_request(request: &RecognizeRequest) -> Result<(), &'static str> {
    if !request.image.starts_with("data:image/") {
        return Err("image must be an encoded raster data URL");
    }
    if request.image.len() > MAX_IMAGE_BYTES {
        return Err("image payload too large");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use inkmath_shared::{RecognizeRequest, VarMap};

    use super::{validate_request, MAX_IMAGE_BYTES};

    fn request(image: String) -> RecognizeRequest {
        RecognizeRequest {
            image,
            variables: VarMap::new(),
        }
    }

    #[test]
    fn accepts_a_png_data_url() {
        let request = request("data:image/png;base64,iVBORw0KGgo=".to_string());
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn rejects_payloads_that_are_not_data_urls() {
        let request = request("https://example.com/sneaky.png".to_string());
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn rejects_oversized_payloads() {
        let mut image = String::from("data:image/png;base64,");
        image.push_str(&"A".repeat(MAX_IMAGE_BYTES));
        let request = request(image);
        assert_eq!(validate_request(&request), Err("image payload too large"));
    }
}
