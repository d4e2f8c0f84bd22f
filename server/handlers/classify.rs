use std::io::Read;

use tiny_http::Request;
use tracing::{debug, error, warn};

use face_classifier::decode::decode_image_bytes;
use face_classifier::{classify_decoded, classify_image, ClassifierError};

use crate::routes::{error_response, internal_error, json_response, HttpResponse};
use crate::state::SharedState;
use crate::util::form::{form_get, parse_form};
use crate::util::multipart::{extract_boundary, find_part, Part};

/// The `image` field of a request, as sent.
#[derive(Debug, PartialEq)]
pub enum ImagePayload {
    /// Base64 text, optionally data-URL prefixed.
    Base64(String),
    /// An uploaded file part.
    Bytes(Vec<u8>),
}

/// Why a request body could not yield an image.
#[derive(Debug, PartialEq)]
pub enum BodyError {
    TooLarge(usize),
    Unreadable(String),
    InvalidJson(String),
    Missing,
    Empty,
}

impl BodyError {
    fn into_response(self) -> HttpResponse {
        match self {
            BodyError::TooLarge(limit) => {
                error_response(413, &format!("Request body exceeds {} bytes", limit))
            }
            BodyError::Unreadable(_) => error_response(400, "Could not read request body"),
            BodyError::InvalidJson(_) => error_response(400, "Invalid JSON body"),
            BodyError::Missing => error_response(400, "No image data provided"),
            BodyError::Empty => error_response(400, "Empty image data"),
        }
    }
}

// ---------------------------------------------------------------------------
// POST /classify_endpoint
// ---------------------------------------------------------------------------

pub fn handle_post(request: &mut Request, state: &SharedState) -> HttpResponse {
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let payload = read_body(request, state.config.max_body_bytes)
        .and_then(|body| extract_image(&content_type, &body));
    let payload = match payload {
        Ok(p) => p,
        Err(e) => {
            warn!(content_type = %content_type, reason = ?e, "rejected classification request");
            return e.into_response();
        }
    };

    let ctx = match state.store.require() {
        Ok(ctx) => ctx,
        Err(e) => return error_response(503, &e.to_string()),
    };

    let response = match payload {
        ImagePayload::Base64(text) => {
            debug!(chars = text.len(), "classifying base64 image");
            classify_image(&ctx, &text)
        }
        ImagePayload::Bytes(bytes) => {
            debug!(bytes = bytes.len(), "classifying uploaded file");
            decode_image_bytes(&bytes).map(|img| classify_decoded(&ctx, &img))
        }
    };

    match response {
        Ok(body) => json_response(200, &body),
        Err(e) if e.is_client_error() => {
            warn!(error = %e, "undecodable image");
            error_response(400, &e.to_string())
        }
        Err(ClassifierError::ModelNotLoaded) => error_response(503, &ClassifierError::ModelNotLoaded.to_string()),
        Err(e) => {
            error!(error = %e, "classification failed");
            internal_error()
        }
    }
}

/// Reads the whole body, refusing anything over `limit` bytes.
fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>, BodyError> {
    if request.body_length().map_or(false, |len| len > limit) {
        return Err(BodyError::TooLarge(limit));
    }
    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| BodyError::Unreadable(e.to_string()))?;
    if body.len() > limit {
        return Err(BodyError::TooLarge(limit));
    }
    Ok(body)
}

/// Pulls the `image` field out of a JSON, urlencoded or multipart body.
///
/// A body that is not multipart and not declared as a form is tried as
/// JSON first, so clients that omit the content type still work.
pub fn extract_image(content_type: &str, body: &[u8]) -> Result<ImagePayload, BodyError> {
    let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();

    let payload = match mime.as_str() {
        "multipart/form-data" => {
            let boundary = extract_boundary(content_type).ok_or(BodyError::Missing)?;
            match find_part(body, &boundary, "image") {
                Some(Part::Text(text)) => ImagePayload::Base64(text),
                Some(Part::File(bytes)) => ImagePayload::Bytes(bytes),
                None => return Err(BodyError::Missing),
            }
        }
        "application/x-www-form-urlencoded" => {
            let text = String::from_utf8_lossy(body);
            let pairs = parse_form(&text);
            ImagePayload::Base64(form_get(&pairs, "image").ok_or(BodyError::Missing)?.to_owned())
        }
        _ => {
            if body.iter().all(|b| b.is_ascii_whitespace()) {
                return Err(BodyError::Missing);
            }
            let value: serde_json::Value =
                serde_json::from_slice(body).map_err(|e| BodyError::InvalidJson(e.to_string()))?;
            match value.get("image") {
                Some(serde_json::Value::String(s)) => ImagePayload::Base64(s.clone()),
                Some(serde_json::Value::Null) | None => return Err(BodyError::Missing),
                Some(_) => return Err(BodyError::InvalidJson("`image` must be a string".into())),
            }
        }
    };

    match &payload {
        ImagePayload::Base64(s) if s.is_empty() => Err(BodyError::Empty),
        ImagePayload::Bytes(b) if b.is_empty() => Err(BodyError::Empty),
        _ => Ok(payload),
    }
}
