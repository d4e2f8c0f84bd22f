use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{error, info};

use crate::handlers;
use crate::state::SharedState;

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Builds headers from static pairs, adding the CORS headers every
/// response carries.
fn headers(pairs: &[(&str, &str)]) -> Vec<Header> {
    let cors = [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ];
    pairs
        .iter()
        .chain(cors.iter())
        .filter_map(|(k, v)| Header::from_bytes(k.as_bytes(), v.as_bytes()).ok())
        .collect()
}

fn bytes_response(status: u16, content_type: &str, bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        headers(&[("Content-Type", content_type)]),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> HttpResponse {
    bytes_response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn json_response<T: Serialize>(status: u16, body: &T) -> HttpResponse {
    match serde_json::to_vec(body) {
        Ok(bytes) => bytes_response(status, "application/json", bytes),
        Err(e) => {
            error!(error = %e, "could not serialize response");
            internal_error()
        }
    }
}

pub fn error_response(status: u16, message: &str) -> HttpResponse {
    json_response(status, &serde_json::json!({ "error": message }))
}

pub fn internal_error() -> HttpResponse {
    bytes_response(500, "application/json", br#"{"error":"Internal server error"}"#.to_vec())
}

pub fn not_found() -> HttpResponse {
    error_response(404, "Endpoint not found")
}

/// Answer to a CORS preflight request.
pub fn preflight() -> HttpResponse {
    Response::new(StatusCode(204), headers(&[("Access-Control-Max-Age", "86400")]), Cursor::new(Vec::new()), Some(0), None)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches one request and writes its response.
///
/// A panicking handler is answered with a 500 instead of a dropped
/// connection.
pub fn dispatch(mut request: Request, state: SharedState) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_owned();
    let path = match url.find('?') {
        Some(pos) => url[..pos].to_owned(),
        None => url.clone(),
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| route(&mut request, &method, &path, &state)));
    let response = outcome.unwrap_or_else(|_| {
        error!(method = %method, path = %path, "handler panicked");
        internal_error()
    });

    let status = response.status_code().0;
    info!(
        method = %method,
        path = %path,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    if let Err(e) = request.respond(response) {
        error!(error = %e, "failed to write response");
    }
}

fn route(request: &mut Request, method: &Method, path: &str, state: &SharedState) -> HttpResponse {
    match (method, path) {
        (Method::Options, _) => preflight(),

        (Method::Get, "/") | (Method::Get, "/index.html") => handlers::index::handle_get(state),
        (Method::Get, "/health") => handlers::health::handle_get(),
        (Method::Post, "/classify_endpoint") => handlers::classify::handle_post(request, state),

        _ => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(resp: &'a HttpResponse, name: &'static str) -> Option<&'a str> {
        resp.headers().iter().find(|h| h.field.equiv(name)).map(|h| h.value.as_str())
    }

    #[test]
    fn every_response_allows_any_origin() {
        for resp in [not_found(), internal_error(), preflight(), html_response("<p>".into())] {
            assert_eq!(header(&resp, "Access-Control-Allow-Origin"), Some("*"));
        }
    }

    #[test]
    fn error_bodies_are_json() {
        let resp = not_found();
        assert_eq!(resp.status_code().0, 404);
        assert_eq!(header(&resp, "Content-Type"), Some("application/json"));
        assert_eq!(preflight().status_code().0, 204);
    }
}
