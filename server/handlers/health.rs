use serde_json::json;

use crate::routes::{json_response, HttpResponse};

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness only; it never triggers an artifact load.
pub fn handle_get() -> HttpResponse {
    json_response(200, &json!({ "status": "healthy" }))
}
