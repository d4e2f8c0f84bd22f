use crate::render::render_index;
use crate::routes::{html_response, HttpResponse};
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_get(state: &SharedState) -> HttpResponse {
    html_response(render_index(state.config.max_body_bytes))
}
