/// Face classifier HTTP server.
///
/// Served by a synchronous tiny_http server, one thread per request.
///
/// Run with:
///   cargo run --bin server --release
/// Then open http://127.0.0.1:5000
///
/// Routes:
///   GET  /                   upload page
///   GET  /health             liveness
///   POST /classify_endpoint  classify the `image` field (JSON, form or multipart)

mod handlers;
mod render;
mod routes;
mod state;
mod util;

use std::sync::Arc;

use tiny_http::Server;
use tracing::{error, info, warn};

use face_classifier::{logging, ServiceConfig};
use state::ServerState;

fn main() {
    logging::init("face_classifier=info,server=info");

    let config = ServiceConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        artifacts = %config.artifacts_dir.display(),
        lazy_load = config.lazy_load,
        "starting face classifier server"
    );

    let shared_state = Arc::new(ServerState::new(config));

    if !shared_state.config.lazy_load {
        match shared_state.store.load() {
            Ok(ctx) => info!(classes = ctx.dictionary().len(), "artifacts loaded"),
            // Keep serving; classification answers 503 until a retry succeeds.
            Err(e) => warn!(error = %e, "artifacts failed to load at startup"),
        }
    }

    let addr = shared_state.config.bind_addr();
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind HTTP server");
            std::process::exit(1);
        }
    };
    info!(addr = %addr, "listening");

    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}
