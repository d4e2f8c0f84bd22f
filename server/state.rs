use std::sync::Arc;

use face_classifier::{ArtifactStore, ServiceConfig};

/// Process-wide server state.  Everything inside is read-only or guards
/// itself, so handlers share it without a lock.
pub struct ServerState {
    pub config: ServiceConfig,
    pub store: ArtifactStore,
}

impl ServerState {
    pub fn new(config: ServiceConfig) -> Self {
        let store = ArtifactStore::new(config.artifact_paths(), config.face_detection, config.eye_detection);
        ServerState { config, store }
    }
}

/// Shared state type passed to every handler.
pub type SharedState = Arc<ServerState>;
