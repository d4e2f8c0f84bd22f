pub mod metadata;
pub mod network;

pub use metadata::ModelMetadata;
pub use network::Network;
