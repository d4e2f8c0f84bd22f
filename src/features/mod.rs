pub mod assembler;
pub mod layout;

pub use assembler::assemble_features;
pub use layout::{ChannelOrder, FeatureLayout};
