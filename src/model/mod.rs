pub mod types;
pub mod transcript;
pub mod gene;
pub mod junction;

pub use types::{GeneId, GeneKey};
