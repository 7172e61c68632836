/// Nombre de numéros possibles (00 à 99).
pub const POOL_SIZE: usize = 100;

/// Nombre de numéros tirés par concours.
pub const DRAW_SIZE: usize = 20;

pub mod audit;
pub mod config;
pub mod error;
pub mod generator;
pub mod score;
pub mod seed;
pub mod selection;
pub mod stats;

pub use config::{GenerationConfig, ScoringWeights};
pub use error::EngineError;
pub use generator::{analyze, generate, Analysis, Generation};
