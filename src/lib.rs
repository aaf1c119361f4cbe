// Library crate - exports the simulation engine, analytics, and shared types

pub mod analytics;
pub mod engine;
pub mod export;
pub mod histogram;
pub mod monte_carlo;
pub mod sampler;
pub mod types;

// Re-export the orchestrator boundary and commonly used types
pub use engine::run_simulation;
pub use types::*;
