//! ethnopath-digitizer library interface
//!
//! Digitizes publicly documented traditional plant knowledge through an
//! ethical compliance gate and a 3-tier pipeline:
//! extractors → cultural context preserver → knowledge graph builder.

pub mod compliance;
pub mod config;
pub mod corpus;
pub mod error;
pub mod export;
pub mod extractors; // Tier 1: per-modality extractors
pub mod fusion; // Tier 2: cultural context preservation
pub mod graph; // Tier 3: knowledge graph construction
pub mod types;
pub mod workflow;

pub use crate::error::{DigitizeError, Result, ValidationError};
pub use crate::workflow::{DigitizationRun, Pipeline, PipelineConfig};
