// Knowledge Extractor: LLM-backed summaries, topics and keywords for text
//
// This is the library root. Each module corresponds to a major subsystem
// of the analysis pipeline.

pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod provider;
pub mod status;
