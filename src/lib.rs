//! Survey Lens: cleans workplace mental-health survey exports into numeric
//! codes, summarizes each field's distribution and flags candidate
//! indicator fields with a simple heuristic.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod state;
pub mod ui;
