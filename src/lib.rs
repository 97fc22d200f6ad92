// src/lib.rs

//! Internal library for nucleo – not published on crates.io

pub mod app_controller;
pub mod common;
pub mod engine;
pub mod ui;

// Re-export a narrow, testable API surface
pub use engine::{
    config::{AnalysisConfig, AnalysisConfigBuilder},
    model::{AnalysisType, BusinessData, BusinessProfile, HistoryRecord, PersonalData},
    parser::ParsedAnalysis,
    session::{AnalysisInput, AnalysisSession},
};
