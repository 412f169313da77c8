#![forbid(unsafe_code)]

//! Core domain model and business logic for FitGlass.
//!
//! This crate provides:
//! - Domain types (profile, daily inputs, daily logs)
//! - Metabolic engine (BMR, TDEE, deficit, fat loss)
//! - Adherence scoring
//! - Aggregation over the log collection
//! - Persistence (journal, profile file, repositories, CSV export)
//! - The tracker that ties them together on save

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod engine;
pub mod scoring;
pub mod aggregation;
pub mod goals;
pub mod journal;
pub mod lock;
pub mod profile_store;
pub mod repository;
pub mod export;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use engine::{
    activity_factor_from_steps, calculate_bmr, calculate_daily_fat_loss,
    calculate_deficit_and_fat_loss, calculate_total_burn,
};
pub use scoring::{calculate_score, score_breakdown, ScoreBreakdown};
pub use goals::suggest_reference_tdee;
pub use repository::{
    ChangeFeed, FileRepository, LogRepository, MemoryRepository, ProfileRepository, StoreEvent,
};
pub use profile_store::ProfileStore;
pub use export::export_csv;
pub use tracker::{Summary, Tracker};
