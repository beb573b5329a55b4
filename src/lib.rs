//! Guild raid ("Asgard") report builder.
//!
//! Loads an event export, the guild roster, the hero/pet catalog, the buff
//! catalog and any archived events, then aggregates them into the report
//! tables rendered by [report].

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod report;
