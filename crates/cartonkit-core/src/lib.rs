//! # CartonKit Core
//!
//! Core types and reference data for CartonKit.
//! Provides the flute catalogue, the manufacturing allowance tables,
//! unit handling and the reference-data error type.

pub mod data;
pub mod error;
pub mod units;

pub use data::{
    allowances::{AllowanceEntry, AllowanceTable, PanelAllowances},
    flutes::{Flute, FluteCatalogue},
    GlueSide,
};

pub use error::{DataError, DataResult};

pub use units::MeasurementSystem;
