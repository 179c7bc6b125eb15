//! # CartonKit
//!
//! Parametric die-line designer for corrugated shipping cartons. Given the
//! internal dimensions of a box, the board flute and the glue-lap setup it
//! produces the flat blank: where the sheet is cut, scored and slotted.
//!
//! ## Architecture
//!
//! CartonKit is organized as a workspace with multiple crates:
//!
//! 1. **cartonkit-core** - Flute catalogue, allowance tables, units
//! 2. **cartonkit-dieline** - Die-line geometry engine (FEFCO 0201)
//! 3. **cartonkit-settings** - Configuration and table persistence
//! 4. **cartonkit** - Command-line binary that integrates all crates

pub mod cli;

pub use cartonkit_core::data;
pub use cartonkit_core::{
    AllowanceEntry, AllowanceTable, DataError, Flute, FluteCatalogue, GlueSide, MeasurementSystem,
};

pub use cartonkit_dieline::{
    AllowanceResolver, AllowanceSource, BoxSpec, DesignRequest, DieLine, DieLineEngine,
    DielineError, GapConfig, GapEdit, GapLocks, GlueConfig, GlueOff, PanelLayout, SlotConfig,
};

pub use cartonkit_settings::{AllowanceStore, Config, FluteStore, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so JSON written to stdout stays clean. `RUST_LOG`
/// overrides the default level.
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(tracing::Level::WARN, false)
}

/// Initialize logging at a given default level, optionally as JSON lines
pub fn init_logging_with(level: tracing::Level, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Map `-v` repetitions to a default log level
pub fn verbosity_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}
