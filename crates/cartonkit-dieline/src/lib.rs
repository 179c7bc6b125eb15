//! # CartonKit Die-Line
//!
//! Geometry engine for corrugated carton blanks. Given internal
//! dimensions, board, glue lap and an allowance table it produces the
//! flat die-line: panel widths, flap heights, slots, the glue-lap
//! chamfer and the cutting boundaries, all in millimetres.
//!
//! ## Styles
//!
//! - **Regular Slotted Case (FEFCO 0201)**: [`rsc::DieLineEngine`]

pub mod error;
pub mod rsc;

pub use error::{DielineError, DielineResult, ParameterError, ParameterResult};
pub use rsc::allowance::{AllowanceResolver, AllowanceRow, AllowanceSource, ResolvedAllowance};
pub use rsc::layout::PanelLayout;
pub use rsc::{
    BoxSpec, DesignRequest, DieLine, DieLineEngine, GapConfig, GapEdit, GapLocks, GlueConfig,
    GlueOff, SlotConfig,
};
