//! chart-axes: axis coordinate engine for charts.
//!
//! Maps numeric, date/time, index and categorical values through an axis'
//! logical and intermediate coordinate systems, and computes round,
//! human-friendly tick sets for them. Rendering is left to the host.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{AxisConfig, CoordinateSetConfig};
pub use crate::core::{
    Axis, AxisContext, CoordinateSet, CoordinateSetComputation, Dimension, Value,
};
pub use error::{ChartError, ChartResult};
