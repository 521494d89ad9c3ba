mod axis_config;

pub use axis_config::{AxisConfig, CoordinateSetConfig};
