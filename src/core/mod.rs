pub mod axis;
pub mod context;
pub mod coordinate_set;
pub mod coordinate_system;
pub mod dimension;
pub mod interval;
pub mod mapping;
pub mod primitives;
pub mod scale;
pub mod types;
pub mod value;

pub use axis::{Axis, AxisRole, AxisState, DEFAULT_MAX_VALUE_ICS, LogScale, MIN_VALUE_ICS};
pub use context::{AxisContext, ChartWarning};
pub use coordinate_set::{
    ComputationKind, CoordinateSet, CoordinateSetComputation,
    DEFAULT_CATEGORICAL_NUMBER_OF_VALUES, DEFAULT_NUMBER_OF_VALUES,
};
pub use coordinate_system::{CoordinateSystem, ParallelProjection, WorldPoint};
pub use dimension::{Dimension, EnumeratedDimension};
pub use interval::{
    DateTimeStep, DateTimeUnit, NiceStep, StepGrid, nice_numeric_step, point_count,
    select_date_time_step, select_index_step,
};
pub use mapping::{ScreenDirection, TargetMapping};
pub use scale::LinearScale;
pub use types::Viewport;
pub use value::{Value, ValueKind};
