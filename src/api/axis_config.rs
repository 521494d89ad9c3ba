use serde::{Deserialize, Serialize};

use crate::core::{
    Axis, AxisRole, ComputationKind, CoordinateSetComputation, DEFAULT_MAX_VALUE_ICS,
    DateTimeUnit, Dimension, LogScale, Value,
};
use crate::error::{ChartError, ChartResult};

/// Persistable tick computation settings.
///
/// `number_of_values: None` keeps the per-dimension default density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSetConfig {
    #[serde(default = "default_computation_kind")]
    pub kind: ComputationKind,
    #[serde(default)]
    pub number_of_values: Option<usize>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub unit: Option<DateTimeUnit>,
    #[serde(default)]
    pub min_value: Option<Value>,
    #[serde(default)]
    pub max_value: Option<Value>,
    #[serde(default = "default_always_include")]
    pub always_include_min_value: bool,
    #[serde(default = "default_always_include")]
    pub always_include_max_value: bool,
    #[serde(default = "default_round_value_range")]
    pub round_value_range: bool,
}

impl Default for CoordinateSetConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateSetConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: default_computation_kind(),
            number_of_values: None,
            step: None,
            unit: None,
            min_value: None,
            max_value: None,
            always_include_min_value: default_always_include(),
            always_include_max_value: default_always_include(),
            round_value_range: default_round_value_range(),
        }
    }

    /// Requests at least `number_of_values` ticks.
    #[must_use]
    pub fn with_number_of_values(mut self, number_of_values: usize) -> Self {
        self.kind = ComputationKind::ByNumberOfPoints;
        self.number_of_values = Some(number_of_values);
        self
    }

    /// Uses an explicit step; `unit` only applies to date/time axes.
    #[must_use]
    pub fn with_step(mut self, step: f64, unit: Option<DateTimeUnit>) -> Self {
        self.kind = ComputationKind::ByStep;
        self.step = Some(step);
        self.unit = unit;
        self
    }

    /// Overrides the axis range for tick generation.
    #[must_use]
    pub fn with_value_range(mut self, min_value: Option<Value>, max_value: Option<Value>) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    #[must_use]
    pub fn with_always_include(mut self, min_value: bool, max_value: bool) -> Self {
        self.always_include_min_value = min_value;
        self.always_include_max_value = max_value;
        self
    }

    #[must_use]
    pub fn with_round_value_range(mut self, round: bool) -> Self {
        self.round_value_range = round;
        self
    }

    /// Builds a fresh, dirty computation from these settings.
    pub fn build(&self) -> ChartResult<CoordinateSetComputation> {
        let mut computation = CoordinateSetComputation::new();
        if let Some(step) = self.step {
            computation.set_step(step, self.unit)?;
        } else if self.kind == ComputationKind::ByStep {
            return Err(ChartError::InvalidArgument(
                "step computation config requires a step".to_owned(),
            ));
        }
        if let Some(number_of_values) = self.number_of_values {
            computation.set_number_of_values(number_of_values)?;
        }
        computation.set_computation_kind(self.kind);
        computation.set_min_value(self.min_value.clone());
        computation.set_max_value(self.max_value.clone());
        computation.set_always_include_min_value(self.always_include_min_value);
        computation.set_always_include_max_value(self.always_include_max_value);
        computation.set_round_value_range(self.round_value_range);
        Ok(computation)
    }

    #[must_use]
    pub fn from_computation(computation: &CoordinateSetComputation) -> Self {
        Self {
            kind: computation.computation_kind(),
            number_of_values: computation
                .is_number_of_values_explicit()
                .then(|| computation.number_of_values()),
            step: computation.step(),
            unit: computation.unit(),
            min_value: computation.min_value().cloned(),
            max_value: computation.max_value().cloned(),
            always_include_min_value: computation.always_include_min_value(),
            always_include_max_value: computation.always_include_max_value(),
            round_value_range: computation.round_value_range(),
        }
    }
}

/// Persistable axis setup.
///
/// The dimension is supplied separately when building, since enumerated
/// categories come from the bound data rather than from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default)]
    pub role: AxisRole,
    #[serde(default)]
    pub min_value: Option<Value>,
    #[serde(default)]
    pub max_value: Option<Value>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub log_base: Option<u32>,
    #[serde(default)]
    pub reference_value: Option<Value>,
    #[serde(default = "default_max_value_ics")]
    pub max_value_ics: f64,
    #[serde(default)]
    pub coordinates: CoordinateSetConfig,
}

impl AxisConfig {
    #[must_use]
    pub fn new(role: AxisRole) -> Self {
        Self {
            role,
            min_value: None,
            max_value: None,
            reverse: false,
            scale: default_scale(),
            log_base: None,
            reference_value: None,
            max_value_ics: default_max_value_ics(),
            coordinates: CoordinateSetConfig::new(),
        }
    }

    /// Sets the initial axis range.
    #[must_use]
    pub fn with_range(mut self, min_value: Value, max_value: Value) -> Self {
        self.min_value = Some(min_value);
        self.max_value = Some(max_value);
        self
    }

    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Sets the display unit multiplier.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_log_base(mut self, base: Option<u32>) -> Self {
        self.log_base = base;
        self
    }

    #[must_use]
    pub fn with_reference_value(mut self, reference: Option<Value>) -> Self {
        self.reference_value = reference;
        self
    }

    #[must_use]
    pub fn with_max_value_ics(mut self, max_value_ics: f64) -> Self {
        self.max_value_ics = max_value_ics;
        self
    }

    #[must_use]
    pub fn with_coordinates(mut self, coordinates: CoordinateSetConfig) -> Self {
        self.coordinates = coordinates;
        self
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

impl Axis {
    /// Builds an axis over `dimension` from persisted settings.
    pub fn from_config(config: &AxisConfig, dimension: Dimension) -> ChartResult<Self> {
        let mut axis = Self::new(config.role, dimension)?;
        if let Some(min) = &config.min_value {
            axis.set_min_value(min.clone())?;
        }
        if let Some(max) = &config.max_value {
            axis.set_max_value(max.clone())?;
        }
        axis.set_reverse(config.reverse);
        axis.set_scale(config.scale)?;
        axis.set_log_scale(config.log_base.map(LogScale::new).transpose()?);
        axis.set_reference_value(config.reference_value.clone())?;
        axis.set_max_value_ics(config.max_value_ics)?;
        *axis.default_computation_mut() = config.coordinates.build()?;
        Ok(axis)
    }

    /// Snapshot of the current settings, including the live range.
    #[must_use]
    pub fn config(&self) -> AxisConfig {
        AxisConfig {
            role: self.role(),
            min_value: Some(self.min_value().clone()),
            max_value: Some(self.max_value().clone()),
            reverse: self.reverse(),
            scale: self.scale(),
            log_base: self.log_scale().map(LogScale::base),
            reference_value: self.reference_value().cloned(),
            max_value_ics: self.max_value_ics(),
            coordinates: CoordinateSetConfig::from_computation(self.default_computation()),
        }
    }
}

fn default_computation_kind() -> ComputationKind {
    ComputationKind::ByNumberOfPoints
}

fn default_always_include() -> bool {
    true
}

fn default_round_value_range() -> bool {
    true
}

fn default_scale() -> f64 {
    1.0
}

fn default_max_value_ics() -> f64 {
    DEFAULT_MAX_VALUE_ICS
}
