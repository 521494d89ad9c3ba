use serde::{Deserialize, Serialize};
use tracing::warn;

/// A recoverable issue found while computing axis coordinates.
///
/// The computation that registered it has already fallen back to a valid
/// layout; the chart renders, just differently than configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartWarning {
    pub message: String,
}

/// Owning-chart state consulted by axis computations.
///
/// Passed explicitly into every evaluation instead of being reached through the
/// axis. Collects warnings for the host to surface after binding or rendering.
#[derive(Debug, Clone, Default)]
pub struct AxisContext {
    design_mode: bool,
    warnings: Vec<ChartWarning>,
}

impl AxisContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// While in design mode cached coordinate sets are served without
    /// recomputation, e.g. during serialization round-trips.
    #[must_use]
    pub fn with_design_mode(mut self, design_mode: bool) -> Self {
        self.design_mode = design_mode;
        self
    }

    #[must_use]
    pub fn design_mode(&self) -> bool {
        self.design_mode
    }

    pub fn set_design_mode(&mut self, design_mode: bool) {
        self.design_mode = design_mode;
    }

    pub fn register_error_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(message = %message, "axis computation fell back");
        self.warnings.push(ChartWarning { message });
    }

    #[must_use]
    pub fn warnings(&self) -> &[ChartWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<ChartWarning> {
        std::mem::take(&mut self.warnings)
    }
}
