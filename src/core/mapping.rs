use serde::{Deserialize, Serialize};

use crate::core::scale::LinearScale;
use crate::core::types::Viewport;
use crate::error::{ChartError, ChartResult};

/// Screen direction an axis is laid out along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScreenDirection {
    #[default]
    Horizontal,
    /// Pixel rows grow downward, so larger ICS values map to smaller rows.
    Vertical,
}

/// Maps an axis' intermediate coordinates onto a viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetMapping {
    viewport: Viewport,
    direction: ScreenDirection,
    margin_start_px: f64,
    margin_end_px: f64,
}

impl TargetMapping {
    pub fn new(viewport: Viewport, direction: ScreenDirection) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            viewport,
            direction,
            margin_start_px: 0.0,
            margin_end_px: 0.0,
        })
    }

    /// Reserves pixels at both ends of the plot extent.
    pub fn with_margins(mut self, start_px: f64, end_px: f64) -> ChartResult<Self> {
        let valid = |margin: f64| margin.is_finite() && margin >= 0.0;
        if !valid(start_px) || !valid(end_px) {
            return Err(ChartError::InvalidArgument(
                "margins must be finite and >= 0".to_owned(),
            ));
        }
        if start_px + end_px >= self.extent_px() {
            return Err(ChartError::InvalidArgument(
                "margins leave no room for the plot".to_owned(),
            ));
        }
        self.margin_start_px = start_px;
        self.margin_end_px = end_px;
        Ok(self)
    }

    #[must_use]
    pub fn viewport(self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn direction(self) -> ScreenDirection {
        self.direction
    }

    #[must_use]
    pub fn extent_px(self) -> f64 {
        match self.direction {
            ScreenDirection::Horizontal => f64::from(self.viewport.width),
            ScreenDirection::Vertical => f64::from(self.viewport.height),
        }
    }

    /// Pixel positions of `min_ics` and `max_ics`.
    #[must_use]
    pub fn pixel_range(self) -> (f64, f64) {
        let extent = self.extent_px();
        match self.direction {
            ScreenDirection::Horizontal => (self.margin_start_px, extent - self.margin_end_px),
            ScreenDirection::Vertical => (extent - self.margin_start_px, self.margin_end_px),
        }
    }

    pub fn ics_to_pixel(self, ics: f64, min_ics: f64, max_ics: f64) -> ChartResult<f64> {
        let (start, end) = self.pixel_range();
        LinearScale::new(min_ics, max_ics)?.domain_to_range(ics, start, end)
    }

    pub fn pixel_to_ics(self, pixel: f64, min_ics: f64, max_ics: f64) -> ChartResult<f64> {
        let (start, end) = self.pixel_range();
        LinearScale::new(min_ics, max_ics)?.range_to_domain(pixel, start, end)
    }

    pub fn ics_length_to_pixels(self, length: f64, min_ics: f64, max_ics: f64) -> ChartResult<f64> {
        let (start, end) = self.pixel_range();
        LinearScale::new(min_ics, max_ics)?.length_to_range(length, start, end)
    }
}
