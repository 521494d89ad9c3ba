use crate::error::{ChartError, ChartResult};

/// Affine map from a finite domain onto an arbitrary pixel interval.
///
/// The pixel interval may be descending, which is how vertical axes grow
/// upward on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    pub fn domain_to_range(self, value: f64, range_start: f64, range_end: f64) -> ChartResult<f64> {
        if !value.is_finite() {
            return Err(ChartError::InvalidData("value must be finite".to_owned()));
        }
        check_range(range_start, range_end)?;

        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        Ok(range_start + normalized * (range_end - range_start))
    }

    pub fn range_to_domain(self, pixel: f64, range_start: f64, range_end: f64) -> ChartResult<f64> {
        if !pixel.is_finite() {
            return Err(ChartError::InvalidData("pixel must be finite".to_owned()));
        }
        check_range(range_start, range_end)?;

        let normalized = (pixel - range_start) / (range_end - range_start);
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }

    /// Pixel length of a domain length; always non-negative.
    pub fn length_to_range(self, length: f64, range_start: f64, range_end: f64) -> ChartResult<f64> {
        if !length.is_finite() {
            return Err(ChartError::InvalidData("length must be finite".to_owned()));
        }
        check_range(range_start, range_end)?;

        let ratio = (range_end - range_start) / (self.domain_end - self.domain_start);
        Ok((length * ratio).abs())
    }
}

fn check_range(range_start: f64, range_end: f64) -> ChartResult<()> {
    if !range_start.is_finite() || !range_end.is_finite() || range_start == range_end {
        return Err(ChartError::InvalidData(
            "pixel range must be finite and non-empty".to_owned(),
        ));
    }
    Ok(())
}
