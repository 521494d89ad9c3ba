use serde::{Deserialize, Serialize};

use crate::core::axis::{Axis, AxisRole};
use crate::core::context::AxisContext;
use crate::core::dimension::Dimension;
use crate::core::scale::LinearScale;
use crate::core::types::Viewport;
use crate::core::value::Value;
use crate::error::{ChartError, ChartResult};

/// Point in the world coordinate system (WCS).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPoint {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    #[must_use]
    pub fn offset(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Three axes whose ICS coordinates combine into world space through per-axis
/// unit vectors. Swapping the X and Y unit vectors lays a chart out sideways.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    x: Axis,
    y: Axis,
    z: Axis,
    x_unit: WorldPoint,
    y_unit: WorldPoint,
    z_unit: WorldPoint,
}

impl CoordinateSystem {
    /// Creates a system with a numeric depth axis and the identity basis.
    pub fn new(x_dimension: Dimension, y_dimension: Dimension) -> ChartResult<Self> {
        Ok(Self {
            x: Axis::new(AxisRole::X, x_dimension)?,
            y: Axis::new(AxisRole::Y, y_dimension)?,
            z: Axis::new(AxisRole::Z, Dimension::Numeric)?,
            x_unit: WorldPoint::new(1.0, 0.0, 0.0),
            y_unit: WorldPoint::new(0.0, 1.0, 0.0),
            z_unit: WorldPoint::new(0.0, 0.0, 1.0),
        })
    }

    pub fn with_z_dimension(mut self, z_dimension: Dimension) -> ChartResult<Self> {
        self.z = Axis::new(AxisRole::Z, z_dimension)?;
        Ok(self)
    }

    #[must_use]
    pub fn axis(&self, role: AxisRole) -> &Axis {
        match role {
            AxisRole::X => &self.x,
            AxisRole::Y => &self.y,
            AxisRole::Z => &self.z,
        }
    }

    pub fn axis_mut(&mut self, role: AxisRole) -> &mut Axis {
        match role {
            AxisRole::X => &mut self.x,
            AxisRole::Y => &mut self.y,
            AxisRole::Z => &mut self.z,
        }
    }

    #[must_use]
    pub fn unit_vector(&self, role: AxisRole) -> WorldPoint {
        match role {
            AxisRole::X => self.x_unit,
            AxisRole::Y => self.y_unit,
            AxisRole::Z => self.z_unit,
        }
    }

    /// World displacement of one ICS unit along `role`'s axis.
    pub fn set_unit_vector(&mut self, role: AxisRole, unit: WorldPoint) -> ChartResult<()> {
        if !unit.is_finite() {
            return Err(ChartError::InvalidArgument(
                "unit vector components must be finite".to_owned(),
            ));
        }
        match role {
            AxisRole::X => self.x_unit = unit,
            AxisRole::Y => self.y_unit = unit,
            AxisRole::Z => self.z_unit = unit,
        }
        Ok(())
    }

    #[must_use]
    pub fn ics_to_wcs(&self, x_ics: f64, y_ics: f64, z_ics: f64) -> WorldPoint {
        self.x_unit
            .scaled(x_ics)
            .offset(self.y_unit.scaled(y_ics))
            .offset(self.z_unit.scaled(z_ics))
    }

    /// World position of a data point; a missing depth value sits at the
    /// start of the Z axis.
    pub fn world_point(&self, x: &Value, y: &Value, z: Option<&Value>) -> ChartResult<WorldPoint> {
        let x_ics = self.x.icoordinate(x)?;
        let y_ics = self.y.icoordinate(y)?;
        let z_ics = match z {
            Some(value) => self.z.icoordinate(value)?,
            None => self.z.min_value_ics(),
        };
        Ok(self.ics_to_wcs(x_ics, y_ics, z_ics))
    }

    /// Runs [`Axis::adjust_range`] on every axis.
    pub fn adjust_ranges(&mut self, ctx: &mut AxisContext) -> ChartResult<()> {
        self.x.adjust_range(ctx)?;
        self.y.adjust_range(ctx)?;
        self.z.adjust_range(ctx)
    }

    /// World-space width and height covered by the X/Y plane.
    #[must_use]
    pub fn plane_extent(&self) -> (f64, f64) {
        let x_span = self.x_unit.scaled(self.x.max_value_ics() - self.x.min_value_ics());
        let y_span = self.y_unit.scaled(self.y.max_value_ics() - self.y.min_value_ics());
        (x_span.x.abs() + y_span.x.abs(), x_span.y.abs() + y_span.y.abs())
    }

    /// Projection of this system's X/Y plane onto `viewport`.
    pub fn projection(&self, viewport: Viewport) -> ChartResult<ParallelProjection> {
        let (width, height) = self.plane_extent();
        ParallelProjection::new(viewport, width, height)
    }
}

/// Parallel (oblique) projection from world space onto a viewport.
///
/// World X grows right and world Y grows up; depth shifts a point by a fixed
/// pixel offset per world unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallelProjection {
    viewport: Viewport,
    horizontal: LinearScale,
    vertical: LinearScale,
    depth_dx: f64,
    depth_dy: f64,
}

impl ParallelProjection {
    pub fn new(viewport: Viewport, world_width: f64, world_height: f64) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            viewport,
            horizontal: LinearScale::new(0.0, world_width)?,
            vertical: LinearScale::new(0.0, world_height)?,
            depth_dx: 0.0,
            depth_dy: 0.0,
        })
    }

    /// Pixel shift applied per world unit of depth.
    pub fn with_depth_offset(mut self, dx: f64, dy: f64) -> ChartResult<Self> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(ChartError::InvalidArgument(
                "depth offset must be finite".to_owned(),
            ));
        }
        self.depth_dx = dx;
        self.depth_dy = dy;
        Ok(self)
    }

    #[must_use]
    pub fn viewport(self) -> Viewport {
        self.viewport
    }

    pub fn project(self, point: WorldPoint) -> ChartResult<(f64, f64)> {
        let width = f64::from(self.viewport.width);
        let height = f64::from(self.viewport.height);
        let x = self.horizontal.domain_to_range(point.x, 0.0, width)?;
        let y = self.vertical.domain_to_range(point.y, height, 0.0)?;
        Ok((x + point.z * self.depth_dx, y - point.z * self.depth_dy))
    }
}
