//! Linear mapper implementation

use super::Mapper;

/// Linear interpolation mapper
///
/// Maps a value's position in [in_min, in_max] into [out_min, out_max].
/// The output is always clamped to the target range: callers routinely
/// hand us values a hair outside the source range (floating point, or a
/// dataset refiltered since the range was computed).
pub struct LinearMapper {
    name: String,
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
}

impl LinearMapper {
    /// Create a new linear mapper
    pub fn new(
        name: impl Into<String>,
        in_min: f64,
        in_max: f64,
        out_min: f64,
        out_max: f64,
    ) -> Self {
        Self {
            name: name.into(),
            in_min,
            in_max,
            out_min,
            out_max,
        }
    }
}

impl Mapper for LinearMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        let in_range = self.in_max - self.in_min;

        // Degenerate source range (single point or all-equal dataset):
        // fall back to the low end of the target rather than dividing
        // by zero.
        if in_range.abs() < f64::EPSILON {
            return self.out_min;
        }

        let normalized = (input - self.in_min) / in_range;
        let output = self.out_min + normalized * (self.out_max - self.out_min);

        output.clamp(
            self.out_min.min(self.out_max),
            self.out_min.max(self.out_max),
        )
    }
}
