//! Band mapper implementation
//!
//! Categorical mapping: values fall into threshold bands and each band
//! produces one fixed output. Useful when a dataset should sound as a
//! handful of distinct tones (small / medium / large) instead of a
//! continuous sweep.

use super::Mapper;

/// One threshold band
#[derive(Debug, Clone, Copy)]
struct Band {
    threshold: f64,
    output: f64,
}

/// Maps values to discrete outputs by threshold bands
///
/// Bands are checked from the highest threshold down; the first band
/// whose threshold the input exceeds wins. Inputs below every
/// threshold produce the fallback output.
pub struct BandMapper {
    name: String,
    bands: Vec<Band>,
    fallback: f64,
}

impl BandMapper {
    /// Create a new band mapper with a fallback output
    pub fn new(name: impl Into<String>, fallback: f64) -> Self {
        Self {
            name: name.into(),
            bands: Vec::new(),
            fallback,
        }
    }

    /// Add a band: inputs strictly above `threshold` map to `output`
    ///
    /// Bands may be added in any order; they are kept sorted by
    /// descending threshold.
    pub fn with_band(mut self, threshold: f64, output: f64) -> Self {
        self.bands.push(Band { threshold, output });
        self.bands
            .sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        self
    }

    /// Number of bands (not counting the fallback)
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
}

impl Mapper for BandMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        for band in &self.bands {
            if input > band.threshold {
                return band.output;
            }
        }
        self.fallback
    }
}
