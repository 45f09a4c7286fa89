//! Mapping system for transforming data to audio parameters
//!
//! Maps data values into pitch space and snaps them to named notes.

mod bands;
mod linear;
mod mapper;
mod quantize;

pub use bands::BandMapper;
pub use linear::LinearMapper;
pub use mapper::{Mapper, MappingPipeline};
pub use quantize::{NoteName, NoteSet, PitchQuantizer};
