//! Warped-disk X-ray reprocessing engine.
//!
//! Beam pattern and disk geometry, heating, self-occlusion,
//! blackbody band synthesis and pulse assembly.

pub mod band_table;
pub mod beam;
pub mod blackbody;
pub mod disk;
pub mod illumination;
pub mod pulse;
pub mod spectrum;
pub mod visibility;
