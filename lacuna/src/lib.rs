#![forbid(unsafe_code)]

//! # `lacuna`: gliding-box lacunarity
//!
//! Measures how "gappy" an occupancy volume is at a range of scales.
//!
//! A cubic box of edge `r` is slid across the volume one voxel at a time, visiting every
//! position where it fits entirely inside. The mass of a box is the sum of the voxel values it
//! covers. For each box size, the distribution of masses is summarized by its mean and
//! population variance, and the lacunarity is
//!
//! ```text
//! Λ(r) = variance / mean² + 1
//! ```
//!
//! A perfectly homogeneous volume has a lacunarity of exactly 1 at every scale, while clumped or
//! porous volumes give higher values at the scales where their gaps live.
//!
//! # Layout
//!
//! Volumes are stored with X varying fastest, then Y, then Z. See [`volume::OccupancyCube`].
//!
//! # Example
//!
//! ```
//! use lacuna::volume::{Dimensions, OccupancyCube};
//!
//! let cube = OccupancyCube::filled(Dimensions::new(2, 2, 2), 1).unwrap();
//! let table = lacuna::compute(&cube, &[1, 2]).unwrap();
//!
//! assert_eq!(table[0].n_boxes, 8);
//! assert_eq!(table[1].mean_mass, 8.0);
//! assert_eq!(table[1].lacunarity, 1.0);
//! ```

// Variable length bit collections, used for binary occupancy masks
extern crate bit_vec;

// Work stealing parallelism across box sizes
extern crate rayon;

mod error;

/// The occupancy volume and its dimensions.
pub mod volume;

/// Building volumes out of bit masks.
pub mod mask;

/// 3D prefix sums for constant time box mass queries.
pub mod summed;

/// Box size lists and the presets that generate them.
pub mod sizes;

pub mod gliding;
pub mod table;
pub mod traces;

pub use error::Error;
pub use gliding::{compute, GlidingBoxAnalyzer};
pub use sizes::BoxSizes;
pub use table::{LacunarityRecord, ResultTable};
pub use traces::{AnalysisTraces, IgnoreTraces, PrintTraces};
