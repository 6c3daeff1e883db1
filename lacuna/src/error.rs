use crate::volume::Dimensions;
use std::fmt::{self, Display, Formatter};

/// Rejected input. Every variant describes an ill-formed request; degenerate but well-formed
/// requests (oversized boxes, empty volumes) are reported through NaN values in the results
/// instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// A box size at the given position of the size list was zero or negative.
	NonPositiveBoxSize { index: usize, size: i64 },
	/// At least one extent of a volume was zero.
	ZeroDimension(Dimensions),
	/// The voxel count of a volume, or the size of its prefix sum table, overflows a `usize`.
	TooLarge(Dimensions),
	/// A value buffer or mask did not hold exactly one entry per voxel.
	ValueCount { expected: usize, actual: usize },
	/// A box size preset could not be parsed.
	InvalidBoxSizes(String)
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Error::NonPositiveBoxSize { index, size } => {
				write!(f, "box size #{} is {}, but box sizes must be positive", index, size)
			},
			Error::ZeroDimension(dimensions) => {
				write!(f, "volume dimensions {} contain a zero extent", dimensions)
			},
			Error::TooLarge(dimensions) => {
				write!(f, "volume dimensions {} are too large to address", dimensions)
			},
			Error::ValueCount { expected, actual } => {
				write!(f, "expected {} voxel values, but got {}", expected, actual)
			},
			Error::InvalidBoxSizes(description) => {
				write!(f, "invalid box sizes \"{}\": expected twos, all, or a comma separated list of integers", description)
			}
		}
	}
}

impl ::std::error::Error for Error {}
