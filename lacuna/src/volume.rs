use crate::error::Error;
use std::fmt::{self, Display, Formatter};
use std::ops::Index;

/// Extents of a volume along each axis.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub struct Dimensions {
	pub x: usize,
	pub y: usize,
	pub z: usize
}

impl Dimensions {
	pub fn new(x: usize, y: usize, z: usize) -> Self {
		Dimensions { x, y, z }
	}

	/// Number of voxels. Only meaningful for dimensions that passed validation, where the product
	/// is known to fit in a `usize`.
	pub fn volume(&self) -> usize {
		self.x * self.y * self.z
	}

	/// Number of voxels, or None if the product overflows.
	pub fn checked_volume(&self) -> Option<usize> {
		self.x.checked_mul(self.y)?.checked_mul(self.z)
	}

	/// Number of entries in the prefix sum table of a volume with these dimensions, which has one
	/// extra entry along each axis. None if the product overflows.
	pub fn summed_len(&self) -> Option<usize> {
		let (x, y, z) = (self.x.checked_add(1)?, self.y.checked_add(1)?, self.z.checked_add(1)?);

		x.checked_mul(y)?.checked_mul(z)
	}

	/// Length of the shortest edge, which is also the largest box that fits in the volume.
	pub fn min_edge(&self) -> usize {
		self.x.min(self.y).min(self.z)
	}

	pub fn is_empty(&self) -> bool {
		self.x == 0 || self.y == 0 || self.z == 0
	}

	/// Number of positions a box with the given edge can occupy while staying fully inside the
	/// volume. Zero if the box is larger than any extent.
	pub fn windows(&self, edge: usize) -> u64 {
		if edge == 0 || edge > self.min_edge() {
			return 0;
		}

		let per_axis = |extent: usize| (extent - edge + 1) as u64;

		per_axis(self.x) * per_axis(self.y) * per_axis(self.z)
	}

	/// Linear index of a voxel: X varies fastest, then Y, then Z.
	pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
		(z * self.y + y) * self.x + x
	}
}

impl Display for Dimensions {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}x{}x{}", self.x, self.y, self.z)
	}
}

/// An immutable 3D volume of non-negative voxel values.
///
/// Each value is either a binary occupancy indicator (0 or 1) or a count. Values are stored with
/// X varying fastest, then Y, then Z, so the voxel at `(x, y, z)` lives at
/// `(z * Y + y) * X + x`. This is the same ordering as a column-major (row, column, slice) cube.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OccupancyCube {
	dimensions: Dimensions,
	values: Box<[u32]>
}

impl OccupancyCube {
	pub fn new(dimensions: Dimensions, values: Vec<u32>) -> Result<Self, Error> {
		check_dimensions(dimensions, values.len())?;

		Ok(OccupancyCube {
			dimensions,
			values: values.into_boxed_slice()
		})
	}

	pub fn filled(dimensions: Dimensions, value: u32) -> Result<Self, Error> {
		let volume = checked_volume(dimensions)?;

		Self::new(dimensions, vec![value; volume])
	}

	/// Builds a volume by evaluating `f(x, y, z)` for every voxel.
	pub fn from_fn<F>(dimensions: Dimensions, mut f: F) -> Result<Self, Error> where F: FnMut(usize, usize, usize) -> u32 {
		let volume = checked_volume(dimensions)?;
		let mut values = Vec::with_capacity(volume);

		for z in 0..dimensions.z {
			for y in 0..dimensions.y {
				for x in 0..dimensions.x {
					values.push(f(x, y, z));
				}
			}
		}

		Self::new(dimensions, values)
	}

	pub fn dimensions(&self) -> Dimensions {
		self.dimensions
	}

	pub fn values(&self) -> &[u32] {
		&self.values
	}

	/// Gets the value of a voxel.
	/// # Panics
	/// If the position is outside of the volume.
	pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
		let Dimensions { x: x_size, y: y_size, z: z_size } = self.dimensions;

		if x >= x_size || y >= y_size || z >= z_size {
			panic!("voxel ({}, {}, {}) out of bounds for a volume of {}", x, y, z, self.dimensions);
		}

		self.values[self.dimensions.index(x, y, z)]
	}

	/// Sum of every voxel value.
	pub fn total_mass(&self) -> u64 {
		self.values.iter().map(|&value| value as u64).sum()
	}

	pub fn mean_value(&self) -> f64 {
		self.total_mass() as f64 / self.values.len() as f64
	}

	/// Number of voxels with a non-zero value.
	pub fn occupied(&self) -> usize {
		self.values.iter().filter(|&&value| value != 0).count()
	}

	/// Reduces the volume to binary occupancy: values above the threshold become 1, everything
	/// else becomes 0.
	pub fn binarized(&self, threshold: u32) -> OccupancyCube {
		let values: Vec<u32> = self.values.iter().map(|&value| (value > threshold) as u32).collect();

		OccupancyCube {
			dimensions: self.dimensions,
			values: values.into_boxed_slice()
		}
	}
}

impl Index<(usize, usize, usize)> for OccupancyCube {
	type Output = u32;

	fn index(&self, (x, y, z): (usize, usize, usize)) -> &u32 {
		&self.values[self.dimensions.index(x, y, z)]
	}
}

/// Rejects empty dimensions, and dimensions whose voxel count or prefix sum table size does not
/// fit in a `usize`.
fn checked_volume(dimensions: Dimensions) -> Result<usize, Error> {
	if dimensions.is_empty() {
		return Err(Error::ZeroDimension(dimensions));
	}

	match (dimensions.checked_volume(), dimensions.summed_len()) {
		(Some(volume), Some(_)) => Ok(volume),
		_ => Err(Error::TooLarge(dimensions))
	}
}

pub(crate) fn check_dimensions(dimensions: Dimensions, len: usize) -> Result<(), Error> {
	let volume = checked_volume(dimensions)?;

	if len != volume {
		return Err(Error::ValueCount { expected: volume, actual: len });
	}

	Ok(())
}
