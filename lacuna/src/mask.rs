use bit_vec::BitVec;

use crate::error::Error;
use crate::volume::{check_dimensions, Dimensions, OccupancyCube};

impl OccupancyCube {
	/// Builds a binary volume from a mask holding one bit per voxel, in the same X, Y, Z order
	/// as the volume itself. Set bits become a value of 1.
	pub fn from_mask(dimensions: Dimensions, mask: &BitVec) -> Result<Self, Error> {
		check_dimensions(dimensions, mask.len())?;

		let values: Vec<u32> = mask.iter().map(|bit| bit as u32).collect();

		OccupancyCube::new(dimensions, values)
	}

	/// The occupancy of every voxel as a bit mask.
	pub fn to_mask(&self) -> BitVec {
		self.values().iter().map(|&value| value != 0).collect()
	}
}
