use crate::volume::{Dimensions, OccupancyCube};

/// Inclusive 3D prefix sums of a volume.
///
/// Entry `(x, y, z)` of the table holds the total mass of the voxels in `[0, x) × [0, y) × [0, z)`,
/// so the table has one more entry than the volume along each axis. Any axis aligned box can then
/// be summed with 8 lookups.
///
/// Intermediate sums use wrapping arithmetic: the inclusion-exclusion terms may temporarily
/// underflow, but the final result of every query is exact as long as the total mass of the
/// volume fits in a `u64`.
#[derive(Debug, Clone)]
pub struct SummedVolume {
	dimensions: Dimensions,
	sums: Box<[u64]>
}

impl SummedVolume {
	pub fn new(cube: &OccupancyCube) -> Self {
		let dimensions = cube.dimensions();
		let (sx, sy, sz) = (dimensions.x + 1, dimensions.y + 1, dimensions.z + 1);

		// Every OccupancyCube has been checked to have an addressable prefix sum table
		let len = match dimensions.summed_len() {
			Some(len) => len,
			None => panic!("prefix sum table for a volume of {} overflows a usize", dimensions)
		};

		let mut sums = vec![0u64; len];
		let at = |x: usize, y: usize, z: usize| (z * sy + y) * sx + x;

		for z in 1..sz {
			for y in 1..sy {
				for x in 1..sx {
					let value = cube[(x - 1, y - 1, z - 1)] as u64;

					sums[at(x, y, z)] = value
						.wrapping_add(sums[at(x - 1, y,     z    )])
						.wrapping_add(sums[at(x,     y - 1, z    )])
						.wrapping_add(sums[at(x,     y,     z - 1)])
						.wrapping_sub(sums[at(x - 1, y - 1, z    )])
						.wrapping_sub(sums[at(x - 1, y,     z - 1)])
						.wrapping_sub(sums[at(x,     y - 1, z - 1)])
						.wrapping_add(sums[at(x - 1, y - 1, z - 1)]);
				}
			}
		}

		SummedVolume {
			dimensions,
			sums: sums.into_boxed_slice()
		}
	}

	pub fn dimensions(&self) -> Dimensions {
		self.dimensions
	}

	fn at(&self, x: usize, y: usize, z: usize) -> u64 {
		let (sx, sy) = (self.dimensions.x + 1, self.dimensions.y + 1);

		self.sums[(z * sy + y) * sx + x]
	}

	/// Total mass of the box spanning `[x0, x1) × [y0, y1) × [z0, z1)`.
	/// # Panics
	/// If an upper bound exceeds the volume's extent.
	pub fn range_mass(&self, (x0, y0, z0): (usize, usize, usize), (x1, y1, z1): (usize, usize, usize)) -> u64 {
		let Dimensions { x, y, z } = self.dimensions;

		if x1 > x || y1 > y || z1 > z {
			panic!("box upper corner ({}, {}, {}) out of bounds for a volume of {}", x1, y1, z1, self.dimensions);
		}

		self.at(x1, y1, z1)
			.wrapping_sub(self.at(x0, y1, z1))
			.wrapping_sub(self.at(x1, y0, z1))
			.wrapping_sub(self.at(x1, y1, z0))
			.wrapping_add(self.at(x0, y0, z1))
			.wrapping_add(self.at(x0, y1, z0))
			.wrapping_add(self.at(x1, y0, z0))
			.wrapping_sub(self.at(x0, y0, z0))
	}

	/// Mass of the cubic box with edge `edge` whose lowest corner is at `(x, y, z)`.
	pub fn box_mass(&self, x: usize, y: usize, z: usize, edge: usize) -> u64 {
		self.range_mass((x, y, z), (x + edge, y + edge, z + edge))
	}

	pub fn total_mass(&self) -> u64 {
		let Dimensions { x, y, z } = self.dimensions;

		self.at(x, y, z)
	}
}
