//! The gliding box sweep.
//!
//! For every requested edge length `r`, a cubic box is placed at every lower corner `(i, j, k)`
//! with `0 ≤ i ≤ X - r`, `0 ≤ j ≤ Y - r` and `0 ≤ k ≤ Z - r`. Boxes overlap, and only positions
//! where the box is fully inside the volume are counted. Box masses come from a
//! [`SummedVolume`], so a sweep costs O(volume) regardless of the box size.

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use std::convert::TryFrom;
use std::time::Instant;

use crate::error::Error;
use crate::summed::SummedVolume;
use crate::table::{LacunarityRecord, ResultTable};
use crate::traces::{AnalysisTraces, IgnoreTraces};
use crate::volume::{Dimensions, OccupancyCube};

/// Computes the lacunarity of the volume for each box size, in the order given.
///
/// All sizes are checked before any box is evaluated: a zero or negative size fails the whole
/// request with [`Error::NonPositiveBoxSize`]. Sizes larger than the shortest edge of the volume
/// are not an error, and produce a record with no boxes and NaN statistics.
pub fn compute(cube: &OccupancyCube, sizes: &[i64]) -> Result<ResultTable, Error> {
	let edges = validate_sizes(sizes)?;

	Ok(GlidingBoxAnalyzer::new(cube).sweep(&edges, &IgnoreTraces))
}

/// Converts a list of box sizes into edge lengths, rejecting non-positive entries.
pub fn validate_sizes(sizes: &[i64]) -> Result<Vec<usize>, Error> {
	sizes.iter().enumerate().map(|(index, &size)| {
		if size <= 0 {
			Err(Error::NonPositiveBoxSize { index, size })
		} else {
			// Sizes beyond the address space can never fit, so they saturate into an empty record
			Ok(usize::try_from(size).unwrap_or(usize::max_value()))
		}
	}).collect()
}

/// Lacunarity analysis over one volume. Building the analyzer precomputes the prefix sums of
/// the volume; each box size afterwards only reads them, so a single analyzer can serve many
/// sweeps, including parallel ones.
pub struct GlidingBoxAnalyzer {
	summed: SummedVolume
}

impl GlidingBoxAnalyzer {
	pub fn new(cube: &OccupancyCube) -> Self {
		GlidingBoxAnalyzer {
			summed: SummedVolume::new(cube)
		}
	}

	pub fn new_traced<T>(cube: &OccupancyCube, tracer: &T) -> Self where T: AnalysisTraces {
		let start = Instant::now();
		let analyzer = Self::new(cube);

		tracer.prepared(cube.dimensions(), start.elapsed());

		analyzer
	}

	pub fn dimensions(&self) -> Dimensions {
		self.summed.dimensions()
	}

	/// Mass of the box of edge `edge` with its lowest corner at `(x, y, z)`.
	/// # Panics
	/// If the box does not fit inside the volume.
	pub fn window_mass(&self, x: usize, y: usize, z: usize, edge: usize) -> u64 {
		self.summed.box_mass(x, y, z, edge)
	}

	pub fn compute(&self, sizes: &[i64]) -> Result<ResultTable, Error> {
		self.compute_traced(sizes, &IgnoreTraces)
	}

	pub fn compute_traced<T>(&self, sizes: &[i64], tracer: &T) -> Result<ResultTable, Error> where T: AnalysisTraces {
		let edges = validate_sizes(sizes)?;

		Ok(self.sweep(&edges, tracer))
	}

	/// Same results as [`compute`](Self::compute), with the box sizes distributed over the rayon
	/// thread pool. The records keep the order of `sizes`.
	pub fn compute_parallel(&self, sizes: &[i64]) -> Result<ResultTable, Error> {
		self.compute_parallel_traced(sizes, &IgnoreTraces)
	}

	pub fn compute_parallel_traced<T>(&self, sizes: &[i64], tracer: &T) -> Result<ResultTable, Error> where T: AnalysisTraces + Sync {
		let edges = validate_sizes(sizes)?;
		let start = Instant::now();

		let records: Vec<LacunarityRecord> = edges.par_iter().map(|&edge| self.traced_size(edge, tracer)).collect();

		tracer.complete(records.len(), start.elapsed());

		Ok(ResultTable::from(records))
	}

	fn sweep<T>(&self, edges: &[usize], tracer: &T) -> ResultTable where T: AnalysisTraces {
		let start = Instant::now();
		let mut table = ResultTable::new();

		for &edge in edges {
			table.push(self.traced_size(edge, tracer));
		}

		tracer.complete(table.len(), start.elapsed());

		table
	}

	fn traced_size<T>(&self, edge: usize, tracer: &T) -> LacunarityRecord where T: AnalysisTraces {
		let start = Instant::now();
		let record = self.analyze_size(edge);

		tracer.box_size(&record, start.elapsed());

		record
	}

	/// Visits every position of a box with the given edge and summarizes the masses.
	/// # Panics
	/// If `edge` is zero.
	pub fn analyze_size(&self, edge: usize) -> LacunarityRecord {
		assert!(edge > 0, "box edge must be positive");

		let dimensions = self.dimensions();
		let n_boxes = dimensions.windows(edge);

		if n_boxes == 0 {
			return LacunarityRecord::empty(edge);
		}

		summarize(edge, n_boxes, || self.masses(edge))
	}

	/// Masses of every position of a box with the given edge, X fastest.
	fn masses<'a>(&'a self, edge: usize) -> impl Iterator<Item = u64> + 'a {
		let Dimensions { x, y, z } = self.dimensions();

		(0..=z - edge).flat_map(move |k| {
			(0..=y - edge).flat_map(move |j| {
				(0..=x - edge).map(move |i| self.summed.box_mass(i, j, k, edge))
			})
		})
	}
}

/// Summarizes `n_boxes` masses produced by `masses`. The masses are walked a second time, in
/// floating point, only if the exact accumulators overflow.
fn summarize<F, I>(box_size: usize, n_boxes: u64, masses: F) -> LacunarityRecord where F: Fn() -> I, I: Iterator<Item = u64> {
	match exact_moments(masses()) {
		Some((sum, sum_squares)) => exact_record(box_size, n_boxes, sum, sum_squares),
		None => {
			let (sum, sum_squares) = float_moments(masses());

			float_record(box_size, n_boxes, sum, sum_squares)
		}
	}
}

/// Sum and sum of squares of the masses, or None if either overflows.
fn exact_moments<I>(mut masses: I) -> Option<(u128, u128)> where I: Iterator<Item = u64> {
	masses.try_fold((0u128, 0u128), |(sum, sum_squares), mass| {
		let mass = mass as u128;

		// mass < 2^64, so the square alone always fits
		Some((sum.checked_add(mass)?, sum_squares.checked_add(mass * mass)?))
	})
}

fn float_moments<I>(masses: I) -> (f64, f64) where I: Iterator<Item = u64> {
	masses.fold((0.0, 0.0), |(sum, sum_squares), mass| {
		let mass = mass as f64;

		(sum + mass, sum_squares + mass * mass)
	})
}

/// Derives the statistics with the variance numerator `n·Σm² - (Σm)²` kept as an integer, so a
/// volume where every box has the same mass gets a variance of exactly zero.
fn exact_record(box_size: usize, n_boxes: u64, sum: u128, sum_squares: u128) -> LacunarityRecord {
	let n = n_boxes as u128;

	let spread = n.checked_mul(sum_squares)
		.and_then(|scaled| sum.checked_mul(sum).map(|squared| (scaled, squared)))
		.map(|(scaled, squared)| (scaled - squared, squared));

	let (spread, squared) = match spread {
		Some(terms) => terms,
		None => return float_record(box_size, n_boxes, sum as f64, sum_squares as f64)
	};

	let mean_mass = sum as f64 / n_boxes as f64;
	let variance = spread as f64 / (n as f64 * n as f64);

	// variance / mean² reduces to spread / (Σm)²
	let lacunarity = if sum == 0 {
		::std::f64::NAN
	} else {
		spread as f64 / squared as f64 + 1.0
	};

	LacunarityRecord { box_size, n_boxes, mean_mass, variance, lacunarity }
}

fn float_record(box_size: usize, n_boxes: u64, sum: f64, sum_squares: f64) -> LacunarityRecord {
	let n = n_boxes as f64;
	let mean_mass = sum / n;

	// Rounding can push the difference slightly below zero
	let variance = (sum_squares / n - mean_mass * mean_mass).max(0.0);

	let lacunarity = if mean_mass > 0.0 {
		variance / (mean_mass * mean_mass) + 1.0
	} else {
		::std::f64::NAN
	};

	LacunarityRecord { box_size, n_boxes, mean_mass, variance, lacunarity }
}

#[cfg(test)]
mod test {
	use java_rand::Random;

	use super::{compute, exact_moments, exact_record, float_record, summarize, GlidingBoxAnalyzer};

	use std::convert::TryFrom;
	use crate::error::Error;
	use crate::table::LacunarityRecord;
	use crate::volume::{Dimensions, OccupancyCube};

	fn random_cube(rng: &mut Random, max_extent: u32, max_value: u32) -> OccupancyCube {
		let dimensions = Dimensions::new(
			1 + rng.next_u32_bound(max_extent) as usize,
			1 + rng.next_u32_bound(max_extent) as usize,
			1 + rng.next_u32_bound(max_extent) as usize
		);

		OccupancyCube::from_fn(dimensions, |_, _, _| rng.next_u32_bound(max_value + 1)).unwrap()
	}

	/// Direct transcription of the definition: every box summed voxel by voxel.
	fn naive_record(cube: &OccupancyCube, edge: usize) -> LacunarityRecord {
		let dimensions = cube.dimensions();

		if edge > dimensions.min_edge() {
			return LacunarityRecord::empty(edge);
		}

		let mut masses = Vec::new();

		for k in 0..=dimensions.z - edge {
			for j in 0..=dimensions.y - edge {
				for i in 0..=dimensions.x - edge {
					let mut mass = 0u64;

					for z in k..k + edge {
						for y in j..j + edge {
							for x in i..i + edge {
								mass += cube.get(x, y, z) as u64;
							}
						}
					}

					masses.push(mass as f64);
				}
			}
		}

		let n = masses.len() as f64;
		let mean_mass = masses.iter().sum::<f64>() / n;
		let variance = masses.iter().map(|mass| (mass - mean_mass) * (mass - mean_mass)).sum::<f64>() / n;

		let lacunarity = if mean_mass > 0.0 {
			variance / (mean_mass * mean_mass) + 1.0
		} else {
			::std::f64::NAN
		};

		LacunarityRecord { box_size: edge, n_boxes: masses.len() as u64, mean_mass, variance, lacunarity }
	}

	fn assert_close(a: f64, b: f64, what: &str) {
		if a.is_nan() || b.is_nan() {
			assert!(a.is_nan() && b.is_nan(), "{}: {} != {}", what, a, b);
		} else {
			assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0), "{}: {} != {}", what, a, b);
		}
	}

	#[test]
	fn test_unit_cube_scenario() {
		let cube = OccupancyCube::filled(Dimensions::new(2, 2, 2), 1).unwrap();
		let table = compute(&cube, &[1, 2]).unwrap();

		assert_eq!(table.len(), 2);

		assert_eq!(table[0].box_size, 1);
		assert_eq!(table[0].n_boxes, 8);
		assert_eq!(table[0].mean_mass, 1.0);
		assert_eq!(table[0].lacunarity, 1.0);

		assert_eq!(table[1].box_size, 2);
		assert_eq!(table[1].n_boxes, 1);
		assert_eq!(table[1].mean_mass, 8.0);
		assert_eq!(table[1].lacunarity, 1.0);
	}

	#[test]
	fn test_matches_naive() {
		let mut rng = Random::new(100);

		for _ in 0..12 {
			let cube = random_cube(&mut rng, 8, 3);
			let analyzer = GlidingBoxAnalyzer::new(&cube);

			for edge in 1..=cube.dimensions().min_edge() + 1 {
				let fast = analyzer.analyze_size(edge);
				let naive = naive_record(&cube, edge);

				assert_eq!(fast.box_size, naive.box_size);
				assert_eq!(fast.n_boxes, naive.n_boxes);
				assert_close(fast.mean_mass, naive.mean_mass, "mean mass");
				assert_close(fast.variance, naive.variance, "variance");
				assert_close(fast.lacunarity, naive.lacunarity, "lacunarity");
			}
		}
	}

	#[test]
	fn test_unit_boxes() {
		let mut rng = Random::new(7);

		for _ in 0..6 {
			let cube = random_cube(&mut rng, 9, 10);
			let record = compute(&cube, &[1]).unwrap()[0];

			assert_eq!(record.n_boxes, cube.dimensions().volume() as u64);
			assert_close(record.mean_mass, cube.mean_value(), "mean mass");
		}
	}

	#[test]
	fn test_single_box() {
		let mut rng = Random::new(31);
		let cube = OccupancyCube::from_fn(Dimensions::new(5, 5, 5), |_, _, _| 1 + rng.next_u32_bound(4)).unwrap();

		let record = compute(&cube, &[5]).unwrap()[0];

		assert_eq!(record.n_boxes, 1);
		assert_eq!(record.variance, 0.0);
		assert_eq!(record.lacunarity, 1.0);
		assert_eq!(record.mean_mass, cube.total_mass() as f64);
	}

	#[test]
	fn test_uniform_volume() {
		let cube = OccupancyCube::filled(Dimensions::new(7, 6, 9), 3).unwrap();
		let table = compute(&cube, &[1, 2, 3, 4, 5, 6]).unwrap();

		for record in &table {
			assert_eq!(record.variance, 0.0, "variance for box size {}", record.box_size);
			assert_eq!(record.lacunarity, 1.0, "lacunarity for box size {}", record.box_size);
		}
	}

	#[test]
	fn test_oversized_box() {
		let cube = OccupancyCube::filled(Dimensions::new(4, 4, 3), 1).unwrap();
		let table = compute(&cube, &[4, 100]).unwrap();

		for record in &table {
			assert_eq!(record.n_boxes, 0);
			assert!(record.lacunarity.is_nan());
			assert!(record.mean_mass.is_nan());
			assert!(!record.is_defined());
		}
	}

	#[test]
	fn test_empty_volume() {
		let cube = OccupancyCube::filled(Dimensions::new(3, 3, 3), 0).unwrap();
		let record = compute(&cube, &[2]).unwrap()[0];

		assert_eq!(record.n_boxes, 8);
		assert_eq!(record.mean_mass, 0.0);
		assert_eq!(record.variance, 0.0);
		assert!(record.lacunarity.is_nan());
	}

	#[test]
	fn test_known_values() {
		// A single occupied voxel in a 2x1x1 line: box masses 1 and 0
		let cube = OccupancyCube::new(Dimensions::new(2, 1, 1), vec![1, 0]).unwrap();
		let record = compute(&cube, &[1]).unwrap()[0];

		assert_eq!(record.n_boxes, 2);
		assert_eq!(record.mean_mass, 0.5);
		assert_eq!(record.variance, 0.25);
		assert_eq!(record.lacunarity, 2.0);
	}

	#[test]
	fn test_invalid_sizes() {
		let cube = OccupancyCube::filled(Dimensions::new(2, 2, 2), 1).unwrap();

		assert_eq!(compute(&cube, &[1, 0, 2]), Err(Error::NonPositiveBoxSize { index: 1, size: 0 }));
		assert_eq!(compute(&cube, &[-3]), Err(Error::NonPositiveBoxSize { index: 0, size: -3 }));

		let analyzer = GlidingBoxAnalyzer::new(&cube);

		assert_eq!(analyzer.compute_parallel(&[2, -1]), Err(Error::NonPositiveBoxSize { index: 1, size: -1 }));
	}

	#[test]
	fn test_empty_sizes() {
		let cube = OccupancyCube::filled(Dimensions::new(2, 2, 2), 1).unwrap();

		assert!(compute(&cube, &[]).unwrap().is_empty());
	}

	#[test]
	fn test_order_and_duplicates() {
		let mut rng = Random::new(2024);
		let cube = random_cube(&mut rng, 10, 1);
		let sizes = [3, 1, 3, 2, 50, 1];

		let analyzer = GlidingBoxAnalyzer::new(&cube);
		let sequential = analyzer.compute(&sizes).unwrap();
		let parallel = analyzer.compute_parallel(&sizes).unwrap();

		let order: Vec<usize> = sequential.iter().map(|record| record.box_size).collect();
		assert_eq!(order, vec![3, 1, 3, 2, 50, 1]);

		assert!(sequential[0].bit_eq(&sequential[2]));
		assert!(sequential[1].bit_eq(&sequential[5]));
		assert!(sequential.bit_eq(&parallel));
	}

	#[test]
	fn test_idempotent() {
		let mut rng = Random::new(99);
		let cube = random_cube(&mut rng, 12, 5);
		let sizes = [1, 2, 3, 4, 5, 6];

		let first = compute(&cube, &sizes).unwrap();
		let second = compute(&cube, &sizes).unwrap();

		assert!(first.bit_eq(&second));
	}

	#[test]
	fn test_window_mass() {
		let cube = OccupancyCube::from_fn(Dimensions::new(3, 3, 3), |x, y, z| (x == y && y == z) as u32).unwrap();
		let analyzer = GlidingBoxAnalyzer::new(&cube);

		assert_eq!(analyzer.window_mass(0, 0, 0, 3), 3);
		assert_eq!(analyzer.window_mass(0, 0, 0, 2), 2);
		assert_eq!(analyzer.window_mass(1, 0, 0, 2), 1);
	}

	#[test]
	fn test_large_counts() {
		let cube = OccupancyCube::filled(Dimensions::new(4, 4, 4), u32::max_value()).unwrap();
		let table = compute(&cube, &[1, 2, 4]).unwrap();

		for record in &table {
			assert_eq!(record.lacunarity, 1.0);
		}

		assert_eq!(table[2].mean_mass, 64.0 * u32::max_value() as f64);
	}

	#[test]
	fn test_huge_box_size() {
		let cube = OccupancyCube::filled(Dimensions::new(2, 2, 2), 1).unwrap();
		let record = compute(&cube, &[i64::max_value()]).unwrap()[0];

		assert_eq!(record.box_size, usize::try_from(i64::max_value()).unwrap_or(usize::max_value()));
		assert_eq!(record.n_boxes, 0);
		assert!(record.lacunarity.is_nan());
	}

	#[test]
	fn test_moments() {
		assert_eq!(exact_moments(vec![1, 2, 0].into_iter()), Some((3, 5)));
		assert_eq!(exact_moments(Vec::new().into_iter()), Some((0, 0)));

		// Two squares of 2^64 - 1 exceed a u128
		let masses = vec![u64::max_value(), u64::max_value(), 0];
		assert_eq!(exact_moments(masses.iter().cloned()), None);

		let record = summarize(3, 3, || masses.iter().cloned());
		let max = u64::max_value() as f64;

		assert_eq!(record.n_boxes, 3);
		assert_close(record.mean_mass, 2.0 * max / 3.0, "mean mass");
		assert_close(record.variance, 2.0 * max * max / 9.0, "variance");
		assert_close(record.lacunarity, 1.5, "lacunarity");
	}

	#[test]
	fn test_exact_record_overflow() {
		// n * sum_squares no longer fits, so the record is derived in floating point
		let sum_squares = u128::max_value() / 2;
		let exact = exact_record(3, 4, 1, sum_squares);

		assert!(exact.bit_eq(&float_record(3, 4, 1.0, sum_squares as f64)));
		assert_eq!(exact.mean_mass, 0.25);
		assert!(exact.lacunarity > 1.0);

		let exact = exact_record(2, 4, 6, 10);

		assert_eq!(exact.mean_mass, 1.5);
		assert_eq!(exact.variance, 0.25);
		assert_close(exact.lacunarity, 0.25 / 2.25 + 1.0, "lacunarity");
	}
}
