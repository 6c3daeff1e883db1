use std::time::Duration;

use crate::table::LacunarityRecord;
use crate::volume::Dimensions;

/// Progress hooks for a lacunarity sweep. Implementations must be `Sync` to be used with the
/// parallel sweep, where `box_size` may be called from several threads at once.
pub trait AnalysisTraces {
	/// The summed volume for a volume of the given dimensions has been built.
	fn prepared(&self, dimensions: Dimensions, duration: Duration);
	/// All boxes of one size have been visited.
	fn box_size(&self, record: &LacunarityRecord, duration: Duration);
	/// Every requested size has been processed.
	fn complete(&self, sizes: usize, duration: Duration);
}

/// Prints progress lines to stderr, leaving stdout free for the result table.
pub struct PrintTraces;

impl PrintTraces {
	fn us(duration: Duration) -> u64 {
		(duration.as_secs() * 1000000) + ((duration.subsec_nanos() / 1000) as u64)
	}
}

impl AnalysisTraces for PrintTraces {
	fn prepared(&self, dimensions: Dimensions, duration: Duration) {
		let us = Self::us(duration);

		eprintln!("[=======] Summed volume for {} ({} voxels) built in {}us", dimensions, dimensions.volume(), us);
	}

	fn box_size(&self, record: &LacunarityRecord, duration: Duration) {
		let us = Self::us(duration);
		let per_box = if record.n_boxes > 0 { us as f64 / record.n_boxes as f64 } else { 0.0 };

		eprintln!(
			"[ r={:4}] {} boxes in {}us ({:.4}us per box) | mean mass {:.3}, lacunarity {:.6}",
			record.box_size,
			record.n_boxes,
			us,
			per_box,
			record.mean_mass,
			record.lacunarity
		);
	}

	fn complete(&self, sizes: usize, duration: Duration) {
		let us = Self::us(duration);

		eprintln!("[=======] Swept {} box size(s) in {:.3}ms", sizes, (us as f64) / 1000.0);
	}
}

pub struct IgnoreTraces;

impl AnalysisTraces for IgnoreTraces {
	fn prepared(&self, _: Dimensions, _: Duration) {}
	fn box_size(&self, _: &LacunarityRecord, _: Duration) {}
	fn complete(&self, _: usize, _: Duration) {}
}
