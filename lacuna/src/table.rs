use std::ops::Index;
use std::slice;

/// Statistics of the box masses for a single box size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LacunarityRecord {
	/// Edge length of the box, in voxels.
	pub box_size: usize,
	/// Number of positions the box could occupy fully inside the volume.
	pub n_boxes: u64,
	/// Mean box mass. NaN when there are no boxes.
	pub mean_mass: f64,
	/// Population variance of the box mass. NaN when there are no boxes.
	pub variance: f64,
	/// `variance / mean² + 1`. NaN when there are no boxes or the mean mass is zero.
	pub lacunarity: f64
}

impl LacunarityRecord {
	/// The record for a box size that does not fit in the volume.
	pub fn empty(box_size: usize) -> Self {
		LacunarityRecord {
			box_size,
			n_boxes: 0,
			mean_mass: ::std::f64::NAN,
			variance: ::std::f64::NAN,
			lacunarity: ::std::f64::NAN
		}
	}

	/// Whether the lacunarity is defined for this box size.
	pub fn is_defined(&self) -> bool {
		!self.lacunarity.is_nan()
	}

	/// Compares every field bit for bit, treating identical NaN sentinels as equal.
	pub fn bit_eq(&self, other: &LacunarityRecord) -> bool {
		self.box_size == other.box_size &&
			self.n_boxes == other.n_boxes &&
			self.mean_mass.to_bits() == other.mean_mass.to_bits() &&
			self.variance.to_bits() == other.variance.to_bits() &&
			self.lacunarity.to_bits() == other.lacunarity.to_bits()
	}
}

/// One record per requested box size, in the order the sizes were requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable(Vec<LacunarityRecord>);

impl ResultTable {
	pub fn new() -> Self {
		ResultTable(Vec::new())
	}

	pub fn push(&mut self, record: LacunarityRecord) {
		self.0.push(record)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> slice::Iter<LacunarityRecord> {
		self.0.iter()
	}

	pub fn records(&self) -> &[LacunarityRecord] {
		&self.0
	}

	pub fn into_inner(self) -> Vec<LacunarityRecord> {
		self.0
	}

	pub fn bit_eq(&self, other: &ResultTable) -> bool {
		self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.bit_eq(b))
	}
}

impl From<Vec<LacunarityRecord>> for ResultTable {
	fn from(records: Vec<LacunarityRecord>) -> Self {
		ResultTable(records)
	}
}

impl Index<usize> for ResultTable {
	type Output = LacunarityRecord;

	fn index(&self, index: usize) -> &LacunarityRecord {
		&self.0[index]
	}
}

impl<'a> IntoIterator for &'a ResultTable {
	type Item = &'a LacunarityRecord;
	type IntoIter = slice::Iter<'a, LacunarityRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl IntoIterator for ResultTable {
	type Item = LacunarityRecord;
	type IntoIter = ::std::vec::IntoIter<LacunarityRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
