use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::Error;
use crate::volume::Dimensions;

/// A recipe for the list of box sizes to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxSizes {
	/// 1, 2, 4, 8, ... up to the shortest edge of the volume.
	PowersOfTwo,
	/// Every size from 1 up to the shortest edge of the volume.
	All,
	/// An explicit list, used as is. Entries are not checked until the sweep.
	Custom(Vec<i64>)
}

impl BoxSizes {
	pub fn resolve(&self, dimensions: Dimensions) -> Vec<i64> {
		let max = dimensions.min_edge() as i64;

		match self {
			BoxSizes::PowersOfTwo => {
				let mut sizes = Vec::new();
				let mut size = 1;

				while size <= max {
					sizes.push(size);
					size *= 2;
				}

				sizes
			},
			BoxSizes::All => (1..=max).collect(),
			BoxSizes::Custom(sizes) => sizes.clone()
		}
	}
}

impl Default for BoxSizes {
	fn default() -> Self {
		BoxSizes::PowersOfTwo
	}
}

impl FromStr for BoxSizes {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Error> {
		match s.trim() {
			"twos" => Ok(BoxSizes::PowersOfTwo),
			"all" => Ok(BoxSizes::All),
			list => {
				list.split(',')
					.map(|entry| i64::from_str(entry.trim()))
					.collect::<Result<Vec<i64>, _>>()
					.map(BoxSizes::Custom)
					.map_err(|_| Error::InvalidBoxSizes(s.to_owned()))
			}
		}
	}
}

impl Display for BoxSizes {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			BoxSizes::PowersOfTwo => f.write_str("twos"),
			BoxSizes::All => f.write_str("all"),
			BoxSizes::Custom(sizes) => {
				for (index, size) in sizes.iter().enumerate() {
					if index != 0 {
						f.write_str(",")?;
					}

					write!(f, "{}", size)?;
				}

				Ok(())
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::BoxSizes;
	use crate::error::Error;
	use crate::volume::Dimensions;

	#[test]
	fn test_presets() {
		let dimensions = Dimensions::new(20, 9, 33);

		assert_eq!(BoxSizes::PowersOfTwo.resolve(dimensions), vec![1, 2, 4, 8]);
		assert_eq!(BoxSizes::All.resolve(dimensions), (1..=9).collect::<Vec<i64>>());
		assert_eq!(BoxSizes::PowersOfTwo.resolve(Dimensions::new(16, 16, 16)), vec![1, 2, 4, 8, 16]);
		assert_eq!(BoxSizes::Custom(vec![5, -1, 5]).resolve(dimensions), vec![5, -1, 5]);
	}

	#[test]
	fn test_parse() {
		assert_eq!("twos".parse::<BoxSizes>(), Ok(BoxSizes::PowersOfTwo));
		assert_eq!(" all ".parse::<BoxSizes>(), Ok(BoxSizes::All));
		assert_eq!("3, 1,3".parse::<BoxSizes>(), Ok(BoxSizes::Custom(vec![3, 1, 3])));
		assert_eq!("0,-2".parse::<BoxSizes>(), Ok(BoxSizes::Custom(vec![0, -2])));

		assert_eq!("some".parse::<BoxSizes>(), Err(Error::InvalidBoxSizes("some".to_owned())));
		assert_eq!("1,,2".parse::<BoxSizes>(), Err(Error::InvalidBoxSizes("1,,2".to_owned())));
	}

	#[test]
	fn test_display() {
		assert_eq!(BoxSizes::Custom(vec![1, 4, 2]).to_string(), "1,4,2");
		assert_eq!(BoxSizes::default().to_string(), "twos");
	}
}
