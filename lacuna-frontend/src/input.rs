//! Loading occupancy volumes from disk.
//!
//! Two sources are understood:
//!
//!  * A text volume: the first three integers are the X, Y and Z extents, followed by one value
//!    per voxel with X varying fastest, then Y, then Z. Whitespace separates values, and `#`
//!    starts a comment running to the end of the line.
//!  * A directory of PNG slices: each `.png` file is one Z slice, in file name order. Slice
//!    width is X and height is Y.

use bit_vec::BitVec;
use image::ImageError;
use lacuna::volume::{Dimensions, OccupancyCube};

use std::fmt::{self, Display, Formatter};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug)]
pub enum Error {
	Io(io::Error),
	Image(ImageError),
	Volume(lacuna::Error),
	Parse { line: usize, message: String },
	EmptyStack(PathBuf),
	SliceSize { path: PathBuf, expected: (u32, u32), actual: (u32, u32) }
}

impl From<io::Error> for Error {
	fn from(from: io::Error) -> Self {
		Error::Io(from)
	}
}

impl From<ImageError> for Error {
	fn from(from: ImageError) -> Self {
		Error::Image(from)
	}
}

impl From<lacuna::Error> for Error {
	fn from(from: lacuna::Error) -> Self {
		Error::Volume(from)
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Error::Io(error) => write!(f, "i/o error: {}", error),
			Error::Image(error) => write!(f, "could not decode slice: {}", error),
			Error::Volume(error) => write!(f, "{}", error),
			Error::Parse { line, message } => write!(f, "line {}: {}", line, message),
			Error::EmptyStack(path) => write!(f, "no .png slices found in {}", path.display()),
			Error::SliceSize { path, expected, actual } => write!(
				f, "slice {} is {}x{}, but the first slice is {}x{}",
				path.display(), actual.0, actual.1, expected.0, expected.1
			)
		}
	}
}

impl ::std::error::Error for Error {}

/// How PNG pixels turn into voxel values.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SliceMode {
	/// Pixels with a luma above the threshold are occupied (1), the rest are empty (0).
	Threshold(u8),
	/// The luma of each pixel is used as the voxel value.
	Raw
}

/// Loads a volume from a PNG slice directory or a text volume file. The slice mode only applies
/// to PNG slices; text volume values are used as written.
pub fn load(path: &Path, mode: SliceMode) -> Result<OccupancyCube, Error> {
	if path.is_dir() {
		load_png_stack(path, mode)
	} else {
		parse_text_volume(BufReader::new(File::open(path)?))
	}
}

pub fn parse_text_volume<R>(reader: R) -> Result<OccupancyCube, Error> where R: BufRead {
	let mut extents: Vec<usize> = Vec::with_capacity(3);
	let mut values: Vec<u32> = Vec::new();
	let mut last_line = 0;

	for (index, line) in reader.lines().enumerate() {
		let line = line?;
		let number = index + 1;
		last_line = number;

		let content = match line.find('#') {
			Some(comment) => &line[..comment],
			None => &line
		};

		for token in content.split_whitespace() {
			if extents.len() < 3 {
				let extent = usize::from_str(token).map_err(|_| Error::Parse {
					line: number,
					message: format!("expected a volume extent, found \"{}\"", token)
				})?;

				extents.push(extent);
			} else {
				let value = u32::from_str(token).map_err(|_| Error::Parse {
					line: number,
					message: format!("expected a non-negative voxel value, found \"{}\"", token)
				})?;

				values.push(value);
			}
		}
	}

	if extents.len() < 3 {
		return Err(Error::Parse {
			line: last_line,
			message: format!("expected 3 volume extents, found {}", extents.len())
		});
	}

	let dimensions = Dimensions::new(extents[0], extents[1], extents[2]);

	Ok(OccupancyCube::new(dimensions, values)?)
}

/// Lists the `.png` files in a directory, sorted by file name.
pub fn slice_paths(directory: &Path) -> Result<Vec<PathBuf>, Error> {
	let mut paths = Vec::new();

	for entry in fs::read_dir(directory)? {
		let path = entry?.path();

		let is_png = path.extension()
			.and_then(|extension| extension.to_str())
			.map(|extension| extension.eq_ignore_ascii_case("png"))
			.unwrap_or(false);

		if is_png && path.is_file() {
			paths.push(path);
		}
	}

	paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

	Ok(paths)
}

pub fn load_png_stack(directory: &Path, mode: SliceMode) -> Result<OccupancyCube, Error> {
	let paths = slice_paths(directory)?;

	if paths.is_empty() {
		return Err(Error::EmptyStack(directory.to_owned()));
	}

	let mut size: Option<(u32, u32)> = None;
	let mut mask = BitVec::new();
	let mut values: Vec<u32> = Vec::new();

	for path in &paths {
		let slice = image::open(path)?.to_luma8();
		let actual = slice.dimensions();

		match size {
			Some(expected) if expected != actual => {
				return Err(Error::SliceSize { path: path.clone(), expected, actual });
			},
			_ => size = Some(actual)
		}

		// Pixels iterate row by row, so X varies fastest
		for pixel in slice.pixels() {
			let luma = pixel.0[0];

			match mode {
				SliceMode::Threshold(threshold) => mask.push(luma > threshold),
				SliceMode::Raw => values.push(luma as u32)
			}
		}
	}

	let (width, height) = size.unwrap_or((0, 0));
	let dimensions = Dimensions::new(width as usize, height as usize, paths.len());

	let cube = match mode {
		SliceMode::Threshold(_) => OccupancyCube::from_mask(dimensions, &mask)?,
		SliceMode::Raw => OccupancyCube::new(dimensions, values)?
	};

	Ok(cube)
}
