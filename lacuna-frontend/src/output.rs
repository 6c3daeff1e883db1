use lacuna::ResultTable;

use std::io::{self, Write};
use std::str::FromStr;

pub const COLUMNS: [&str; 4] = ["box_size", "n_boxes", "mean_mass", "lacunarity"];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Format {
	Csv,
	Tsv
}

impl Format {
	pub fn delimiter(&self) -> &'static str {
		match self {
			Format::Csv => ",",
			Format::Tsv => "\t"
		}
	}
}

impl FromStr for Format {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, String> {
		match s {
			"csv" => Ok(Format::Csv),
			"tsv" => Ok(Format::Tsv),
			other => Err(format!("unknown output format \"{}\", expected csv or tsv", other))
		}
	}
}

/// Writes a header line followed by one line per record. Undefined statistics are written as
/// `NaN`.
pub fn write_table<W>(out: &mut W, table: &ResultTable, format: Format) -> io::Result<()> where W: Write {
	let delimiter = format.delimiter();

	writeln!(out, "{}", COLUMNS.join(delimiter))?;

	for record in table {
		writeln!(
			out,
			"{1}{0}{2}{0}{3}{0}{4}",
			delimiter,
			record.box_size,
			record.n_boxes,
			record.mean_mass,
			record.lacunarity
		)?;
	}

	out.flush()
}
