extern crate clap;
extern crate num_cpus;
extern crate rayon;
extern crate lacuna;
extern crate lacuna_frontend;

use clap::{Arg, App};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Instant;

use lacuna::{AnalysisTraces, BoxSizes, GlidingBoxAnalyzer, IgnoreTraces, PrintTraces};
use lacuna_frontend::input::{self, SliceMode};
use lacuna_frontend::output::{self, Format};

struct Options {
	quiet: bool,
	source: PathBuf,
	sizes: BoxSizes,
	mode: SliceMode,
	format: Format,
	threads: usize,
	destination: Option<PathBuf>
}

fn validate_threads(number: String) -> Result<(), String> {
	match number.parse::<usize>() {
		Ok(x) => if x == 0 {
			Err("zero values are not a valid argument".to_owned())
		} else {
			Ok(())
		},
		Err(parse) => Err(parse.to_string())
	}
}

fn validate_threshold(number: String) -> Result<(), String> {
	number.parse::<u8>().map(|_| ()).map_err(|parse| format!("{} (expected 0 to 255)", parse))
}

fn validate_sizes(sizes: String) -> Result<(), String> {
	BoxSizes::from_str(&sizes).map(|_| ()).map_err(|error| error.to_string())
}

fn main() {
	let matches = App::new("lacuna")
		.version("0.1.0")
		.author("coderbot <coderbot16@gmail.com>")
		.about("Computes the gliding box lacunarity of a 3D occupancy volume")
		.arg(Arg::with_name("input")
			.value_name("INPUT")
			.help("A text volume file, or a directory of PNG slices")
			.required(true)
			.index(1)
		)
		.arg(Arg::with_name("box-sizes")
			.short("b")
			.long("box-sizes")
			.value_name("SIZES")
			.long_help("Box edge lengths to sweep: \n\
			               twos - powers of two up to the shortest volume edge \n\
			               all  - every size up to the shortest volume edge \n\
			               or a comma separated list, such as 1,3,5")
			.default_value("twos")
			.validator(validate_sizes)
		)
		.arg(Arg::with_name("threshold")
			.short("t")
			.long("threshold")
			.value_name("LUMA")
			.help("PNG pixels brighter than this are occupied")
			.default_value("127")
			.validator(validate_threshold)
		)
		.arg(Arg::with_name("raw")
			.long("raw")
			.help("Uses the PNG luma values as voxel counts instead of thresholding them")
		)
		.arg(Arg::with_name("format")
			.short("f")
			.long("format")
			.value_name("FORMAT")
			.help("Output table format")
			.possible_values(&["csv", "tsv"])
			.default_value("csv")
		)
		.arg(Arg::with_name("output")
			.short("o")
			.long("output")
			.value_name("OUTPUT")
			.help("Writes the table to a file instead of standard output")
			.takes_value(true)
		)
		.arg(Arg::with_name("threads")
			.short("j")
			.long("threads")
			.value_name("COUNT")
			.long_help("Configures the number of threads to use \n\
			               Default: CPU count")
			.takes_value(true)
			.validator(validate_threads)
		)
		.arg(Arg::with_name("quiet")
			.short("q")
			.long("quiet")
			.help("Suppresses progress output")
		)
		.get_matches();

	// Every value below either has a default or has passed its validator
	let threshold = matches.value_of("threshold").and_then(|value| u8::from_str(value).ok()).unwrap_or(127);

	let options = Options {
		quiet: matches.is_present("quiet"),
		source: PathBuf::from(matches.value_of("input").unwrap_or_default()),
		sizes: matches.value_of("box-sizes").and_then(|value| BoxSizes::from_str(value).ok()).unwrap_or_default(),
		mode: if matches.is_present("raw") { SliceMode::Raw } else { SliceMode::Threshold(threshold) },
		format: matches.value_of("format").and_then(|value| Format::from_str(value).ok()).unwrap_or(Format::Csv),
		threads: matches.value_of("threads").and_then(|value| usize::from_str(value).ok()).unwrap_or_else(num_cpus::get),
		destination: matches.value_of("output").map(PathBuf::from)
	};

	if let Err(message) = execute(options) {
		eprintln!("error: {}", message);
		process::exit(1);
	}
}

fn execute(options: Options) -> Result<(), String> {
	if options.quiet {
		run(options, &IgnoreTraces)
	} else {
		run(options, &PrintTraces)
	}
}

fn run<T>(options: Options, tracer: &T) -> Result<(), String> where T: AnalysisTraces + Sync {
	let Options { quiet, source, sizes, mode, format, threads, destination } = options;

	rayon::ThreadPoolBuilder::new()
		.num_threads(threads)
		.build_global()
		.map_err(|error| error.to_string())?;

	let load_start = Instant::now();

	let cube = input::load(&source, mode)
		.map_err(|error| format!("could not load {}: {}", source.display(), error))?;

	let dimensions = cube.dimensions();
	let box_sizes = sizes.resolve(dimensions);

	if !quiet {
		eprintln!("[=======] Loaded {} volume from {} in {:.3}ms: {} occupied voxel(s), total mass {}",
			dimensions,
			source.display(),
			load_start.elapsed().as_secs_f64() * 1000.0,
			cube.occupied(),
			cube.total_mass()
		);

		eprintln!("[=======] Sweeping {} box size(s) ({}) using {} thread(s)", box_sizes.len(), sizes, threads);
	}

	let analyzer = GlidingBoxAnalyzer::new_traced(&cube, tracer);
	let table = analyzer.compute_parallel_traced(&box_sizes, tracer).map_err(|error| error.to_string())?;

	match destination {
		Some(path) => {
			if let Some(parent) = path.parent() {
				fs::create_dir_all(parent).map_err(|error| error.to_string())?;
			}

			let file = File::create(&path).map_err(|error| format!("could not create {}: {}", path.display(), error))?;
			output::write_table(&mut BufWriter::new(file), &table, format).map_err(|error| error.to_string())?;

			if !quiet {
				eprintln!("[=======] Wrote {} row(s) to {}", table.len(), path.display());
			}
		},
		None => {
			let stdout = io::stdout();
			output::write_table(&mut stdout.lock(), &table, format).map_err(|error| error.to_string())?;
		}
	}

	Ok(())
}
