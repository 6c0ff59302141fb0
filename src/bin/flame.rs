use clap::{value_t, App, Arg, ArgMatches};
use flamebrot::random::session_rng;
use flamebrot::{ColorAxis, Engine, Limits, TransformSet};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const BUDGET: &str = "budget";
const POINTS: &str = "points";
const SCALE: &str = "scale";
const SEED: &str = "seed";
const FRAMES: &str = "frames";
const EVERY: &str = "every";

fn args<'a>() -> ArgMatches<'a> {
    App::new("flame")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Exhaustive fractal flame renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("640")
                .validator(|s| {
                    validate_range::<usize>(
                        &s,
                        16,
                        8192,
                        "Could not parse image size",
                        "Image size must be between 16 and 8192",
                    )
                })
                .help("Width and height of the output image"),
        )
        .arg(
            Arg::with_name(BUDGET)
                .required(false)
                .long(BUDGET)
                .short("b")
                .takes_value(true)
                .default_value("300000000")
                .validator(|s| {
                    validate_range::<f64>(
                        &s,
                        1.0,
                        1.0e18,
                        "Could not parse leaf budget",
                        "Leaf budget must be between 1 and 1e18",
                    )
                })
                .help("Upper bound on the number of leaves, seeding included"),
        )
        .arg(
            Arg::with_name(POINTS)
                .required(false)
                .long(POINTS)
                .short("p")
                .takes_value(true)
                .default_value("50000")
                .validator(|s| {
                    validate_range::<usize>(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse seed point count",
                        "Seed point count must be between 1 and 10000000",
                    )
                })
                .help("Number of points to grow the seed batch to"),
        )
        .arg(
            Arg::with_name(SCALE)
                .required(false)
                .long(SCALE)
                .short("a")
                .takes_value(true)
                .default_value("1.0")
                .validator(|s| {
                    validate_range::<f64>(
                        &s,
                        1.0e-6,
                        1.0e6,
                        "Could not parse affine scale",
                        "Affine scale must be positive",
                    )
                })
                .help("Scale of the random affine matrices"),
        )
        .arg(
            Arg::with_name(SEED)
                .required(false)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    validate_range::<u64>(
                        &s,
                        0,
                        std::u64::MAX,
                        "Could not parse seed",
                        "Seed out of range",
                    )
                })
                .help("Seed for the random transforms, for repeatable renders"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .required(false)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .validator(|s| {
                    validate_range::<u64>(
                        &s,
                        1,
                        std::u64::MAX,
                        "Could not parse frame count",
                        "Frame count must be at least 1",
                    )
                })
                .help("Stop after drawing this many leaves"),
        )
        .arg(
            Arg::with_name(EVERY)
                .required(false)
                .long(EVERY)
                .takes_value(true)
                .validator(|s| {
                    validate_range::<u64>(
                        &s,
                        1,
                        std::u64::MAX,
                        "Could not parse snapshot interval",
                        "Snapshot interval must be at least 1",
                    )
                })
                .help("Rewrite the output file every this many leaves"),
        )
        .get_matches()
}

fn write_image(outfile: &str, pixels: &[u8], resolution: usize) -> Result<(), std::io::Error> {
    let rgb: Vec<u8> = pixels
        .chunks(4)
        .flat_map(|px| px[..3].iter().cloned())
        .collect();
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(
        &rgb[..],
        resolution as u32,
        resolution as u32,
        ColorType::RGB(8),
    )?;
    Ok(())
}

fn optional_u64(matches: &ArgMatches, name: &str) -> Result<Option<u64>, clap::Error> {
    if matches.is_present(name) {
        Ok(Some(value_t!(matches, name, u64)?))
    } else {
        Ok(None)
    }
}

fn render(matches: &ArgMatches) -> Result<(), failure::Error> {
    let output = matches.value_of(OUTPUT).unwrap_or_default();
    let resolution = value_t!(matches, SIZE, usize)?;
    let limits = Limits {
        seed_points: value_t!(matches, POINTS, usize)?,
        leaf_budget: value_t!(matches, BUDGET, f64)?,
    };
    let scale = value_t!(matches, SCALE, f64)?;
    let seed = optional_u64(matches, SEED)?;
    let frames = optional_u64(matches, FRAMES)?;
    let every = optional_u64(matches, EVERY)?;

    let mut rng = session_rng(seed);
    let transforms = TransformSet::standard(&mut rng, scale);
    let axis = ColorAxis::random(&mut rng);

    let started = Instant::now();
    let mut engine = Engine::with_limits(transforms, resolution, axis, limits)?;
    info!(
        total_leaves = engine.total_leaves(),
        max_depth = engine.max_depth(),
        resolution,
        "rendering"
    );

    while frames.map_or(true, |f| engine.leaves() < f) && engine.step() {
        if let Some(every) = every {
            if engine.leaves() % every == 0 {
                write_image(output, engine.pixels(), resolution)?;
                debug!(leaves = engine.leaves(), "snapshot written");
            }
        }
    }
    write_image(output, engine.pixels(), resolution)?;

    let seconds = started.elapsed().as_secs_f64();
    let rate = if seconds > 0.0 {
        engine.leaves() as f64 / seconds
    } else {
        0.0
    };
    info!(
        leaves = engine.leaves(),
        exhausted = engine.is_exhausted(),
        dropped = engine.dropped(),
        seconds,
        rate,
        "render complete"
    );
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flamebrot=info,flame=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = args();
    if let Err(e) = render(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
