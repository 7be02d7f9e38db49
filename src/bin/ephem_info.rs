//! JPL DE Ephemeris Information Tool
//!
//! Prints the header of a DE binary ephemeris (validity interval, coefficient
//! layout, constants) and optionally evaluates one lookup.
//!
//! Usage:
//!   cargo run --bin ephem_info -- de431.eph
//!   cargo run --bin ephem_info -- de431.eph --target mars --center earth --date 2024-03-20

use std::time::Instant;

use chrono::Utc;
use clap::{ArgAction, Parser};
use log::debug;
use serde::Serialize;

use dephem::constants::AU_KM;
use dephem::jplephem::calendar::{format_date, julian_day_from_datetime, parse_date};
use dephem::jplephem::session::EphemerisInfo;
use dephem::jplephem::transform::effective_center;
use dephem::{
    AngleUnit, Body, CenterFrame, EphemerisSession, Loader, LookupRequest, OutputShape,
    ReadStrategy,
};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// JPL DE Ephemeris Information Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Displays the header of a JPL DE binary ephemeris and evaluates lookups",
    long_about = None
)]
struct Args {
    /// Ephemeris file, absolute or searched in --data-dir, $SE_EPHE_PATH, ./ephe and ./
    #[arg(default_value = "de431.eph")]
    filename: String,

    /// Directory searched first for the ephemeris file
    #[arg(long)]
    data_dir: Option<String>,

    /// Body to look up (name, alias or JPL number)
    #[arg(short, long)]
    target: Option<Body>,

    /// Center body of the lookup
    #[arg(short, long, default_value = "ssb")]
    center: Body,

    /// Julian date (dynamical time) of the lookup
    #[arg(long, conflicts_with_all = ["date", "now"])]
    jd: Option<f64>,

    /// Date of the lookup, e.g. 2024-03-20 or 2024-03-20T12:00:00
    #[arg(long, conflicts_with = "now")]
    date: Option<String>,

    /// Look up the current instant
    #[arg(long, action = ArgAction::SetTrue)]
    now: bool,

    /// Print x, y, z instead of longitude, latitude, distance
    #[arg(long, action = ArgAction::SetTrue)]
    cartesian: bool,

    /// Polar angles in radians instead of degrees
    #[arg(long, action = ArgAction::SetTrue)]
    radians: bool,

    /// Use the Sun as center
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "barycentric")]
    heliocentric: bool,

    /// Use the solar system barycenter as center
    #[arg(long, action = ArgAction::SetTrue)]
    barycentric: bool,

    /// Leave velocity components at zero
    #[arg(long, action = ArgAction::SetTrue)]
    no_speed: bool,

    /// Print JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Memory-map the file instead of seek reads
    #[arg(long, action = ArgAction::SetTrue)]
    mmap: bool,

    /// Keep the last read record between lookups
    #[arg(long, action = ArgAction::SetTrue)]
    cache: bool,
}

impl Args {
    fn loader(&self) -> Loader {
        let mut loader = Loader::new()
            .with_record_cache(self.cache)
            .with_read_strategy(if self.mmap {
                ReadStrategy::MemoryMap
            } else {
                ReadStrategy::Seek
            });
        if let Some(dir) = &self.data_dir {
            loader = loader.with_data_dir(dir);
        }
        loader
    }

    fn request(&self) -> LookupRequest {
        let frame = if self.heliocentric {
            CenterFrame::Heliocentric
        } else if self.barycentric {
            CenterFrame::Barycentric
        } else {
            CenterFrame::AsRequested
        };

        LookupRequest::new()
            .with_frame(frame)
            .with_shape(if self.cartesian {
                OutputShape::Cartesian
            } else {
                OutputShape::Polar
            })
            .with_angles(if self.radians {
                AngleUnit::Radians
            } else {
                AngleUnit::Degrees
            })
            .with_velocity(!self.no_speed)
    }

    /// Julian date requested on the command line, if any
    fn lookup_jd(&self) -> Result<Option<f64>> {
        if let Some(jd) = self.jd {
            return Ok(Some(jd));
        }
        if let Some(text) = &self.date {
            return parse_date(text)
                .map(Some)
                .ok_or_else(|| format!("cannot parse date: {}", text).into());
        }
        if self.now {
            return Ok(Some(julian_day_from_datetime(&Utc::now())));
        }
        Ok(None)
    }
}

/// Lookup result as printed with --json
#[derive(Serialize)]
struct LookupReport {
    jd: f64,
    target: Body,
    center: Body,
    request: LookupRequest,
    values: [f64; 6],
}

/// Everything printed with --json
#[derive(Serialize)]
struct Report {
    info: EphemerisInfo,
    au_km: f64,
    emrat: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lookup: Option<LookupReport>,
}

/// Format bytes as KB, MB, or GB
fn format_size(size_bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size_bytes >= GB {
        format!("{:.2} GB", size_bytes as f64 / GB as f64)
    } else if size_bytes >= MB {
        format!("{:.2} MB", size_bytes as f64 / MB as f64)
    } else if size_bytes >= KB {
        format!("{:.2} KB", size_bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", size_bytes)
    }
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Helper to print named values in a formatted way
fn print_named_value(name: &str, value: impl std::fmt::Display) {
    println!("{}: {}", name, value);
}

fn display_file_info(info: &EphemerisInfo) {
    print_section_header("File");
    print_named_value("Path", info.path.display());
    print_named_value("Size", format_size(info.file_size));
    print_named_value("DE number", info.de_number);
    print_named_value("Records", info.record_count);
}

fn display_time_coverage(info: &EphemerisInfo) {
    let validity = &info.validity;
    let days = validity.end_jd - validity.start_jd;

    print_section_header("Time Coverage");
    print_named_value(
        "Start date",
        format!("{} (JD {:.1})", format_date(validity.start_jd), validity.start_jd),
    );
    print_named_value(
        "End date",
        format!("{} (JD {:.1})", format_date(validity.end_jd), validity.end_jd),
    );
    print_named_value(
        "Duration",
        format!("{:.1} days ({:.1} years)", days, days / 365.25),
    );
    print_named_value("Record span", format!("{} days", validity.step_days));
}

fn display_layout(session: &EphemerisSession) {
    let layout = &session.header().layout;
    print_section_header(&format!("Coefficient Layout ({} populated)", layout.populated()));
    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>8}",
        "Slot", "Offset", "Coeffs", "Subint", "Block"
    );
    for (slot, entry) in layout.iter() {
        match entry {
            Some(entry) => println!(
                "{:<24} {:>8} {:>8} {:>8} {:>8}",
                format!("{:?}", slot),
                entry.offset,
                entry.coeff_count,
                entry.sub_intervals,
                entry.block_len()
            ),
            None => println!("{:<24} {:>8}", format!("{:?}", slot), "-"),
        }
    }
}

fn display_constants(session: &EphemerisSession) {
    let header = session.header();
    print_section_header("Constants");
    print_named_value("Declared", header.constant_count);
    for (name, value) in &header.constants {
        print_named_value(name, value);
    }
    if (header.au - AU_KM).abs() > 1e-3 {
        println!("Note: AU differs from the IAU 2012 value {} km", AU_KM);
    }
}

fn display_lookup(report: &LookupReport) {
    print_section_header(&format!(
        "{} relative to {} at JD {} ({})",
        report.target,
        report.center,
        report.jd,
        format_date(report.jd)
    ));

    let v = &report.values;
    match report.request.shape {
        OutputShape::Cartesian => {
            println!("x  = {:>22.15} AU   vx = {:>22.15} AU/day", v[0], v[3]);
            println!("y  = {:>22.15} AU   vy = {:>22.15} AU/day", v[1], v[4]);
            println!("z  = {:>22.15} AU   vz = {:>22.15} AU/day", v[2], v[5]);
        }
        OutputShape::Polar => {
            let unit = match report.request.angles {
                AngleUnit::Degrees => "deg",
                AngleUnit::Radians => "rad",
            };
            println!("lon = {:>20.12} {}   dlon = {:>20.12} {}/day", v[0], unit, v[3], unit);
            println!("lat = {:>20.12} {}   dlat = {:>20.12} {}/day", v[1], unit, v[4], unit);
            println!("r   = {:>20.12} AU    dr   = {:>20.12} AU/day", v[2], v[5]);
            println!("r   = {:>20.3} km", v[2] * AU_KM);
        }
    }
}

/// Evaluate the lookup asked for on the command line
///
/// The reported center is the one the frame option actually selects.
fn lookup_report(session: &EphemerisSession, args: &Args) -> Result<Option<LookupReport>> {
    match (args.target, args.lookup_jd()?) {
        (Some(target), Some(jd)) => {
            let request = args.request();
            let values = session.lookup(jd, target, args.center, &request)?;
            Ok(Some(LookupReport {
                jd,
                target,
                center: effective_center(args.center, request.frame),
                request,
                values,
            }))
        }
        (Some(_), None) => Err("--target needs one of --jd, --date or --now".into()),
        (None, _) => Ok(None),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    debug!("{:?}", args);

    let start_time = Instant::now();
    let session = args.loader().open(&args.filename)?;
    let info = session.info();

    let lookup = lookup_report(&session, &args)?;

    if args.json {
        let report = Report {
            info,
            au_km: session.header().au,
            emrat: session.header().emrat,
            lookup,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Analyzing JPL DE ephemeris file: {}", args.filename);
    println!("-------------------------------------------------------");

    display_file_info(&info);
    display_time_coverage(&info);
    display_layout(&session);
    display_constants(&session);

    if let Some(report) = &lookup {
        display_lookup(report);
    }

    println!("\nTotal time: {:.2?}", start_time.elapsed());
    Ok(())
}
