use sediment_ledger::{
    estimate_height, load_station_table, scan_stations, AppPaths, Error, LedgerStore, PixelRect,
    Result, Settings, StationTable,
};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("reconcile") => {
            let photos_dir = args
                .get(2)
                .ok_or_else(|| Error::Usage("reconcile needs a photo folder".into()))?;
            cmd_reconcile(Path::new(photos_dir), args.get(3).map(Path::new))
        }
        Some("pending") => cmd_pending(),
        Some("record") => {
            let station = args
                .get(2)
                .ok_or_else(|| Error::Usage("record needs: station photo_id value_cm".into()))?;
            let photo_id = parse_arg::<i64>(args.get(3), "photo_id")?;
            let value_cm = parse_arg::<f64>(args.get(4), "value_cm")?;
            cmd_record(station, photo_id, value_cm)
        }
        Some("summary") => cmd_summary(),
        Some("estimate") => {
            let ruler_px = parse_arg::<f64>(args.get(2), "ruler_px")?;
            let target_px = parse_arg::<f64>(args.get(3), "target_px")?;
            cmd_estimate(ruler_px, target_px, &args[4..])
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    eprintln!("Usage: sediment-ledger <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  reconcile <photos_dir> [stations_csv]   merge discovered photos into the ledger");
    eprintln!("  pending                                 list photos without a measurement");
    eprintln!("  record <station> <photo_id> <value_cm>  write one measurement");
    eprintln!("  summary                                 per-station overview");
    eprintln!("  estimate <ruler_px> <target_px> [ruler_cm] [fov_deg] [width_px]");
}

fn parse_arg<T: std::str::FromStr>(arg: Option<&String>, name: &str) -> Result<T> {
    arg.ok_or_else(|| Error::Usage(format!("missing argument: {name}")))?
        .parse()
        .map_err(|_| Error::Usage(format!("invalid value for {name}")))
}

fn open_store(stations_csv: Option<&Path>) -> Result<LedgerStore> {
    let paths = AppPaths::discover()?;
    let pool = sediment_ledger::init_database(&paths.db_path)?;

    let default_table = paths.root.join("stations.csv");
    let reference = match stations_csv {
        Some(path) => load_station_table(path)?,
        None if default_table.is_file() => load_station_table(&default_table)?,
        None => {
            log::warn!(
                "No station reference table at {}; station metadata will be unresolved",
                default_table.display()
            );
            StationTable::default()
        }
    };

    Ok(LedgerStore::new(pool, reference))
}

fn cmd_reconcile(photos_dir: &Path, stations_csv: Option<&Path>) -> Result<()> {
    let store = open_store(stations_csv)?;
    let scan = scan_stations(photos_dir)?;
    let summary = store.reconcile(&scan)?;

    println!(
        "Reconciled {} stations, {} new photos",
        summary.stations_seen, summary.photos_added
    );
    if !summary.unresolved_station_codes.is_empty() {
        println!(
            "Stations missing from the reference table: {}",
            summary.unresolved_station_codes.join(", ")
        );
    }
    Ok(())
}

fn cmd_pending() -> Result<()> {
    let store = open_store(None)?;
    let pending = store.list_unmeasured()?;

    if pending.is_empty() {
        println!("No photos waiting for a measurement.");
        return Ok(());
    }
    println!("{:<8} {:>8}  {}", "Station", "Photo", "Filename");
    for photo in &pending {
        println!(
            "{:<8} {:>8}  {}",
            photo.station_code, photo.photo_id, photo.filename
        );
    }
    println!("{} photos pending", pending.len());
    Ok(())
}

fn cmd_record(station: &str, photo_id: i64, value_cm: f64) -> Result<()> {
    let store = open_store(None)?;
    store.record_result(station, photo_id, value_cm)?;
    println!("Recorded {value_cm:.1} cm for photo {photo_id} at {station}");
    Ok(())
}

fn cmd_summary() -> Result<()> {
    let store = open_store(None)?;
    let stations = store.summary_view()?;

    println!(
        "{:<8} {:<20} {:>10} {:>10} {:>8} {:>7}",
        "Station", "Commune", "Latitude", "Longitude", "Z_CC49", "Photos"
    );
    for station in &stations {
        println!(
            "{:<8} {:<20} {:>10} {:>10} {:>8} {:>7}",
            station.code,
            station.commune.as_deref().unwrap_or("-"),
            fmt_opt(station.latitude, 4),
            fmt_opt(station.longitude, 4),
            fmt_opt(station.reference_elevation, 2),
            station.photo_count
        );
    }
    Ok(())
}

fn cmd_estimate(ruler_px: f64, target_px: f64, rest: &[String]) -> Result<()> {
    let paths = AppPaths::discover()?;
    let settings = Settings::load(&paths.settings_path)?;

    let ruler_cm = match rest.first() {
        Some(arg) => parse_arg(Some(arg), "ruler_cm")?,
        None => settings.measure.ruler_height_cm,
    };
    let fov_deg = match rest.get(1) {
        Some(arg) => parse_arg(Some(arg), "fov_deg")?,
        None => settings.measure.fov_degrees,
    };
    let width_px = match rest.get(2) {
        Some(arg) => parse_arg(Some(arg), "width_px")?,
        None => settings.measure.image_width_px,
    };

    let ruler = PixelRect::new(0.0, 0.0, 0.0, ruler_px);
    let target = PixelRect::new(0.0, 0.0, 0.0, target_px);
    let height = estimate_height(&ruler, &target, ruler_cm, fov_deg, width_px)?;
    println!("{height:.2} cm");
    Ok(())
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}
