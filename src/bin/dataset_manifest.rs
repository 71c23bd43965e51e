//! Writes `<dataset>.manifest.json` describing a sales CSV: hash, columns,
//! kept/dropped row counts and the observation date span.
//!
//! Run with: cargo run --bin dataset_manifest -- "automobile excel sheet.csv"

use automobile_dashboard::config::Config;
use automobile_dashboard::data::{default_manifest_path, load_table, DatasetManifest};
use std::fs;
use std::path::PathBuf;

fn main() {
    let cfg = Config::from_env().with_args(std::env::args());
    let path = PathBuf::from(&cfg.data_path);

    let (table, report) = match load_table(&path, &cfg.columns) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("load failed: {:#}", err);
            std::process::exit(1);
        }
    };

    let manifest = match DatasetManifest::build(&path, &table, &report) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("manifest failed: {:#}", err);
            std::process::exit(2);
        }
    };

    if manifest.rows_dropped > 0 {
        eprintln!(
            "warning: {} of {} rows had unparseable dates",
            manifest.rows_dropped, manifest.rows_read
        );
    }

    let out_path = default_manifest_path(&path);
    let payload = match serde_json::to_string_pretty(&manifest) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("serialization failed: {}", err);
            std::process::exit(3);
        }
    };
    if let Err(err) = fs::write(&out_path, payload) {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(4);
    }
    println!("wrote manifest {}", out_path.display());
}
