use anyhow::Result;
use automobile_dashboard::config::Config;
use automobile_dashboard::dashboard::Dashboard;
use automobile_dashboard::data::{load_table, DatasetManifest};
use automobile_dashboard::logging::{log, log_load, obj, v_str, Domain, Level, ProfileScope};
use automobile_dashboard::server;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cfg = Config::from_env().with_args(std::env::args());
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[("path", v_str(&cfg.data_path)), ("addr", v_str(&cfg.bind_addr()))]),
    );

    let path = PathBuf::from(&cfg.data_path);
    let loaded = {
        let _scope = ProfileScope::new("load_table");
        load_table(&path, &cfg.columns)
    };
    let (table, report) = match loaded {
        Ok(v) => v,
        Err(err) => {
            log(
                Level::Fatal,
                Domain::System,
                "load_failed",
                obj(&[("path", v_str(&cfg.data_path)), ("msg", v_str(&format!("{:#}", err)))]),
            );
            return Err(err);
        }
    };
    log_load(
        &cfg.data_path,
        report.rows_read,
        report.rows_kept,
        report.rows_dropped,
        report.rows_missing_sales,
    );

    let manifest = DatasetManifest::build(&path, &table, &report)?;
    let dash = Arc::new(Dashboard::new(table, cfg.columns.clone(), Some(manifest)));

    println!("Automobile dashboard running at http://{}", cfg.bind_addr());
    server::serve(dash, &cfg.bind_addr()).await
}
