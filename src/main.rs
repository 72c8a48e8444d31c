mod config;
mod data;
mod errors;
mod etl;
mod gpx;

use std::fs::create_dir_all;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::config::UserConfig;
use crate::errors::{Error, Result};
use crate::etl::cache::{HttpTransport, QueryCache};
use crate::etl::route_pois::RoutePoiEtl;
use crate::etl::Etl;

/// Finds points of interest along a GPX route using the Overpass API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the JSON config file.
    #[arg(short, long, default_value = "config/route.json")]
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.route_path)
        .file_name()
        .ok_or_else(|| Error::input(format!("route path {} has no file name", config.route_path.display())))?;
    let output_dir = config.output_root.join(input_fname);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    let user_config = UserConfig::load(&args.config)?;
    let rules = user_config.rules()?;
    info!(rules = rules.len(), endpoint = user_config.endpoint.as_str(); "Config loaded");

    let cache = QueryCache::new(&user_config.cache_dir, HttpTransport::new(&user_config.endpoint))?;
    let mut etl = RoutePoiEtl::new(&user_config, rules, cache);
    let output_dir = create_output_dir(&user_config)?;
    etl.process(&output_dir)?;

    info!(output = etl.output_path(&output_dir).display().to_string().as_str(); "POIs written");
    Ok(())
}
