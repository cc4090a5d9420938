mod geo;
mod model;
mod sanitize;
mod share_site_client;

use std::path::Path;
use std::process;

use anyhow::Result;
use clap::Parser;
use git_version::git_version;
use log::{LevelFilter, info};

use crate::geo::lat_long_decimal_to_dms;
use crate::share_site_client::ShareSiteClient;

pub const GIT_VERSION: &str = git_version!(fallback = "unknown");

/// Share Site Downloader
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Authentication token (ie ShrAuth cookie contents)
    #[clap(short, long)]
    token: String,

    /// Share Sites site name
    #[clap(short, long)]
    site: String,

    /// Directory to download photos to
    #[clap(short, long, default_value = ".")]
    directory: String,

    /// Adds geo coordinate EXIF data to all the photos (ex: "40.7335,-74.0031")
    #[clap(short, long)]
    geo: Option<String>,

    /// Turns on verbose logging
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    println!("Share Site Downloader {GIT_VERSION}");

    let client = ShareSiteClient::new(&args.token, &args.site)?;
    let albums = client.fetch_albums().await?;
    info!("Found {} albums", albums.len());

    let coordinate = match &args.geo {
        Some(geo) => Some(lat_long_decimal_to_dms(geo)?),
        None => None,
    };

    println!("Downloading albums. This may take several minutes...");
    let success = client
        .download_albums(&albums, Path::new(&args.directory), coordinate.as_ref())
        .await?;
    if !success {
        process::exit(1);
    }

    Ok(())
}
