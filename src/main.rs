// playlift - exports every playlist in the music library as a playlist file
// Parse args, set up logging, export, then maybe mention a newer release

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::CommandFactory;
use playlift::cli::{banner, Args};
use playlift::config::{AppPaths, ExportConfig, Settings};
use playlift::logging::{init_logging, pluralise};
use playlift::update::AppVersion;
use playlift::export_library_file;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse_with_legacy();

    // Bad combinations get the same treatment as bad flags: usage and exit 2
    let config = match args.to_export_config() {
        Ok(config) => config,
        Err(e) => Args::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let paths = match AppPaths::discover() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Keep the guard alive until exit so the file log gets flushed
    let _guard = match init_logging(&paths.log_dir(), args.debug) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &config, &paths).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &ExportConfig, paths: &AppPaths) -> Result<()> {
    let version = AppVersion::current();
    for line in banner(version) {
        info!("{}", line);
    }
    debug!("Application data: {}", paths.root().display());

    let settings = Settings::load().context("Failed to load settings")?;
    let library_path = args.library.clone().unwrap_or(settings.library_path.clone());

    // The parsed library is released before the network check starts
    let report = export_library_file(config, &library_path, args.close)?;

    info!(
        "Export finished. Wrote {}.",
        pluralise(report.written.len(), "playlist file", "playlist files")
    );

    if settings.check_for_updates && !args.no_check {
        report_new_release(version, &paths.version_cache()).await;
    }

    Ok(())
}

#[cfg(feature = "update-check")]
async fn report_new_release(current: AppVersion, cache_path: &Path) {
    use playlift::update::{check_latest_release, HttpReleaseFetcher, GITHUB_REPO};

    let fetcher = match HttpReleaseFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            debug!("{}", e);
            return;
        }
    };

    let result = check_latest_release(current, GITHUB_REPO, cache_path, &fetcher).await;
    if let (true, Some(latest)) = (result.update_available, result.latest) {
        info!("A new version ({}) is available! You are using {}", latest, result.current);
        info!("Get it from https://github.com/{}/", result.repo);
    }
}

#[cfg(not(feature = "update-check"))]
async fn report_new_release(_current: AppVersion, _cache_path: &Path) {}
