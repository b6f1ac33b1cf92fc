use std::env;
use std::path::PathBuf;

use podarchive::AppConfig;

fn print_usage() {
    eprintln!("Usage: podarchive [OPTIONS]");
    eprintln!();
    eprintln!("Downloads every episode in the catalog that is not archived yet.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -i, --input <FILE>        Catalog file (default: podcasts.json)");
    eprintln!("  -d, --download-dir <DIR>  Download directory (default: downloads)");
    eprintln!("  -f, --filter <REGEX>      Only episodes whose title matches (case-insensitive)");
    eprintln!("  -p, --parallel <N>        Concurrent downloads (default: 8)");
    eprintln!("      --force               Overwrite existing files");
    eprintln!("  -n, --dry-run             Report intended actions without downloading");
    eprintln!("  -c, --convert             Re-encode downloads with ffmpeg (Opus, 64 kbit/s)");
    eprintln!("  -h, --help                Show this help");
}

fn parse_args() -> AppConfig {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut config = AppConfig::load();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-i" | "--input" => {
                i += 1;
                if i < args.len() {
                    config.paths.catalog = PathBuf::from(&args[i]);
                }
            }
            "-d" | "--download-dir" => {
                i += 1;
                if i < args.len() {
                    config.paths.download_dir = PathBuf::from(&args[i]);
                }
            }
            "-f" | "--filter" => {
                i += 1;
                if i < args.len() {
                    config.filter = Some(args[i].clone());
                }
            }
            "-p" | "--parallel" => {
                i += 1;
                if i < args.len() {
                    config.download.parallel =
                        args[i].parse().unwrap_or(config.download.parallel);
                }
            }
            "--force" => {
                config.download.force = true;
            }
            "-n" | "--dry-run" => {
                config.download.dry_run = true;
            }
            "-c" | "--convert" => {
                config.download.convert = true;
            }
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let config = parse_args();

    // Per-episode failures are already logged and counted in the summary;
    // only fatal startup errors change the exit code.
    if let Err(e) = podarchive::cli::run_download(config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
