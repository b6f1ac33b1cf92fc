use std::env;
use std::path::PathBuf;

use podarchive::{Catalog, scrape};

fn print_usage() {
    eprintln!("Usage: podscrape [OPTIONS] --scraper <CMD> | --from <FILE>");
    eprintln!();
    eprintln!("Merges freshly scraped episodes into the catalog.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <FILE>   Catalog file to update (default: podcasts.json)");
    eprintln!("      --scraper <CMD>   Scraper command; must print a JSON episode array on stdout");
    eprintln!("      --headless        Pass --headless through to the scraper command");
    eprintln!("      --from <FILE>     Read a captured scrape result instead of running a scraper");
    eprintln!("  -h, --help            Show this help");
}

struct ScrapeArgs {
    output: PathBuf,
    scraper: Option<String>,
    headless: bool,
    from: Option<PathBuf>,
}

fn parse_args() -> ScrapeArgs {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut parsed = ScrapeArgs {
        output: PathBuf::from("podcasts.json"),
        scraper: None,
        headless: false,
        from: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    parsed.output = PathBuf::from(&args[i]);
                }
            }
            "--scraper" => {
                i += 1;
                if i < args.len() {
                    parsed.scraper = Some(args[i].clone());
                }
            }
            "--headless" => {
                parsed.headless = true;
            }
            "--from" => {
                i += 1;
                if i < args.len() {
                    parsed.from = Some(PathBuf::from(&args[i]));
                }
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

    parsed
}

async fn run(args: ScrapeArgs) -> podarchive::Result<()> {
    let raw = if let Some(path) = &args.from {
        scrape::read_records(path)?
    } else if let Some(command) = &args.scraper {
        scrape::scrape_command(command, args.headless).await?
    } else {
        print_usage();
        std::process::exit(1);
    };

    let records = scrape::validate(raw);
    log::info!("scrape yielded {} usable record(s)", records.len());

    let mut catalog = Catalog::load(&args.output)?;
    let added = catalog.merge(records);
    catalog.save(&args.output)?;

    println!("{added} new episode(s), {} total.", catalog.len());
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = parse_args();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
