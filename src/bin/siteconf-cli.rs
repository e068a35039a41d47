use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use siteconf::config::{BasicSiteConfiguration, Category, ConfigStore, CoreSiteConfiguration};
use siteconf::fetch::RemoteFetcher;

#[derive(Parser)]
#[command(name = "siteconf-cli")]
#[command(about = "Inspect and check site configuration documents", long_about = None)]
struct Cli {
    /// Root URL of the authority's internal API
    #[arg(short, long, default_value = "http://127.0.0.1:3090")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the raw basic configuration served by the authority
    Basic,
    /// Print the raw core configuration served by the authority
    Core,
    /// Validate a local document against a category's schema
    Check {
        /// Category of the document (basic or core)
        category: Category,
        /// Path to the document
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Basic => print_raw(&cli.url, Category::Basic).await?,
        Commands::Core => print_raw(&cli.url, Category::Core).await?,
        Commands::Check { category, path } => {
            let raw = fs::read_to_string(&path)?;
            let result = match category {
                Category::Basic => ConfigStore::<BasicSiteConfiguration>::new(category)
                    .maybe_update(&raw)
                    .map(|_| ()),
                Category::Core => ConfigStore::<CoreSiteConfiguration>::new(category)
                    .maybe_update(&raw)
                    .map(|_| ()),
            };
            match result {
                Ok(()) => println!("{}: valid {} configuration", path.display(), category),
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn print_raw(url: &str, category: Category) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = RemoteFetcher::new(url)?;
    let raw = fetcher.fetch(category).await?;
    println!("{}", raw.trim_end());
    Ok(())
}
