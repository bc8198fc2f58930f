use std::path::Path;

use clap::Parser;

use alodat::browser::WebDriverPage;
use alodat::config::RunConfig;
use alodat::diagnostics::Capturer;
use alodat::{output, stages};

mod args;
use args::{Args, Stage};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match RunConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => RunConfig::default(),
    };
    args.apply_to(&mut config);

    // Environment override for the WebDriver server
    if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
        if !webdriver_url.is_empty() {
            config.site.webdriver_url = webdriver_url;
        }
    }

    if let Err(e) = run(args.stage, &config).await {
        ::log::error!("run aborted: {}", e);
        std::process::exit(1);
    }
}

async fn run(stage: Stage, config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let capturer = Capturer::new(&config.site.screenshot_dir);

    // Session setup is the one failure with no per-item recovery
    let mut page = WebDriverPage::connect(&config.site.webdriver_url).await?;

    let result = match stage {
        Stage::Crawl => run_crawl(&mut page, config, &capturer).await,
        Stage::Scrape => run_scrape(&mut page, config, &capturer).await,
    };

    page.close().await;
    result
}

async fn run_crawl(
    page: &mut WebDriverPage,
    config: &RunConfig,
    capturer: &Capturer,
) -> Result<(), Box<dyn std::error::Error>> {
    let (links, report) = stages::crawl::run(page, &config.site, &config.crawl, capturer).await?;

    output::write_links(Path::new(&config.crawl.links_file), &links)?;

    ::log::info!(
        "crawl finished: {} pages visited, {} skipped, {} errors; {} unique links -> {}",
        report.visited,
        report.skipped,
        report.errors,
        links.len(),
        config.crawl.links_file
    );
    Ok(())
}

async fn run_scrape(
    page: &mut WebDriverPage,
    config: &RunConfig,
    capturer: &Capturer,
) -> Result<(), Box<dyn std::error::Error>> {
    let urls = output::read_links(Path::new(&config.scrape.links_file))?;
    if urls.is_empty() {
        ::log::warn!("no urls found in {}", config.scrape.links_file);
    }

    let (records, report) = stages::scrape::run(page, &config.site, &urls, capturer).await;

    output::write_records(Path::new(&config.scrape.output_file), &records)?;

    ::log::info!(
        "scrape finished: {} urls visited, {} without content, {} errors; {} records -> {}",
        report.visited,
        report.skipped,
        report.errors,
        records.len(),
        config.scrape.output_file
    );
    Ok(())
}
