use alodat::config::RunConfig;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "alodat")]
#[command(about = "Captcha-aware crawler/scraper for paginated real-estate listings")]
#[command(version)]
pub struct Args {
    /// Stage to run
    #[arg(value_enum)]
    pub stage: Stage,

    /// Path to a JSON config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of listing pages to walk (crawl stage)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Links file: crawl output, scrape input
    #[arg(long)]
    pub links_file: Option<String>,

    /// CSV output file (scrape stage)
    #[arg(long)]
    pub output_file: Option<String>,

    /// URL of the WebDriver server
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Directory for diagnostic snapshots
    #[arg(long)]
    pub screenshot_dir: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Walk listing pages and collect detail-page links
    Crawl,
    /// Visit collected links and extract records
    Scrape,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut RunConfig) {
        if let Some(max_pages) = self.max_pages {
            config.crawl.max_pages = max_pages;
        }
        if let Some(links_file) = &self.links_file {
            config.crawl.links_file = links_file.clone();
            config.scrape.links_file = links_file.clone();
        }
        if let Some(output_file) = &self.output_file {
            config.scrape.output_file = output_file.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.site.webdriver_url = webdriver_url.clone();
        }
        if let Some(screenshot_dir) = &self.screenshot_dir {
            config.site.screenshot_dir = screenshot_dir.clone();
        }
    }
}
