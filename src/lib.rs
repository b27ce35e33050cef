pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod parser;
pub mod sites;

pub use error::{Result, ScrapingError};
pub use config::Config;
pub use parser::{ScrapeRequest, ScrapeResult};
pub use sites::{Dispatcher, SiteExtractor, SiteKind};
