//! Cycle runners for the scraper and analyzer stages.

mod analyzer;
mod scraper;

pub use analyzer::{AnalysisReport, AnalyzerService};
pub use scraper::{ScrapeReport, ScraperService};
