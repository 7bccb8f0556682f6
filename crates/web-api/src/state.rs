use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::bail;
use fintech_monitor_alerts::AlertService;
use fintech_monitor_data::MonitorStore;
use fintech_monitor_signals::{AnalyzerService, ScraperService};

/// Which service's routes a server mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Scraper,
    Analyzer,
    Alert,
    All,
}

impl ServiceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scraper => "scraper",
            Self::Analyzer => "analyzer",
            Self::Alert => "alert",
            Self::All => "all",
        }
    }

    #[must_use]
    pub fn includes(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "scraper" => Ok(Self::Scraper),
            "analyzer" => Ok(Self::Analyzer),
            "alert" | "alerts" => Ok(Self::Alert),
            "all" => Ok(Self::All),
            other => bail!("unknown service: {other}"),
        }
    }
}

/// Shared handler state. Services are built once by the entry point.
#[derive(Clone)]
pub struct AppState {
    pub service: ServiceKind,
    pub store: Arc<dyn MonitorStore>,
    pub scraper: Arc<ScraperService>,
    pub analyzer: Arc<AnalyzerService>,
    pub alerts: Arc<AlertService>,
    pub symbols: Arc<[String]>,
    pub sentiment_summary_hours: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind_parse() {
        assert_eq!("Analyzer".parse::<ServiceKind>().unwrap(), ServiceKind::Analyzer);
        assert_eq!("alerts".parse::<ServiceKind>().unwrap(), ServiceKind::Alert);
        assert!("billing".parse::<ServiceKind>().is_err());
        assert!(ServiceKind::All.includes(ServiceKind::Scraper));
        assert!(!ServiceKind::Alert.includes(ServiceKind::Scraper));
    }
}
