pub mod config;
pub mod config_loader;
pub mod error;
pub mod sentiment;
pub mod signal;
pub mod traits;

pub use config::{
    AppConfig, DatabaseConfig, NotificationConfig, SchedulerConfig, ScraperConfig,
    SentimentConfig, ServerConfig, ThresholdConfig, WindowConfig,
};
pub use config_loader::ConfigLoader;
pub use error::{is_connectivity_error, MonitorError};
pub use sentiment::{MarketImpact, SentimentAnalysis, SentimentLabel};
pub use signal::{
    FinalSignal, FusedSignal, Polarity, PriceAction, PriceSignal, SentimentBias, SentimentSignal,
};
pub use traits::SentimentCapability;
