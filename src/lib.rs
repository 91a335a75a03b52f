pub mod cli;
pub mod config;
pub mod extractor;
pub mod models;
pub mod plugins;
pub mod scheduler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use extractor::ProductExtractor;
pub use models::{PollState, Product, RunState, StatusReport};
pub use scheduler::{CycleOutcome, PollDiff, PollLoop, WatcherStats};
pub use scraper::{BrowserFetcher, PageFetcher};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
