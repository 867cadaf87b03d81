pub mod aggregate;
pub mod categorize;
pub mod dates;
pub mod extract;
pub mod orchestrator;
pub mod score;
pub mod stopwords;

pub use aggregate::{BucketedCounts, Granularity, KeywordCounts, ScanStats};
pub use extract::KeywordExtractor;
pub use orchestrator::{PipelineSettings, TrendingPipeline};
pub use stopwords::StopwordSet;
