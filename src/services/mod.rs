pub mod aggregator;
pub mod enrichment;
pub mod feedback;
pub mod providers;

pub use aggregator::RecommendationAggregator;
pub use enrichment::MetadataEnricher;
pub use feedback::FeedbackSubmitter;
