pub mod lookups;
pub mod resolver;

pub use lookups::{
    Classification, ClassificationLookup, FeedEntry, NewsFeedLookup, YahooNewsFeed,
    YahooProfileLookup,
};
pub use resolver::{EnrichmentResolver, EnrichmentWarning};
