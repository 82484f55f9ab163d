pub mod feed;
pub mod filter;
pub mod geo;
pub mod location;
pub mod ranking;

pub use feed::{compose, FeedEntry};
pub use filter::filter;
pub use geo::{distance_km, round_km};
pub use location::{LocationResolver, ManualAddress, ResolutionOutcome, ViewerProfile};
pub use ranking::{popularity_score, rank};
