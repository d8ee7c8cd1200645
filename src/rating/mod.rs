pub mod engine;
pub mod rounding;
pub mod types;

pub use engine::{
    RATING_AVERAGE_INT_KEY, RATING_AVERAGE_KEY, RATING_COUNT_KEY, RatingEngine,
    merge_rating_extras,
};
pub use rounding::round_average;
pub use types::{RatingAggregate, RatingSummary, Score};
