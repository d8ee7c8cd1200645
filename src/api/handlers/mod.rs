use crate::rating::RatingEngine;

pub mod ratings;

/// Shared by all handlers; the engine itself is stateless between calls
pub struct AppState<L, C> {
    pub engine: RatingEngine<L, C>,
}

impl<L, C> AppState<L, C> {
    pub fn new(engine: RatingEngine<L, C>) -> Self {
        Self { engine }
    }
}
