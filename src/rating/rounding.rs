use crate::errors::RatingError;

/// Upper bounds (exclusive) of the 1..=5 bins
const BIN_UPPER_BOUNDS: [(f64, u8); 5] = [(1.6, 1), (2.6, 2), (3.6, 3), (4.6, 4), (5.6, 5)];

/// Maps a mean score onto the 0..=5 star scale.
///
/// 0.0 means "no votes"; every other mean falls into a half-open bin ending at x.6,
/// so 1.59 is 1 and 1.6 is 2. Anything outside [0, 5.6) is an invariant violation.
pub fn round_average(average: f64) -> Result<u8, RatingError> {
    if average == 0.0 {
        return Ok(0);
    }
    if average < 0.0 || average.is_nan() {
        return Err(RatingError::Invariant { value: average });
    }

    BIN_UPPER_BOUNDS
        .iter()
        .find(|(upper, _)| average < *upper)
        .map(|&(_, rounded)| rounded)
        .ok_or(RatingError::Invariant { value: average })
}
