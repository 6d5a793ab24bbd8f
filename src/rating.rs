//! Weighted 1-5 star rating derived from aspect sentiment.

use crate::sentiment::{Aspect, SentimentVector};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Aspect weights. `overall` does not contribute.
pub const ASPECT_WEIGHTS: [(Aspect, f64); 5] = [
    (Aspect::Taste, 0.35),
    (Aspect::Service, 0.30),
    (Aspect::Ambience, 0.15),
    (Aspect::Hygiene, 0.10),
    (Aspect::Delivery, 0.10),
];

/// Compute the rating for a sentiment vector using [`ASPECT_WEIGHTS`].
///
/// Always a multiple of 0.5 in `[1.0, 5.0]`.
pub fn calculate_rating(sentiment: &SentimentVector) -> f64 {
    weighted_rating(sentiment, &ASPECT_WEIGHTS)
}

/// Weighted average of aspect scores, normalized by the weights actually
/// applied, scaled to five stars and rounded to the nearest half star.
pub fn weighted_rating(sentiment: &SentimentVector, weights: &[(Aspect, f64)]) -> f64 {
    let (weighted_sum, total_weight) = weights
        .iter()
        .fold((0.0, 0.0), |(sum, total), (aspect, weight)| {
            (sum + sentiment.aspect(*aspect).score() * weight, total + weight)
        });

    let average = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.5
    };

    let rating = (average * MAX_RATING * 2.0).round() / 2.0;
    rating.clamp(MIN_RATING, MAX_RATING)
}
