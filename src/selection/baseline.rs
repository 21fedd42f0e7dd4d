//! Cold-start rating predictions for the hypothesis-free strategy

use crate::candidate::CandidateStore;

/// Predicted rating for every candidate without a model
///
/// A rated candidate predicts its own rating; an unrated one predicts the
/// mean of all ratings so far, or `standard_rating` before any rating exists.
pub fn baseline_predictions<M>(store: &CandidateStore<M>, standard_rating: f64) -> Vec<f64> {
    let fallback = store.mean_visited_rating().unwrap_or(standard_rating);
    store
        .records()
        .iter()
        .map(|r| if r.is_visited() { r.rating } else { fallback })
        .collect()
}
