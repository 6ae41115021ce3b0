//! Cross-view projection matching.
//!
//! Two projections match when their fitted endpoint times agree within a
//! tolerance, either start-to-start and end-to-end (direct) or crosswise
//! (reversed). The search is exhaustive and greedy: pairs are accepted in
//! loop order, with no ranking by match quality.

use wirestereo_core::track::{MatchOrientation, MatchedPair, Projection};

/// Pairs induction projections with collection projections.
#[derive(Clone, Debug)]
pub struct CrossViewMatcher {
    tolerance: f64,
    exclusive: bool,
}

impl CrossViewMatcher {
    /// Creates a matcher with a time tolerance in centimetres.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            exclusive: false,
        }
    }

    /// Restricts every projection to at most one pair (first fit wins).
    #[must_use]
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Time tolerance (cm).
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Orientation under which `a` and `b` match, if any.
    ///
    /// Direct wins when both orientations hold. The result does not depend
    /// on argument order.
    #[must_use]
    pub fn orientation(&self, a: &Projection, b: &Projection) -> Option<MatchOrientation> {
        let close = |x: f64, y: f64| (x - y).abs() < self.tolerance;

        if close(a.start_line, b.start_line) && close(a.end_line, b.end_line) {
            Some(MatchOrientation::Direct)
        } else if close(a.start_line, b.end_line) && close(a.end_line, b.start_line) {
            Some(MatchOrientation::Reversed)
        } else {
            None
        }
    }

    /// Finds all matched pairs.
    ///
    /// Collection projections drive the outer loop and induction projections
    /// the inner one; pairs come out in that order.
    #[must_use]
    pub fn match_projections(
        &self,
        induction: &[Projection],
        collection: &[Projection],
    ) -> Vec<MatchedPair> {
        let mut pairs = Vec::new();
        let mut induction_used = vec![false; induction.len()];

        for (c, coll) in collection.iter().enumerate() {
            for (i, ind) in induction.iter().enumerate() {
                if self.exclusive && induction_used[i] {
                    continue;
                }
                if let Some(orientation) = self.orientation(ind, coll) {
                    pairs.push(MatchedPair {
                        induction: i,
                        collection: c,
                        orientation,
                    });
                    if self.exclusive {
                        induction_used[i] = true;
                        break;
                    }
                }
            }
        }

        pairs
    }
}
