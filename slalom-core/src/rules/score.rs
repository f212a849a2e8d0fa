/// Relative performance score: `(1 - gap / elapsed) * 100`.
///
/// The denominator is the competitor's own time, not the leader's, so the
/// leader (gap 0) scores exactly 100 and everyone else degrades in proportion
/// to their own run. Returns `None` when either input is missing or
/// `elapsed` is not strictly positive. Results are not clamped: a negative or
/// oversized gap yields a score outside 0-100.
pub fn compute_score(elapsed_seconds: Option<f64>, gap_seconds: Option<f64>) -> Option<f64> {
    let elapsed = elapsed_seconds?;
    let gap = gap_seconds?;

    // `!(x > 0)` also rejects NaN
    if !(elapsed > 0.0) {
        return None;
    }

    Some((1.0 - gap / elapsed) * 100.0)
}
