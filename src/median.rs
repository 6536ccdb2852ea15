//! Median of a distance set, with the split-threshold interpolation rule.

/// Median of `values`.
///
/// For an odd number of values this is the middle element of the sorted
/// sequence (index `n / 2`). For an even number it interpolates between the
/// two central elements: with `low = (n - 1) / 2` and `high = low + 1`,
/// the result is `sorted[low] + (sorted[high] - sorted[low]) / 2`.
///
/// # Panics
///
/// Panics if `values` is empty.
///
/// # Examples
///
/// ```
/// use vantage::median;
///
/// assert_eq!(median(&[3.0, 5.0, 9.0, 7.0, 22.0]), 7.0);
/// assert_eq!(median(&[5.0, 15.0, 20.0, 25.0]), 17.5);
/// ```
pub fn median(values: &[f64]) -> f64 {
    assert!(!values.is_empty(), "median of an empty set is undefined");

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n % 2 == 1 {
        return sorted[n / 2];
    }

    let low = (n - 1) / 2;
    let high = low + 1;
    sorted[low] + (sorted[high] - sorted[low]) / 2.0
}
