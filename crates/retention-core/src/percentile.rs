// Mid-rank percentile against a sorted reference population.

/// Percentile returned when the reference population is empty.
pub const EMPTY_POPULATION_PERCENTILE: f64 = 50.0;

/// Percentile rank of `value` within `sorted` (ascending).
///
/// Uses the mid-rank convention: `(below + 0.5 * equal) / n * 100`, so every
/// member of a run of tied values receives the same percentile.
///
/// Returns 0.0 for a non-finite `value` and [`EMPTY_POPULATION_PERCENTILE`]
/// for an empty population.
pub fn percentile(value: f64, sorted: &[f64]) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if sorted.is_empty() {
        return EMPTY_POPULATION_PERCENTILE;
    }
    let below = sorted.partition_point(|v| *v < value);
    let through = sorted.partition_point(|v| *v <= value);
    let equal = through - below;
    (below as f64 + 0.5 * equal as f64) * 100.0 / sorted.len() as f64
}

/// Percentile for a stat where lower values are better (ERA, WHIP, ...).
pub fn inverted_percentile(value: f64, sorted: &[f64]) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    100.0 - percentile(value, sorted)
}

/// Mean of the given percentiles; `None` when there are none.
pub fn mean_percentile(percentiles: &[f64]) -> Option<f64> {
    if percentiles.is_empty() {
        return None;
    }
    Some(percentiles.iter().sum::<f64>() / percentiles.len() as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn empty_population_is_neutral() {
        assert_eq!(percentile(0.300, &[]), 50.0);
        assert_eq!(percentile(-12.0, &[]), 50.0);
    }

    #[test]
    fn non_finite_value_is_zero() {
        let pop = [1.0, 2.0, 3.0];
        assert_eq!(percentile(f64::NAN, &pop), 0.0);
        assert_eq!(percentile(f64::INFINITY, &pop), 0.0);
        assert_eq!(percentile(f64::NAN, &[]), 0.0);
    }

    #[test]
    fn known_values() {
        let pop = [1.0, 2.0, 3.0, 4.0];
        // 0 below, 1 equal -> 0.5 / 4
        assert!(approx_eq(percentile(1.0, &pop), 12.5, 1e-10));
        // 3 below, 1 equal -> 3.5 / 4
        assert!(approx_eq(percentile(4.0, &pop), 87.5, 1e-10));
        // above everything
        assert!(approx_eq(percentile(10.0, &pop), 100.0, 1e-10));
        // below everything
        assert!(approx_eq(percentile(0.0, &pop), 0.0, 1e-10));
        // between entries
        assert!(approx_eq(percentile(2.5, &pop), 50.0, 1e-10));
    }

    #[test]
    fn ties_share_percentile() {
        let pop = [1.0, 3.0, 3.0, 3.0, 5.0];
        // 1 below, 3 equal -> (1 + 1.5) / 5
        let p = percentile(3.0, &pop);
        assert!(approx_eq(p, 50.0, 1e-10));
        for v in pop.iter().filter(|v| **v == 3.0) {
            assert_eq!(percentile(*v, &pop), p);
        }
    }

    #[test]
    fn monotone_in_value() {
        let pop = [0.1, 0.2, 0.2, 0.25, 0.3, 0.3, 0.3, 0.41];
        let mut last = -1.0;
        let mut v = 0.0;
        while v <= 0.5 {
            let p = percentile(v, &pop);
            assert!(p >= last, "percentile decreased at {v}: {p} < {last}");
            last = p;
            v += 0.005;
        }
    }

    #[test]
    fn result_is_bounded() {
        let pop = [5.0; 7];
        for v in [-100.0, 5.0, 100.0] {
            let p = percentile(v, &pop);
            assert!((0.0..=100.0).contains(&p));
        }
    }

    #[test]
    fn inverted_percentile_flips() {
        let pop = [2.0, 3.0, 4.0, 5.0];
        assert!(approx_eq(inverted_percentile(2.0, &pop), 87.5, 1e-10));
        assert!(approx_eq(inverted_percentile(5.0, &pop), 12.5, 1e-10));
        assert_eq!(inverted_percentile(f64::NAN, &pop), 0.0);
    }

    #[test]
    fn mean_of_percentiles() {
        assert_eq!(mean_percentile(&[]), None);
        assert_eq!(mean_percentile(&[90.0; 6]), Some(90.0));
        assert!(approx_eq(mean_percentile(&[40.0, 60.0, 80.0]).unwrap(), 60.0, 1e-10));
    }
}
