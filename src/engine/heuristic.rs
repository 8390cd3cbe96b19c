//! Component-count heuristic for model clustering.

/// Pick a component count from the number of points.
///
/// The first matching band wins:
///
/// | points           | components          |
/// |------------------|---------------------|
/// | `n < 100`        | `max(3, n / 20)`    |
/// | `n < 1_000`      | `max(5, n / 50)`    |
/// | `n < 10_000`     | `max(10, n / 200)`  |
/// | otherwise        | `max(20, n / 500)`  |
///
/// The result can exceed `n` for tiny inputs; the mixture fit rejects that.
pub fn auto_n_components(n: usize) -> usize {
    if n < 100 {
        (n / 20).max(3)
    } else if n < 1_000 {
        (n / 50).max(5)
    } else if n < 10_000 {
        (n / 200).max(10)
    } else {
        (n / 500).max(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_values() {
        let cases = [
            (0, 3),
            (12, 3),
            (99, 4),
            (100, 5),
            (500, 10),
            (999, 19),
            (1_000, 10),
            (5_000, 25),
            (9_999, 49),
            (10_000, 20),
            (20_000, 40),
        ];
        for (n, expected) in cases {
            assert_eq!(auto_n_components(n), expected, "n = {n}");
        }
    }

    #[test]
    fn test_band_boundaries_drop() {
        // Counts fall at each band edge.
        assert!(auto_n_components(999) > auto_n_components(1_000));
        assert!(auto_n_components(9_999) > auto_n_components(10_000));
    }
}
