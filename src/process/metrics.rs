use rayon::prelude::*;

/// Anything exposing pending/closed counts can carry a congestion rate:
/// raw rows as well as grouped sums.
pub trait CaseCounts {
    fn pending_cases(&self) -> u64;
    fn closed_cases(&self) -> u64;
    fn set_congestion_rate(&mut self, rate: f64);
}

/// `pending / (pending + closed) * 100`, two decimals; 0 when both are 0.
pub fn congestion_rate(pending: u64, closed: u64) -> f64 {
    let denominator = pending as f64 + closed as f64;
    if denominator > 0.0 {
        round2(100.0 * (pending as f64 / denominator))
    } else {
        0.0
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Overwrite `congestion_rate` on every row.
pub fn compute_congestion<T: CaseCounts + Send>(rows: &mut [T]) {
    rows.par_iter_mut().for_each(|row| {
        let rate = congestion_rate(row.pending_cases(), row.closed_cases());
        row.set_congestion_rate(rate);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counts(u64, u64, f64);

    impl CaseCounts for Counts {
        fn pending_cases(&self) -> u64 {
            self.0
        }
        fn closed_cases(&self) -> u64 {
            self.1
        }
        fn set_congestion_rate(&mut self, rate: f64) {
            self.2 = rate;
        }
    }

    #[test]
    fn rate_matches_formula() {
        assert_eq!(congestion_rate(2, 8), 20.0);
        assert_eq!(congestion_rate(1, 2), 33.33);
        assert_eq!(congestion_rate(2, 1), 66.67);
        assert_eq!(congestion_rate(5, 0), 100.0);
        assert_eq!(congestion_rate(0, 7), 0.0);
    }

    #[test]
    fn zero_denominator_floors_to_zero() {
        assert_eq!(congestion_rate(0, 0), 0.0);
    }

    #[test]
    fn overwrites_existing_rates() {
        let mut rows = vec![Counts(1, 3, 99.0), Counts(0, 0, 42.0)];
        compute_congestion(&mut rows);
        assert_eq!(rows[0].2, 25.0);
        assert_eq!(rows[1].2, 0.0);
    }
}
