//! Trailing averages over delta sequences.

use std::num::NonZeroUsize;

/// One week of daily samples.
pub const WEEK: NonZeroUsize = NonZeroUsize::MIN.saturating_add(6);

/// Trailing average with a running sum.
///
/// Output `i` averages `deltas[max(0, i + 1 - window)..=i]`: before the
/// window fills, the divisor is the number of samples seen so far. Integer
/// division truncates. The sum is kept in `u128`, so any `u64` input is safe.
pub fn rolling_average(deltas: &[u64], window: NonZeroUsize) -> Vec<u64> {
    let window = window.get();
    let mut out = Vec::with_capacity(deltas.len());
    let mut sum: u128 = 0;

    for (i, &d) in deltas.iter().enumerate() {
        sum += u128::from(d);
        if i >= window {
            sum -= u128::from(deltas[i - window]);
        }
        let count = (i + 1).min(window) as u128;
        // The mean of u64 values fits in u64.
        out.push((sum / count) as u64);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_up_uses_partial_windows() {
        let avg = rolling_average(&[1, 2, 3, 4, 5, 6, 7, 8], WEEK);
        // {1}, {1,2}, {1,2,3}, ... {1..7}, {2..8}
        assert_eq!(avg, vec![1, 1, 2, 2, 3, 3, 4, 5]);
    }

    #[test]
    fn huge_counters_do_not_overflow() {
        let half = u64::MAX / 2 + 1;
        assert_eq!(rolling_average(&[half, half], WEEK), vec![half, half]);
        assert_eq!(rolling_average(&[u64::MAX; 9], WEEK), vec![u64::MAX; 9]);
    }

    #[test]
    fn output_length_matches_input() {
        assert!(rolling_average(&[], WEEK).is_empty());
        assert_eq!(rolling_average(&[9; 20], WEEK), vec![9; 20]);
    }

    #[test]
    fn window_of_one_is_identity() {
        let data = [4, 0, 7, 1];
        assert_eq!(rolling_average(&data, NonZeroUsize::MIN), data.to_vec());
    }

    #[test]
    fn calls_do_not_share_state() {
        let first = rolling_average(&[100, 100, 100], WEEK);
        let second = rolling_average(&[1, 1, 1], WEEK);
        assert_eq!(first, vec![100, 100, 100]);
        assert_eq!(second, vec![1, 1, 1]);
    }

    #[test]
    fn full_window_slides() {
        let avg = rolling_average(&[7, 0, 0, 0, 0, 0, 0, 0], WEEK);
        assert_eq!(avg[6], 1);
        assert_eq!(avg[7], 0);
    }
}
