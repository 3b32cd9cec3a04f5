//! Relative Strength Index (RSI) indicator.

/// Convert window gain/loss averages into an RSI value.
///
/// A window without losses saturates at 100, including a perfectly flat one.
#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Calculate RSI over the newest `period + 1` prices.
///
/// Unlike Wilder's smoothed RSI this is stateless: gains and losses are simple
/// sums over the window, recomputed on every call.
///
/// # Arguments
///
/// * `prices` - Price history, oldest to newest
/// * `period` - Number of deltas in the window (typically 14)
///
/// # Returns
///
/// RSI in `[0, 100]`, or `None` while fewer than `period + 1` prices exist.
///
/// # Example
///
/// ```rust
/// use pricewatch_core::indicators::compute_rsi;
///
/// let prices = vec![44.0, 44.25, 44.5, 43.75, 44.5, 44.25];
/// let rsi = compute_rsi(&prices, 5).unwrap();
/// assert!(rsi > 0.0 && rsi < 100.0);
///
/// assert!(compute_rsi(&prices, 14).is_none());
/// ```
pub fn compute_rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let window = &prices[prices.len() - (period + 1)..];
    let (gains, losses) = window.windows(2).fold((0.0_f64, 0.0_f64), |(g, l), w| {
        let change = w[1] - w[0];
        if change > 0.0 {
            (g + change, l)
        } else {
            (g, l + change.abs())
        }
    });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    Some(rsi_value(avg_gain, avg_loss))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rsi_insufficient_data() {
        let prices: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(compute_rsi(&prices, 14).is_none());
        assert!(compute_rsi(&[], 14).is_none());
        assert!(compute_rsi(&[1.0, 2.0], 0).is_none());
    }

    #[test]
    fn test_rsi_all_gains_saturates() {
        let prices: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        assert_eq!(compute_rsi(&prices, 14), Some(100.0));
    }

    #[test]
    fn test_rsi_flat_window_saturates() {
        let prices = vec![100.0; 20];
        assert_eq!(compute_rsi(&prices, 14), Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses() {
        let prices: Vec<f64> = (1..=15).rev().map(|x| x as f64).collect();
        assert_eq!(compute_rsi(&prices, 14), Some(0.0));
    }

    #[test]
    fn test_rsi_known_value() {
        // Deltas: +2, -1, +2, -1 => gains 4, losses 2, rs = 2, rsi = 66.67
        let prices = vec![10.0, 12.0, 11.0, 13.0, 12.0];
        assert_relative_eq!(compute_rsi(&prices, 4).unwrap(), 200.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_uses_newest_window_only() {
        // Older losses fall outside the 3-delta window
        let prices = vec![50.0, 40.0, 30.0, 31.0, 32.0, 33.0];
        assert_eq!(compute_rsi(&prices, 3), Some(100.0));
    }

    #[test]
    fn test_rsi_range() {
        let prices: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 10.0 + (i as f64 * 1.3).cos())
            .collect();

        for end in 15..prices.len() {
            let rsi = compute_rsi(&prices[..end], 14).unwrap();
            assert!((0.0..=100.0).contains(&rsi), "RSI {rsi} out of range");
        }
    }
}
