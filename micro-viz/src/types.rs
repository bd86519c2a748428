use embedded_graphics::pixelcolor::Rgb888;

/// One level in `[0, 1]` per output channel; index is the LED position.
pub type ChannelLevels = Vec<f32>;

/// One color per LED, produced fresh every frame.
pub type RgbFrame = Vec<Rgb888>;

/// Indices of the `k` largest values, strongest first. Equal values keep
/// index order, so the lower index wins a tie.
pub(crate) fn strongest_indices(values: &[f32], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    let by_strength = |a: &usize, b: &usize| values[*b].total_cmp(&values[*a]).then(a.cmp(b));
    if k == 0 {
        return Vec::new();
    }
    if k < order.len() {
        order.select_nth_unstable_by(k - 1, by_strength);
        order.truncate(k);
    }
    order.sort_unstable_by(by_strength);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strongest_indices_orders_by_value() {
        let values = [0.1, 0.9, 0.4, 0.7];
        assert_eq!(strongest_indices(&values, 2), vec![1, 3]);
        assert_eq!(strongest_indices(&values, 10), vec![1, 3, 2, 0]);
        assert!(strongest_indices(&values, 0).is_empty());
    }

    #[test]
    fn test_strongest_indices_prefers_lower_index_on_tie() {
        let values = [0.5, 0.2, 0.5, 0.5];
        assert_eq!(strongest_indices(&values, 1), vec![0]);
        assert_eq!(strongest_indices(&values, 2), vec![0, 2]);
    }
}
