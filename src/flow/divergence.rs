use crate::model::row::Divergence;

/// Label price movement that runs against the window's net flow. Looks only
/// at the last two ticks' prices, regardless of window size.
pub fn classify(prev_price: f64, last_price: f64, net_flow: f64) -> Divergence {
    let price_change = last_price - prev_price;
    if net_flow < 0.0 && price_change > 0.0 {
        Divergence::Absorption
    } else if net_flow > 0.0 && price_change < 0.0 {
        Divergence::Distribution
    } else {
        Divergence::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorption_on_price_up_against_selling() {
        // Ticks (p=100, sell=5) then (p=101): net flow -5, price change +1.
        let label = classify(100.0, 101.0, -5.0);
        assert_eq!(label, Divergence::Absorption);
        assert!(label.manipulation_high());
    }

    #[test]
    fn distribution_on_price_down_against_buying() {
        let label = classify(101.0, 100.0, 5.0);
        assert_eq!(label, Divergence::Distribution);
        assert!(label.manipulation_high());
    }

    #[test]
    fn aligned_flow_is_unlabelled() {
        assert_eq!(classify(100.0, 101.0, 5.0), Divergence::None);
        assert_eq!(classify(101.0, 100.0, -5.0), Divergence::None);
        assert_eq!(classify(100.0, 100.0, 5.0), Divergence::None);
        assert_eq!(classify(100.0, 101.0, 0.0), Divergence::None);
    }
}
