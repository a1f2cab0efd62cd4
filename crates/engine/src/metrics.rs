//! Derived display metrics.
//!
//! Pure, total functions over optional operands. A missing operand or a
//! zero denominator yields `None`; nothing here panics or rounds. These
//! values are recomputed for display on every render and are never
//! written back to the store.

/// Year-over-year percentage change.
///
/// Divides by `previous.abs()` so the sign of the rate tracks the
/// direction of change even when the prior value was negative.
pub fn yoy_rate(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let current = current?;
    let previous = previous?;
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

/// Year-over-year absolute change.
pub fn yoy_diff(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

/// Actual value as a percentage of its target.
pub fn achievement_rate(actual: Option<f64>, target: Option<f64>) -> Option<f64> {
    let actual = actual?;
    let target = target?;
    if target == 0.0 {
        return None;
    }
    Some(actual / target * 100.0)
}

/// One line item as a percentage of total sales.
pub fn sales_ratio(value: Option<f64>, sales_total: Option<f64>) -> Option<f64> {
    let value = value?;
    let total = sales_total?;
    if total == 0.0 {
        return None;
    }
    Some(value / total * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yoy_rate_basic() {
        assert_eq!(yoy_rate(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(yoy_rate(Some(90.0), Some(100.0)), Some(-10.0));
    }

    #[test]
    fn yoy_rate_sign_tracks_direction_with_negative_prior() {
        // -100 -> 50 is an improvement: (50 - (-100)) / 100 = +150%.
        // Dividing by previous instead of abs(previous) would flip it.
        assert_eq!(yoy_rate(Some(50.0), Some(-100.0)), Some(150.0));
        assert_eq!(yoy_rate(Some(-50.0), Some(-100.0)), Some(50.0));
        assert_eq!(yoy_rate(Some(-150.0), Some(-100.0)), Some(-50.0));
    }

    #[test]
    fn yoy_rate_null_propagation() {
        assert_eq!(yoy_rate(None, Some(100.0)), None);
        assert_eq!(yoy_rate(Some(100.0), None), None);
        assert_eq!(yoy_rate(None, None), None);
        assert_eq!(yoy_rate(Some(100.0), Some(0.0)), None);
    }

    #[test]
    fn yoy_diff_basic() {
        assert_eq!(yoy_diff(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(yoy_diff(Some(90.0), Some(100.0)), Some(-10.0));
        assert_eq!(yoy_diff(None, Some(100.0)), None);
        assert_eq!(yoy_diff(Some(100.0), None), None);
    }

    #[test]
    fn achievement_rate_basic() {
        assert_eq!(achievement_rate(Some(80.0), Some(100.0)), Some(80.0));
        assert_eq!(achievement_rate(Some(120.0), Some(100.0)), Some(120.0));
        assert_eq!(achievement_rate(Some(80.0), Some(0.0)), None);
        assert_eq!(achievement_rate(Some(80.0), None), None);
        assert_eq!(achievement_rate(None, Some(100.0)), None);
    }

    #[test]
    fn sales_ratio_basic() {
        assert_eq!(sales_ratio(Some(25.0), Some(100.0)), Some(25.0));
        assert_eq!(sales_ratio(Some(25.0), Some(0.0)), None);
        assert_eq!(sales_ratio(None, Some(100.0)), None);
        assert_eq!(sales_ratio(Some(25.0), None), None);
    }
}
