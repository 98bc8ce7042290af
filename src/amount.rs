use std::fmt;

/// Fixed-point money with 4 decimal places, stored as a scaled integer.
///
/// Displayed with exactly 2 decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 10_000;

    pub const ZERO: Amount = Amount(0);

    pub fn from_float(value: f64) -> Self {
        Amount((value * Self::SCALE as f64).round() as i64)
    }

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Price of `minutes` at `self` per minute, `None` on overflow.
    pub fn checked_times(self, minutes: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(minutes)).map(Amount)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Sum of `amounts`, `None` on overflow.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Amount>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, Amount::checked_add)
    }

    /// Reduce by `percent` (e.g. `15.0` keeps 85%).
    pub fn discounted(self, percent: f64) -> Self {
        let percent = (percent * Self::SCALE as f64).round() as i128;
        let whole = 100 * Self::SCALE as i128;
        let kept = div_round(self.0 as i128 * (whole - percent), whole);
        Amount(kept as i64)
    }

    /// Mean of `self` over `count` parts, `None` for zero parts.
    pub fn average(self, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(Amount(div_round(self.0 as i128, count as i128) as i64))
    }
}

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round(n: i128, d: i128) -> i128 {
    let q = n / d;
    let r = n % d;
    if r.abs() * 2 >= d { q + n.signum() } else { q }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = div_round(self.0 as i128, (Self::SCALE / 100) as i128);
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scaled_preserves_value() {
        let amount = Amount::from_scaled(123456);
        assert_eq!(amount, Amount(123456));
    }

    #[test]
    fn from_float_converts_correctly() {
        assert_eq!(Amount::from_float(100.0), Amount::from_scaled(1_000_000));
        assert_eq!(Amount::from_float(0.5), Amount::from_scaled(5_000));
        assert_eq!(Amount::from_float(0.0001), Amount::from_scaled(1));
    }

    #[test]
    fn from_float_rounds_correctly() {
        assert_eq!(Amount::from_float(1.23456), Amount::from_scaled(12346));
        assert_eq!(Amount::from_float(1.23454), Amount::from_scaled(12345));
        assert_eq!(Amount::from_float(0.00001), Amount::ZERO);
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Amount::from_float(7.0).to_string(), "7.00");
        assert_eq!(Amount::from_float(0.5).to_string(), "0.50");
        assert_eq!(Amount::from_scaled(0).to_string(), "0.00");
        assert_eq!(Amount::from_float(1234.5).to_string(), "1234.50");
    }

    #[test]
    fn display_rounds_half_away_from_zero() {
        assert_eq!(Amount::from_float(15.305).to_string(), "15.31");
        assert_eq!(Amount::from_float(15.304).to_string(), "15.30");
        assert_eq!(Amount::from_float(-0.005).to_string(), "-0.01");
        assert_eq!(Amount::from_float(0.0049).to_string(), "0.00");
    }

    #[test]
    fn checked_times_multiplies_by_minutes() {
        assert_eq!(
            Amount::from_float(0.5).checked_times(10),
            Some(Amount::from_float(5.0))
        );
        assert_eq!(Amount::from_float(0.4).checked_times(0), Some(Amount::ZERO));
        assert_eq!(
            Amount::from_float(1000.0).checked_times(1440),
            Some(Amount::from_float(1_440_000.0))
        );
    }

    #[test]
    fn checked_times_reports_overflow() {
        assert_eq!(Amount::from_scaled(i64::MAX / 2 + 1).checked_times(2), None);
        assert_eq!(Amount::from_scaled(i64::MAX).checked_times(1440), None);
    }

    #[test]
    fn discounted_keeps_remaining_share() {
        assert_eq!(Amount::from_float(18.0).discounted(15.0), Amount::from_float(15.3));
        assert_eq!(Amount::from_float(2.0).discounted(20.0), Amount::from_float(1.6));
        assert_eq!(Amount::from_float(1.0).discounted(99.0), Amount::from_float(0.01));
        assert_eq!(Amount::from_float(1.0).discounted(12.5), Amount::from_float(0.875));
    }

    #[test]
    fn discounted_rounds_to_scale() {
        // 0.0001 * 0.5 = 0.00005 rounds away from zero
        assert_eq!(Amount::from_scaled(1).discounted(50.0), Amount::from_scaled(1));
        assert_eq!(Amount::from_scaled(3).discounted(90.0), Amount::ZERO);
    }

    #[test]
    fn average_divides_and_rounds() {
        assert_eq!(Amount::from_float(3.0).average(2), Some(Amount::from_float(1.5)));
        assert_eq!(Amount::from_scaled(10).average(3), Some(Amount::from_scaled(3)));
        assert_eq!(Amount::from_scaled(20).average(3), Some(Amount::from_scaled(7)));
        assert_eq!(Amount::from_float(1.0).average(0), None);
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Amount::default(), Amount::ZERO);
        assert!(!Amount::ZERO.is_positive());
    }

    #[test]
    fn checked_add_and_sum() {
        assert_eq!(
            Amount::from_scaled(150).checked_add(Amount::from_scaled(1)),
            Some(Amount::from_scaled(151))
        );

        let total = Amount::checked_sum([1, 2, 3].into_iter().map(Amount::from_scaled));
        assert_eq!(total, Some(Amount::from_scaled(6)));
        assert_eq!(Amount::checked_sum(Vec::new()), Some(Amount::ZERO));
    }

    #[test]
    fn checked_add_and_sum_report_overflow() {
        let max = Amount::from_scaled(i64::MAX);
        assert_eq!(max.checked_add(Amount::from_scaled(1)), None);
        assert_eq!(Amount::checked_sum([max, max]), None);
    }
}
