//! Quota calculation.

use crate::config::{ConfigResult, ConfigurationError, QuotaMethod};
use crate::model::Weight;

/// Votes required for a seat, given the valid weight `V` and seat count `S`.
///
/// - Droop: `floor(V / (S + 1)) + 1`, always a whole number of votes.
/// - Hare: `V / S`, exact to the last fixed-point digit.
pub fn calculate(method: QuotaMethod, valid_weight: Weight, seats: u32) -> ConfigResult<Weight> {
    if seats == 0 {
        return Err(ConfigurationError::InvalidSeatCount);
    }
    if valid_weight.is_zero() {
        return Err(ConfigurationError::NoValidVotes);
    }

    let quota = match method {
        QuotaMethod::Droop => {
            let divisor = (u128::from(seats) + 1) * Weight::SCALE;
            let whole = valid_weight.raw() / divisor;
            Weight::from_raw((whole + 1) * Weight::SCALE)
        }
        QuotaMethod::Hare => valid_weight.div_whole(u64::from(seats)),
    };

    Ok(quota)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn droop_single_seat() {
        let quota = calculate(QuotaMethod::Droop, Weight::from_votes(7), 1).unwrap();
        assert_eq!(quota, Weight::from_votes(4));

        let quota = calculate(QuotaMethod::Droop, Weight::from_votes(8), 1).unwrap();
        assert_eq!(quota, Weight::from_votes(5));
    }

    #[test]
    fn droop_multi_seat_floors_fractional_weight() {
        let valid: Weight = "100.75".parse().unwrap();
        let quota = calculate(QuotaMethod::Droop, valid, 3).unwrap();
        assert_eq!(quota, Weight::from_votes(26));
    }

    #[test]
    fn hare_is_exact() {
        let quota = calculate(QuotaMethod::Hare, Weight::from_votes(10), 4).unwrap();
        assert_eq!(quota, "2.5".parse().unwrap());

        let quota = calculate(QuotaMethod::Hare, Weight::from_votes(10), 3).unwrap();
        assert_eq!(quota.raw(), 3_333_333_333);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert_eq!(
            calculate(QuotaMethod::Droop, Weight::from_votes(10), 0),
            Err(ConfigurationError::InvalidSeatCount)
        );
        assert_eq!(
            calculate(QuotaMethod::Hare, Weight::ZERO, 2),
            Err(ConfigurationError::NoValidVotes)
        );
    }
}
