use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Coin, Decimal, StdError, StdResult, Uint128};

/// The result of charging the forwarding fee on an amount.
///
/// `fee + net` always equals the amount the split was computed from.
#[cw_serde]
#[derive(Eq, Copy)]
pub struct FeeSplit {
    pub fee: Uint128,
    pub net: Uint128,
}

impl FeeSplit {
    pub fn fee_coin(&self, denom: &str) -> Coin {
        Coin::new(self.fee, denom)
    }

    pub fn net_coin(&self, denom: &str) -> Coin {
        Coin::new(self.net, denom)
    }
}

/// Splits `amount` into the fee owed at `fee_percentage` and the net amount
/// that is forwarded.
///
/// The fee is rounded down, the net amount is whatever remains. The rate is
/// expected to be validated already (see [`crate::Params::validate`]); a rate
/// of 1 or more is reported as an error rather than producing a fee larger
/// than the amount.
pub fn compute_fee(amount: Uint128, fee_percentage: Decimal) -> StdResult<FeeSplit> {
    if fee_percentage >= Decimal::one() {
        return Err(StdError::generic_err(format!(
            "fee percentage {fee_percentage} is not below 1"
        )));
    }
    let fee = amount
        .checked_mul_floor(fee_percentage)
        .map_err(|e| StdError::generic_err(e.to_string()))?;
    let net = amount.checked_sub(fee)?;
    Ok(FeeSplit { fee, net })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn one_percent_of_thousand() {
        let split = compute_fee(Uint128::new(1000), Decimal::percent(1)).unwrap();
        assert_eq!(split.fee, Uint128::new(10));
        assert_eq!(split.net, Uint128::new(990));
    }

    #[test]
    fn fee_rounds_down() {
        // 0.25% of 999 is 2.4975
        let rate = Decimal::from_str("0.0025").unwrap();
        let split = compute_fee(Uint128::new(999), rate).unwrap();
        assert_eq!(split.fee, Uint128::new(2));
        assert_eq!(split.net, Uint128::new(997));

        // anything below one unit is no fee at all
        let split = compute_fee(Uint128::new(99), Decimal::percent(1)).unwrap();
        assert_eq!(split.fee, Uint128::zero());
        assert_eq!(split.net, Uint128::new(99));
    }

    #[test]
    fn zero_rate_and_zero_amount() {
        let split = compute_fee(Uint128::new(1234), Decimal::zero()).unwrap();
        assert_eq!(split.fee, Uint128::zero());
        assert_eq!(split.net, Uint128::new(1234));

        let split = compute_fee(Uint128::zero(), Decimal::percent(50)).unwrap();
        assert_eq!(split.fee, Uint128::zero());
        assert_eq!(split.net, Uint128::zero());
    }

    #[test]
    fn works_at_the_top_of_the_range() {
        let rate = Decimal::from_str("0.999999999999999999").unwrap();
        let split = compute_fee(Uint128::MAX, rate).unwrap();
        assert_eq!(split.fee + split.net, Uint128::MAX);
        assert!(split.fee < Uint128::MAX);
    }

    #[test]
    fn rejects_rate_of_one() {
        compute_fee(Uint128::new(10), Decimal::one()).unwrap_err();
        compute_fee(Uint128::new(10), Decimal::percent(150)).unwrap_err();
    }

    #[test]
    fn coins_carry_denom() {
        let split = compute_fee(Uint128::new(1000), Decimal::percent(1)).unwrap();
        assert_eq!(split.fee_coin("uatom"), Coin::new(10u128, "uatom"));
        assert_eq!(split.net_coin("uatom"), Coin::new(990u128, "uatom"));
    }

    proptest! {
        #[test]
        fn fee_and_net_add_up(amount in any::<u128>(), atomics in 0u128..1_000_000_000_000_000_000u128) {
            let rate = Decimal::new(Uint128::new(atomics));
            let split = compute_fee(Uint128::new(amount), rate).unwrap();
            prop_assert_eq!(split.fee + split.net, Uint128::new(amount));
            prop_assert!(split.fee <= Uint128::new(amount));
        }
    }
}
