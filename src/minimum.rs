use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// VAT-style surcharge applied on top of every interest charge (fixed domain constant)
pub const SURCHARGE_RATE: Decimal = dec!(0.16);

/// percentage-of-balance component of the regulatory reference minimum
const BALANCE_FACTOR: Decimal = dec!(0.015);

/// percentage-of-credit-limit alternative of the regulatory reference minimum
const LIMIT_FACTOR: Decimal = dec!(0.0125);

/// regulator-style reference minimum payment for one monthly cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FloorBreakdown {
    pub monthly_interest: Money,
    pub surcharge: Money,
    pub option_a: Money,
    pub option_b: Money,
    pub floor: Money,
}

/// approximate the statutory minimum-payment reference for a balance/rate/limit triple.
/// advisory only; the binding obligation minimum is [`binding_minimum`].
pub fn regulatory_floor(balance: Money, annual_rate: Rate, credit_limit: Option<Money>) -> FloorBreakdown {
    if !balance.is_positive() || !annual_rate.is_positive() {
        return FloorBreakdown::default();
    }

    let monthly_interest = balance.interest_at(annual_rate.monthly());
    let surcharge = monthly_interest * SURCHARGE_RATE;
    let option_a = balance * BALANCE_FACTOR + monthly_interest + surcharge;
    let option_b = credit_limit.map_or(Money::ZERO, |limit| limit * LIMIT_FACTOR);

    // the floor never exceeds what is actually owed this cycle
    let owed_cap = balance + monthly_interest + surcharge;
    let floor = option_a.max(option_b).min(owed_cap);

    FloorBreakdown {
        monthly_interest,
        surcharge,
        option_a,
        option_b,
        floor,
    }
}

/// binding minimum for an obligation: never under-report a statutory minimum,
/// but never invent one the user didn't have when no floor applies
pub fn binding_minimum(user_min: Money, floor: Money) -> Money {
    if user_min.is_positive() {
        user_min.max(floor)
    } else {
        floor
    }
}
