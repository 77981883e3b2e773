use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::decimal::{Money, Rate};
use crate::schedule::DRIFT_EPSILON;

/// ordering policy for surplus cash across active balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum Strategy {
    /// smallest balance first
    Snowball,
    /// highest annual rate first
    Avalanche,
    /// largest contractual monthly minimum first
    HighMin,
    /// largest balance first, intentionally sub-optimal, kept for comparison
    ReverseSnowball,
    /// pro-rata split by share of total active balance
    Flat,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Avalanche
    }
}

impl FromStr for Strategy {
    type Err = std::convert::Infallible;

    /// unrecognized selectors fall back to avalanche
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "snowball" => Strategy::Snowball,
            "avalanche" => Strategy::Avalanche,
            "highMin" => Strategy::HighMin,
            "reverseSnowball" => Strategy::ReverseSnowball,
            "flat" => Strategy::Flat,
            _ => Strategy::Avalanche,
        })
    }
}

impl From<String> for Strategy {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// a debt as seen by the allocation pass
pub trait AllocationTarget {
    fn balance(&self) -> Money;
    fn annual_rate(&self) -> Rate;
    fn contractual_min(&self) -> Money;
    fn apply_extra(&mut self, amount: Money);

    /// carries a balance beyond drift tolerance
    fn is_active(&self) -> bool {
        self.balance().as_decimal() > DRIFT_EPSILON
    }
}

/// outcome of one allocation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// (debt index, amount) in the order payments were made
    pub payments: Vec<(usize, Money)>,
    /// cash left after exhausting all active debts, returned for goal funding
    pub leftover: Money,
}

/// distribute `pool` across active debts according to `strategy`
pub fn allocate<T: AllocationTarget>(strategy: Strategy, pool: Money, debts: &mut [T]) -> Allocation {
    let mut payments = Vec::new();
    let mut remaining = pool;
    if !remaining.is_positive() {
        return Allocation { payments, leftover: remaining };
    }

    match strategy {
        Strategy::Flat => {
            // shares computed once against the pre-distribution pool and
            // balances; remainders from mid-distribution payoffs stay unspent
            let active: Vec<usize> = (0..debts.len()).filter(|&i| debts[i].is_active()).collect();
            let total: Money = active.iter().map(|&i| debts[i].balance()).sum();
            if !total.is_positive() {
                return Allocation { payments, leftover: remaining };
            }
            for &i in &active {
                let share = Money::from_decimal(
                    pool.as_decimal() * debts[i].balance().as_decimal() / total.as_decimal(),
                );
                let payment = share.min(debts[i].balance()).min(remaining);
                if payment.is_positive() {
                    debts[i].apply_extra(payment);
                    remaining -= payment;
                    payments.push((i, payment));
                }
            }
        }
        _ => {
            for i in ordered_active(strategy, debts) {
                if !remaining.is_positive() {
                    break;
                }
                let payment = remaining.min(debts[i].balance());
                if payment.is_positive() {
                    debts[i].apply_extra(payment);
                    remaining -= payment;
                    payments.push((i, payment));
                }
            }
        }
    }

    Allocation { payments, leftover: remaining }
}

/// the single at-a-glance target debt under a strategy, or none when the
/// strategy has no single-target ordering (flat)
pub fn target_index<T: AllocationTarget>(strategy: Strategy, debts: &[T]) -> Option<usize> {
    if strategy == Strategy::Flat {
        return None;
    }
    ordered_active(strategy, debts).into_iter().next()
}

/// active debt indices in strategy payment order; stable on ties
fn ordered_active<T: AllocationTarget>(strategy: Strategy, debts: &[T]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..debts.len()).filter(|&i| debts[i].is_active()).collect();
    match strategy {
        Strategy::Snowball => indices.sort_by_key(|&i| debts[i].balance()),
        Strategy::Avalanche => {
            indices.sort_by(|&a, &b| debts[b].annual_rate().cmp(&debts[a].annual_rate()))
        }
        Strategy::HighMin => {
            indices.sort_by(|&a, &b| debts[b].contractual_min().cmp(&debts[a].contractual_min()))
        }
        Strategy::ReverseSnowball => {
            indices.sort_by(|&a, &b| debts[b].balance().cmp(&debts[a].balance()))
        }
        Strategy::Flat => {}
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone)]
    struct TestDebt {
        balance: Money,
        rate: Rate,
        min: Money,
    }

    impl TestDebt {
        fn new(balance: i64, rate_pct: i64, min: i64) -> Self {
            Self {
                balance: Money::from_major(balance),
                rate: Rate::from_percentage(rate_pct.into()),
                min: Money::from_major(min),
            }
        }
    }

    impl AllocationTarget for TestDebt {
        fn balance(&self) -> Money {
            self.balance
        }
        fn annual_rate(&self) -> Rate {
            self.rate
        }
        fn contractual_min(&self) -> Money {
            self.min
        }
        fn apply_extra(&mut self, amount: Money) {
            self.balance -= amount;
        }
    }

    fn portfolio() -> Vec<TestDebt> {
        vec![
            TestDebt::new(11_334, 86, 1671),
            TestDebt::new(14_326, 72, 1500),
            TestDebt::new(2_500, 99, 400),
        ]
    }

    #[test]
    fn test_selector_fallback() {
        assert_eq!("snowball".parse::<Strategy>().unwrap(), Strategy::Snowball);
        assert_eq!("highMin".parse::<Strategy>().unwrap(), Strategy::HighMin);
        assert_eq!("nonsense".parse::<Strategy>().unwrap(), Strategy::Avalanche);
        assert_eq!(Strategy::from(String::from("flat")), Strategy::Flat);
    }

    #[test]
    fn test_snowball_targets_smallest_balance_first() {
        let mut debts = portfolio();
        let allocation = allocate(Strategy::Snowball, Money::from_major(3000), &mut debts);

        assert_eq!(allocation.payments[0], (2, Money::from_major(2500)));
        assert_eq!(allocation.payments[1], (0, Money::from_major(500)));
        assert_eq!(allocation.leftover, Money::ZERO);
        assert_eq!(debts[2].balance, Money::ZERO);
    }

    #[test]
    fn test_avalanche_targets_highest_rate_first() {
        let debts = portfolio();
        assert_eq!(target_index(Strategy::Avalanche, &debts), Some(2)); // 99%
        assert_eq!(target_index(Strategy::Snowball, &debts), Some(2)); // smallest
        assert_eq!(target_index(Strategy::HighMin, &debts), Some(0)); // 1671
        assert_eq!(target_index(Strategy::ReverseSnowball, &debts), Some(1)); // largest
        assert_eq!(target_index(Strategy::Flat, &debts), None);
    }

    #[test]
    fn test_sequential_leftover_after_all_debts_cleared() {
        let mut debts = vec![TestDebt::new(100, 50, 10), TestDebt::new(200, 40, 20)];
        let allocation = allocate(Strategy::Avalanche, Money::from_major(1000), &mut debts);

        assert_eq!(allocation.leftover, Money::from_major(700));
        assert!(debts.iter().all(|d| d.balance.is_zero()));
    }

    #[test]
    fn test_flat_splits_pro_rata_capped_at_balance() {
        let mut debts = vec![
            TestDebt::new(7_500, 50, 100),
            TestDebt::new(2_500, 40, 100),
        ];
        let allocation = allocate(Strategy::Flat, Money::from_major(1000), &mut debts);

        // shares: 75% and 25% of the pool
        assert_eq!(allocation.payments[0], (0, Money::from_major(750)));
        assert_eq!(allocation.payments[1], (1, Money::from_major(250)));
        assert_eq!(allocation.leftover, Money::ZERO);
    }

    #[test]
    fn test_flat_leaves_remainder_when_share_exceeds_balance() {
        let mut debts = vec![
            TestDebt::new(100, 50, 10),
            TestDebt::new(100, 40, 10),
        ];
        let allocation = allocate(Strategy::Flat, Money::from_major(1000), &mut debts);

        // each share is 500 but capped at the 100 balance; the rest stays unspent
        assert_eq!(allocation.payments[0].1, Money::from_major(100));
        assert_eq!(allocation.payments[1].1, Money::from_major(100));
        assert_eq!(allocation.leftover, Money::from_major(800));
    }

    #[test]
    fn test_inactive_debts_are_skipped() {
        let mut debts = vec![
            TestDebt {
                balance: Money::from_decimal(dec!(0.40)), // under drift tolerance
                rate: Rate::from_percentage(dec!(99)),
                min: Money::from_major(100),
            },
            TestDebt::new(500, 10, 50),
        ];
        let allocation = allocate(Strategy::Avalanche, Money::from_major(100), &mut debts);
        assert_eq!(allocation.payments, vec![(1, Money::from_major(100))]);
    }
}
