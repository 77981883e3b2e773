use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::{add_month_clamped, first_due_on_or_after};
use crate::decimal::Money;

/// tolerance under which a balance or obligation remainder counts as settled,
/// absorbing accumulated rounding drift
pub const DRIFT_EPSILON: Decimal = dec!(0.5);

/// runaway guard on the per-debt obligation queue
pub const MAX_OBLIGATIONS: usize = 240;

/// one monthly minimum-payment requirement for one due date of one debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub due_date: NaiveDate,
    /// floor amount owed for this cycle, fixed at creation
    pub monthly_min: Money,
    /// decreases as minimum payments are applied, floor 0
    pub amount_remaining: Money,
    /// regulator reference value at creation, reporting only
    pub regulatory_floor: Money,
}

impl Obligation {
    pub fn new(due_date: NaiveDate, monthly_min: Money, regulatory_floor: Money) -> Self {
        Self {
            due_date,
            monthly_min,
            amount_remaining: monthly_min,
            regulatory_floor,
        }
    }

    /// still carries an unpaid remainder beyond drift tolerance
    pub fn is_outstanding(&self) -> bool {
        self.amount_remaining.as_decimal() > DRIFT_EPSILON
    }
}

/// per-debt queue of monthly obligations, sorted by due date ascending.
/// unpaid entries accumulate across periods, modeling arrears.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationQueue {
    entries: Vec<Obligation>,
}

impl ObligationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// seed the queue at simulation start: one obligation at the first due
    /// date on or after `start`
    pub fn seed(start: NaiveDate, due_day: u32, monthly_min: Money, floor: Money) -> Self {
        let due = first_due_on_or_after(start, due_day);
        Self {
            entries: vec![Obligation::new(due, monthly_min, floor)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Obligation] {
        &self.entries
    }

    pub fn latest_due(&self) -> Option<NaiveDate> {
        self.entries.last().map(|ob| ob.due_date)
    }

    /// whether the simulated clock at `period_end` has passed the latest due
    /// date, so a new obligation must roll forward
    pub fn wants_roll(&self, period_end: NaiveDate) -> bool {
        self.len() < MAX_OBLIGATIONS
            && self.latest_due().is_some_and(|due| due < period_end)
    }

    /// append the next monthly obligation, one clamped month after the
    /// previous due date
    pub fn roll_forward(&mut self, due_day: u32, monthly_min: Money, floor: Money) -> Option<NaiveDate> {
        let prev_due = self.latest_due()?;
        let due = add_month_clamped(prev_due, due_day);
        self.entries.push(Obligation::new(due, monthly_min, floor));
        Some(due)
    }

    /// sum of unpaid remainders across the whole queue
    pub fn outstanding_total(&self) -> Money {
        self.entries.iter().map(|ob| ob.amount_remaining).sum()
    }

    /// earliest due date whose obligation is still outstanding
    pub fn earliest_unmet_due(&self) -> Option<NaiveDate> {
        self.entries
            .iter()
            .find(|ob| ob.is_outstanding())
            .map(|ob| ob.due_date)
    }

    pub fn has_outstanding(&self) -> bool {
        self.entries.iter().any(Obligation::is_outstanding)
    }

    /// cumulative minimum required for all cycles due on or before `date`
    pub fn required_through(&self, date: NaiveDate) -> Money {
        self.entries
            .iter()
            .filter(|ob| ob.due_date <= date)
            .map(|ob| ob.monthly_min)
            .sum()
    }

    /// cumulative unpaid remainder for all cycles due on or before `date`
    pub fn owed_through(&self, date: NaiveDate) -> Money {
        self.entries
            .iter()
            .filter(|ob| ob.due_date <= date)
            .map(|ob| ob.amount_remaining)
            .sum()
    }

    /// settle obligations oldest-due-date-first, drawing from `cash` and
    /// never pushing `balance` below zero. returns the total paid.
    pub fn settle_oldest_first(&mut self, cash: &mut Money, balance: &mut Money) -> Money {
        let mut paid_total = Money::ZERO;
        for ob in &mut self.entries {
            if !ob.is_outstanding() {
                continue;
            }
            let payment = (*cash).min(ob.amount_remaining).min(*balance);
            if !payment.is_positive() {
                break;
            }
            ob.amount_remaining -= payment;
            *cash -= payment;
            *balance -= payment;
            paid_total += payment;
        }
        paid_total
    }
}
