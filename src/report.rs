use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::DebtId;
use crate::decimal::Money;
use crate::events::Event;
use crate::goals::GoalContribution;

/// per-debt minimum-payment breakdown for one period, reported per debt so a
/// caller can flag specific cards at risk of delinquency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumBreakdown {
    pub debt_id: DebtId,
    pub debt_name: String,
    /// minimum paid this period
    pub paid: Money,
    /// cumulative minimum required for cycles due by this period's end
    pub required_through: Money,
    /// cumulative remainder still unpaid from those cycles (arrears)
    pub still_owed: Money,
    pub next_unmet_due: Option<NaiveDate>,
}

/// one strategy-extra payment to one debt in one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub debt_id: DebtId,
    pub debt_name: String,
    pub amount: Money,
}

/// full breakdown of one semi-monthly cycle, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodResult {
    /// 1-based iteration index
    pub index: u32,
    pub period_end: NaiveDate,
    pub income: Money,
    pub expenses: Money,
    /// cash on hand before any payment, carry-over included
    pub cash_before_allocation: Money,
    pub minimums: Vec<MinimumBreakdown>,
    pub extras: Vec<ExtraPayment>,
    pub goal_funding: Vec<GoalContribution>,
    /// aggregate debt balance after all payments and cleanup
    pub ending_balance: Money,
    /// leftover cash carried into the next period
    pub carry_over: Money,
}

/// what happened to one balance in one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtHistoryEntry {
    pub period: u32,
    pub period_end: NaiveDate,
    pub starting_balance: Money,
    pub interest: Money,
    pub surcharge: Money,
    pub minimum_paid: Money,
    pub extra_paid: Money,
    pub ending_balance: Money,
}

/// the debt-freedom horizon outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freedom {
    /// first period at which aggregate balance is effectively zero
    /// (0 when the snapshot was already debt-free)
    At(u32),
    /// iteration cap reached while balance remained: interest structurally
    /// exceeds payment capacity
    Never,
}

impl Freedom {
    pub fn is_never(&self) -> bool {
        matches!(self, Freedom::Never)
    }
}

/// complete output of one projection run, owned by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub periods: Vec<PeriodResult>,
    pub histories: BTreeMap<DebtId, Vec<DebtHistoryEntry>>,
    /// interest plus surcharge accrued across the whole run
    pub total_finance_charges: Money,
    pub freedom: Freedom,
    /// at-a-glance target under the active strategy, computed from the
    /// unsimulated initial debts; none for strategies with no single target
    pub initial_target: Option<String>,
    pub events: Vec<Event>,
}

impl Projection {
    pub fn history(&self, debt_id: &DebtId) -> &[DebtHistoryEntry] {
        self.histories.get(debt_id).map_or(&[], Vec::as_slice)
    }

    pub fn final_balance(&self) -> Money {
        self.periods.last().map_or(Money::ZERO, |p| p.ending_balance)
    }
}
