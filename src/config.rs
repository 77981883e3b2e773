use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::goals::GoalId;
use crate::strategy::Strategy;

/// unique identifier for a debt, stable across edits
pub type DebtId = Uuid;

/// due day assumed when the input omits one or gives an out-of-range value
pub const DEFAULT_DUE_DAY: u32 = 25;

/// immutable input snapshot for one projection run. the engine deep-copies
/// the mutable working state from it and never writes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub gross_income: Decimal,
    #[serde(default)]
    pub deductions: Vec<LineItem>,
    #[serde(default)]
    pub fixed_expenses: Vec<LineItem>,
    #[serde(default)]
    pub discretionary: Decimal,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub debts: Vec<DebtSpec>,
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
    #[serde(default)]
    pub events: Vec<CashEventSpec>,
}

impl PlanSnapshot {
    /// parse a snapshot from the json handed over by the storage collaborator
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: PlanSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// structural checks ingestion cannot coerce away
    pub fn validate(&self) -> Result<()> {
        let mut debt_ids: Vec<DebtId> = self.debts.iter().map(|d| d.id).collect();
        debt_ids.sort();
        if let Some(dup) = debt_ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(EngineError::DuplicateDebtId { id: dup[0] });
        }
        let mut goal_ids: Vec<GoalId> = self.goals.iter().map(|g| g.id).collect();
        goal_ids.sort();
        if let Some(dup) = goal_ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(EngineError::DuplicateGoalId { id: dup[0] });
        }
        Ok(())
    }

    /// net salary per semi-monthly cycle: gross minus all deductions
    pub fn net_income(&self) -> Money {
        let deducted: Money = self
            .deductions
            .iter()
            .map(|item| item.amount().or_zero())
            .sum();
        (Money::from_decimal(self.gross_income).or_zero() - deducted).or_zero()
    }

    /// fixed expenses plus discretionary allowance per cycle
    pub fn fixed_outflow(&self) -> Money {
        let fixed: Money = self
            .fixed_expenses
            .iter()
            .map(|item| item.amount().or_zero())
            .sum();
        fixed + Money::from_decimal(self.discretionary).or_zero()
    }
}

/// named amount: a payroll deduction or a fixed expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Decimal,
}

impl LineItem {
    pub fn amount(&self) -> Money {
        Money::from_decimal(self.amount)
    }
}

/// one revolving balance as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSpec {
    #[serde(default = "Uuid::new_v4")]
    pub id: DebtId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub balance: Decimal,
    /// annual rate in percent (e.g. 86.5)
    #[serde(default)]
    pub annual_rate: Decimal,
    /// null when the user doesn't know the limit
    #[serde(default)]
    pub credit_limit: Option<Decimal>,
    /// user-entered contractual minimum, 0 if unknown
    #[serde(default)]
    pub monthly_min: Decimal,
    #[serde(default = "default_due_day")]
    pub due_day: u32,
}

impl DebtSpec {
    pub fn balance(&self) -> Money {
        Money::from_decimal(self.balance).or_zero()
    }

    pub fn annual_rate(&self) -> Rate {
        Rate::from_percentage(self.annual_rate).or_zero()
    }

    pub fn credit_limit(&self) -> Option<Money> {
        self.credit_limit.map(|limit| Money::from_decimal(limit).or_zero())
    }

    pub fn monthly_min(&self) -> Money {
        Money::from_decimal(self.monthly_min).or_zero()
    }

    /// due day coerced into 1-31; out-of-range values fall back to the default
    pub fn due_day(&self) -> u32 {
        if (1..=31).contains(&self.due_day) {
            self.due_day
        } else {
            DEFAULT_DUE_DAY
        }
    }
}

fn default_due_day() -> u32 {
    DEFAULT_DUE_DAY
}

/// one savings goal as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSpec {
    #[serde(default = "Uuid::new_v4")]
    pub id: GoalId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target_amount: Decimal,
    #[serde(default)]
    pub saved: Decimal,
    #[serde(default = "default_priority")]
    pub priority: u32,
}

impl GoalSpec {
    pub fn target_amount(&self) -> Money {
        Money::from_decimal(self.target_amount).or_zero()
    }

    pub fn saved(&self) -> Money {
        Money::from_decimal(self.saved).or_zero()
    }

    pub fn priority(&self) -> u32 {
        self.priority.max(1)
    }
}

fn default_priority() -> u32 {
    1
}

/// one-off income or expense landing in exactly one period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashEventSpec {
    #[serde(default)]
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: CashFlowKind,
}

impl CashEventSpec {
    pub fn amount(&self) -> Money {
        Money::from_decimal(self.amount).or_zero()
    }

    /// window is exclusive below, inclusive above
    pub fn falls_in(&self, window_start_exclusive: NaiveDate, window_end_inclusive: NaiveDate) -> bool {
        self.date > window_start_exclusive && self.date <= window_end_inclusive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowKind {
    Income,
    Expense,
}
