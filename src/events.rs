use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::config::DebtId;
use crate::goals::GoalId;

/// all events the engine can emit while a projection runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    InterestAccrued {
        debt_id: DebtId,
        period: u32,
        interest: Money,
        surcharge: Money,
        new_balance: Money,
    },
    ObligationScheduled {
        debt_id: DebtId,
        period: u32,
        due_date: NaiveDate,
        monthly_min: Money,
    },
    MinimumPaid {
        debt_id: DebtId,
        period: u32,
        amount: Money,
    },
    ExtraPaid {
        debt_id: DebtId,
        period: u32,
        amount: Money,
    },
    DebtCleared {
        debt_id: DebtId,
        period: u32,
    },
    GoalFunded {
        goal_id: GoalId,
        period: u32,
        amount: Money,
        completed: bool,
    },
    FreedomReached {
        period: u32,
    },
    HorizonCapped {
        periods: u32,
        remaining_balance: Money,
    },
}

/// event store for collecting events during a run
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
