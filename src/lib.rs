pub mod calendar;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod goals;
pub mod minimum;
pub mod report;
pub mod schedule;
pub mod strategy;

// re-export key types
pub use config::{CashEventSpec, CashFlowKind, DebtId, DebtSpec, GoalSpec, LineItem, PlanSnapshot};
pub use decimal::{Money, Rate};
pub use engine::{run, MAX_PERIODS, PORTFOLIO_EPSILON};
pub use errors::{EngineError, Result};
pub use events::{Event, EventStore};
pub use goals::{GoalAccount, GoalContribution, GoalId};
pub use minimum::{binding_minimum, regulatory_floor, FloorBreakdown, SURCHARGE_RATE};
pub use report::{
    DebtHistoryEntry, ExtraPayment, Freedom, MinimumBreakdown, PeriodResult, Projection,
};
pub use schedule::{Obligation, ObligationQueue, DRIFT_EPSILON, MAX_OBLIGATIONS};
pub use strategy::{allocate, target_index, AllocationTarget, Strategy};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
