use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::calendar::{next_period_start, period_end_after};
use crate::config::{CashFlowKind, DebtId, DebtSpec, PlanSnapshot};
use crate::decimal::{Money, Rate};
use crate::events::{Event, EventStore};
use crate::goals::{fund_goals, total_shortfall, GoalAccount};
use crate::minimum::{binding_minimum, regulatory_floor, SURCHARGE_RATE};
use crate::report::{
    DebtHistoryEntry, ExtraPayment, Freedom, MinimumBreakdown, PeriodResult, Projection,
};
use crate::schedule::{ObligationQueue, DRIFT_EPSILON};
use crate::strategy::{allocate, target_index, AllocationTarget};

/// hard cap on simulated cycles (~5 years), bounding runaway cases where
/// interest outpaces payment capacity
pub const MAX_PERIODS: u32 = 120;

/// aggregate debt balance or goal shortfall at or below this counts as settled
pub const PORTFOLIO_EPSILON: Decimal = dec!(5);

/// individual balances under one currency unit snap to exactly zero
const SNAP_THRESHOLD: Decimal = dec!(1);

/// mutable working copy of one debt for the duration of a run
#[derive(Debug, Clone)]
struct DebtAccount {
    id: DebtId,
    name: String,
    balance: Money,
    annual_rate: Rate,
    credit_limit: Option<Money>,
    contractual_min: Money,
    due_day: u32,
    queue: ObligationQueue,
    cleared: bool,
}

impl DebtAccount {
    fn from_spec(spec: &DebtSpec, start: NaiveDate) -> Self {
        let balance = spec.balance();
        let annual_rate = spec.annual_rate();
        let credit_limit = spec.credit_limit();
        let contractual_min = spec.monthly_min();
        let due_day = spec.due_day();

        // seed one obligation from the initial balance; a debt that starts
        // settled never schedules anything
        let queue = if balance.as_decimal() > DRIFT_EPSILON {
            let breakdown = regulatory_floor(balance, annual_rate, credit_limit);
            let monthly_min = binding_minimum(contractual_min, breakdown.floor);
            ObligationQueue::seed(start, due_day, monthly_min, breakdown.floor)
        } else {
            ObligationQueue::new()
        };

        Self {
            id: spec.id,
            name: spec.name.clone(),
            balance,
            annual_rate,
            credit_limit,
            contractual_min,
            due_day,
            queue,
            cleared: false,
        }
    }
}

impl AllocationTarget for DebtAccount {
    fn balance(&self) -> Money {
        self.balance
    }

    fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    fn contractual_min(&self) -> Money {
        self.contractual_min
    }

    fn apply_extra(&mut self, amount: Money) {
        self.balance -= amount;
    }
}

/// per-debt scratch figures for the period being simulated
#[derive(Debug, Clone, Copy, Default)]
struct PeriodTracker {
    starting_balance: Money,
    interest: Money,
    surcharge: Money,
    minimum_paid: Money,
    extra_paid: Money,
    active_at_start: bool,
}

fn total_balance(debts: &[DebtAccount]) -> Money {
    debts.iter().map(|d| d.balance).sum()
}

/// project the snapshot forward, semi-monthly cycle by cycle, until the
/// portfolio is debt-free and goals are met or the horizon cap is reached.
/// the snapshot is never mutated; output is owned by the caller.
pub fn run(snapshot: &PlanSnapshot) -> Projection {
    let mut events = EventStore::new();
    let mut debts: Vec<DebtAccount> = snapshot
        .debts
        .iter()
        .map(|spec| DebtAccount::from_spec(spec, snapshot.start_date))
        .collect();
    let mut goals: Vec<GoalAccount> = snapshot
        .goals
        .iter()
        .map(|spec| GoalAccount {
            id: spec.id,
            name: spec.name.clone(),
            target_amount: spec.target_amount(),
            saved: spec.saved(),
            priority: spec.priority(),
        })
        .collect();

    // at-a-glance label, from the unsimulated initial debts
    let initial_target =
        target_index(snapshot.strategy, &debts).map(|i| debts[i].name.clone());

    let net_income = snapshot.net_income();
    let fixed_outflow = snapshot.fixed_outflow();

    let mut periods: Vec<PeriodResult> = Vec::new();
    let mut histories: BTreeMap<DebtId, Vec<DebtHistoryEntry>> =
        debts.iter().map(|d| (d.id, Vec::new())).collect();
    let mut total_finance_charges = Money::ZERO;
    let mut carry_over = Money::ZERO;
    let mut freedom: Option<u32> = None;

    if total_balance(&debts).as_decimal() <= PORTFOLIO_EPSILON {
        freedom = Some(0); // already debt-free at the start
    }

    let mut cursor = snapshot.start_date;
    let mut window_start = snapshot
        .start_date
        .pred_opt()
        .unwrap_or(snapshot.start_date);

    let mut index: u32 = 0;
    while index < MAX_PERIODS
        && (total_balance(&debts).as_decimal() > PORTFOLIO_EPSILON
            || total_shortfall(&goals).as_decimal() > PORTFOLIO_EPSILON)
    {
        index += 1;
        let period_end = period_end_after(cursor);

        // 1. cash aggregation over the (window_start, period_end] window
        let event_income: Money = snapshot
            .events
            .iter()
            .filter(|e| e.kind == CashFlowKind::Income && e.falls_in(window_start, period_end))
            .map(|e| e.amount())
            .sum();
        let event_expense: Money = snapshot
            .events
            .iter()
            .filter(|e| e.kind == CashFlowKind::Expense && e.falls_in(window_start, period_end))
            .map(|e| e.amount())
            .sum();
        let income = net_income + event_income;
        let expenses = fixed_outflow + event_expense;
        let mut cash = income - expenses + carry_over;
        let cash_before_allocation = cash;

        // 2. interest accrual, unconditionally before any payment
        let mut trackers = vec![PeriodTracker::default(); debts.len()];
        for (i, debt) in debts.iter_mut().enumerate() {
            trackers[i].starting_balance = debt.balance;
            trackers[i].active_at_start = debt.is_active();
            if !trackers[i].active_at_start {
                continue;
            }
            let interest = debt.balance.interest_at(debt.annual_rate.semi_monthly());
            let surcharge = interest * SURCHARGE_RATE;
            debt.balance += interest + surcharge;
            total_finance_charges += interest + surcharge;
            trackers[i].interest = interest;
            trackers[i].surcharge = surcharge;
            events.emit(Event::InterestAccrued {
                debt_id: debt.id,
                period: index,
                interest,
                surcharge,
                new_balance: debt.balance,
            });
        }

        // 3. obligation rollover on post-interest balances
        for debt in debts.iter_mut() {
            while debt.is_active() && debt.queue.wants_roll(period_end) {
                let breakdown =
                    regulatory_floor(debt.balance, debt.annual_rate, debt.credit_limit);
                let monthly_min = binding_minimum(debt.contractual_min, breakdown.floor);
                match debt.queue.roll_forward(debt.due_day, monthly_min, breakdown.floor) {
                    Some(due_date) => events.emit(Event::ObligationScheduled {
                        debt_id: debt.id,
                        period: index,
                        due_date,
                        monthly_min,
                    }),
                    None => break,
                }
            }
        }

        // 4. minimum settlement: most urgent due date first, largest arrears
        // breaking ties; within a debt oldest obligation first
        let mut order: Vec<usize> = (0..debts.len())
            .filter(|&i| debts[i].is_active() && debts[i].queue.has_outstanding())
            .collect();
        order.sort_by(|&a, &b| {
            debts[a]
                .queue
                .earliest_unmet_due()
                .cmp(&debts[b].queue.earliest_unmet_due())
                .then_with(|| {
                    debts[b]
                        .queue
                        .outstanding_total()
                        .cmp(&debts[a].queue.outstanding_total())
                })
        });
        for &i in &order {
            if !cash.is_positive() {
                break;
            }
            let DebtAccount { id, queue, balance, .. } = &mut debts[i];
            let paid = queue.settle_oldest_first(&mut cash, balance);
            if paid.is_positive() {
                trackers[i].minimum_paid = paid;
                events.emit(Event::MinimumPaid {
                    debt_id: *id,
                    period: index,
                    amount: paid,
                });
            }
        }

        // 5. per-debt minimum reporting, never summed across the portfolio
        let minimums: Vec<MinimumBreakdown> = debts
            .iter()
            .enumerate()
            .map(|(i, debt)| MinimumBreakdown {
                debt_id: debt.id,
                debt_name: debt.name.clone(),
                paid: trackers[i].minimum_paid,
                required_through: debt.queue.required_through(period_end),
                still_owed: debt.queue.owed_through(period_end),
                next_unmet_due: debt.queue.earliest_unmet_due(),
            })
            .collect();

        // 6. strategy allocation of whatever cash is left
        let allocation = allocate(snapshot.strategy, cash, &mut debts);
        cash = allocation.leftover;
        let extras: Vec<ExtraPayment> = allocation
            .payments
            .iter()
            .map(|&(i, amount)| {
                trackers[i].extra_paid += amount;
                events.emit(Event::ExtraPaid {
                    debt_id: debts[i].id,
                    period: index,
                    amount,
                });
                ExtraPayment {
                    debt_id: debts[i].id,
                    debt_name: debts[i].name.clone(),
                    amount,
                }
            })
            .collect();

        // 7. snap residual balances to exactly zero
        for debt in debts.iter_mut() {
            if debt.balance.as_decimal() < SNAP_THRESHOLD {
                debt.balance = Money::ZERO;
            }
            if !debt.cleared && !debt.is_active() {
                debt.cleared = true;
                events.emit(Event::DebtCleared {
                    debt_id: debt.id,
                    period: index,
                });
            }
        }

        // 8. goal funding, only once the portfolio is effectively debt-free
        let aggregate = total_balance(&debts);
        let goal_funding = if aggregate.as_decimal() <= PORTFOLIO_EPSILON && cash.is_positive() {
            let (contributions, leftover) = fund_goals(cash, &mut goals);
            cash = leftover;
            for contribution in &contributions {
                let completed = goals
                    .iter()
                    .find(|g| g.id == contribution.goal_id)
                    .is_some_and(GoalAccount::is_met);
                events.emit(Event::GoalFunded {
                    goal_id: contribution.goal_id,
                    period: index,
                    amount: contribution.amount,
                    completed,
                });
            }
            contributions
        } else {
            Vec::new()
        };

        // 9. the pocket: leftover cash rides into the next period
        carry_over = cash;

        // 10. freedom detection, recorded once and never overwritten
        if freedom.is_none() && aggregate.as_decimal() <= PORTFOLIO_EPSILON {
            freedom = Some(index);
            events.emit(Event::FreedomReached { period: index });
        }

        // 11. append output rows and advance the clock
        for (i, debt) in debts.iter().enumerate() {
            let tracker = &trackers[i];
            if !tracker.active_at_start
                && !tracker.minimum_paid.is_positive()
                && !tracker.extra_paid.is_positive()
            {
                continue;
            }
            if let Some(history) = histories.get_mut(&debt.id) {
                history.push(DebtHistoryEntry {
                    period: index,
                    period_end,
                    starting_balance: tracker.starting_balance,
                    interest: tracker.interest,
                    surcharge: tracker.surcharge,
                    minimum_paid: tracker.minimum_paid,
                    extra_paid: tracker.extra_paid,
                    ending_balance: debt.balance,
                });
            }
        }
        periods.push(PeriodResult {
            index,
            period_end,
            income,
            expenses,
            cash_before_allocation,
            minimums,
            extras,
            goal_funding,
            ending_balance: aggregate,
            carry_over,
        });

        window_start = period_end;
        cursor = next_period_start(period_end);
    }

    if freedom.is_none() {
        events.emit(Event::HorizonCapped {
            periods: index,
            remaining_balance: total_balance(&debts),
        });
    }

    Projection {
        periods,
        histories,
        total_finance_charges,
        freedom: freedom.map_or(Freedom::Never, Freedom::At),
        initial_target,
        events: events.take_events(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CashEventSpec, GoalSpec, LineItem};
    use crate::strategy::Strategy;
    use uuid::Uuid;

    fn debt(name: &str, balance: Decimal, rate: Decimal, min: Decimal, due_day: u32) -> DebtSpec {
        DebtSpec {
            id: Uuid::new_v4(),
            name: name.to_string(),
            balance,
            annual_rate: rate,
            credit_limit: None,
            monthly_min: min,
            due_day,
        }
    }

    fn snapshot(debts: Vec<DebtSpec>) -> PlanSnapshot {
        PlanSnapshot {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            gross_income: dec!(9250),
            deductions: vec![LineItem {
                name: "payroll".to_string(),
                amount: dec!(4800),
            }],
            fixed_expenses: vec![LineItem {
                name: "rent".to_string(),
                amount: dec!(672),
            }],
            discretionary: dec!(300),
            strategy: Strategy::Snowball,
            debts,
            goals: Vec::new(),
            events: Vec::new(),
        }
    }

    #[test]
    fn test_empty_portfolio_is_free_at_period_zero() {
        let projection = run(&snapshot(Vec::new()));
        assert_eq!(projection.freedom, Freedom::At(0));
        assert!(projection.periods.is_empty());
        assert_eq!(projection.total_finance_charges, Money::ZERO);
    }

    #[test]
    fn test_single_debt_pays_off_and_records_freedom() {
        let projection = run(&snapshot(vec![debt(
            "Plata",
            dec!(2500),
            dec!(99),
            dec!(400),
            12,
        )]));

        assert!(!projection.freedom.is_never());
        let Freedom::At(period) = projection.freedom else {
            panic!("expected freedom");
        };
        assert!(period >= 1);
        assert_eq!(projection.periods.len() as u32, period);
        assert_eq!(projection.final_balance(), Money::ZERO);
        assert!(projection
            .events
            .iter()
            .any(|e| matches!(e, Event::FreedomReached { .. })));
    }

    #[test]
    fn test_interest_accrues_before_payments() {
        let spec = debt("Visa", dec!(10000), dec!(72), dec!(1500), 18);
        let id = spec.id;
        let projection = run(&snapshot(vec![spec]));

        let first = &projection.history(&id)[0];
        // 10000 * 0.72 / 24 = 300 interest, 48 surcharge
        assert_eq!(first.starting_balance, Money::from_major(10_000));
        assert_eq!(first.interest, Money::from_major(300));
        assert_eq!(first.surcharge, Money::from_major(48));
    }

    #[test]
    fn test_cash_events_land_in_exactly_one_period() {
        let mut snap = snapshot(vec![debt("Visa", dec!(40000), dec!(36), dec!(1500), 18)]);
        snap.events = vec![CashEventSpec {
            name: "aguinaldo".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            amount: dec!(5000),
            kind: CashFlowKind::Income,
        }];

        let projection = run(&snap);
        // march 31 belongs to the second cycle (march 16 - march 31)
        let boosted: Vec<u32> = projection
            .periods
            .iter()
            .filter(|p| p.income > snap.net_income())
            .map(|p| p.index)
            .collect();
        assert_eq!(boosted, vec![2]);
    }

    #[test]
    fn test_carry_over_flows_into_next_period() {
        let projection = run(&snapshot(vec![debt(
            "Plata",
            dec!(2500),
            dec!(99),
            dec!(400),
            12,
        )]));

        // period 1 clears the debt; leftover rides into period 2's cash
        let first = &projection.periods[0];
        if projection.periods.len() > 1 {
            let second = &projection.periods[1];
            assert_eq!(
                second.cash_before_allocation,
                second.income - second.expenses + first.carry_over
            );
        }
    }

    #[test]
    fn test_goal_funding_waits_for_debt_freedom() {
        let mut snap = snapshot(vec![debt("Visa", dec!(9000), dec!(36), dec!(1500), 18)]);
        snap.goals = vec![GoalSpec {
            id: Uuid::new_v4(),
            name: "emergency".to_string(),
            target_amount: dec!(10000),
            saved: dec!(0),
            priority: 1,
        }];

        let projection = run(&snap);
        let Freedom::At(freedom_period) = projection.freedom else {
            panic!("expected convergence");
        };
        for period in &projection.periods {
            if period.index < freedom_period {
                assert!(period.goal_funding.is_empty());
            }
        }
        // goals do get funded afterwards
        assert!(projection
            .periods
            .iter()
            .any(|p| !p.goal_funding.is_empty()));
    }

    #[test]
    fn test_balances_never_negative() {
        let projection = run(&snapshot(vec![
            debt("Didi", dec!(11334.59), dec!(86.5), dec!(1671), 24),
            debt("Visa 40", dec!(14326.18), dec!(72.0), dec!(1500), 18),
            debt("Plata", dec!(2500), dec!(99.0), dec!(400), 12),
        ]));

        for history in projection.histories.values() {
            for entry in history {
                assert!(!entry.ending_balance.is_negative());
                assert!(!entry.starting_balance.is_negative());
            }
        }
    }
}
