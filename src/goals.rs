use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

pub type GoalId = Uuid;

/// working copy of one savings goal for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAccount {
    pub id: GoalId,
    pub name: String,
    pub target_amount: Money,
    pub saved: Money,
    /// lower funds first; ties broken by declaration order
    pub priority: u32,
}

impl GoalAccount {
    pub fn shortfall(&self) -> Money {
        (self.target_amount - self.saved).or_zero()
    }

    pub fn is_met(&self) -> bool {
        !self.shortfall().is_positive()
    }
}

/// one period's contribution to one goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalContribution {
    pub goal_id: GoalId,
    pub goal_name: String,
    pub amount: Money,
    pub saved_after: Money,
}

/// feed residual cash into goals by priority ascending, each funded up to its
/// remaining shortfall, until cash or shortfalls are exhausted. returns the
/// contributions made and the cash left over.
pub fn fund_goals(cash: Money, goals: &mut [GoalAccount]) -> (Vec<GoalContribution>, Money) {
    let mut remaining = cash;
    let mut contributions = Vec::new();

    let mut order: Vec<usize> = (0..goals.len()).collect();
    order.sort_by_key(|&i| goals[i].priority); // stable: declaration order breaks ties

    for i in order {
        if !remaining.is_positive() {
            break;
        }
        let goal = &mut goals[i];
        let contribution = remaining.min(goal.shortfall());
        if contribution.is_positive() {
            goal.saved += contribution;
            remaining -= contribution;
            contributions.push(GoalContribution {
                goal_id: goal.id,
                goal_name: goal.name.clone(),
                amount: contribution,
                saved_after: goal.saved,
            });
        }
    }

    (contributions, remaining)
}

/// total unmet shortfall across all goals
pub fn total_shortfall(goals: &[GoalAccount]) -> Money {
    goals.iter().map(GoalAccount::shortfall).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(name: &str, target: i64, saved: i64, priority: u32) -> GoalAccount {
        GoalAccount {
            id: Uuid::new_v4(),
            name: name.to_string(),
            target_amount: Money::from_major(target),
            saved: Money::from_major(saved),
            priority,
        }
    }

    #[test]
    fn test_funds_by_priority_then_declaration_order() {
        let mut goals = vec![
            goal("vacation", 1000, 0, 2),
            goal("emergency", 2000, 500, 1),
            goal("laptop", 800, 0, 2),
        ];

        let (contributions, leftover) = fund_goals(Money::from_major(2000), &mut goals);

        // emergency shortfall 1500 first, then vacation (declared before laptop)
        assert_eq!(contributions[0].goal_name, "emergency");
        assert_eq!(contributions[0].amount, Money::from_major(1500));
        assert_eq!(contributions[1].goal_name, "vacation");
        assert_eq!(contributions[1].amount, Money::from_major(500));
        assert_eq!(contributions.len(), 2);
        assert_eq!(leftover, Money::ZERO);
    }

    #[test]
    fn test_leftover_when_all_goals_met() {
        let mut goals = vec![goal("emergency", 1000, 0, 1)];
        let (contributions, leftover) = fund_goals(Money::from_major(1500), &mut goals);

        assert_eq!(contributions[0].amount, Money::from_major(1000));
        assert!(goals[0].is_met());
        assert_eq!(leftover, Money::from_major(500));
    }

    #[test]
    fn test_total_shortfall() {
        let goals = vec![goal("a", 1000, 400, 1), goal("b", 500, 600, 2)];
        // over-saved goal contributes zero, never negative
        assert_eq!(total_shortfall(&goals), Money::from_major(600));
    }
}
