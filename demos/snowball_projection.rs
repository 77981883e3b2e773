//! project a three-card portfolio under the snowball strategy and print the
//! period table plus the freedom horizon.

use payoff_plan_rs::{run, Freedom, PlanSnapshot};

fn main() -> payoff_plan_rs::Result<()> {
    let snapshot = PlanSnapshot::from_json(
        r#"{
            "startDate": "2024-03-01",
            "grossIncome": 9250,
            "deductions": [{"name": "payroll taxes", "amount": 4800}],
            "fixedExpenses": [{"name": "rent", "amount": 672}],
            "discretionary": 300,
            "strategy": "snowball",
            "debts": [
                {"name": "Didi", "balance": 11334.59, "annualRate": 86.5, "monthlyMin": 1671, "dueDay": 24},
                {"name": "Visa 40", "balance": 14326.18, "annualRate": 72.0, "monthlyMin": 1500, "dueDay": 18},
                {"name": "Plata", "balance": 2500, "annualRate": 99.0, "monthlyMin": 400, "dueDay": 12}
            ],
            "goals": [
                {"name": "emergency fund", "targetAmount": 20000, "priority": 1}
            ]
        }"#,
    )?;

    let projection = run(&snapshot);

    println!("target: {}", projection.initial_target.as_deref().unwrap_or("-"));
    println!("{:<4} {:>12} {:>12} {:>12} {:>12}", "per", "end", "cash", "balance", "pocket");
    for period in &projection.periods {
        println!(
            "{:<4} {:>12} {:>12} {:>12} {:>12}",
            period.index,
            period.period_end.to_string(),
            period.cash_before_allocation.to_string(),
            period.ending_balance.to_string(),
            period.carry_over.to_string(),
        );
    }

    match projection.freedom {
        Freedom::At(period) => println!("debt-free at period {period}"),
        Freedom::Never => println!("never debt-free within the horizon"),
    }
    println!("finance charges: {}", projection.total_finance_charges);

    Ok(())
}
