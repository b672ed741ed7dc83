//! Expense display formatting

use crate::models::Expense;

use super::{truncate, MemberNames};

/// Format a single expense as a register row
pub fn format_expense_row(expense: &Expense, names: &MemberNames, symbol: &str) -> String {
    let pending = expense.settlements.iter().filter(|s| !s.is_settled()).count();
    let status = if expense.settlements.is_empty() {
        "-".to_string()
    } else if pending == 0 {
        "✓".to_string()
    } else {
        format!("{}/{}", pending, expense.settlements.len())
    };

    format!(
        "{:<12}  {}  {:<24}  {:>12}  {:<14}  {}",
        expense.id.to_string(),
        expense.created_at.format("%Y-%m-%d"),
        truncate(&expense.description, 24),
        expense.amount.format_with_symbol(symbol),
        truncate(&names.get(expense.paid_by), 14),
        status
    )
}

/// Format a list of expenses as a register
pub fn format_expense_register(expenses: &[Expense], names: &MemberNames, symbol: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<10}  {:<24}  {:>12}  {:<14}  {}\n",
        "ID", "Date", "Description", "Amount", "Paid by", "Pending"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for expense in expenses {
        output.push_str(&format_expense_row(expense, names, symbol));
        output.push('\n');
    }

    output
}

/// Format an expense with its settlements
pub fn format_expense_details(expense: &Expense, names: &MemberNames, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:      {}\n", expense.id));
    output.push_str(&format!("Description:  {}\n", expense.description));
    output.push_str(&format!(
        "Amount:       {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Paid by:      {}\n", names.get(expense.paid_by)));
    output.push_str(&format!(
        "Date:         {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M")
    ));

    let participants: Vec<_> = expense.participants.iter().map(|&p| names.get(p)).collect();
    output.push_str(&format!("Split among:  {}\n", participants.join(", ")));

    if let Some(share) = expense.share() {
        output.push_str(&format!("Share:        {}\n", share.format_with_symbol(symbol)));
    }

    if expense.settlements.is_empty() {
        output.push_str("\nNo settlements (payer covered the whole expense).\n");
        return output;
    }

    output.push_str("\nSettlements:\n");
    for settlement in &expense.settlements {
        let detail = match (settlement.settled_by, settlement.settled_at) {
            (Some(by), Some(at)) => format!(" by {} on {}", names.get(by), at.format("%Y-%m-%d")),
            _ => String::new(),
        };
        output.push_str(&format!(
            "  {}  {:<14}  {:>12}  {}{}\n",
            settlement.id,
            truncate(&names.get(settlement.participant), 14),
            settlement.amount.format_with_symbol(symbol),
            settlement.status(),
            detail
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::create_settlements_for_expense;
    use crate::models::{GroupId, Member, Money};
    use chrono::Utc;

    #[test]
    fn test_register_and_details() {
        let asha = Member::new("Asha", "asha@example.com", "");
        let ravi = Member::new("Ravi", "ravi@example.com", "");
        let names = MemberNames::from_members([&asha, &ravi]);

        let mut expense = Expense::new(
            GroupId::new(),
            "Dinner",
            Money::from_major(90),
            asha.id,
            &[asha.id, ravi.id],
        );
        expense.settlements = create_settlements_for_expense(&expense);

        let register = format_expense_register(&[expense.clone()], &names, "₹");
        assert!(register.contains("Dinner"));
        assert!(register.contains("₹90.00"));
        assert!(register.lines().nth(2).unwrap().ends_with("1/1"));

        expense.settlements[0].mark_settled(asha.id, Utc::now());
        let details = format_expense_details(&expense, &names, "₹");
        assert!(details.contains("Split among:  Asha, Ravi"));
        assert!(details.contains("Share:        ₹45.00"));
        assert!(details.contains("Settled by Asha"));
    }

    #[test]
    fn test_empty_register() {
        assert_eq!(
            format_expense_register(&[], &MemberNames::default(), "₹"),
            "No expenses found.\n"
        );
    }
}
