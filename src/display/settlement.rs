//! Settlement and reminder display formatting

use crate::engine::SettlementSummary;
use crate::notify::DeliveryOutcome;
use crate::services::{BulkReport, ReminderReport, SettlementEntry};

use super::{truncate, MemberNames};

/// Format a group's settlements, pending first
pub fn format_settlement_list(
    entries: &[SettlementEntry],
    names: &MemberNames,
    symbol: &str,
) -> String {
    if entries.is_empty() {
        return "No settlements found.\n".to_string();
    }

    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by_key(|e| e.settlement.is_settled());

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<20}  {:<14}  {:<14}  {:>12}  {}\n",
        "ID", "Expense", "Owed by", "Owed to", "Amount", "Status"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for entry in sorted {
        output.push_str(&format!(
            "{:<12}  {:<20}  {:<14}  {:<14}  {:>12}  {}\n",
            entry.settlement.id.to_string(),
            truncate(&entry.expense_description, 20),
            truncate(&names.get(entry.settlement.participant), 14),
            truncate(&names.get(entry.paid_by), 14),
            entry.settlement.amount.format_with_symbol(symbol),
            entry.settlement.status(),
        ));
    }

    output
}

/// Format pending/settled totals
pub fn format_summary(summary: &SettlementSummary, symbol: &str) -> String {
    format!(
        "  Pending: {:>12}  ({} settlements)\n  Settled: {:>12}  ({} settlements)\n",
        summary.total_pending.format_with_symbol(symbol),
        summary.pending_count,
        summary.total_settled.format_with_symbol(symbol),
        summary.settled_count,
    )
}

/// Format the per-item outcome of a bulk transition
pub fn format_bulk_report(report: &BulkReport) -> String {
    let mut output = String::new();

    for item in &report.items {
        match &item.result {
            Ok(settlement) => output.push_str(&format!(
                "  ✓ {}  {}\n",
                item.settlement_id,
                settlement.status()
            )),
            Err(e) => output.push_str(&format!("  ✗ {}  {}\n", item.settlement_id, e)),
        }
    }

    output.push_str(&format!(
        "{} of {} updated\n",
        report.succeeded(),
        report.items.len()
    ));
    output
}

/// Format the outcome of a reminder run
pub fn format_reminder_report(report: &ReminderReport, symbol: &str) -> String {
    if report.reports.is_empty() {
        return format!("Nobody owes anything in \"{}\".\n", report.group_name);
    }

    let mut output = format!("Reminders for \"{}\":\n", report.group_name);
    for delivery in &report.reports {
        let outcome = match &delivery.outcome {
            DeliveryOutcome::Sent(id) => format!("sent ({})", id),
            DeliveryOutcome::Failed(reason) => format!("failed: {}", reason),
            DeliveryOutcome::SkippedNoContact => "skipped: no WhatsApp number".to_string(),
        };
        output.push_str(&format!(
            "  {:<16}  {:>12}  {}\n",
            truncate(&delivery.member_name, 16),
            delivery.amount_owed.format_with_symbol(symbol),
            outcome
        ));
    }
    output.push_str(&format!(
        "{} of {} reminders sent\n",
        report.sent_count(),
        report.reports.len()
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayupError;
    use crate::models::{ExpenseId, GroupId, MemberId, Money, Settlement, SettlementId};
    use crate::notify::DeliveryReport;
    use crate::services::BulkItem;
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    fn test_summary() {
        let summary = SettlementSummary {
            total_pending: Money::from_major(20),
            total_settled: Money::from_major(60),
            pending_count: 2,
            settled_count: 3,
        };
        let output = format_summary(&summary, "₹");
        assert!(output.contains("₹20.00  (2 settlements)"));
        assert!(output.contains("₹60.00  (3 settlements)"));
    }

    #[test]
    fn test_settlement_list_pending_first() {
        let payer = MemberId::new();
        let mut settled = Settlement::new(MemberId::new(), Money::from_major(10));
        settled.mark_settled(payer, Utc::now());
        let pending = Settlement::new(MemberId::new(), Money::from_major(5));

        let entries: Vec<_> = [settled, pending]
            .into_iter()
            .map(|settlement| SettlementEntry {
                expense_id: ExpenseId::new(),
                expense_description: "Taxi".into(),
                paid_by: payer,
                settlement,
            })
            .collect();

        let output = format_settlement_list(&entries, &MemberNames::default(), "₹");
        let rows: Vec<_> = output.lines().skip(2).collect();
        assert!(rows[0].ends_with("Pending"));
        assert!(rows[1].ends_with("Settled"));
    }

    #[test]
    fn test_bulk_report() {
        let ok = Settlement::new(MemberId::new(), Money::from_major(5));
        let report = BulkReport {
            items: vec![
                BulkItem {
                    settlement_id: ok.id,
                    result: Ok(ok.clone()),
                },
                BulkItem {
                    settlement_id: SettlementId::new(),
                    result: Err(PayupError::settlement_not_found("stl-00000000")),
                },
            ],
        };
        let output = format_bulk_report(&report);
        assert!(output.contains("Settlement not found: stl-00000000"));
        assert!(output.ends_with("1 of 2 updated\n"));
    }

    #[test]
    fn test_reminder_report() {
        let report = ReminderReport {
            group_id: GroupId::new(),
            group_name: "Trip".into(),
            reports: vec![DeliveryReport {
                member_id: MemberId::new(),
                member_name: "Ravi".into(),
                amount_owed: Money::from_cents(3333),
                outcome: DeliveryOutcome::SkippedNoContact,
            }],
            balances: BTreeMap::new(),
        };
        let output = format_reminder_report(&report, "₹");
        assert!(output.contains("₹33.33  skipped: no WhatsApp number"));
        assert!(output.ends_with("0 of 1 reminders sent\n"));
    }
}
