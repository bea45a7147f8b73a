//! Settlement display formatting
//!
//! Formats settlements and computation breakdowns for terminal output.

use std::collections::{BTreeMap, BTreeSet};

use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::config::settings::Settings;
use crate::engine::SettlementBreakdown;
use crate::models::{HouseholdMember, Settlement, UserId, Yen};

/// Resolves user ids to display names, falling back to the short id
#[derive(Debug, Clone, Default)]
pub struct MemberNames {
    names: BTreeMap<UserId, String>,
}

impl MemberNames {
    pub fn new(members: &[HouseholdMember]) -> Self {
        Self {
            names: members
                .iter()
                .map(|m| (m.user_id, m.display_name.clone()))
                .collect(),
        }
    }

    pub fn name(&self, user_id: UserId) -> String {
        self.names
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    }
}

#[derive(Tabled)]
struct SettlementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Lines")]
    lines: usize,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Fair Share")]
    fair_share: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Household")]
    household: String,
    #[tabled(rename = "Personal")]
    personal: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

fn money(amount: Yen, symbol: &str) -> String {
    amount.format_with_symbol(symbol)
}

fn line_table(rows: Vec<LineRow>) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string()
}

/// Format a household's settlements as a table
pub fn format_settlement_list(settlements: &[Settlement], symbol: &str) -> String {
    if settlements.is_empty() {
        return "No settlements found.".to_string();
    }

    let rows: Vec<SettlementRow> = settlements
        .iter()
        .map(|s| SettlementRow {
            id: s.id.as_uuid().to_string(),
            month: s.period(),
            status: s.status.to_string(),
            lines: s.lines.len(),
            total: money(s.total_transferred(), symbol),
        })
        .collect();

    let mut output = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    output.push('\n');
    output
}

/// Format a single settlement with its lines
pub fn format_settlement_details(
    settlement: &Settlement,
    names: &MemberNames,
    settings: &Settings,
) -> String {
    let symbol = settings.currency_symbol.as_str();
    let date_format = settings.date_format.as_str();
    let mut output = String::new();

    output.push_str(&format!("Settlement: {}\n", settlement.period()));
    output.push_str(&format!("  ID:        {}\n", settlement.id.as_uuid()));
    output.push_str(&format!("  Status:    {}\n", settlement.status));
    output.push_str(&format!(
        "  Created:   {}\n",
        settlement.created_at.format(date_format)
    ));
    if let (Some(by), Some(at)) = (settlement.finalized_by, settlement.finalized_at) {
        output.push_str(&format!(
            "  Finalized: {} by {}\n",
            at.format(date_format),
            names.name(by)
        ));
    }
    output.push('\n');

    if settlement.lines.is_empty() {
        output.push_str("Nothing to settle.\n");
    } else {
        let rows = settlement
            .lines
            .iter()
            .map(|l| LineRow {
                from: names.name(l.from_user_id),
                to: names.name(l.to_user_id),
                amount: money(l.amount, symbol),
            })
            .collect();
        output.push_str(&line_table(rows));
        output.push('\n');
    }

    if !settlement.unsettled.is_empty() {
        output.push_str("\nUnsettled (rounding or unassigned cost):\n");
        for residual in &settlement.unsettled {
            output.push_str(&format!(
                "  {}: {}\n",
                names.name(residual.user_id),
                money(residual.amount, symbol)
            ));
        }
    }

    output
}

/// Format every stage of a computation for inspection
pub fn format_breakdown(
    breakdown: &SettlementBreakdown,
    names: &MemberNames,
    symbol: &str,
) -> String {
    let members: BTreeSet<UserId> = breakdown
        .weights
        .keys()
        .chain(breakdown.balances.keys())
        .copied()
        .collect();
    let amount_of = |map: &BTreeMap<UserId, Yen>, user: &UserId| {
        money(map.get(user).copied().unwrap_or_default(), symbol)
    };

    let mut output = String::new();
    output.push_str(&format!(
        "Policy: zero income {:?}, rounding {:?}\n",
        breakdown.policy.apportionment_zero_income, breakdown.policy.rounding
    ));
    output.push_str(&format!(
        "Shared expenses: {}\n\n",
        breakdown.shared_expense_count
    ));

    if members.is_empty() {
        output.push_str("No activity this month.\n");
        return output;
    }

    let rows: Vec<MemberRow> = members
        .iter()
        .map(|user| MemberRow {
            member: names.name(*user),
            weight: breakdown
                .weights
                .get(user)
                .map(|w| format!("{:.2}%", w.as_f64() * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            fair_share: amount_of(&breakdown.fair_shares, user),
            paid: amount_of(&breakdown.paid, user),
            household: amount_of(&breakdown.household_deltas, user),
            personal: amount_of(&breakdown.reimbursements, user),
            balance: amount_of(&breakdown.balances, user),
        })
        .collect();
    output.push_str(
        &Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string(),
    );
    output.push_str("\n\nTransfers:\n");

    if breakdown.transfers().is_empty() {
        output.push_str("  (none)\n");
    } else {
        let rows = breakdown
            .transfers()
            .iter()
            .map(|t| LineRow {
                from: names.name(t.from),
                to: names.name(t.to),
                amount: money(t.amount, symbol),
            })
            .collect();
        output.push_str(&line_table(rows));
        output.push('\n');
    }

    let drift = breakdown.drift();
    if !drift.is_zero() {
        output.push_str(&format!("\nRounding drift: {}\n", money(drift, symbol)));
    }

    output
}
