//! Plain-text rendering of command responses for the shell.

use duka_core::Sale;

use crate::commands::assistant::AssistantReply;
use crate::commands::draft::DraftResponse;
use crate::commands::sale::{RemoteOutcome, SaleReceipt};
use crate::commands::summary::SummaryCards;
use crate::state::ConfigState;

const RULE: &str = "--------------------------------------------------------------";

pub fn draft(view: &DraftResponse, config: &ConfigState) -> String {
    if view.lines.is_empty() {
        return "Draft is empty. Use 'add' or 'ask' to start a sale.".to_string();
    }

    let mut out = vec![
        format!("{:>3}  {:<24} {:>8} {:>12} {:>12}", "#", "Item", "Qty", "Price", "Total"),
        RULE.to_string(),
    ];
    for line in &view.lines {
        let name = if line.item_name.is_empty() {
            "(unnamed)"
        } else {
            line.item_name.as_str()
        };
        out.push(format!(
            "{:>3}  {:<24} {:>8} {:>12.2} {:>12.2}",
            line.position, name, line.quantity, line.unit_price, line.line_total
        ));
    }
    out.push(RULE.to_string());
    out.push(format!("Total:     {}", config.format_currency(view.total)));
    out.push(format!("Tendered:  {}", config.format_currency(view.tendered)));
    if view.credit_due > 0.0 {
        out.push(format!("Credit due: {}", config.format_currency(view.credit_due)));
    } else {
        out.push(format!("Change:    {}", config.format_currency(view.change_given)));
    }
    if !view.customer_name.is_empty() || !view.customer_email.is_empty() {
        out.push(format!(
            "Customer:  {} {}",
            view.customer_name,
            if view.customer_email.is_empty() {
                String::new()
            } else {
                format!("<{}>", view.customer_email)
            }
        ));
    }
    out.join("\n")
}

pub fn cards(cards: &SummaryCards) -> String {
    format!("{}\n{}", cards.today.message, cards.month.message)
}

pub fn receipt(receipt: Option<&SaleReceipt>, config: &ConfigState) -> String {
    let Some(receipt) = receipt else {
        return "Nothing to record, the draft is empty.".to_string();
    };

    let headline = match &receipt.remote {
        RemoteOutcome::Saved => "Sale recorded and saved remotely!".to_string(),
        RemoteOutcome::Failed(reason) => format!(
            "! Sale recorded locally, but failed to save remotely. Please check your connection. ({reason})"
        ),
        RemoteOutcome::Skipped => "Sale recorded locally (no webhook configured).".to_string(),
    };

    let settlement = if receipt.settlement.credit_due > 0.0 {
        format!("credit due {}", config.format_currency(receipt.settlement.credit_due))
    } else {
        format!("change {}", config.format_currency(receipt.settlement.change_given))
    };

    format!(
        "{headline}\n{} item(s), total {}, {settlement}",
        receipt.sales.len(),
        config.format_currency(receipt.total)
    )
}

pub fn sales_log(sales: &[Sale], config: &ConfigState) -> String {
    if sales.is_empty() {
        return "No sales recorded today.".to_string();
    }

    let mut out = vec![
        format!("{:<24} {:>8} {:>12} {:>14}", "Item", "Qty", "Price", "Total"),
        RULE.to_string(),
    ];
    out.extend(sales.iter().map(|sale| {
        format!(
            "{:<24} {:>8} {:>12.2} {:>14}",
            sale.item_name,
            sale.quantity,
            sale.unit_price,
            config.format_currency(sale.total)
        )
    }));
    out.join("\n")
}

pub fn assistant(reply: &AssistantReply, config: &ConfigState) -> String {
    match reply {
        AssistantReply::SaleLineAdded { line, draft_total } => format!(
            "Added line {}: {} x {} @ {:.2} (draft total {})",
            line.position,
            line.quantity,
            line.item_name,
            line.unit_price,
            config.format_currency(*draft_total)
        ),
        AssistantReply::Summary(summary) => summary.message.clone(),
        AssistantReply::Message { text } => text.clone(),
        AssistantReply::Error { text } => format!("! {text}"),
    }
}

pub fn help() -> String {
    [
        "add [item] [qty] [price]      append a line (blank line when no arguments)",
        "set <line> <field> <value>    edit a line; field is name, qty or price",
        "rm <line>                     remove a line",
        "customer name|email <value>   set buyer details",
        "tender <amount>               cash handed over",
        "show                          draft, settlement and totals",
        "record                        commit the draft as sales",
        "today                         today's sales, most recent first",
        "summary [daily|monthly]       total sales for the period",
        "ask <text>                    let the assistant read free text",
        "clear                         discard the draft",
        "help                          this list",
        "quit                          leave the shell",
    ]
    .join("\n")
}
