//! Plain-text rendering of command results for the terminal.

use savdo_client::config::DisplaySettings;
use savdo_client::TenantProfile;
use savdo_core::label::ShelfLabel;
use savdo_core::smart_scan::ScanFeedback;
use savdo_core::{Customer, Money};

use crate::commands::cart::CartView;
use crate::commands::checkout::CheckoutOutcome;
use crate::commands::scan::{AddedLine, ScanOutcome};
use crate::commands::voice::VoiceOutcome;

const BELL: char = '\u{7}';

pub const HELP: &str = "\
Scan a barcode or label, or type a command:
  :cart                      show the cart
  :qty <id> <n>              set quantity (0 removes)
  :inc <id> / :dec <id>      one more / one less
  :rm <id>                   remove a line
  :disc <id> <percent>       line discount (0 clears)
  :price <id> <amount>       negotiated unit price
  :pack <id> <packs>         pack count for a line
  :clear                     empty the cart
  :customers                 list customers
  :customer <id>|none        select or drop the customer
  :voice <transcript>        e.g. :voice 5 ta cola qo'sh
  :find <text>               search by name and add one
  :new <price> <name>        quick-add the last unknown code
  :label <sku> [packs]       print a shelf label
  :pay <method> [notes]      cash, card, transfer, debt, mixed, payme, click
  :login <user> <password> / :logout / :profile
  :signup <user> <email> <password> [type]   register a new shop
  :settings margin <percent> | name <text>   tenant settings
  :quit";

/// Bells for the cashier: one per beep, a single one for the error tone.
fn bells(feedback: ScanFeedback) -> String {
    let count = match feedback {
        ScanFeedback::Error => 1,
        other => usize::from(other.beeps()),
    };
    std::iter::repeat(BELL).take(count).collect()
}

pub fn added(line: &AddedLine) -> String {
    let pack = match line.feedback {
        ScanFeedback::PackAdd { units } => format!(" (pack of {units})"),
        _ => String::new(),
    };
    format!(
        "{}+{} {}{} -> {} in cart",
        bells(line.feedback),
        line.added,
        line.name,
        pack,
        line.line_quantity
    )
}

pub fn scan(outcome: &ScanOutcome) -> String {
    match outcome {
        ScanOutcome::Added(line) => added(line),
        ScanOutcome::NotFound { code } => format!(
            "{}Unknown code {code}. Add it with :new <price> <name>",
            bells(ScanFeedback::Error)
        ),
        ScanOutcome::Superseded => String::new(),
    }
}

pub fn voice(outcome: &VoiceOutcome) -> String {
    match outcome {
        VoiceOutcome::Added(line) => added(line),
        VoiceOutcome::NotFound { term } => format!(
            "{}Nothing found for \"{term}\"",
            bells(ScanFeedback::Error)
        ),
        VoiceOutcome::Superseded => String::new(),
    }
}

fn customer_line(customer: &Customer, display: &DisplaySettings) -> String {
    let mut line = format!("#{} {}", customer.id, customer.name);
    if let Some(phone) = &customer.phone {
        line.push_str(&format!(" {phone}"));
    }
    let debt = customer.debt();
    if debt.is_positive() {
        line.push_str(&format!(" owes {}", display.format_money(debt)));
    }
    if customer.debt_limit_reached() {
        line.push_str(" [debt limit]");
    }
    line
}

pub fn customers(list: &[Customer], display: &DisplaySettings) -> String {
    if list.is_empty() {
        return "No customers".to_string();
    }
    list.iter()
        .map(|c| customer_line(c, display))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cart(view: &CartView, display: &DisplaySettings) -> String {
    if view.lines.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = Vec::new();
    for line in &view.lines {
        let mut row = format!(
            "#{:<5} {:<24} {:>4} x {:>14} = {:>14}",
            line.variant_id,
            line.name,
            line.quantity,
            display.format_money(line.unit_price),
            display.format_money(line.total)
        );
        if line.pack_qty > 1 {
            row.push_str(&format!("  {} packs", line.pack_qty));
        }
        if !line.price_cut.is_zero() {
            row.push_str(&format!("  -{:.1}%", line.price_cut.percentage()));
        }
        if line.discount_amount.is_positive() {
            row.push_str(&format!("  disc {}", display.format_money(line.discount_amount)));
        }
        if line.below_margin {
            row.push_str("  [below margin]");
        }
        out.push(row);
    }

    let totals = &view.totals;
    let mut summary: Vec<(&str, Money)> = vec![("Subtotal", totals.subtotal)];
    for (label, amount) in [
        ("Discount", totals.discount),
        ("Tax", totals.tax),
        ("Service", totals.service_charge),
    ] {
        if !amount.is_zero() {
            summary.push((label, amount));
        }
    }
    summary.push(("TOTAL", totals.total));

    out.push(format!(
        "{} lines, {} units",
        totals.item_count, totals.total_quantity
    ));
    for (label, amount) in summary {
        out.push(format!("{:<10} {:>20}", label, display.format_money(amount)));
    }
    if let Some(customer) = &view.customer {
        out.push(format!("Customer: {}", customer_line(customer, display)));
    }
    out.join("\n")
}

pub fn sale(outcome: &CheckoutOutcome, display: &DisplaySettings) -> String {
    let receipt = &outcome.receipt;
    let number = receipt
        .receipt_number
        .clone()
        .unwrap_or_else(|| format!("#{}", receipt.id));
    let total = if receipt.total_amount.is_zero() {
        outcome.totals.total
    } else {
        receipt.total_amount
    };

    let mut text = format!("Sale {number} completed: {}", display.format_money(total));
    if receipt.is_debt {
        text.push_str(&format!(" (on debt {})", display.format_money(receipt.debt_amount)));
    }
    text.push_str(&format!("\nReceipt ready ({} bytes)", outcome.printout.len()));
    text
}

pub fn label(label: &ShelfLabel, display: &DisplaySettings) -> String {
    format!(
        "{}\n{}  {}\nQR {}",
        label.title,
        label.sku,
        display.format_money(label.price),
        label.qr_payload
    )
}

pub fn profile(profile: &TenantProfile) -> String {
    let business = profile
        .business_type
        .map(|b| b.to_string())
        .unwrap_or_else(|| "not set".to_string());
    format!(
        "{} at {} (business type: {})",
        profile.username, profile.tenant_name, business
    )
}
