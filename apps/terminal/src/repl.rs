//! # Terminal Loop
//!
//! Reads stdin line by line. A USB scanner in keyboard-wedge mode types
//! the code and presses Enter, so a scan arrives as one line.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin line                                                             │
//! │     │                                                                   │
//! │     ├── ":pay cash" ──► Command::parse ──► execute ──► reply            │
//! │     │                                                                   │
//! │     └── "4780000000010" ──► BarcodeDetector (chars + Enter)             │
//! │                                 │                                       │
//! │                                 ├── Scan(code) ──► handle_scan          │
//! │                                 └── Discarded ──► hint                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;
use std::time::Instant;

use savdo_client::{Authenticator, SignupRequest, TenantUpdate};
use savdo_core::scanner::{BarcodeDetector, Key, KeyEvent, KeyOutcome};
use savdo_core::{BusinessType, DiscountRate, Money, PaymentMethod};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::commands::{account, cart, checkout, product, scan, voice};
use crate::error::{TerminalError, TerminalResult};
use crate::render;
use crate::state::Session;

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Cart,
    Quantity { variant_id: i64, quantity: i64 },
    Increment(i64),
    Decrement(i64),
    Remove(i64),
    Discount { variant_id: i64, rate: DiscountRate },
    Price { variant_id: i64, price: Money },
    Packs { variant_id: i64, packs: i64 },
    Clear,
    Customers,
    /// `None` drops the selected customer.
    Customer(Option<i64>),
    Voice(String),
    Find(String),
    QuickAdd { price: Money, name: String },
    Label { sku: String, packs: Option<u32> },
    Pay { method: PaymentMethod, notes: Option<String> },
    Login { username: String, password: String },
    Signup(SignupRequest),
    Settings(TenantUpdate),
    Logout,
    Profile,
    Quit,
}

/// One line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    /// Anything not starting with ':' is fed to the scan detector.
    Keys(String),
}

fn usage(text: &str) -> TerminalError {
    TerminalError::validation(format!("Usage: {text}"))
}

fn parse_id(arg: Option<&str>, text: &str) -> TerminalResult<i64> {
    arg.and_then(|a| a.parse().ok()).ok_or_else(|| usage(text))
}

fn parse_percent(arg: Option<&str>, text: &str) -> TerminalResult<DiscountRate> {
    let pct: f64 = arg
        .and_then(|a| a.trim_end_matches('%').parse().ok())
        .ok_or_else(|| usage(text))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(TerminalError::validation("percent must be between 0 and 100"));
    }
    Ok(DiscountRate::from_percentage(pct))
}

const SIGNUP_USAGE: &str = ":signup <user> <email> <password> [business type]";
const SETTINGS_USAGE: &str = ":settings margin <percent> | :settings name <store name>";

fn parse_signup<'a>(mut words: impl Iterator<Item = &'a str>) -> TerminalResult<SignupRequest> {
    let mut next = || words.next().map(str::to_string).ok_or_else(|| usage(SIGNUP_USAGE));
    let username = next()?;
    let email = next()?;
    let password = next()?;
    let business_type = match next() {
        Ok(bt) => Some(bt.parse::<BusinessType>()?),
        Err(_) => None,
    };
    Ok(SignupRequest {
        username,
        email,
        password,
        phone_number: None,
        full_name: None,
        business_type,
    })
}

fn parse_settings(
    line: &str,
    field: Option<&str>,
    value: Option<&str>,
) -> TerminalResult<TenantUpdate> {
    match field {
        Some("margin") => {
            let rate = parse_percent(value, SETTINGS_USAGE)?;
            Ok(TenantUpdate {
                min_margin_bps: Some(rate.bps()),
                ..TenantUpdate::default()
            })
        }
        Some("name") => Ok(TenantUpdate {
            name: Some(rest_after(line, 2).ok_or_else(|| usage(SETTINGS_USAGE))?),
            ..TenantUpdate::default()
        }),
        _ => Err(usage(SETTINGS_USAGE)),
    }
}

/// Everything after the first `n` words, or `None` when empty.
fn rest_after(line: &str, n: usize) -> Option<String> {
    let mut rest = line.trim_start();
    for _ in 0..n {
        rest = rest
            .split_once(char::is_whitespace)
            .map_or("", |(_, tail)| tail)
            .trim_start();
    }
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

impl FromStr for Command {
    type Err = TerminalError;

    /// Parses a command line without its leading ':'.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or("").to_lowercase();
        let arg1 = words.next();
        let arg2 = words.next();

        let command = match name.as_str() {
            "help" | "h" | "?" => Command::Help,
            "cart" | "c" => Command::Cart,
            "qty" => Command::Quantity {
                variant_id: parse_id(arg1, ":qty <id> <n>")?,
                quantity: parse_id(arg2, ":qty <id> <n>")?,
            },
            "inc" => Command::Increment(parse_id(arg1, ":inc <id>")?),
            "dec" => Command::Decrement(parse_id(arg1, ":dec <id>")?),
            "rm" => Command::Remove(parse_id(arg1, ":rm <id>")?),
            "disc" => Command::Discount {
                variant_id: parse_id(arg1, ":disc <id> <percent>")?,
                rate: parse_percent(arg2, ":disc <id> <percent>")?,
            },
            "price" => Command::Price {
                variant_id: parse_id(arg1, ":price <id> <amount>")?,
                price: rest_after(line, 2)
                    .ok_or_else(|| usage(":price <id> <amount>"))?
                    .parse()?,
            },
            "pack" => Command::Packs {
                variant_id: parse_id(arg1, ":pack <id> <packs>")?,
                packs: parse_id(arg2, ":pack <id> <packs>")?,
            },
            "clear" => Command::Clear,
            "customers" => Command::Customers,
            "customer" => match arg1 {
                Some("none") | Some("-") => Command::Customer(None),
                other => Command::Customer(Some(parse_id(other, ":customer <id>|none")?)),
            },
            "voice" | "v" => Command::Voice(rest_after(line, 1).ok_or_else(|| usage(":voice <transcript>"))?),
            "find" | "f" => Command::Find(rest_after(line, 1).ok_or_else(|| usage(":find <text>"))?),
            "new" => Command::QuickAdd {
                price: arg1.ok_or_else(|| usage(":new <price> <name>"))?.parse()?,
                name: rest_after(line, 2).ok_or_else(|| usage(":new <price> <name>"))?,
            },
            "label" => Command::Label {
                sku: arg1.ok_or_else(|| usage(":label <sku> [packs]"))?.to_string(),
                packs: match arg2 {
                    Some(p) => Some(p.parse().map_err(|_| usage(":label <sku> [packs]"))?),
                    None => None,
                },
            },
            "pay" => Command::Pay {
                method: arg1.ok_or_else(|| usage(":pay <method> [notes]"))?.parse()?,
                notes: rest_after(line, 2),
            },
            "login" => Command::Login {
                username: arg1.ok_or_else(|| usage(":login <user> <password>"))?.to_string(),
                password: arg2.ok_or_else(|| usage(":login <user> <password>"))?.to_string(),
            },
            "signup" => Command::Signup(parse_signup(line.split_whitespace().skip(1))?),
            "settings" => Command::Settings(parse_settings(line, arg1, arg2)?),
            "logout" => Command::Logout,
            "profile" | "me" => Command::Profile,
            "quit" | "q" | "exit" => Command::Quit,
            other => {
                return Err(TerminalError::validation(format!(
                    "Unknown command ':{other}'. Type :help"
                )))
            }
        };
        Ok(command)
    }
}

pub fn parse_line(line: &str) -> TerminalResult<Input> {
    match line.trim_start().strip_prefix(':') {
        Some(command) => Ok(Input::Command(command.parse()?)),
        None => Ok(Input::Keys(line.trim_end_matches(['\r', '\n']).to_string())),
    }
}

// =============================================================================
// Keyboard Wedge
// =============================================================================

/// Replays a line through the detector as keystrokes plus Enter.
///
/// Returns the scan when the detector accepted one. A line that overflowed
/// the buffer at any point is not a scan, even if its tail looks like one.
pub fn feed_line(detector: &mut BarcodeDetector, line: &str, at: Instant) -> Option<String> {
    let mut overflowed = false;
    for c in line.chars() {
        if detector.handle_key(&KeyEvent::new(Key::Char(c), at)) == KeyOutcome::Discarded {
            overflowed = true;
        }
    }

    match detector.handle_key(&KeyEvent::new(Key::Enter, at)) {
        KeyOutcome::Scan(code) if !overflowed => Some(code),
        _ => None,
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command and renders the reply.
pub async fn execute(session: &Session, command: Command) -> TerminalResult<String> {
    debug!(?command, "execute");
    let display = session.display();

    let reply = match command {
        Command::Help => render::HELP.to_string(),
        Command::Cart => render::cart(&cart::get_cart(session), display),
        Command::Quantity { variant_id, quantity } => {
            render::cart(&cart::set_quantity(session, variant_id, quantity)?, display)
        }
        Command::Increment(id) => render::cart(&cart::increment(session, id)?, display),
        Command::Decrement(id) => render::cart(&cart::decrement(session, id)?, display),
        Command::Remove(id) => render::cart(&cart::remove_item(session, id)?, display),
        Command::Discount { variant_id, rate } => {
            render::cart(&cart::set_discount(session, variant_id, rate)?, display)
        }
        Command::Price { variant_id, price } => {
            render::cart(&cart::set_price(session, variant_id, price)?, display)
        }
        Command::Packs { variant_id, packs } => {
            render::cart(&cart::set_packs(session, variant_id, packs)?, display)
        }
        Command::Clear => render::cart(&cart::clear_cart(session), display),
        Command::Customers => render::customers(&cart::list_customers(session).await?, display),
        Command::Customer(id) => match cart::select_customer(session, id).await? {
            Some(customer) => format!("Customer: {}", customer.name),
            None => "Customer cleared".to_string(),
        },
        Command::Voice(transcript) => render::voice(&voice::handle_voice(session, &transcript).await?),
        Command::Find(query) => render::voice(&product::search_and_add(session, &query).await?),
        Command::QuickAdd { price, name } => render::added(&product::quick_add(session, &name, price).await?),
        Command::Label { sku, packs } => render::label(&product::label(session, &sku, packs).await?, display),
        Command::Pay { method, notes } => render::sale(&checkout::checkout(session, method, notes).await?, display),
        Command::Login { username, password } => {
            session.backend.login(&username, &password).await?;
            render::profile(&session.refresh_profile().await?)
        }
        Command::Signup(request) => render::profile(&account::signup(session, request).await?),
        Command::Settings(update) => {
            account::update_settings(session, update).await?;
            "Settings saved".to_string()
        }
        Command::Logout => {
            session.backend.logout().await?;
            "Logged out".to_string()
        }
        Command::Profile => render::profile(&session.refresh_profile().await?),
        Command::Quit => String::new(),
    };
    Ok(reply)
}

/// Handles one raw input line. `None` means quit.
pub async fn handle_line(session: &Session, detector: &mut BarcodeDetector, line: &str) -> Option<String> {
    let reply = match parse_line(line) {
        Ok(Input::Command(Command::Quit)) => return None,
        Ok(Input::Command(command)) => execute(session, command).await,
        Ok(Input::Keys(keys)) if keys.trim().is_empty() => Ok(String::new()),
        Ok(Input::Keys(keys)) => match feed_line(detector, &keys, Instant::now()) {
            Some(code) => scan::handle_scan(session, &code).await.map(|o| render::scan(&o)),
            None => Ok("Not a scan. Use :find <text> to search by name".to_string()),
        },
        Err(e) => Err(e),
    };

    Some(reply.unwrap_or_else(|e| {
        warn!(code = ?e.code, message = %e.message, "Command failed");
        e.to_string()
    }))
}

/// Reads lines until EOF or `:quit`.
pub async fn run_loop<R, W>(session: &Session, input: R, output: &mut W) -> TerminalResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut detector = BarcodeDetector::new(session.config.scanner.settings());
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let Some(reply) = handle_line(session, &mut detector, &line).await else {
            break;
        };
        if !reply.is_empty() {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
    }
    Ok(())
}
