//! # Receipt
//!
//! ESC/POS byte stream for 58 mm thermal printers (32 columns).
//!
//! ```text
//!        ┌────────────────────────────────┐
//!        │          SAVDO MARKET          │  ESC a 1, ESC E 1
//!        │--------------------------------│
//!        │Coca-Cola 1L x2                 │  ESC a 0
//!        │                           24.00│
//!        │--------------------------------│
//!        │Service                     2.40│  (hospitality only)
//!        │TOTAL:                     26.40│  ESC E 1
//!        │                                │
//!        └──────────── cut ───────────────┘  GS V A 16
//! ```
//!
//! Only the byte sequence is built here. Talking to the device is the
//! caller's business.

use crate::cart::Cart;
use crate::money::Money;
use crate::pricing::CartTotals;

pub const LINE_WIDTH: usize = 32;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Low-level ESC/POS command buffer.
#[derive(Debug, Default)]
pub struct EscPosBuilder {
    bytes: Vec<u8>,
}

impl EscPosBuilder {
    /// Starts a buffer with `ESC @` (printer reset).
    pub fn new() -> Self {
        EscPosBuilder {
            bytes: vec![ESC, b'@'],
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.bytes.extend_from_slice(&[ESC, b'a', align as u8]);
        self
    }

    pub fn bold(mut self, on: bool) -> Self {
        self.bytes.extend_from_slice(&[ESC, b'E', u8::from(on)]);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.bytes.extend_from_slice(text.as_bytes());
        self
    }

    pub fn line(self, text: &str) -> Self {
        self.text(text).text("\n")
    }

    pub fn rule(self) -> Self {
        self.line(&"-".repeat(LINE_WIDTH))
    }

    /// Feeds three lines and performs a partial cut (`GS V A 16`).
    pub fn feed_and_cut(mut self) -> Self {
        self.bytes.extend_from_slice(b"\n\n\n");
        self.bytes.extend_from_slice(&[GS, b'V', b'A', 0x10]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Left text and right-aligned amount on one 32-column line.
fn two_columns(left: &str, right: &str) -> String {
    let left_width = left.chars().count();
    let right_width = right.chars().count();
    let pad = LINE_WIDTH.saturating_sub(left_width + right_width).max(1);
    format!("{left}{}{right}", " ".repeat(pad))
}

/// Builds the receipt for a cart.
pub fn build_receipt(store_name: &str, cart: &Cart, totals: &CartTotals) -> Vec<u8> {
    let mut builder = EscPosBuilder::new()
        .align(Align::Center)
        .bold(true)
        .line(store_name)
        .bold(false)
        .rule()
        .align(Align::Left);

    for item in cart.items() {
        builder = builder
            .line(&format!("{} x{}", item.variant.display_name(), item.quantity))
            .line(&two_columns("", &item.total.to_string()));
    }

    builder = builder.rule();

    let extras: [(&str, Money); 3] = [
        ("Discount", totals.discount),
        ("Tax", totals.tax),
        ("Service", totals.service_charge),
    ];
    for (label, amount) in extras {
        if !amount.is_zero() {
            builder = builder.line(&two_columns(label, &amount.to_string()));
        }
    }

    builder
        .bold(true)
        .line(&two_columns("TOTAL:", &totals.total.to_string()))
        .bold(false)
        .feed_and_cut()
        .build()
}
