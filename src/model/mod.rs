//! # Invoice Model
//!
//! The data an invoice is assembled from: who sells, who buys, and the
//! ordered line items. Everything here is an immutable value; totals are
//! derived on read and never stored next to the values they come from.
//!
//! Monetary amounts use `rust_decimal::Decimal` so `quantity * unit_price`
//! is exact for every representable price.

pub mod sample;

use crate::InvoiceError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One purchasable entry on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEntry {
    /// 1-based display position shown in the first grid column.
    pub position: u32,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// Shown in the grid for reference. Not applied to `line_total`.
    #[serde(default)]
    pub discount_percent: Decimal,
}

impl ProductEntry {
    pub fn new(
        position: u32,
        description: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
        discount_percent: Decimal,
    ) -> Self {
        Self {
            position,
            description: description.into(),
            quantity,
            unit_price,
            discount_percent,
        }
    }

    /// `quantity * unit_price`. The discount is display-only.
    ///
    /// Saturates at `Decimal::MAX`; entries of a validated [`Invoice`]
    /// never reach it.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }

    /// `quantity * unit_price`, or `None` when the product overflows.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// A free-form identity/address block, one line per `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyInfo {
    pub display_text: String,
}

impl CompanyInfo {
    pub fn new(display_text: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
        }
    }

    /// The block split on line breaks (`\n` or `\r\n`).
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.display_text.lines()
    }
}

/// Running sum of line totals.
///
/// The grid assembler feeds every item through `add` while it emits rows,
/// so the summary row never has to walk the items a second time. The sum
/// saturates at `Decimal::MAX` for unvalidated entries; [`Invoice::new`]
/// rejects any invoice whose total would.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceTotals {
    grand_total: Decimal,
    line_count: usize,
}

impl InvoiceTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one entry and return its line total.
    pub fn add(&mut self, entry: &ProductEntry) -> Decimal {
        let line_total = entry.line_total();
        self.grand_total = self.grand_total.saturating_add(line_total);
        self.line_count += 1;
        line_total
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

impl<'a> FromIterator<&'a ProductEntry> for InvoiceTotals {
    fn from_iter<I: IntoIterator<Item = &'a ProductEntry>>(iter: I) -> Self {
        let mut totals = InvoiceTotals::new();
        for entry in iter {
            totals.add(entry);
        }
        totals
    }
}

/// The aggregate the document is built from.
///
/// Constructed through [`Invoice::new`] (or deserialization, which goes
/// through the same checks), so an `Invoice` in hand always has positive,
/// strictly increasing positions, non-negative prices, discounts within
/// `[0, 100]` and a grand total that fits in a `Decimal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawInvoice")]
pub struct Invoice {
    seller: CompanyInfo,
    buyer: CompanyInfo,
    line_items: Vec<ProductEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInvoice {
    seller: CompanyInfo,
    buyer: CompanyInfo,
    #[serde(default)]
    line_items: Vec<ProductEntry>,
}

impl TryFrom<RawInvoice> for Invoice {
    type Error = InvoiceError;

    fn try_from(raw: RawInvoice) -> Result<Self, Self::Error> {
        Invoice::new(raw.seller, raw.buyer, raw.line_items)
    }
}

impl Invoice {
    /// Build an invoice, checking the line-item invariants.
    pub fn new(
        seller: CompanyInfo,
        buyer: CompanyInfo,
        line_items: Vec<ProductEntry>,
    ) -> Result<Self, InvoiceError> {
        validate_line_items(&line_items)?;
        Ok(Self::from_parts(seller, buyer, line_items))
    }

    /// Build from trusted, statically known values.
    pub(crate) fn from_parts(
        seller: CompanyInfo,
        buyer: CompanyInfo,
        line_items: Vec<ProductEntry>,
    ) -> Self {
        Self {
            seller,
            buyer,
            line_items,
        }
    }

    /// Parse an invoice from JSON.
    pub fn from_json(json: &str) -> Result<Self, InvoiceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn seller(&self) -> &CompanyInfo {
        &self.seller
    }

    pub fn buyer(&self) -> &CompanyInfo {
        &self.buyer
    }

    /// Line items in display order.
    pub fn line_items(&self) -> &[ProductEntry] {
        &self.line_items
    }

    /// Sum of every line total.
    pub fn grand_total(&self) -> Decimal {
        self.line_items
            .iter()
            .collect::<InvoiceTotals>()
            .grand_total()
    }
}

fn validate_line_items(items: &[ProductEntry]) -> Result<(), InvoiceError> {
    let hundred = Decimal::ONE_HUNDRED;
    let mut previous: Option<u32> = None;
    let mut total = Decimal::ZERO;

    for (index, item) in items.iter().enumerate() {
        if item.position == 0 {
            return Err(InvoiceError::InvalidInvoice(format!(
                "line item {} has position 0; positions are 1-based",
                index + 1
            )));
        }
        if let Some(prev) = previous {
            if item.position <= prev {
                return Err(InvoiceError::InvalidInvoice(format!(
                    "line item {} has position {} after position {}; positions must increase in display order",
                    index + 1,
                    item.position,
                    prev
                )));
            }
        }
        if item.unit_price < Decimal::ZERO {
            return Err(InvoiceError::InvalidInvoice(format!(
                "line item at position {} has negative unit price {}",
                item.position, item.unit_price
            )));
        }
        if item.discount_percent < Decimal::ZERO || item.discount_percent > hundred {
            return Err(InvoiceError::InvalidInvoice(format!(
                "line item at position {} has discount {} outside [0, 100]",
                item.position, item.discount_percent
            )));
        }
        let line_total = item.checked_line_total().ok_or_else(|| {
            InvoiceError::InvalidInvoice(format!(
                "line item at position {} overflows: {} x {} is not representable",
                item.position, item.quantity, item.unit_price
            ))
        })?;
        total = total.checked_add(line_total).ok_or_else(|| {
            InvoiceError::InvalidInvoice(format!(
                "grand total overflows at line item position {}",
                item.position
            ))
        })?;
        previous = Some(item.position);
    }

    Ok(())
}
