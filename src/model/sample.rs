//! Built-in sample invoice.
//!
//! The fixed seller, buyer and two line items the `invoicer` binary renders
//! when no `--data` file is given. Also printed by `invoicer --example` as a
//! starting point for real data files.

use super::{CompanyInfo, Invoice, ProductEntry};
use rust_decimal::Decimal;

pub const SAMPLE_SELLER: &str = "Northwind Supplies Ltd.\n125 Market Street\nSpringfield, IL 62701\nsales@northwind.example";

pub const SAMPLE_BUYER: &str = "Contoso Retail Inc.\n48 Harbor Avenue\nPortland, OR 97204";

/// The sample invoice: two line items at positions 2 and 3.
pub fn sample_invoice() -> Invoice {
    Invoice::from_parts(
        CompanyInfo::new(SAMPLE_SELLER),
        CompanyInfo::new(SAMPLE_BUYER),
        vec![
            ProductEntry::new(
                2,
                "Description 1",
                3,
                Decimal::new(200, 0),
                Decimal::new(1, 1),
            ),
            ProductEntry::new(
                3,
                "Description 2",
                4,
                Decimal::new(300, 0),
                Decimal::new(2, 1),
            ),
        ],
    )
}

/// The sample invoice as pretty-printed JSON, in the format `--data` reads.
pub fn sample_invoice_json() -> Result<String, crate::InvoiceError> {
    Ok(serde_json::to_string_pretty(&sample_invoice())?)
}
