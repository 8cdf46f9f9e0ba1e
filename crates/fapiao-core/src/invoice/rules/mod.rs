//! Rule-based field extractors for Chinese VAT invoices.
//!
//! Every field is handled by one [`FieldExtractor`]: an ordered list of
//! strategies where the first strategy producing a validated value wins.

pub mod amounts;
pub mod buyer;
pub mod dates;
pub mod invoice_number;
pub mod items;
pub mod patterns;

pub use amounts::{parse_amount, TotalAmountExtractor};
pub use buyer::{normalize_buyer_name, BuyerNameExtractor};
pub use dates::{normalize_date, parse_date, IssueDateExtractor};
pub use invoice_number::InvoiceNumberExtractor;
pub use items::LineItemExtractor;

use tracing::debug;

/// One matching strategy of an extractor.
pub type Strategy<E> = fn(&E, &str) -> Option<<E as FieldExtractor>::Output>;

/// Trait for field extractors.
pub trait FieldExtractor: Sized + 'static {
    /// The type of value this extractor produces.
    type Output: 'static;

    /// Field name used in logs.
    const FIELD: &'static str;

    /// Named strategies in priority order.
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)];

    /// Run the strategies in order and return the first validated value.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        Self::STRATEGIES.iter().find_map(|&(name, strategy)| {
            let value = strategy(self, text)?;
            debug!(field = Self::FIELD, strategy = name, "field extracted");
            Some(value)
        })
    }
}
