//! Payment Data

use soko::payments::{PaymentChannel, PaymentChannelKind, PaymentStatus};

/// Proof of an off-platform mobile-money transfer, as pasted by the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSubmission {
    pub message: String,
    pub phone: Option<String>,
    pub channel: PaymentChannel,
    pub amount: u64,
}

/// Narrows the admin payment list. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub channel: Option<PaymentChannelKind>,
    /// Case-insensitive substring of the customer's name or email, the
    /// pasted message or the payer's phone.
    pub search: Option<String>,
}

impl PaymentFilter {
    /// `ILIKE` pattern for the search term, with wildcards in the term escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|term| !term.is_empty())?;

        let mut pattern = String::with_capacity(term.len() + 2);

        pattern.push('%');

        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }

            pattern.push(c);
        }

        pattern.push('%');

        Some(pattern)
    }
}
