//! Payments

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{lifecycle::Lifecycle, orders::UnknownStatus};

/// Ten uppercase ASCII letters or digits, e.g. `QGH7K2LM9P`.
#[expect(clippy::expect_used, reason = "the pattern is a fixed literal")]
static TRANSACTION_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[A-Z0-9]{10}").expect("transaction code pattern compiles"));

/// Payment record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Submitted, awaiting an admin.
    Pending,

    /// Verified by an admin.
    Confirmed,

    /// Refused by an admin, or withdrawn when the customer cancelled.
    Rejected,
}

impl PaymentStatus {
    /// Every status.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Confirmed, Self::Rejected];

    /// Storage name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }
}

impl Lifecycle for PaymentStatus {
    fn allows(self, to: Self) -> bool {
        matches!((self, to), (Self::Pending, Self::Confirmed | Self::Rejected))
    }

    fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// A mobile-money transaction code such as `QGH7K2LM9P`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionCode(String);

impl TransactionCode {
    /// The code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TransactionCode> for String {
    fn from(code: TransactionCode) -> Self {
        code.0
    }
}

/// Mobile-money channel without its per-channel details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannelKind {
    /// M-Pesa send money or till payment.
    Mpesa,

    /// NCBA Loop paybill transfer.
    NcbaLoop,
}

impl PaymentChannelKind {
    /// Every channel.
    pub const ALL: [Self; 2] = [Self::Mpesa, Self::NcbaLoop];

    /// Storage name of the channel.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mpesa => "mpesa",
            Self::NcbaLoop => "ncba_loop",
        }
    }
}

impl fmt::Display for PaymentChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised payment channel name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown payment channel: {0}")]
pub struct UnknownPaymentChannel(pub String);

impl FromStr for PaymentChannelKind {
    type Err = UnknownPaymentChannel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownPaymentChannel(value.to_string()))
    }
}

/// Where the customer sent the money.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaymentChannel {
    /// M-Pesa send money or till payment.
    #[default]
    Mpesa,

    /// NCBA Loop paybill transfer.
    NcbaLoop {
        /// Paybill the transfer was made to.
        paybill_number: Option<String>,

        /// Account number entered against the paybill.
        account_number: Option<String>,
    },
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

impl PaymentChannel {
    /// An NCBA Loop transfer. Blank paybill or account numbers are dropped.
    pub fn ncba_loop(paybill_number: Option<&str>, account_number: Option<&str>) -> Self {
        Self::NcbaLoop {
            paybill_number: non_blank(paybill_number),
            account_number: non_blank(account_number),
        }
    }

    /// Rebuild a channel from its stored parts. M-Pesa ignores the paybill details.
    pub fn from_parts(
        kind: PaymentChannelKind,
        paybill_number: Option<&str>,
        account_number: Option<&str>,
    ) -> Self {
        match kind {
            PaymentChannelKind::Mpesa => Self::Mpesa,
            PaymentChannelKind::NcbaLoop => Self::ncba_loop(paybill_number, account_number),
        }
    }

    /// The channel without its details.
    pub const fn kind(&self) -> PaymentChannelKind {
        match self {
            Self::Mpesa => PaymentChannelKind::Mpesa,
            Self::NcbaLoop { .. } => PaymentChannelKind::NcbaLoop,
        }
    }

    /// Paybill number, for NCBA Loop transfers that gave one.
    pub fn paybill_number(&self) -> Option<&str> {
        match self {
            Self::Mpesa => None,
            Self::NcbaLoop { paybill_number, .. } => paybill_number.as_deref(),
        }
    }

    /// Account number, for NCBA Loop transfers that gave one.
    pub fn account_number(&self) -> Option<&str> {
        match self {
            Self::Mpesa => None,
            Self::NcbaLoop { account_number, .. } => account_number.as_deref(),
        }
    }
}

/// Find the first run of ten consecutive uppercase ASCII letters or digits.
///
/// Longer runs yield their first ten characters. Best effort: `None` simply
/// leaves the code for an admin to look up by hand.
pub fn extract_transaction_code(message: &str) -> Option<TransactionCode> {
    TRANSACTION_CODE
        .find(message)
        .map(|code| TransactionCode(code.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::lifecycle::TransitionError;

    use super::*;

    #[test]
    fn extracts_code_from_mpesa_message() {
        let message = "QGH7K2LM9P Confirmed. Ksh1,000.00 sent to SOKO on 12/3/24 at 4:15 PM.";

        assert_eq!(
            extract_transaction_code(message).map(String::from),
            Some("QGH7K2LM9P".to_string())
        );
    }

    #[test]
    fn extracts_code_from_middle_of_message() {
        let message = "Confirmed. Ref: RKT4ABCD12. Thank you";

        assert_eq!(
            extract_transaction_code(message).map(String::from),
            Some("RKT4ABCD12".to_string())
        );
    }

    #[test]
    fn longer_run_yields_first_ten_characters() {
        assert_eq!(
            extract_transaction_code("ABCDEFGHIJKL").map(String::from),
            Some("ABCDEFGHIJ".to_string())
        );
    }

    #[test]
    fn lowercase_and_short_runs_do_not_match() {
        assert_eq!(extract_transaction_code("qgh7k2lm9p confirmed"), None);
        assert_eq!(extract_transaction_code("ABC123 DEF456 GHI"), None);
        assert_eq!(extract_transaction_code(""), None);
    }

    #[test]
    fn multibyte_characters_break_runs() {
        assert_eq!(extract_transaction_code("ABCDEÉFGHIJ"), None);
        assert_eq!(
            extract_transaction_code("é QGH7K2LM9P").map(String::from),
            Some("QGH7K2LM9P".to_string())
        );
    }

    #[test]
    fn ncba_loop_keeps_paybill_details() -> TestResult {
        let channel = PaymentChannel::ncba_loop(Some(" 880100 "), Some("  "));

        assert_eq!(channel.kind(), PaymentChannelKind::NcbaLoop);
        assert_eq!(channel.paybill_number(), Some("880100"));
        assert_eq!(channel.account_number(), None);
        assert_eq!(
            "ncba_loop".parse::<PaymentChannelKind>()?,
            PaymentChannelKind::NcbaLoop
        );
        assert!("airtel".parse::<PaymentChannelKind>().is_err());

        Ok(())
    }

    #[test]
    fn mpesa_has_no_paybill_details() {
        let channel =
            PaymentChannel::from_parts(PaymentChannelKind::Mpesa, Some("880100"), Some("SOKO"));

        assert_eq!(channel, PaymentChannel::Mpesa);
        assert_eq!(channel.paybill_number(), None);
    }

    #[test]
    fn pending_payment_can_be_confirmed_or_rejected() -> TestResult {
        assert_eq!(
            PaymentStatus::Pending.transition(PaymentStatus::Confirmed)?,
            PaymentStatus::Confirmed
        );
        assert_eq!(
            PaymentStatus::Pending.transition(PaymentStatus::Rejected)?,
            PaymentStatus::Rejected
        );

        Ok(())
    }

    #[test]
    fn terminal_payment_never_changes() {
        for terminal in [PaymentStatus::Confirmed, PaymentStatus::Rejected] {
            for to in PaymentStatus::ALL {
                assert_eq!(
                    terminal.transition(to),
                    Err(TransitionError::Terminal(terminal))
                );
            }
        }
    }

    #[test]
    fn status_parses_storage_name() -> TestResult {
        assert_eq!("confirmed".parse::<PaymentStatus>()?, PaymentStatus::Confirmed);
        assert!("approved".parse::<PaymentStatus>().is_err());

        Ok(())
    }
}
