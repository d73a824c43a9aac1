//! Assembly of a submittable invoice from the bill being edited.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::ledger::{saturating_add, CategorySet, ItemFieldError, Ledger, LineItem};
use super::money::{WORDS_CEILING, amount_to_words, whole_rupees};
use crate::models::template::OrganizationTemplate;

/// Decorative bar pattern printed under the totals. Encodes nothing.
pub const BARCODE_GLYPHS: &str = "|||||| || ||| || |||| | ||| |||| || ||| | |||| ||";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    #[error("Please select a student")]
    MissingSubject,

    #[error("Please enter the student ID")]
    MissingSubjectId,

    #[error("Add at least one item with a category and a rate")]
    NoCompleteItems,

    #[error("Please fill all required fields for items")]
    IncompleteItems(Vec<ItemFieldError>),

    #[error("Unknown category on row {}", .0.first().map(|(row, _)| *row).unwrap_or_default())]
    UnknownCategory(Vec<(usize, String)>),

    #[error("Amount too large")]
    AmountTooLarge,

    #[error("Please select a payment mode")]
    MissingPaymentMode,

    #[error("Transaction ID is required for online payments")]
    MissingTransactionId,
}

/// Human-facing bill label: `INV` followed by the last six digits of the
/// creation time in epoch milliseconds. Two bills started in the same
/// millisecond modulo 10^6 share a label, so it is never used as a key; see
/// [`InvoiceMeta::draft_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    pub fn generate() -> Self {
        Self::from_timestamp(Utc::now())
    }

    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        let suffix = at.timestamp_millis().rem_euclid(1_000_000);
        Self(format!("INV{:06}", suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    Cash,
    Online,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 2] = [PaymentMode::Cash, PaymentMode::Online];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Online => "ONLINE",
        }
    }

    /// Form value to mode; anything unrecognised means "not chosen yet".
    pub fn from_form(value: &str) -> Option<Self> {
        match value.trim() {
            "CASH" => Some(PaymentMode::Cash),
            "ONLINE" => Some(PaymentMode::Online),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "paymentMode", rename_all = "UPPERCASE")]
pub enum Payment {
    Cash,
    Online {
        #[serde(rename = "transactionId")]
        transaction_id: String,
    },
}

impl Payment {
    /// A transaction id is required for, and only kept on, online payments.
    pub fn from_input(mode: Option<PaymentMode>, transaction_id: &str) -> Result<Self, InvoiceError> {
        match mode {
            None => Err(InvoiceError::MissingPaymentMode),
            Some(PaymentMode::Cash) => Ok(Payment::Cash),
            Some(PaymentMode::Online) => {
                let transaction_id = transaction_id.trim();
                if transaction_id.is_empty() {
                    Err(InvoiceError::MissingTransactionId)
                } else {
                    Ok(Payment::Online {
                        transaction_id: transaction_id.to_string(),
                    })
                }
            }
        }
    }

    pub fn mode(&self) -> PaymentMode {
        match self {
            Payment::Cash => PaymentMode::Cash,
            Payment::Online { .. } => PaymentMode::Online,
        }
    }
}

/// Who the bill is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSubject {
    pub name: String,
    pub external_id: String,
    pub class_label: String,
}

#[derive(Debug, Clone)]
pub struct InvoiceMeta {
    /// Unique per bill-creation session; the backend deduplicates on it.
    pub draft_id: Uuid,
    pub invoice_number: InvoiceNumber,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub payment: Payment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl From<&LineItem> for InvoiceLine {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
            rate: item.rate.unwrap_or(Decimal::ZERO),
            amount: item.amount(),
        }
    }
}

/// A complete bill, ready to submit. Totals are derived from `items` when
/// the document is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub draft_id: Uuid,
    pub invoice_number: InvoiceNumber,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subject_name: String,
    pub subject_external_id: String,
    pub subject_class_label: String,
    pub items: Vec<InvoiceLine>,
    total: Decimal,
    total_in_words: String,
    #[serde(flatten)]
    pub payment: Payment,
    pub issuer: OrganizationTemplate,
}

impl InvoiceDocument {
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn total_in_words(&self) -> &str {
        &self.total_in_words
    }
}

/// Builds the submittable document. Only complete rows are carried over;
/// incomplete rows are the caller's to report (see [`Ledger::field_errors`]).
pub fn build_invoice(
    subject: Option<&BillingSubject>,
    ledger: &Ledger,
    template: &OrganizationTemplate,
    meta: InvoiceMeta,
) -> Result<InvoiceDocument, InvoiceError> {
    let subject = subject.ok_or(InvoiceError::MissingSubject)?;
    if subject.external_id.trim().is_empty() {
        return Err(InvoiceError::MissingSubjectId);
    }

    let items: Vec<InvoiceLine> = ledger.complete_items().map(InvoiceLine::from).collect();
    if items.is_empty() {
        return Err(InvoiceError::NoCompleteItems);
    }

    let total = items.iter().map(|line| line.amount).fold(Decimal::ZERO, saturating_add);
    let whole = whole_rupees(total);
    if whole >= WORDS_CEILING {
        return Err(InvoiceError::AmountTooLarge);
    }

    Ok(InvoiceDocument {
        draft_id: meta.draft_id,
        invoice_number: meta.invoice_number,
        issue_date: meta.issue_date,
        due_date: meta.due_date,
        description: meta.description.filter(|d| !d.trim().is_empty()),
        subject_name: subject.name.clone(),
        subject_external_id: subject.external_id.trim().to_string(),
        subject_class_label: subject.class_label.clone(),
        items,
        total,
        total_in_words: amount_to_words(whole),
        payment: meta.payment,
        issuer: template.clone(),
    })
}

/// Submission gate run before [`build_invoice`]: every row complete and every
/// category offered by the organization.
pub fn check_submittable(ledger: &Ledger, categories: &CategorySet) -> Result<(), InvoiceError> {
    if !ledger.is_submit_eligible() {
        return Err(InvoiceError::IncompleteItems(ledger.field_errors()));
    }
    if !categories.is_empty() {
        let unknown = ledger.unknown_categories(categories);
        if !unknown.is_empty() {
            return Err(InvoiceError::UnknownCategory(unknown));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn invoice_number_uses_last_six_millisecond_digits() {
        let at = Utc.timestamp_millis_opt(1_736_500_123_456).unwrap();
        assert_eq!(InvoiceNumber::from_timestamp(at).as_str(), "INV123456");
    }

    #[test]
    fn invoice_number_pads_short_suffixes() {
        let at = Utc.timestamp_millis_opt(1_736_500_000_042).unwrap();
        assert_eq!(InvoiceNumber::from_timestamp(at).as_str(), "INV000042");
    }

    #[test]
    fn payment_mode_round_trips_through_form_values() {
        for mode in PaymentMode::ALL {
            assert_eq!(PaymentMode::from_form(mode.as_str()), Some(mode));
        }
        assert_eq!(PaymentMode::from_form(""), None);
    }

    #[test]
    fn online_payment_serializes_with_transaction_id() {
        let payment = Payment::Online {
            transaction_id: "TXN-9".to_string(),
        };
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["paymentMode"], "ONLINE");
        assert_eq!(json["transactionId"], "TXN-9");
    }
}
