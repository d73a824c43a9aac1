use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invoice::{BillingSubject, InvoiceError, InvoiceMeta, InvoiceNumber, Payment, PaymentMode};
use super::ledger::Ledger;

/// The bill being edited in one bill-creation session. Possibly partial;
/// kept in the user's session and dropped once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub draft_id: Uuid,
    pub invoice_number: InvoiceNumber,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub description: String,
    pub subject: Option<BillingSubject>,
    /// The student-ID field; prefilled from the selected subject, editable.
    pub subject_id: String,
    pub ledger: Ledger,
    pub payment_mode: Option<PaymentMode>,
    pub transaction_id: String,
}

impl InvoiceDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            invoice_number: InvoiceNumber::generate(),
            issue_date: today,
            due_date: Some(today),
            description: String::new(),
            subject: None,
            subject_id: String::new(),
            ledger: Ledger::new(),
            payment_mode: None,
            transaction_id: String::new(),
        }
    }

    pub fn select_subject(&mut self, subject: BillingSubject) {
        self.subject_id = subject.external_id.clone();
        self.subject = Some(subject);
    }

    /// The selected subject with the student-ID field applied.
    pub fn effective_subject(&self) -> Option<BillingSubject> {
        self.subject.as_ref().map(|subject| BillingSubject {
            external_id: self.subject_id.trim().to_string(),
            ..subject.clone()
        })
    }

    pub fn meta(&self) -> Result<InvoiceMeta, InvoiceError> {
        let payment = Payment::from_input(self.payment_mode, &self.transaction_id)?;
        Ok(InvoiceMeta {
            draft_id: self.draft_id,
            invoice_number: self.invoice_number.clone(),
            issue_date: self.issue_date,
            due_date: self.due_date,
            description: Some(self.description.clone()),
            payment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn fresh_draft_has_one_blank_row_and_a_label() {
        let draft = InvoiceDraft::new(today());
        assert_eq!(draft.ledger.len(), 1);
        assert!(draft.invoice_number.as_str().starts_with("INV"));
        assert_eq!(draft.due_date, Some(today()));
    }

    #[test]
    fn student_id_field_overrides_the_selected_subject() {
        let mut draft = InvoiceDraft::new(today());
        draft.select_subject(BillingSubject {
            name: "Asha".to_string(),
            external_id: "S-1".to_string(),
            class_label: "5A".to_string(),
        });
        assert_eq!(draft.subject_id, "S-1");

        draft.subject_id = " S-2 ".to_string();
        assert_eq!(draft.effective_subject().unwrap().external_id, "S-2");
    }

    #[test]
    fn meta_requires_a_payment_mode() {
        let draft = InvoiceDraft::new(today());
        assert_eq!(draft.meta().unwrap_err(), InvoiceError::MissingPaymentMode);
    }
}
