//! Printable projection of a bill in progress.
//!
//! [`render_preview`] never fails: anything not filled in yet shows a
//! bracketed placeholder so a template can be previewed before real data
//! exists. The same draft always renders to the same layout.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::draft::InvoiceDraft;
use super::invoice::BARCODE_GLYPHS;
use super::money::{AMOUNT_TOO_LARGE, amount_to_words, format_currency_text, format_money, whole_rupees};
use crate::models::template::{DEFAULT_THEME_COLOR, OrganizationTemplate};

pub const CURRENCY_SYMBOL: &str = "₹";
pub const STUDENT_NAME_PLACEHOLDER: &str = "[STUDENT NAME]";
pub const STUDENT_ID_PLACEHOLDER: &str = "[STUDENT ID]";
pub const CLASS_PLACEHOLDER: &str = "[CLASS]";
pub const DATE_PLACEHOLDER: &str = "[ DATE]";
pub const ORG_NAME_PLACEHOLDER: &str = "[ORGANIZATION NAME]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub serial: usize,
    pub item: String,
    pub category: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLayout {
    pub org_name: String,
    pub org_place: String,
    pub org_contact: String,
    pub theme_color: String,
    pub bill_to_name: String,
    pub bill_to_id: String,
    pub bill_to_class: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub description: Option<String>,
    pub rows: Vec<PreviewRow>,
    pub total: String,
    pub total_in_words: String,
    pub barcode: &'static str,
}

/// The invoice date is the draft's issue date, the same one submission sends.
pub fn render_preview(draft: &InvoiceDraft, template: Option<&OrganizationTemplate>) -> PreviewLayout {
    let subject = draft.subject.as_ref();

    let rows: Vec<PreviewRow> = draft
        .ledger
        .items()
        .iter()
        .filter(|item| !item.category.is_empty() || item.rate.is_some())
        .enumerate()
        .map(|(i, item)| PreviewRow {
            serial: i + 1,
            item: if item.name.trim().is_empty() {
                item.category.clone()
            } else {
                item.name.clone()
            },
            category: item.category.clone(),
            quantity: item.quantity.to_string(),
            rate: money_cell(item.rate.map(format_money)),
            amount: money_cell(Some(format_money(item.amount()))),
        })
        .collect();

    let rows = if rows.is_empty() {
        vec![placeholder_row()]
    } else {
        rows
    };

    let total = draft.ledger.total();
    let words = amount_to_words(whole_rupees(total));
    let total_in_words = if words == AMOUNT_TOO_LARGE {
        words
    } else {
        format!("{} Rupees Only", words)
    };

    PreviewLayout {
        org_name: template
            .map(|t| t.org_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ORG_NAME_PLACEHOLDER.to_string()),
        org_place: template.map(|t| t.org_place.clone()).unwrap_or_default(),
        org_contact: template.map(contact_line).unwrap_or_default(),
        theme_color: template
            .map(OrganizationTemplate::css_color)
            .unwrap_or_else(|| DEFAULT_THEME_COLOR.to_string()),
        bill_to_name: subject
            .map(|s| s.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| STUDENT_NAME_PLACEHOLDER.to_string()),
        bill_to_id: non_empty_or(draft.subject_id.trim(), STUDENT_ID_PLACEHOLDER),
        bill_to_class: subject
            .map(|s| s.class_label.clone())
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| CLASS_PLACEHOLDER.to_string()),
        invoice_number: draft.invoice_number.to_string(),
        invoice_date: display_date(draft.issue_date),
        due_date: draft
            .due_date
            .map(display_date)
            .unwrap_or_else(|| DATE_PLACEHOLDER.to_string()),
        description: Some(draft.description.trim().to_string()).filter(|d| !d.is_empty()),
        rows,
        total: format!("{} {}", CURRENCY_SYMBOL, format_currency_text(total)),
        total_in_words,
        barcode: BARCODE_GLYPHS,
    }
}

impl PreviewLayout {
    /// Plain-text rendition of the bill, as it would be printed.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.org_name);
        out.push('\n');
        for line in [&self.org_place, &self.org_contact] {
            if !line.is_empty() {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');
        out.push_str(&format!("BILL TO: {}\n", self.bill_to_name));
        out.push_str(&format!("ID: {}\n", self.bill_to_id));
        out.push_str(&format!("Class: {}\n", self.bill_to_class));
        out.push_str(&format!(
            "Invoice No.: {}  Invoice Date: {}  Due Date: {}\n",
            self.invoice_number, self.invoice_date, self.due_date
        ));
        if let Some(description) = &self.description {
            out.push_str(&format!("DESCRIPTION: {}\n", description));
        }
        out.push('\n');
        out.push_str("S.NO | ITEM | CATEGORY | QTY | RATE | AMOUNT\n");
        for row in &self.rows {
            out.push_str(&format!(
                "{} | {} | {} | {} | {} | {}\n",
                row.serial, row.item, row.category, row.quantity, row.rate, row.amount
            ));
        }
        out.push('\n');
        out.push_str(&format!("TOTAL AMOUNT: {}\n", self.total));
        out.push_str(&format!("Total Amount (in words): {}\n", self.total_in_words));
        out.push_str(self.barcode);
        out.push('\n');
        out.push_str("Thank you for your payment!\nThis is a computer generated bill.\n");
        out
    }
}

fn placeholder_row() -> PreviewRow {
    PreviewRow {
        serial: 1,
        item: "[Item Name]".to_string(),
        category: "[Category]".to_string(),
        quantity: "1".to_string(),
        rate: money_cell(None),
        amount: money_cell(None),
    }
}

fn money_cell(value: Option<String>) -> String {
    format!("{}{}", CURRENCY_SYMBOL, value.unwrap_or_else(|| "0.00".to_string()))
}

fn contact_line(template: &OrganizationTemplate) -> String {
    match (template.org_phone.trim(), template.org_email.trim()) {
        ("", "") => String::new(),
        (phone, "") => format!("+91 {}", phone),
        ("", email) => email.to_string(),
        (phone, email) => format!("+91 {} • {}", phone, email),
    }
}

fn non_empty_or(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Day/month/year without zero padding, as bills are printed locally.
fn display_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}
