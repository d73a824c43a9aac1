//! Bill computation and preview: formatting, line items, invoice assembly
//! and the printable projection. Everything here is pure.

pub mod draft;
pub mod invoice;
pub mod ledger;
pub mod money;
pub mod preview;

pub use draft::InvoiceDraft;
pub use invoice::{
    BillingSubject, InvoiceDocument, InvoiceError, InvoiceMeta, InvoiceNumber, Payment,
    PaymentMode, build_invoice, check_submittable,
};
pub use ledger::{CategorySet, ItemField, ItemFieldError, Ledger, LineItem};
pub use money::{amount_to_words, format_currency_text, format_money, whole_rupees};
pub use preview::{PreviewLayout, render_preview};
