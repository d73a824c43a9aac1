use chrono::NaiveDate;
use portal_frontend::billing::{
    amount_to_words, build_invoice, check_submittable, format_currency_text, format_money,
    render_preview, whole_rupees, BillingSubject, CategorySet, InvoiceDraft, InvoiceError,
    ItemField, Ledger, Payment, PaymentMode,
};
use portal_frontend::models::template::OrganizationTemplate;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(text: &str) -> Decimal {
    Decimal::from_str(text).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn subject() -> BillingSubject {
    BillingSubject {
        name: "Asha Rao".to_string(),
        external_id: "S-101".to_string(),
        class_label: "5-A".to_string(),
    }
}

fn school() -> OrganizationTemplate {
    OrganizationTemplate {
        org_name: "Green Valley School".to_string(),
        org_place: "Pune".to_string(),
        org_phone: "8624800390".to_string(),
        org_email: "office@gvs.in".to_string(),
        theme_color: "#1d4ed8".to_string(),
    }
}

fn tuition_draft() -> InvoiceDraft {
    let mut draft = InvoiceDraft::new(today());
    draft.select_subject(subject());
    draft.ledger.update_item(0, ItemField::Category, "Tuition");
    draft.ledger.update_item(0, ItemField::Quantity, "2");
    draft.ledger.update_item(0, ItemField::Rate, "500");
    draft.payment_mode = Some(PaymentMode::Cash);
    draft
}

#[test]
fn amounts_are_spelled_with_lakh_and_thousand() {
    assert_eq!(amount_to_words(0), "Zero");
    assert_eq!(amount_to_words(15), "Fifteen");
    assert_eq!(amount_to_words(19), "Nineteen");
    assert_eq!(amount_to_words(105), "One Hundred Five");
    assert_eq!(amount_to_words(100_000), "One Lakh");
    assert_eq!(amount_to_words(1_000), "One Thousand");
    assert_eq!(amount_to_words(1_050), "One Thousand Fifty");
    assert_eq!(
        amount_to_words(123_456),
        "One Lakh Twenty Three Thousand Four Hundred Fifty Six"
    );
    assert_eq!(
        amount_to_words(9_999_999),
        "Ninety Nine Lakh Ninety Nine Thousand Nine Hundred Ninety Nine"
    );
    assert_eq!(amount_to_words(10_000_000), "Amount too large");
}

#[test]
fn currency_text_uses_indian_grouping() {
    assert_eq!(format_currency_text(dec("1234567")), "12,34,567");
    assert_eq!(format_currency_text(dec("999")), "999");
    assert_eq!(format_currency_text(dec("100000")), "1,00,000");
    assert_eq!(format_money(dec("1000")), "1,000.00");
}

#[test]
fn half_rupees_round_away_from_zero() {
    assert_eq!(whole_rupees(dec("10.5")), 11);
    assert_eq!(whole_rupees(dec("10.49")), 10);
    assert_eq!(whole_rupees(dec("-3")), 0);
}

#[test]
fn ledger_never_drops_its_last_row() {
    let mut ledger = Ledger::new();
    assert!(!ledger.remove_item(0));
    assert_eq!(ledger.len(), 1);

    ledger.add_item();
    ledger.add_item();
    assert!(ledger.remove_item(1));
    assert!(!ledger.remove_item(5));
    assert_eq!(ledger.len(), 2);
}

#[test]
fn adding_then_removing_a_row_keeps_the_others_intact() {
    let mut ledger = Ledger::new();
    ledger.update_item(0, ItemField::Category, "Tuition");
    ledger.update_item(0, ItemField::Rate, "500");
    ledger.add_item();
    ledger.update_item(1, ItemField::Name, "Bus pass");
    ledger.update_item(1, ItemField::Category, "Transport");
    ledger.update_item(1, ItemField::Quantity, "3");
    ledger.update_item(1, ItemField::Rate, "120");
    let before = ledger.clone();

    ledger.add_item();
    assert!(ledger.remove_item(2));

    assert_eq!(ledger, before);
}

#[test]
fn huge_rates_never_break_the_bill() {
    let mut draft = tuition_draft();
    draft
        .ledger
        .update_item(0, ItemField::Rate, "79228162514264337593543950335");

    assert_eq!(draft.ledger.items()[0].rate, Some(Decimal::ZERO));
    assert_eq!(draft.ledger.total(), Decimal::ZERO);

    let layout = render_preview(&draft, Some(&school()));
    assert_eq!(layout.total, "₹ 0");
    assert_eq!(layout.rows[0].amount, "₹0.00");
}

#[test]
fn rates_of_a_crore_or_more_read_as_zero() {
    let mut ledger = Ledger::new();
    ledger.update_item(0, ItemField::Category, "Tuition");
    ledger.update_item(0, ItemField::Rate, "10000000");
    assert_eq!(ledger.total(), Decimal::ZERO);

    ledger.update_item(0, ItemField::Rate, "9999999.99");
    assert_eq!(ledger.total(), dec("9999999.99"));
}

#[test]
fn ledger_total_counts_rows_with_a_category() {
    let mut ledger = Ledger::new();
    ledger.update_item(0, ItemField::Rate, "250");
    assert_eq!(ledger.total(), Decimal::ZERO);

    ledger.update_item(0, ItemField::Category, "Transport");
    ledger.add_item();
    ledger.update_item(1, ItemField::Category, "Books");
    ledger.update_item(1, ItemField::Quantity, "3");
    ledger.update_item(1, ItemField::Rate, "120.50");
    assert_eq!(ledger.total(), dec("611.50"));
}

#[test]
fn updating_a_missing_row_changes_nothing() {
    let mut ledger = Ledger::new();
    let before = ledger.clone();
    assert!(!ledger.update_item(3, ItemField::Name, "Fees"));
    assert_eq!(ledger, before);
}

#[test]
fn tuition_bill_builds_end_to_end() {
    let draft = tuition_draft();
    let categories = CategorySet::new(["Tuition", "Transport"]);

    check_submittable(&draft.ledger, &categories).unwrap();
    let document = build_invoice(
        draft.effective_subject().as_ref(),
        &draft.ledger,
        &school(),
        draft.meta().unwrap(),
    )
    .unwrap();

    assert_eq!(document.total(), dec("1000"));
    assert_eq!(document.total_in_words(), "One Thousand");
    assert_eq!(document.items.len(), 1);
    assert_eq!(document.payment, Payment::Cash);
    assert_eq!(document.subject_external_id, "S-101");
    assert_eq!(document.draft_id, draft.draft_id);
}

#[test]
fn invoice_requires_a_subject_and_complete_items() {
    let meta = || tuition_draft().meta().unwrap();
    let ledger = tuition_draft().ledger;

    assert_eq!(
        build_invoice(None, &ledger, &school(), meta()).unwrap_err(),
        InvoiceError::MissingSubject
    );

    let blank_id = BillingSubject {
        external_id: "  ".to_string(),
        ..subject()
    };
    assert_eq!(
        build_invoice(Some(&blank_id), &ledger, &school(), meta()).unwrap_err(),
        InvoiceError::MissingSubjectId
    );

    assert_eq!(
        build_invoice(Some(&subject()), &Ledger::new(), &school(), meta()).unwrap_err(),
        InvoiceError::NoCompleteItems
    );
}

#[test]
fn totals_of_a_crore_are_rejected() {
    let mut draft = tuition_draft();
    draft.ledger.update_item(0, ItemField::Quantity, "2");
    draft.ledger.update_item(0, ItemField::Rate, "5000000");

    let err = build_invoice(
        draft.effective_subject().as_ref(),
        &draft.ledger,
        &school(),
        draft.meta().unwrap(),
    )
    .unwrap_err();
    assert_eq!(err, InvoiceError::AmountTooLarge);
}

#[test]
fn incomplete_rows_block_submission_with_row_numbers() {
    let mut draft = tuition_draft();
    draft.ledger.add_item();
    draft.ledger.update_item(1, ItemField::Category, "Transport");

    match check_submittable(&draft.ledger, &CategorySet::default()) {
        Err(InvoiceError::IncompleteItems(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].row, 2);
            assert_eq!(errors[0].missing, vec![ItemField::Rate]);
        }
        other => panic!("expected incomplete items, got {:?}", other),
    }
}

#[test]
fn categories_outside_the_organization_list_are_rejected() {
    let draft = tuition_draft();
    let categories = CategorySet::new(["Transport"]);

    assert_eq!(
        check_submittable(&draft.ledger, &categories).unwrap_err(),
        InvoiceError::UnknownCategory(vec![(1, "Tuition".to_string())])
    );
}

#[test]
fn online_payments_need_a_transaction_id() {
    assert_eq!(
        Payment::from_input(Some(PaymentMode::Online), "  ").unwrap_err(),
        InvoiceError::MissingTransactionId
    );
    assert_eq!(
        Payment::from_input(Some(PaymentMode::Online), " TXN-1 ").unwrap(),
        Payment::Online {
            transaction_id: "TXN-1".to_string()
        }
    );
    assert_eq!(
        Payment::from_input(Some(PaymentMode::Cash), "ignored").unwrap(),
        Payment::Cash
    );
    assert_eq!(
        Payment::from_input(None, "").unwrap_err(),
        InvoiceError::MissingPaymentMode
    );
}

#[test]
fn blank_preview_shows_placeholders() {
    let draft = InvoiceDraft::new(today());
    let layout = render_preview(&draft, None);

    assert_eq!(layout.org_name, "[ORGANIZATION NAME]");
    assert_eq!(layout.bill_to_name, "[STUDENT NAME]");
    assert_eq!(layout.bill_to_id, "[STUDENT ID]");
    assert_eq!(layout.bill_to_class, "[CLASS]");
    assert_eq!(layout.theme_color, "#000000");
    assert_eq!(layout.rows.len(), 1);
    assert_eq!(layout.rows[0].item, "[Item Name]");
    assert_eq!(layout.total, "₹ 0");
    assert_eq!(layout.total_in_words, "Zero Rupees Only");
    assert_eq!(layout.description, None);
}

#[test]
fn tuition_preview_matches_the_bill() {
    let draft = tuition_draft();
    let layout = render_preview(&draft, Some(&school()));

    assert_eq!(layout.org_name, "Green Valley School");
    assert_eq!(layout.org_contact, "+91 8624800390 • office@gvs.in");
    assert_eq!(layout.bill_to_name, "Asha Rao");
    assert_eq!(layout.bill_to_class, "5-A");
    assert_eq!(layout.invoice_date, "19/10/2026");
    assert_eq!(layout.rows[0].item, "Tuition");
    assert_eq!(layout.rows[0].amount, "₹1,000.00");
    assert_eq!(layout.total, "₹ 1,000");
    assert_eq!(layout.total_in_words, "One Thousand Rupees Only");
}

#[test]
fn preview_dates_the_bill_by_its_issue_day() {
    let mut draft = tuition_draft();
    draft.issue_date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    let layout = render_preview(&draft, Some(&school()));
    assert_eq!(layout.invoice_date, "18/10/2026");

    let document = build_invoice(
        draft.effective_subject().as_ref(),
        &draft.ledger,
        &school(),
        draft.meta().unwrap(),
    )
    .unwrap();
    assert_eq!(document.issue_date, draft.issue_date);
}

#[test]
fn preview_is_stable_for_the_same_draft() {
    let draft = tuition_draft();
    let first = render_preview(&draft, Some(&school()));
    let second = render_preview(&draft, Some(&school()));

    assert_eq!(first, second);
    assert_eq!(first.to_text(), second.to_text());
    assert!(first.to_text().contains("TOTAL AMOUNT: ₹ 1,000"));
}
