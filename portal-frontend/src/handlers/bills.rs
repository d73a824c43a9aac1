//! Bill creation. The draft lives in the user's session; every edit returns
//! a freshly rendered preview, and submission resets the draft.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Form,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tower_sessions::Session;

use crate::billing::{
    build_invoice, check_submittable, format_currency_text, format_money, render_preview,
    BillingSubject, CategorySet, InvoiceDraft, ItemField, PaymentMode, PreviewLayout,
};
use crate::billing::preview::CURRENCY_SYMBOL;
use crate::error::{Notice, Notify};
use crate::models::category::category_set;
use crate::models::session::{discard_draft, load_draft, store_draft, SessionContext};
use crate::models::student::Student;
use crate::models::template::OrganizationTemplate;
use crate::services::metrics::{record_bill_submitted, record_preview};
use crate::AppState;

use super::{select_options, today, SelectOption};

pub const BILL_CONTEXT_KEY: &str = "bill_context";
const MIN_SEARCH_LEN: usize = 2;

/// Organization data a bill is checked and printed against. Fetched when
/// the bill page opens and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillContext {
    pub template: Option<OrganizationTemplate>,
    pub categories: CategorySet,
}

#[derive(Template)]
#[template(path = "bills/page.html")]
pub struct BillPage {
    pub user_name: String,
    pub workspace: BillWorkspace,
}

pub struct EditorRow {
    pub index: usize,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub rate: String,
    pub amount: String,
    pub categories: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "bills/workspace.html")]
pub struct BillWorkspace {
    pub invoice_number: String,
    pub rows: Vec<EditorRow>,
    pub can_remove: bool,
    pub subject_name: String,
    pub subject_id: String,
    pub due_date: String,
    pub description: String,
    pub payment_modes: Vec<SelectOption>,
    pub online: bool,
    pub transaction_id: String,
    pub total: String,
    pub preview: PreviewFragment,
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "bills/preview.html")]
pub struct PreviewFragment {
    pub layout: PreviewLayout,
}

#[derive(Template)]
#[template(path = "bills/item_update.html")]
pub struct ItemUpdate {
    pub index: usize,
    pub amount: String,
    pub total: String,
    pub preview: PreviewFragment,
}

#[derive(Template)]
#[template(path = "bills/subjects.html")]
pub struct SubjectResults {
    pub query: String,
    pub students: Vec<Student>,
}

#[derive(Debug, Deserialize)]
pub struct ItemInput {
    pub field: ItemField,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SubjectQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SubjectChoice {
    pub name: String,
    pub student_id: String,
    #[serde(default)]
    pub class_label: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailsInput {
    #[serde(default)]
    pub subject_id: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payment_mode: String,
    #[serde(default)]
    pub transaction_id: String,
}

fn preview_of(draft: &InvoiceDraft, bill: &BillContext) -> PreviewFragment {
    record_preview();
    PreviewFragment {
        layout: render_preview(draft, bill.template.as_ref()),
    }
}

fn total_text(draft: &InvoiceDraft) -> String {
    format!("{} {}", CURRENCY_SYMBOL, format_currency_text(draft.ledger.total()))
}

fn workspace(draft: &InvoiceDraft, bill: &BillContext, notice: Option<Notice>) -> BillWorkspace {
    let rows = draft
        .ledger
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| EditorRow {
            index,
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
            rate: item.rate.map(|r| r.to_string()).unwrap_or_default(),
            amount: format_money(item.amount()),
            categories: select_options(bill.categories.names().iter().cloned(), &item.category),
        })
        .collect();
    let payment_mode = draft.payment_mode.map(|m| m.as_str()).unwrap_or_default();

    BillWorkspace {
        invoice_number: draft.invoice_number.to_string(),
        rows,
        can_remove: draft.ledger.len() > 1,
        subject_name: draft
            .subject
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default(),
        subject_id: draft.subject_id.clone(),
        due_date: draft
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        description: draft.description.clone(),
        payment_modes: select_options(PaymentMode::ALL.iter().map(PaymentMode::as_str), payment_mode),
        online: draft.payment_mode == Some(PaymentMode::Online),
        transaction_id: draft.transaction_id.clone(),
        total: total_text(draft),
        preview: preview_of(draft, bill),
        notice,
    }
}

async fn fetch_bill_context(state: &AppState, context: &SessionContext) -> (BillContext, Option<Notice>) {
    let mut problems = Vec::new();

    let template = match state.backend.template(&context.access_token).await {
        Ok(template) => template,
        Err(e) => {
            tracing::warn!(error = %e, "Bill template unavailable, previewing with placeholders");
            problems.push(format!("Bill template: {}", e.user_message()));
            None
        }
    };

    let categories = match context.organization() {
        Ok(organization) => match state
            .backend
            .categories(&context.access_token, organization)
            .await
        {
            Ok(categories) => category_set(&categories),
            Err(e) => {
                tracing::warn!(error = %e, "Fee categories unavailable");
                problems.push(format!("Fee categories: {}", e.user_message()));
                CategorySet::default()
            }
        },
        Err(e) => {
            problems.push(e.user_message());
            CategorySet::default()
        }
    };

    let notice = (!problems.is_empty())
        .then(|| Notice::error("Some organization data could not be loaded").with_details(problems));
    (BillContext { template, categories }, notice)
}

/// Reads the stored context, fetching it when the bill page was never opened.
async fn bill_context(state: &AppState, context: &SessionContext, session: &Session) -> Result<BillContext, AppError> {
    if let Ok(Some(bill)) = session.get::<BillContext>(BILL_CONTEXT_KEY).await {
        return Ok(bill);
    }
    let (bill, _) = fetch_bill_context(state, context).await;
    store_bill_context(session, &bill).await?;
    Ok(bill)
}

async fn store_bill_context(session: &Session, bill: &BillContext) -> Result<(), AppError> {
    session
        .insert(BILL_CONTEXT_KEY, bill)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {}", e)))
}

async fn current_draft(session: &Session) -> Result<InvoiceDraft, AppError> {
    match load_draft(session).await {
        Some(draft) => Ok(draft),
        None => {
            let draft = InvoiceDraft::new(today());
            store_draft(session, &draft).await?;
            Ok(draft)
        }
    }
}

pub async fn bill_page(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
) -> Result<impl IntoResponse, Notify> {
    let (bill, notice) = fetch_bill_context(&state, &context).await;
    store_bill_context(&session, &bill).await?;
    let draft = current_draft(&session).await?;

    tracing::debug!(draft_id = %draft.draft_id, "Bill editor opened");
    Ok(BillPage {
        user_name: context.user.name,
        workspace: workspace(&draft, &bill, notice),
    })
}

pub async fn add_item(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
) -> Result<BillWorkspace, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let mut draft = current_draft(&session).await?;
    draft.ledger.add_item();
    store_draft(&session, &draft).await?;
    Ok(workspace(&draft, &bill, None))
}

pub async fn remove_item(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
    Path(index): Path<usize>,
) -> Result<BillWorkspace, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let mut draft = current_draft(&session).await?;
    if draft.ledger.remove_item(index) {
        store_draft(&session, &draft).await?;
    }
    Ok(workspace(&draft, &bill, None))
}

pub async fn update_item(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
    Path(index): Path<usize>,
    Form(input): Form<ItemInput>,
) -> Result<ItemUpdate, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let mut draft = current_draft(&session).await?;
    if !draft.ledger.update_item(index, input.field, &input.value) {
        return Err(AppError::NotFound(format!("Item {} does not exist", index + 1)).into());
    }
    store_draft(&session, &draft).await?;

    let amount = draft.ledger.items()[index].amount();
    Ok(ItemUpdate {
        index,
        amount: format_money(amount),
        total: total_text(&draft),
        preview: preview_of(&draft, &bill),
    })
}

pub async fn search_subjects(
    State(state): State<AppState>,
    context: SessionContext,
    Query(search): Query<SubjectQuery>,
) -> Result<SubjectResults, Notify> {
    let query = search.query.trim().to_string();
    let students = if query.chars().count() < MIN_SEARCH_LEN {
        Vec::new()
    } else {
        state
            .backend
            .search_students(&context.access_token, &query)
            .await?
    };
    Ok(SubjectResults { query, students })
}

pub async fn select_subject(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
    Form(choice): Form<SubjectChoice>,
) -> Result<BillWorkspace, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let mut draft = current_draft(&session).await?;
    draft.select_subject(BillingSubject {
        name: choice.name,
        external_id: choice.student_id,
        class_label: choice.class_label,
    });
    store_draft(&session, &draft).await?;
    Ok(workspace(&draft, &bill, None))
}

pub async fn update_details(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
    Form(input): Form<DetailsInput>,
) -> Result<BillWorkspace, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let mut draft = current_draft(&session).await?;

    draft.due_date = parse_due_date(&input.due_date)?;
    draft.subject_id = input.subject_id;
    draft.description = input.description;
    draft.payment_mode = PaymentMode::from_form(&input.payment_mode);
    draft.transaction_id = input.transaction_id;

    store_draft(&session, &draft).await?;
    Ok(workspace(&draft, &bill, None))
}

fn parse_due_date(value: &str) -> Result<Option<NaiveDate>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::BadRequest("Please enter a valid due date".to_string()))
}

pub async fn preview_fragment(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
) -> Result<PreviewFragment, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let draft = current_draft(&session).await?;
    Ok(preview_of(&draft, &bill))
}

/// The bill as printable plain text.
pub async fn preview_text(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
) -> Result<impl IntoResponse, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let draft = current_draft(&session).await?;
    let text = render_preview(&draft, bill.template.as_ref()).to_text();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    ))
}

/// Validates and sends the bill, then starts a fresh draft. On any failure
/// the draft is left untouched for the user to fix and resend.
pub async fn submit_bill(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
) -> Result<BillWorkspace, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let draft = current_draft(&session).await?;

    check_submittable(&draft.ledger, &bill.categories)?;
    let meta = draft.meta()?;
    let subject = draft.effective_subject();
    let issuer = bill.template.clone().unwrap_or_default();
    let document = build_invoice(subject.as_ref(), &draft.ledger, &issuer, meta)?;

    let message = state
        .backend
        .submit_bill(&context.access_token, &document)
        .await?;

    record_bill_submitted(document.payment.mode().as_str());
    tracing::info!(
        draft_id = %document.draft_id,
        invoice_number = %document.invoice_number,
        total = %document.total(),
        "Bill submitted"
    );

    discard_draft(&session).await?;
    let fresh = InvoiceDraft::new(today());
    store_draft(&session, &fresh).await?;
    Ok(workspace(&fresh, &bill, Some(Notice::success(message))))
}

/// Throws the current draft away and starts over.
pub async fn reset_bill(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
) -> Result<BillWorkspace, Notify> {
    let bill = bill_context(&state, &context, &session).await?;
    let fresh = InvoiceDraft::new(today());
    store_draft(&session, &fresh).await?;
    Ok(workspace(&fresh, &bill, None))
}
