//! Student roster: paged listing, single add, CSV bulk import and removal.

use askama::Template;
use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse},
    Form,
};
use service_core::error::AppError;
use tower_sessions::Session;

use crate::error::{Notice, Notify};
use crate::models::roster::{RosterUpload, RowError};
use crate::models::session::{
    discard_roster_upload, load_roster_upload, store_roster_upload, SessionContext,
};
use crate::models::student::{Pagination, Student, StudentFilter, StudentForm};
use crate::AppState;

use super::{select_options, SelectOption};

pub const CSV_FIELD: &str = "file";

#[derive(Template)]
#[template(path = "students/page.html")]
pub struct StudentsPage {
    pub user_name: String,
    pub query: String,
    pub class_filter: Vec<SelectOption>,
    pub section_filter: Vec<SelectOption>,
    pub classes: Vec<String>,
    pub sections: Vec<String>,
    pub list: StudentList,
}

pub struct PageLink {
    pub number: u32,
    pub current: bool,
}

#[derive(Template)]
#[template(path = "students/list.html")]
pub struct StudentList {
    pub students: Vec<Student>,
    pub pagination: Pagination,
    pub pages: Vec<PageLink>,
    pub notice: Option<Notice>,
}

/// One parsed CSV row as shown before saving. `number` counts from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub number: usize,
    pub name: String,
    pub class: String,
    pub section: String,
    pub student_id: String,
    pub invalid: bool,
}

#[derive(Template)]
#[template(path = "students/roster_preview.html")]
pub struct RosterPreview {
    pub rows: Vec<PreviewRow>,
    pub errors: Vec<RowError>,
    pub invalid_count: usize,
}

impl RosterPreview {
    pub fn new(upload: &RosterUpload) -> Self {
        let rows = upload
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| PreviewRow {
                number: i + 1,
                name: row.name.clone(),
                class: row.class.clone(),
                section: row.section.clone(),
                student_id: row.student_id.clone(),
                invalid: upload.report.is_invalid(i + 1),
            })
            .collect();
        Self {
            rows,
            errors: upload.report.errors.clone(),
            invalid_count: upload.report.invalid_rows.len(),
        }
    }

    pub fn can_save(&self) -> bool {
        self.invalid_count == 0
    }
}

/// The refreshed list after an import, clearing the preview out of band.
#[derive(Template)]
#[template(path = "students/imported.html")]
pub struct ImportResult {
    pub list: StudentList,
}

const EMPTY_PREVIEW: &str = r#"<div id="roster-preview"></div>"#;

async fn refetch_students(
    state: &AppState,
    context: &SessionContext,
    filter: StudentFilter,
    notice: Option<Notice>,
) -> Result<StudentList, Notify> {
    let organization = context.organization()?;
    let page = state
        .backend
        .students(&context.access_token, organization, &filter)
        .await?;
    let pages = page
        .pagination
        .pages()
        .into_iter()
        .map(|number| PageLink {
            number,
            current: number == page.pagination.page,
        })
        .collect();
    Ok(StudentList {
        students: page.students,
        pagination: page.pagination,
        pages,
        notice,
    })
}

pub async fn students_page(
    State(state): State<AppState>,
    context: SessionContext,
    Query(filter): Query<StudentFilter>,
) -> Result<impl IntoResponse, Notify> {
    let list = refetch_students(&state, &context, filter.clone(), None).await?;
    Ok(StudentsPage {
        user_name: context.user.name,
        query: filter.query,
        class_filter: select_options(state.school.classes.iter().cloned(), &filter.class),
        section_filter: select_options(state.school.sections.iter().cloned(), &filter.section),
        classes: state.school.classes.clone(),
        sections: state.school.sections.clone(),
        list,
    })
}

pub async fn student_list(
    State(state): State<AppState>,
    context: SessionContext,
    Query(filter): Query<StudentFilter>,
) -> Result<StudentList, Notify> {
    refetch_students(&state, &context, filter, None).await
}

pub async fn add_student(
    State(state): State<AppState>,
    context: SessionContext,
    Form(form): Form<StudentForm>,
) -> Result<StudentList, Notify> {
    form.validate_with(&state.school.classes)?;
    let organization = context.organization()?;
    let message = state
        .backend
        .add_student(&context.access_token, organization, &form)
        .await?;
    tracing::info!(student_id = %form.student_id, organization, "Student added");
    refetch_students(
        &state,
        &context,
        StudentFilter::default(),
        Some(Notice::success(message)),
    )
    .await
}

async fn read_csv(mut multipart: Multipart) -> Result<Bytes, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some(CSV_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
            upload = Some(bytes);
        }
    }
    upload.ok_or_else(|| AppError::BadRequest("Please choose a CSV file".to_string()))
}

/// Parses a CSV upload and shows every row, invalid ones highlighted.
/// Nothing is sent yet; the rows wait in the session for confirmation.
pub async fn preview_upload(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<RosterPreview, Notify> {
    let bytes = read_csv(multipart).await?;
    let upload = match RosterUpload::parse(&bytes, &state.school.classes) {
        Ok(upload) => upload,
        Err(e) => {
            discard_roster_upload(&session).await?;
            return Err(e.into());
        }
    };

    if upload.report.is_valid() {
        store_roster_upload(&session, &upload.rows).await?;
    } else {
        discard_roster_upload(&session).await?;
    }
    tracing::debug!(
        rows = upload.rows.len(),
        invalid = upload.report.invalid_rows.len(),
        "Roster upload previewed"
    );
    Ok(RosterPreview::new(&upload))
}

/// Saves the previewed rows. They are checked again against the current
/// class list; nothing is sent unless every row passes.
pub async fn bulk_upload(
    State(state): State<AppState>,
    context: SessionContext,
    session: Session,
) -> Result<ImportResult, Notify> {
    let rows = load_roster_upload(&session)
        .await
        .ok_or_else(|| AppError::BadRequest("Please upload a CSV file first".to_string()))?;
    let rows = RosterUpload::check(rows, &state.school.classes)?.into_rows()?;

    let organization = context.organization()?;
    let message = state
        .backend
        .add_students_bulk(&context.access_token, organization, &rows)
        .await?;
    discard_roster_upload(&session).await?;
    tracing::info!(count = rows.len(), organization, "Students imported");

    let list = refetch_students(
        &state,
        &context,
        StudentFilter::default(),
        Some(Notice::success(message)),
    )
    .await?;
    Ok(ImportResult { list })
}

pub async fn discard_upload(session: Session) -> Result<Html<&'static str>, Notify> {
    discard_roster_upload(&session).await?;
    Ok(Html(EMPTY_PREVIEW))
}

pub async fn delete_student(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<String>,
    Form(filter): Form<StudentFilter>,
) -> Result<StudentList, Notify> {
    let message = state
        .backend
        .delete_student(&context.access_token, &id)
        .await?;
    tracing::info!(student = %id, "Student removed");
    refetch_students(&state, &context, filter, Some(Notice::success(message))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roster::RosterRow;

    fn row(name: &str, class: &str, student_id: &str) -> RosterRow {
        RosterRow {
            name: name.to_string(),
            class: class.to_string(),
            student_id: student_id.to_string(),
            section: String::new(),
        }
    }

    #[test]
    fn preview_flags_only_the_rows_that_failed() {
        let classes = vec!["1".to_string(), "2".to_string()];
        let upload = RosterUpload::check(
            vec![row("Asha", "1", "S-1"), row("", "7", "S-2"), row("Ravi", "2", "S-3")],
            &classes,
        )
        .unwrap();

        let preview = RosterPreview::new(&upload);
        let flags: Vec<bool> = preview.rows.iter().map(|r| r.invalid).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert_eq!(preview.rows[1].number, 2);
        assert_eq!(preview.errors.len(), 2);
        assert_eq!(preview.invalid_count, 1);
        assert!(!preview.can_save());
    }

    #[test]
    fn clean_upload_can_be_saved() {
        let classes = vec!["1".to_string()];
        let upload = RosterUpload::check(vec![row("Asha", "1", "S-1")], &classes).unwrap();
        let preview = RosterPreview::new(&upload);

        assert!(preview.can_save());
        assert!(preview.errors.is_empty());
        assert!(preview.to_string().contains("Save 1 student(s)"));
    }
}
