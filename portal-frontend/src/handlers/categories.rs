//! Fee categories of the signed-in admin's organization. Every write is
//! followed by a fresh fetch of the list.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Form,
};
use validator::Validate;

use crate::error::{Notice, Notify};
use crate::models::category::{Category, CategoryForm};
use crate::models::session::SessionContext;
use crate::AppState;

#[derive(Template)]
#[template(path = "categories/page.html")]
pub struct CategoriesPage {
    pub user_name: String,
    pub list: CategoryList,
}

#[derive(Template)]
#[template(path = "categories/list.html")]
pub struct CategoryList {
    pub categories: Vec<Category>,
    pub notice: Option<Notice>,
}

async fn refetch_categories(
    state: &AppState,
    context: &SessionContext,
    notice: Option<Notice>,
) -> Result<CategoryList, Notify> {
    let organization = context.organization()?;
    let categories = state
        .backend
        .categories(&context.access_token, organization)
        .await?;
    Ok(CategoryList { categories, notice })
}

pub async fn categories_page(
    State(state): State<AppState>,
    context: SessionContext,
) -> Result<impl IntoResponse, Notify> {
    let list = refetch_categories(&state, &context, None).await?;
    Ok(CategoriesPage {
        user_name: context.user.name,
        list,
    })
}

pub async fn create_category(
    State(state): State<AppState>,
    context: SessionContext,
    Form(form): Form<CategoryForm>,
) -> Result<CategoryList, Notify> {
    form.validate()?;
    let organization = context.organization()?;
    let message = state
        .backend
        .create_category(&context.access_token, organization, &form)
        .await?;
    tracing::info!(category = %form.name, organization, "Category created");
    refetch_categories(&state, &context, Some(Notice::success(message))).await
}

pub async fn update_category(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Result<CategoryList, Notify> {
    form.validate()?;
    let message = state
        .backend
        .update_category(&context.access_token, &id, &form)
        .await?;
    tracing::info!(category_id = %id, "Category updated");
    refetch_categories(&state, &context, Some(Notice::success(message))).await
}

pub async fn delete_category(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<String>,
) -> Result<CategoryList, Notify> {
    let message = state
        .backend
        .delete_category(&context.access_token, &id)
        .await?;
    tracing::info!(category_id = %id, "Category deleted");
    refetch_categories(&state, &context, Some(Notice::success(message))).await
}
