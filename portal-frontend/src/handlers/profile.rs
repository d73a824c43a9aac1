//! Portfolio profile pages: view, first-time onboarding, links and skills.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use validator::Validate;

use crate::error::{Notice, Notify};
use crate::middleware::auth::redirect;
use crate::models::profile::{
    Link, LinkForm, LinkType, OnboardingForm, Profile, SkillCategory, SkillCategoryForm, SkillForm,
};
use crate::models::session::SessionContext;
use crate::AppState;

#[derive(Template)]
#[template(path = "profile/page.html")]
pub struct ProfilePage {
    pub profile: Profile,
    pub links: LinkList,
    pub skills: SkillBoard,
}

#[derive(Template)]
#[template(path = "profile/links.html")]
pub struct LinkList {
    pub links: Vec<Link>,
    pub types: Vec<LinkType>,
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "profile/skills.html")]
pub struct SkillBoard {
    pub categories: Vec<SkillCategory>,
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "onboarding/profile.html")]
pub struct OnboardingPage {
    pub name: String,
    pub avatars: Vec<String>,
    pub backgrounds: Vec<String>,
}

async fn refetch_links(
    state: &AppState,
    context: &SessionContext,
    notice: Option<Notice>,
) -> Result<LinkList, Notify> {
    let profile = state.backend.profile(&context.access_token).await?;
    let types = state.backend.link_types(&context.access_token).await?;
    Ok(LinkList {
        links: profile.links,
        types,
        notice,
    })
}

async fn refetch_skills(
    state: &AppState,
    context: &SessionContext,
    notice: Option<Notice>,
) -> Result<SkillBoard, Notify> {
    let categories = state.backend.skills(&context.access_token).await?;
    Ok(SkillBoard { categories, notice })
}

pub async fn profile_page(
    State(state): State<AppState>,
    context: SessionContext,
) -> Result<impl IntoResponse, Notify> {
    let token = &context.access_token;
    let profile = state.backend.profile(token).await?;
    let types = state.backend.link_types(token).await?;
    let categories = state.backend.skills(token).await?;
    Ok(ProfilePage {
        links: LinkList {
            links: profile.links.clone(),
            types,
            notice: None,
        },
        skills: SkillBoard {
            categories,
            notice: None,
        },
        profile,
    })
}

pub async fn onboarding_page(
    State(state): State<AppState>,
    context: SessionContext,
) -> Result<impl IntoResponse, Notify> {
    let avatars = state.backend.avatars(&context.access_token).await?;
    let backgrounds = state.backend.backgrounds(&context.access_token).await?;
    Ok(OnboardingPage {
        name: context.user.name,
        avatars,
        backgrounds,
    })
}

pub async fn submit_onboarding(
    State(state): State<AppState>,
    context: SessionContext,
    headers: HeaderMap,
    Form(form): Form<OnboardingForm>,
) -> Result<Response, Notify> {
    form.check()
        .map_err(|message| Notify::new(StatusCode::UNPROCESSABLE_ENTITY, Notice::error(message)))?;
    state
        .backend
        .onboard(&context.access_token, &form)
        .await?;
    tracing::info!(username = %form.username, "Profile onboarding completed");
    Ok(redirect(&headers, "/dashboard"))
}

pub async fn create_link(
    State(state): State<AppState>,
    context: SessionContext,
    Form(form): Form<LinkForm>,
) -> Result<LinkList, Notify> {
    save_link(state, context, None, form).await
}

pub async fn update_link(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<String>,
    Form(form): Form<LinkForm>,
) -> Result<LinkList, Notify> {
    save_link(state, context, Some(id), form).await
}

async fn save_link(
    state: AppState,
    context: SessionContext,
    id: Option<String>,
    form: LinkForm,
) -> Result<LinkList, Notify> {
    form.validate()?;
    let types = state.backend.link_types(&context.access_token).await?;
    let message = state
        .backend
        .save_link(&context.access_token, id.as_deref(), &form, &types)
        .await?;
    refetch_links(&state, &context, Some(Notice::success(message))).await
}

pub async fn add_skill_category(
    State(state): State<AppState>,
    context: SessionContext,
    Form(form): Form<SkillCategoryForm>,
) -> Result<SkillBoard, Notify> {
    form.validate()?;
    let message = state
        .backend
        .add_skill_category(&context.access_token, &form)
        .await?;
    refetch_skills(&state, &context, Some(Notice::success(message))).await
}

pub async fn delete_skill_category(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<String>,
) -> Result<SkillBoard, Notify> {
    let message = state
        .backend
        .delete_skill_category(&context.access_token, &id)
        .await?;
    refetch_skills(&state, &context, Some(Notice::success(message))).await
}

pub async fn add_skill(
    State(state): State<AppState>,
    context: SessionContext,
    Form(form): Form<SkillForm>,
) -> Result<SkillBoard, Notify> {
    form.validate()?;
    let message = state.backend.add_skill(&context.access_token, &form).await?;
    refetch_skills(&state, &context, Some(Notice::success(message))).await
}

pub async fn delete_skill(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<String>,
) -> Result<SkillBoard, Notify> {
    let message = state
        .backend
        .delete_skill(&context.access_token, &id)
        .await?;
    refetch_skills(&state, &context, Some(Notice::success(message))).await
}
