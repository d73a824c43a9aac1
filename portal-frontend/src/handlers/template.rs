use askama::Template;
use axum::{extract::State, response::IntoResponse, Form};
use validator::Validate;

use crate::error::{Notice, Notify};
use crate::models::session::SessionContext;
use crate::models::template::{OrganizationTemplate, TemplateForm, ThemeColor};
use crate::AppState;

#[derive(Template)]
#[template(path = "template/page.html")]
pub struct TemplatePage {
    pub user_name: String,
    pub editor: TemplateEditor,
}

pub struct ThemeOption {
    pub id: &'static str,
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "template/editor.html")]
pub struct TemplateEditor {
    pub template: OrganizationTemplate,
    pub themes: Vec<ThemeOption>,
    pub swatch: String,
    pub notice: Option<Notice>,
}

impl TemplateEditor {
    fn new(template: Option<OrganizationTemplate>, notice: Option<Notice>) -> Self {
        let template = template.unwrap_or_default();
        let selected = ThemeColor::from_id(&template.theme_color);
        let themes = ThemeColor::ALL
            .into_iter()
            .map(|theme| ThemeOption {
                id: theme.id(),
                name: theme.name(),
                primary: theme.primary(),
                secondary: theme.secondary(),
                selected: selected == Some(theme),
            })
            .collect();
        Self {
            swatch: template.css_color(),
            template,
            themes,
            notice,
        }
    }
}

pub async fn template_page(
    State(state): State<AppState>,
    context: SessionContext,
) -> Result<impl IntoResponse, Notify> {
    let template = state.backend.template(&context.access_token).await?;
    Ok(TemplatePage {
        user_name: context.user.name,
        editor: TemplateEditor::new(template, None),
    })
}

pub async fn update_template(
    State(state): State<AppState>,
    context: SessionContext,
    Form(form): Form<TemplateForm>,
) -> Result<TemplateEditor, Notify> {
    form.validate()?;
    let message = state
        .backend
        .update_template(&context.access_token, &form)
        .await?;
    tracing::info!(theme = %form.theme_color, "Bill template updated");

    let template = state.backend.template(&context.access_token).await?;
    Ok(TemplateEditor::new(template, Some(Notice::success(message))))
}
