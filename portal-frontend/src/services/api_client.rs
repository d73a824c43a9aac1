//! Typed client for the school backend's REST API.
//!
//! Every call carries the W3C trace context and the signed-in user's bearer
//! token, uses the configured short timeout and is never retried. Replies are
//! unwrapped from the `{ success, message, data }` envelope into
//! [`AppError`] values the handlers can show.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::error::{AppError, GENERIC_FAILURE_MESSAGE};
use service_core::observability::{TracedClientExt, TracedRequest};

use crate::billing::InvoiceDocument;
use crate::config::BackendSettings;
use crate::models::api::{ApiEnvelope, ApiReply};
use crate::models::auth::{SignInData, SignInForm, SignUpForm, VerifyData};
use crate::models::category::{Category, CategoryForm};
use crate::models::organization::OrganizationForm;
use crate::models::profile::{
    LinkForm, LinkType, OnboardingForm, Profile, SkillCategory, SkillCategoryForm, SkillForm,
};
use crate::models::roster::RosterRow;
use crate::models::session::SessionUser;
use crate::models::student::{Student, StudentFilter, StudentForm, StudentPage};
use crate::models::template::{OrganizationTemplate, TemplateForm};
use crate::services::metrics::record_backend_failure;

pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self, AppError> {
        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    /// `prefix/id`, with `id` percent-encoded as a single path segment.
    fn resource_path(prefix: &str, id: &str) -> Result<String, AppError> {
        let id = id.trim();
        if id.is_empty() || id == "." || id == ".." {
            return Err(AppError::BadRequest(format!("Invalid identifier: {:?}", id)));
        }
        Ok(format!("{}/{}", prefix, urlencoding::encode(id)))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: TracedRequest,
    ) -> Result<ApiReply<T>, AppError> {
        let response = request.send().await.map_err(|e| {
            let err = AppError::from(e);
            tracing::warn!(path = %path, error = %err, "Backend request failed");
            record_backend_failure(match &err {
                AppError::Timeout => "timeout",
                _ => "unreachable",
            });
            err
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let envelope = if body.is_empty() {
            ApiEnvelope {
                success: (200..300).contains(&status),
                message: None,
                data: None,
            }
        } else {
            serde_json::from_slice::<ApiEnvelope<T>>(&body).map_err(|e| {
                tracing::warn!(path = %path, status, error = %e, "Unreadable backend reply");
                record_backend_failure("decode");
                AppError::Upstream {
                    status: if (200..300).contains(&status) { 502 } else { status },
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                }
            })?
        };

        envelope.into_reply(status).inspect_err(|err| {
            tracing::info!(path = %path, status, error = %err, "Backend rejected request");
            record_backend_failure("rejected");
        })
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<ApiReply<T>, AppError> {
        let request = self.client.traced_get(&self.url(path)).bearer_auth(token);
        self.send(path, request).await
    }

    async fn post(&self, token: &str, path: &str, body: &Value) -> Result<ApiReply<Value>, AppError> {
        let request = self
            .client
            .traced_post(&self.url(path))
            .bearer_auth(token)
            .json(body);
        self.send(path, request).await
    }

    async fn put(&self, token: &str, path: &str, body: &Value) -> Result<ApiReply<Value>, AppError> {
        let request = self
            .client
            .traced_put(&self.url(path))
            .bearer_auth(token)
            .json(body);
        self.send(path, request).await
    }

    async fn delete(
        &self,
        token: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiReply<Value>, AppError> {
        let mut request = self.client.traced_delete(&self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(path, request).await
    }

    // Session lifecycle

    pub async fn sign_in(&self, form: &SignInForm) -> Result<SignInData, AppError> {
        let request = self.client.traced_post(&self.url("/auth/sign-in")).json(form);
        self.send::<SignInData>("/auth/sign-in", request)
            .await?
            .require_data()
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<String, AppError> {
        let request = self.client.traced_post(&self.url("/auth/sign-up")).json(form);
        let reply = self.send::<Value>("/auth/sign-up", request).await?;
        Ok(reply.message_or("Account created. Please sign in."))
    }

    pub async fn verify(&self, token: &str) -> Result<SessionUser, AppError> {
        let data: VerifyData = self.get(token, "/auth/verify").await?.require_data()?;
        Ok(data.user)
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        self.post(token, "/auth/sign-out", &Value::Null).await?;
        Ok(())
    }

    // Organization

    pub async fn register_organization(
        &self,
        token: &str,
        form: &OrganizationForm,
    ) -> Result<String, AppError> {
        let reply = self.post(token, "/organizations", &form.to_payload()).await?;
        Ok(reply.message_or("Organization registered"))
    }

    /// `None` when the organization has not saved a template yet.
    pub async fn template(&self, token: &str) -> Result<Option<OrganizationTemplate>, AppError> {
        Ok(self.get(token, "/organizations/template").await?.data)
    }

    pub async fn update_template(&self, token: &str, form: &TemplateForm) -> Result<String, AppError> {
        let reply = self
            .put(token, "/organizations/template/update", &form.to_payload())
            .await?;
        Ok(reply.message_or("Template updated"))
    }

    // Fee categories

    pub async fn categories(&self, token: &str, organization: &str) -> Result<Vec<Category>, AppError> {
        let path = Self::resource_path("/categories/organizations", organization)?;
        Ok(self.get(token, &path).await?.data.unwrap_or_default())
    }

    pub async fn create_category(
        &self,
        token: &str,
        organization: &str,
        form: &CategoryForm,
    ) -> Result<String, AppError> {
        let reply = self
            .post(token, "/categories", &form.create_payload(organization))
            .await?;
        Ok(reply.message_or("Category created"))
    }

    pub async fn update_category(
        &self,
        token: &str,
        id: &str,
        form: &CategoryForm,
    ) -> Result<String, AppError> {
        let reply = self
            .put(token, "/categories/update", &form.update_payload(id))
            .await?;
        Ok(reply.message_or("Category updated"))
    }

    pub async fn delete_category(&self, token: &str, id: &str) -> Result<String, AppError> {
        let reply = self
            .post(token, "/categories/delete", &serde_json::json!({ "id": id }))
            .await?;
        Ok(reply.message_or("Category deleted"))
    }

    // Students

    pub async fn search_students(&self, token: &str, query: &str) -> Result<Vec<Student>, AppError> {
        let request = self
            .client
            .traced_get(&self.url("/students/search"))
            .bearer_auth(token)
            .query(&[("query", query)]);
        Ok(self
            .send::<Vec<Student>>("/students/search", request)
            .await?
            .data
            .unwrap_or_default())
    }

    pub async fn students(
        &self,
        token: &str,
        organization: &str,
        filter: &StudentFilter,
    ) -> Result<StudentPage, AppError> {
        let path = Self::resource_path("/students/organizations", organization)?;
        let request = self
            .client
            .traced_get(&self.url(&path))
            .bearer_auth(token)
            .query(&filter.to_query());
        Ok(self
            .send::<StudentPage>(&path, request)
            .await?
            .data
            .unwrap_or_default())
    }

    pub async fn add_student(
        &self,
        token: &str,
        organization: &str,
        form: &StudentForm,
    ) -> Result<String, AppError> {
        let reply = self
            .post(token, "/students", &form.to_payload(organization))
            .await?;
        Ok(reply.message_or("Student added successfully"))
    }

    pub async fn add_students_bulk(
        &self,
        token: &str,
        organization: &str,
        rows: &[RosterRow],
    ) -> Result<String, AppError> {
        let body = serde_json::json!({ "organization": organization, "students": rows });
        let reply = self.post(token, "/students/bulk", &body).await?;
        Ok(reply.message_or("Student added successfully"))
    }

    pub async fn delete_student(&self, token: &str, id: &str) -> Result<String, AppError> {
        let path = Self::resource_path("/students", id)?;
        let reply = self.delete(token, &path, None).await?;
        Ok(reply.message_or("Student removed"))
    }

    // Bills

    pub async fn submit_bill(&self, token: &str, bill: &InvoiceDocument) -> Result<String, AppError> {
        let body = serde_json::to_value(bill)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("bill encoding failed: {}", e)))?;
        let reply = self.post(token, "/bills", &body).await?;
        Ok(reply.message_or("Bill created successfully"))
    }

    // Profile

    pub async fn profile(&self, token: &str) -> Result<Profile, AppError> {
        Ok(self.get(token, "/users/profile").await?.data.unwrap_or_default())
    }

    pub async fn avatars(&self, token: &str) -> Result<Vec<String>, AppError> {
        Ok(self.get(token, "/users/avatars").await?.data.unwrap_or_default())
    }

    pub async fn backgrounds(&self, token: &str) -> Result<Vec<String>, AppError> {
        Ok(self.get(token, "/users/backgrounds").await?.data.unwrap_or_default())
    }

    pub async fn onboard(&self, token: &str, form: &OnboardingForm) -> Result<String, AppError> {
        let reply = self.post(token, "/users/onboarding", &form.to_payload()).await?;
        Ok(reply.message_or("Profile saved"))
    }

    pub async fn link_types(&self, token: &str) -> Result<Vec<LinkType>, AppError> {
        Ok(self.get(token, "/links").await?.data.unwrap_or_default())
    }

    pub async fn save_link(
        &self,
        token: &str,
        id: Option<&str>,
        form: &LinkForm,
        types: &[LinkType],
    ) -> Result<String, AppError> {
        let body = form.to_payload(types);
        let reply = match id {
            Some(id) => {
                let path = Self::resource_path("/links", id)?;
                self.put(token, &path, &body).await?
            }
            None => self.post(token, "/links", &body).await?,
        };
        Ok(reply.message_or("Link saved"))
    }

    pub async fn skills(&self, token: &str) -> Result<Vec<SkillCategory>, AppError> {
        Ok(self.get(token, "/skills").await?.data.unwrap_or_default())
    }

    pub async fn add_skill_category(
        &self,
        token: &str,
        form: &SkillCategoryForm,
    ) -> Result<String, AppError> {
        let body = serde_json::json!({ "name": form.name.trim() });
        let reply = self.post(token, "/skills/categories", &body).await?;
        Ok(reply.message_or("Category added"))
    }

    pub async fn delete_skill_category(&self, token: &str, category_id: &str) -> Result<String, AppError> {
        let body = serde_json::json!({ "categoryId": category_id });
        let reply = self
            .delete(token, "/skills/categories", Some(&body))
            .await?;
        Ok(reply.message_or("Category removed"))
    }

    pub async fn add_skill(&self, token: &str, form: &SkillForm) -> Result<String, AppError> {
        let body = serde_json::json!({ "categoryId": form.category_id, "name": form.name.trim() });
        let reply = self.post(token, "/skills/categories/skills", &body).await?;
        Ok(reply.message_or("Skill added"))
    }

    pub async fn delete_skill(&self, token: &str, skill_id: &str) -> Result<String, AppError> {
        let body = serde_json::json!({ "skillId": skill_id });
        let reply = self
            .delete(token, "/skills/categories/skills", Some(&body))
            .await?;
        Ok(reply.message_or("Skill removed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_stay_inside_their_path_segment() {
        assert_eq!(
            BackendClient::resource_path("/students", "65f1c0ab").unwrap(),
            "/students/65f1c0ab"
        );
        assert_eq!(
            BackendClient::resource_path("/students", "../bills?all=1").unwrap(),
            "/students/..%2Fbills%3Fall%3D1"
        );
        assert_eq!(
            BackendClient::resource_path("/links", "a/b#c").unwrap(),
            "/links/a%2Fb%23c"
        );
    }

    #[test]
    fn dot_segments_and_blanks_are_rejected() {
        for id in ["", "  ", ".", ".."] {
            assert!(matches!(
                BackendClient::resource_path("/students", id),
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
