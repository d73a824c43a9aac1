use askama::Template;
use axum::response::{IntoResponse, Redirect};

use crate::middleware::access::{landing_route, Role};
use crate::models::session::{SessionContext, SessionUser};

pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: SessionUser,
    pub title: &'static str,
    pub links: Vec<NavLink>,
}

fn links_for(role: Role) -> Vec<NavLink> {
    let link = |label, href| NavLink { label, href };
    let mut links = vec![link("My profile", "/profile")];
    match role {
        Role::User => {}
        Role::Admin => {
            links.push(link("Students", "/students"));
            links.push(link("Create bill", "/bills/new"));
            links.push(link("Fee categories", "/dashboard/admin/categories"));
            links.push(link("Bill template", "/dashboard/admin/template"));
        }
        Role::SuperUser => {
            links.push(link("Students", "/students"));
            links.push(link("Create bill", "/bills/new"));
        }
    }
    links
}

fn dashboard(context: SessionContext, title: &'static str) -> DashboardTemplate {
    DashboardTemplate {
        links: links_for(context.role()),
        user: context.user,
        title,
    }
}

/// `/dashboard`: forwards to the signed-in role's own dashboard.
pub async fn dashboard_redirect(context: SessionContext) -> impl IntoResponse {
    Redirect::to(landing_route(Some(context.role())))
}

pub async fn user_dashboard(context: SessionContext) -> impl IntoResponse {
    dashboard(context, "Dashboard")
}

pub async fn admin_dashboard(context: SessionContext) -> impl IntoResponse {
    dashboard(context, "Admin dashboard")
}

pub async fn super_user_dashboard(context: SessionContext) -> impl IntoResponse {
    dashboard(context, "Super user dashboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_see_school_settings() {
        let hrefs = |role| {
            links_for(role)
                .into_iter()
                .map(|l| l.href)
                .collect::<Vec<_>>()
        };
        assert_eq!(hrefs(Role::User), vec!["/profile"]);
        assert!(hrefs(Role::Admin).contains(&"/dashboard/admin/template"));
        assert!(!hrefs(Role::SuperUser).contains(&"/dashboard/admin/template"));
        assert!(hrefs(Role::SuperUser).contains(&"/bills/new"));
    }
}
