//! Tabla de rutas del panel y control de navegación
//!
//! Las decisiones se toman solo con el token presente en la sesión: la
//! presencia del token cuenta como autenticación y los roles salen de su
//! payload sin consultar al servidor.

use serde::Serialize;

use crate::models::Role;
use crate::services::access_policy::{derive_roles, RoleSet};

const BASE_TITLE: &str = "FleetMaster";

/// Pantallas del panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppRoute {
    Login,
    Dashboard,
    Vehicles,
    Drivers,
    Issues,
    ReportIssue,
    DriverDashboard,
    Note,
}

impl AppRoute {
    pub const ALL: [AppRoute; 8] = [
        AppRoute::Login,
        AppRoute::Dashboard,
        AppRoute::Vehicles,
        AppRoute::Drivers,
        AppRoute::Issues,
        AppRoute::ReportIssue,
        AppRoute::DriverDashboard,
        AppRoute::Note,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            AppRoute::Login => "/login",
            AppRoute::Dashboard => "/dashboard",
            AppRoute::Vehicles => "/vehicles",
            AppRoute::Drivers => "/drivers",
            AppRoute::Issues => "/issues",
            AppRoute::ReportIssue => "/report-issue",
            AppRoute::DriverDashboard => "/driver-dashboard",
            AppRoute::Note => "/note",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AppRoute::Login => "Logowanie",
            AppRoute::Dashboard => "Panel Admina",
            AppRoute::Vehicles => "Flota Pojazdów",
            AppRoute::Drivers => "Personel",
            AppRoute::Issues => "Usterki",
            AppRoute::ReportIssue => "Zgłoś Problem",
            AppRoute::DriverDashboard => "Mój Panel",
            AppRoute::Note => "Dziennik",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, AppRoute::Login)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            AppRoute::Dashboard | AppRoute::Vehicles | AppRoute::Drivers | AppRoute::Issues
        )
    }

    pub fn from_path(path: &str) -> Option<AppRoute> {
        let path = path.trim_end_matches('/');
        AppRoute::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Título del documento: "<título> | FleetMaster"
    pub fn document_title(&self) -> String {
        format!("{} | {}", self.title(), BASE_TITLE)
    }
}

/// Estado de sesión del cliente
#[derive(Debug, Clone, Default)]
pub struct Session {
    authenticated: bool,
    roles: RoleSet,
}

impl Session {
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Self {
                authenticated: true,
                roles: derive_roles(token),
            },
            None => Self::default(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Pantalla de inicio según el rol
    pub fn home(&self) -> AppRoute {
        if self.is_admin() {
            AppRoute::Dashboard
        } else {
            AppRoute::DriverDashboard
        }
    }
}

/// Decisión de navegación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Navigation {
    Proceed,
    Redirect(AppRoute),
    NotFound,
}

/// Decide si la sesión puede entrar en `route`
pub fn guard(route: AppRoute, session: &Session) -> Navigation {
    if route.requires_auth() && !session.is_authenticated() {
        Navigation::Redirect(AppRoute::Login)
    } else if route == AppRoute::Login && session.is_authenticated() {
        Navigation::Redirect(session.home())
    } else if route.requires_admin() && !session.is_admin() {
        Navigation::Redirect(AppRoute::DriverDashboard)
    } else {
        Navigation::Proceed
    }
}

/// Resuelve una ruta por path; "/" lleva al login
pub fn navigate(path: &str, session: &Session) -> Navigation {
    if path.trim().is_empty() || path == "/" {
        return match guard(AppRoute::Login, session) {
            Navigation::Proceed => Navigation::Redirect(AppRoute::Login),
            other => other,
        };
    }

    match AppRoute::from_path(path) {
        Some(route) => guard(route, session),
        None => Navigation::NotFound,
    }
}

/// Título para un path; el título base si la ruta no existe
pub fn document_title(path: &str) -> String {
    AppRoute::from_path(path)
        .map(|route| route.document_title())
        .unwrap_or_else(|| BASE_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn token(payload: &str) -> String {
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload))
    }

    fn admin() -> Session {
        Session::from_token(Some(&token(r#"{"role":"Admin"}"#)))
    }

    fn driver() -> Session {
        Session::from_token(Some(&token(r#"{"role":"Driver"}"#)))
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        let anonymous = Session::from_token(None);
        assert_eq!(guard(AppRoute::Vehicles, &anonymous), Navigation::Redirect(AppRoute::Login));
        assert_eq!(guard(AppRoute::Note, &anonymous), Navigation::Redirect(AppRoute::Login));
        assert_eq!(guard(AppRoute::Login, &anonymous), Navigation::Proceed);
    }

    #[test]
    fn test_logged_in_user_leaves_login_for_home() {
        assert_eq!(guard(AppRoute::Login, &admin()), Navigation::Redirect(AppRoute::Dashboard));
        assert_eq!(
            guard(AppRoute::Login, &driver()),
            Navigation::Redirect(AppRoute::DriverDashboard)
        );
    }

    #[test]
    fn test_driver_is_kept_out_of_admin_routes() {
        assert_eq!(
            guard(AppRoute::Issues, &driver()),
            Navigation::Redirect(AppRoute::DriverDashboard)
        );
        assert_eq!(guard(AppRoute::ReportIssue, &driver()), Navigation::Proceed);
        assert_eq!(guard(AppRoute::Issues, &admin()), Navigation::Proceed);
    }

    #[test]
    fn test_garbage_token_is_authenticated_without_roles() {
        let session = Session::from_token(Some("garbage"));
        assert!(session.is_authenticated());
        assert!(session.roles().is_empty());
        assert_eq!(
            guard(AppRoute::Dashboard, &session),
            Navigation::Redirect(AppRoute::DriverDashboard)
        );
    }

    #[test]
    fn test_navigate_by_path() {
        let anonymous = Session::default();
        assert_eq!(navigate("/", &anonymous), Navigation::Redirect(AppRoute::Login));
        assert_eq!(navigate("/", &admin()), Navigation::Redirect(AppRoute::Dashboard));
        assert_eq!(navigate("/drivers/", &admin()), Navigation::Proceed);
        assert_eq!(navigate("/nowhere", &admin()), Navigation::NotFound);
    }

    #[test]
    fn test_document_title() {
        assert_eq!(document_title("/issues"), "Usterki | FleetMaster");
        assert_eq!(AppRoute::Login.document_title(), "Logowanie | FleetMaster");
        assert_eq!(document_title("/nowhere"), "FleetMaster");
    }
}
