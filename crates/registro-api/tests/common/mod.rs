//! Test harness: a router over fresh stores and a cookie-keeping browser.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use registro_api::{AppState, SESSION_COOKIE, router};
use registro_auth::{AuthConfig, AuthLayer, StaticTokenValidator};
use registro_core::FormData;
use registro_core::types::Question;
use registro_storage::{MemoryStore, RecordStore};
use registro_workflows::{MemorySessionStore, SessionStore, Workflows};

pub const TOKEN: &str = "token-tecnico";
pub const USERNAME: &str = "tecnico";

/// Router plus direct handles on its stores.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    /// Auth disabled.
    pub fn new() -> Self {
        Self::build(false, MemorySessionStore::new())
    }

    /// Auth enabled with a single token for [`USERNAME`].
    pub fn with_auth() -> Self {
        Self::build(true, MemorySessionStore::new())
    }

    /// Auth disabled, sessions expiring after `ttl` idle.
    pub fn with_session_ttl(ttl: Duration) -> Self {
        Self::build(false, MemorySessionStore::with_ttl(ttl))
    }

    fn build(enabled: bool, sessions: MemorySessionStore) -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(sessions);
        let workflows = Workflows::new(
            store.clone() as Arc<dyn RecordStore>,
            sessions.clone() as Arc<dyn SessionStore>,
        );
        let validator = StaticTokenValidator::default().with_token(TOKEN, USERNAME);
        let auth = AuthLayer::new(Arc::new(validator), AuthConfig { enabled });
        Self {
            router: router(AppState::new(workflows), auth),
            store,
            sessions,
        }
    }

    /// A browser with no cookie yet.
    pub fn browser(&self) -> Browser {
        Browser {
            router: self.router.clone(),
            cookie: None,
            token: None,
        }
    }

    /// A browser that sends the bearer token.
    pub fn technician(&self) -> Browser {
        Browser {
            token: Some(TOKEN.to_string()),
            ..self.browser()
        }
    }
}

/// Keeps the session cookie between requests.
pub struct Browser {
    router: Router,
    pub cookie: Option<String>,
    token: Option<String>,
}

impl Browser {
    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn post(&mut self, uri: &str, form: &FormData) -> Response<Body> {
        let builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(encode(form))).await
    }

    async fn send(&mut self, mut builder: http::request::Builder, body: Body) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        if let Some(cookie) = session_cookie(&response) {
            self.cookie = Some(cookie);
        }
        response
    }
}

/// `name=value` of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

pub async fn json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn encode(form: &FormData) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", percent(k), percent(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

// ============================================================================
// Forms
// ============================================================================

pub fn institution_form(name: &str, amie: &str) -> FormData {
    FormData::new()
        .with("nombre_institucion", name)
        .with("codigo_amie", amie)
        .with("provincia", "Azuay")
        .with("canton", "Cuenca")
        .with("direccion", "Calle Larga 7-45")
        .with("tipo_institucion", "PUBLICA")
}

pub fn survey_form(answer: &str) -> FormData {
    let mut form = FormData::new()
        .with("fecha_encuesta", "2024-06-03")
        .with("encuestador", "Lucía Andrade")
        .with("cargo_encuestador", "Inspectora");
    for question in Question::ALL {
        form.insert(question.field(), answer);
    }
    form
}

pub fn equipment_form(code: &str, serial: &str, state: &str) -> FormData {
    FormData::new()
        .with("codigo_inventario", code)
        .with("tipo", "LAPTOP")
        .with("marca", "Lenovo")
        .with("modelo", "ThinkPad E14")
        .with("numero_serie", serial)
        .with("anio_adquisicion", "2022")
        .with("costo", "899.90")
        .with("estado", state)
        .with("condicion_fisica", "BUENO")
}

pub fn location_form(area: &str, room: &str) -> FormData {
    FormData::new()
        .with("area", area)
        .with("aula_laboratorio", room)
        .with("piso", "2")
}

pub fn maintenance_form(date: &str) -> FormData {
    FormData::new()
        .with("tipo", "PREVENTIVO")
        .with("fecha", date)
        .with("descripcion", "Limpieza interna")
        .with("actividades_realizadas", "Soplado y cambio de pasta térmica")
        .with("costo_mantenimiento", "20")
        .with("estado_posterior", "Operativo")
}
