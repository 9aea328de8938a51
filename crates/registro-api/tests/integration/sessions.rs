use std::time::Duration;

use http::StatusCode;

use crate::common::{TestApp, institution_form, json, location, session_cookie};
use registro_core::FormData;
use registro_storage::InstitutionStore;

#[tokio::test]
async fn test_health_needs_no_session_or_token() {
    let app = TestApp::with_auth();
    let mut browser = app.browser();

    let response = browser.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_first_visit_sets_session_cookie_once() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let first = browser.get("/accesibilidad/").await;
    assert_eq!(first.status(), StatusCode::OK);
    let cookie = session_cookie(&first).unwrap();
    assert!(cookie.starts_with("registro_session="));

    let raw = first
        .headers()
        .get(http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("SameSite=Lax"));
    assert!(raw.contains("Path=/"));

    let second = browser.get("/accesibilidad/").await;
    assert!(session_cookie(&second).is_none());
}

#[tokio::test]
async fn test_forged_cookie_is_replaced() {
    let app = TestApp::new();
    let mut browser = app.browser();
    browser.cookie = Some("registro_session=not-a-uuid".to_string());

    let response = browser.get("/accesibilidad/").await;
    let cookie = session_cookie(&response).unwrap();
    assert_ne!(cookie, "registro_session=not-a-uuid");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();
    let response = app.browser().get("/inventario/desconocido/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cookieless_selections_expire() {
    let app = TestApp::with_session_ttl(Duration::from_secs(2));
    app.browser()
        .post(
            "/accesibilidad/instituciones/nueva/",
            &institution_form("Escuela Fiscal 1", "01H00001"),
        )
        .await;
    let institution = app.store.list_institutions().await.unwrap().remove(0);
    let selection = FormData::new().with("institucion_id", institution.id.to_string());

    for _ in 0..200 {
        let response = app
            .browser()
            .post("/accesibilidad/encuestas/seleccionar/", &selection)
            .await;
        assert_eq!(location(&response), "/accesibilidad/encuestas/crear/");
    }
    assert!(app.sessions.len() >= 200);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    let mut returning = app.browser();
    returning
        .post("/accesibilidad/encuestas/seleccionar/", &selection)
        .await;
    assert_eq!(app.sessions.len(), 1);

    let form = returning.get("/accesibilidad/encuestas/crear/").await;
    assert_eq!(form.status(), StatusCode::OK);
}
