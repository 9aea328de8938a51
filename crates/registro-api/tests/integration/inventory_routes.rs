use http::StatusCode;

use crate::common::{
    Browser, TestApp, USERNAME, equipment_form, json, location, location_form, maintenance_form,
};
use registro_core::types::EquipmentFilter;
use registro_core::{EquipmentId, FormData};
use registro_storage::{EquipmentStore, MaintenanceStore};

async fn add_equipment(browser: &mut Browser, code: &str, serial: &str, state: &str) -> EquipmentId {
    let response = browser
        .post(
            "/inventario/equipos/agregar/",
            &equipment_form(code, serial, state),
        )
        .await;
    let target = location(&response).to_string();
    target
        .trim_start_matches("/inventario/equipos/")
        .trim_end_matches('/')
        .parse()
        .unwrap()
}

#[tokio::test]
async fn test_inventory_requires_token_when_auth_is_enabled() {
    let app = TestApp::with_auth();

    let response = app.browser().get("/inventario/").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(http::header::WWW_AUTHENTICATE));

    let response = app.technician().get("/inventario/").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_accessibility_routes_stay_open_when_auth_is_enabled() {
    let app = TestApp::with_auth();
    let response = app.browser().get("/accesibilidad/instituciones/").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_adding_equipment_redirects_to_detail() {
    let app = TestApp::new();
    let mut browser = app.browser();

    let id = add_equipment(&mut browser, "EQ-001", "SN-0001", "OPERATIVO").await;

    let detail = json(browser.get(&format!("/inventario/equipos/{id}/")).await).await;
    assert_eq!(detail["contexto"]["equipo"]["codigo_inventario"], "EQ-001");
    assert_eq!(detail["mensajes"][0]["level"], "success");
    assert!(detail["contexto"]["asignacion"].is_null());
}

#[tokio::test]
async fn test_duplicate_inventory_code_is_409() {
    let app = TestApp::new();
    let mut browser = app.browser();
    add_equipment(&mut browser, "EQ-001", "SN-0001", "OPERATIVO").await;

    let response = browser
        .post(
            "/inventario/equipos/agregar/",
            &equipment_form("EQ-001", "SN-0002", "OPERATIVO"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let total = app
        .store
        .count_equipment(&EquipmentFilter::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_shortcut_redirects_to_equipment_form() {
    let app = TestApp::new();
    let response = app.browser().get("/inventario/agregar/").await;
    assert_eq!(location(&response), "/inventario/equipos/agregar/");
}

#[tokio::test]
async fn test_equipment_list_filters_by_state() {
    let app = TestApp::new();
    let mut browser = app.browser();
    add_equipment(&mut browser, "EQ-001", "SN-0001", "OPERATIVO").await;
    add_equipment(&mut browser, "EQ-002", "SN-0002", "MANTENIMIENTO").await;
    add_equipment(&mut browser, "EQ-003", "SN-0003", "OPERATIVO").await;

    let page = json(browser.get("/inventario/equipos/?estado=OPERATIVO").await).await;
    let codes: Vec<&str> = page["contexto"]["equipos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["codigo_inventario"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["EQ-001", "EQ-003"]);
}

#[tokio::test]
async fn test_editing_missing_equipment_is_404() {
    let app = TestApp::new();
    let response = app
        .browser()
        .post(
            "/inventario/equipos/editar/404/",
            &equipment_form("EQ-404", "SN-404", "OPERATIVO"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_editing_equipment_keeps_identity() {
    let app = TestApp::new();
    let mut browser = app.browser();
    let id = add_equipment(&mut browser, "EQ-010", "SN-0010", "OPERATIVO").await;

    let form = browser
        .get(&format!("/inventario/equipos/editar/{id}/"))
        .await;
    assert_eq!(form.status(), StatusCode::OK);

    let response = browser
        .post(
            &format!("/inventario/equipos/editar/{id}/"),
            &equipment_form("EQ-010", "SN-0010", "BAJA"),
        )
        .await;
    assert_eq!(location(&response), format!("/inventario/equipos/{id}/"));

    let stored = app.store.get_equipment(id).await.unwrap().unwrap();
    assert_eq!(stored.data.state.code(), "BAJA");
}

#[tokio::test]
async fn test_equipment_maintenance_is_stamped_with_the_actor() {
    let app = TestApp::with_auth();
    let mut browser = app.technician();
    let id = add_equipment(&mut browser, "EQ-020", "SN-0020", "OPERATIVO").await;

    // The form's equipo field cannot redirect the entry to other equipment
    let form = maintenance_form("2024-07-01").with("equipo", "999");
    let response = browser
        .post(&format!("/inventario/mantenimientos/agregar/{id}/"), &form)
        .await;
    assert_eq!(location(&response), format!("/inventario/equipos/{id}/"));

    let log = app.store.maintenance_for_equipment(id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].data.performed_by.as_deref(), Some(USERNAME));

    let listing = json(browser.get("/inventario/mantenimientos/").await).await;
    assert_eq!(listing["contexto"][0]["usuario"], USERNAME);
}

#[tokio::test]
async fn test_second_assignment_is_409() {
    let app = TestApp::new();
    let mut browser = app.browser();
    let id = add_equipment(&mut browser, "EQ-030", "SN-0030", "OPERATIVO").await;

    let response = browser
        .post(
            "/inventario/ubicaciones/agregar/",
            &location_form("Laboratorio", "Lab 1"),
        )
        .await;
    assert_eq!(location(&response), "/inventario/");
    let lab = json(browser.get("/inventario/ubicaciones/").await).await["contexto"][0]["id"]
        .to_string();

    let assignment = FormData::new().with("ubicacion", lab.clone());
    let response = browser
        .post(&format!("/inventario/asignaciones/agregar/{id}/"), &assignment)
        .await;
    assert_eq!(location(&response), format!("/inventario/equipos/{id}/"));

    let detail = json(browser.get(&format!("/inventario/equipos/{id}/")).await).await;
    assert!(
        detail["mensajes"][0]["message"]
            .as_str()
            .unwrap()
            .contains("Laboratorio")
    );
    assert_eq!(detail["contexto"]["asignacion"]["ubicacion"]["area"], "Laboratorio");

    let response = browser
        .post(
            "/inventario/asignaciones/agregar/",
            &assignment.with("equipo", id.to_string()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_location_edit_and_detail() {
    let app = TestApp::new();
    let mut browser = app.browser();
    browser
        .post(
            "/inventario/ubicaciones/agregar/",
            &location_form("Biblioteca", "Sala 1"),
        )
        .await;
    let id = json(browser.get("/inventario/ubicaciones/").await).await["contexto"][0]["id"]
        .to_string();

    let response = browser
        .post(
            &format!("/inventario/ubicaciones/editar/{id}/"),
            &location_form("Biblioteca", "Sala 2"),
        )
        .await;
    assert_eq!(location(&response), format!("/inventario/ubicaciones/{id}/"));

    let detail = json(browser.get(&format!("/inventario/ubicaciones/{id}/")).await).await;
    assert_eq!(detail["contexto"]["ubicacion"]["aula_laboratorio"], "Sala 2");
    assert!(detail["contexto"]["equipos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_inventory_dashboard_totals() {
    let app = TestApp::new();
    let mut browser = app.browser();
    add_equipment(&mut browser, "EQ-040", "SN-0040", "OPERATIVO").await;
    add_equipment(&mut browser, "EQ-041", "SN-0041", "MANTENIMIENTO").await;

    let page = json(browser.get("/inventario/").await).await;
    assert_eq!(page["contexto"]["total_equipos"], 2);
    assert_eq!(page["contexto"]["equipos_operativos"], 1);
    assert_eq!(page["contexto"]["equipos_mantenimiento"], 1);
}
