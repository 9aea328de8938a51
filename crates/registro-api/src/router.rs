//! API Router configuration

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use registro_auth::{AuthLayer, TokenValidator};

use crate::handlers::{accessibility, health, inventory};
use crate::session;
use crate::state::AppState;

/// Redirect targets shared by handlers.
pub mod paths {
    /// Survey step one
    pub const SELECT_INSTITUTION: &str = "/accesibilidad/encuestas/seleccionar/";
    /// Survey step two
    pub const CREATE_SURVEY: &str = "/accesibilidad/encuestas/crear/";
    /// Institution listing
    pub const INSTITUTIONS: &str = "/accesibilidad/instituciones/";
    /// Survey listing
    pub const SURVEYS: &str = "/accesibilidad/encuestas/";
    /// Inventory dashboard
    pub const INVENTORY: &str = "/inventario/";
    /// Equipment creation form
    pub const ADD_EQUIPMENT: &str = "/inventario/equipos/agregar/";
    /// Maintenance log
    pub const MAINTENANCE: &str = "/inventario/mantenimientos/";

    /// Equipment detail page.
    pub fn equipment(id: impl std::fmt::Display) -> String {
        format!("/inventario/equipos/{id}/")
    }

    /// Location detail page.
    pub fn location(id: impl std::fmt::Display) -> String {
        format!("/inventario/ubicaciones/{id}/")
    }
}

/// Create the main router.
///
/// Inventory routes sit behind `auth`; with auth disabled the layer lets
/// every request through anonymously.
pub fn router<V: TokenValidator>(state: AppState, auth: AuthLayer<V>) -> Router {
    let accesibilidad = Router::new()
        .route("/accesibilidad/", get(accessibility::dashboard))
        .route("/accesibilidad/instituciones/", get(accessibility::list_institutions))
        .route(
            "/accesibilidad/instituciones/nueva/",
            get(accessibility::institution_form).post(accessibility::register_institution),
        )
        .route(
            "/accesibilidad/instituciones/{id}/",
            get(accessibility::institution_detail),
        )
        .route(
            "/accesibilidad/encuestas/seleccionar/",
            get(accessibility::selection_page).post(accessibility::select_institution),
        )
        .route(
            "/accesibilidad/encuestas/crear/",
            get(accessibility::survey_form).post(accessibility::submit_survey),
        )
        .route("/accesibilidad/encuestas/nueva/", get(accessibility::new_survey))
        .route("/accesibilidad/encuestas/", get(accessibility::list_surveys))
        .route("/accesibilidad/encuestas/{id}/", get(accessibility::survey_detail));

    let inventario = Router::new()
        .route("/inventario/", get(inventory::dashboard))
        .route("/inventario/agregar/", get(inventory::add_shortcut))
        .route("/inventario/equipos/", get(inventory::list_equipment))
        .route(
            "/inventario/equipos/agregar/",
            get(inventory::equipment_form).post(inventory::create_equipment),
        )
        .route("/inventario/equipos/{id}/", get(inventory::equipment_detail))
        .route(
            "/inventario/equipos/editar/{id}/",
            get(inventory::edit_equipment_form).post(inventory::update_equipment),
        )
        .route("/inventario/mantenimientos/", get(inventory::list_maintenance))
        .route(
            "/inventario/mantenimientos/agregar/",
            get(inventory::maintenance_form).post(inventory::create_maintenance),
        )
        .route(
            "/inventario/mantenimientos/agregar/{equipo_id}/",
            get(inventory::equipment_maintenance_form).post(inventory::create_equipment_maintenance),
        )
        .route("/inventario/ubicaciones/", get(inventory::list_locations))
        .route(
            "/inventario/ubicaciones/agregar/",
            get(inventory::location_form).post(inventory::create_location),
        )
        .route("/inventario/ubicaciones/{id}/", get(inventory::location_detail))
        .route(
            "/inventario/ubicaciones/editar/{id}/",
            get(inventory::edit_location_form).post(inventory::update_location),
        )
        .route(
            "/inventario/asignaciones/agregar/",
            get(inventory::assignment_form).post(inventory::create_assignment),
        )
        .route(
            "/inventario/asignaciones/agregar/{equipo_id}/",
            get(inventory::equipment_assignment_form).post(inventory::create_equipment_assignment),
        )
        .route_layer(auth);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(accesibilidad)
        .merge(inventario)
        .layer(from_fn_with_state(state.clone(), session::track))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
