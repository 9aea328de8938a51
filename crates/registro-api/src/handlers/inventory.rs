//! Equipment, location, maintenance and assignment handlers (`/inventario`).

use axum::extract::{Path, Query, State};
use axum::Form;

use registro_core::types::Location;
use registro_core::{EquipmentId, FormData, LocationId};
use registro_workflows::FormPage;
use registro_workflows::inventory::{
    EquipmentDetail, EquipmentList, LocationDetail, MaintenanceView, ReferenceFormPage,
};
use registro_workflows::reports::InventoryDashboard;

use super::PageResult;
use crate::error::{ApiResult, parse_id};
use crate::router::paths;
use crate::session::{Ctx, Page, SeeOther};
use crate::state::AppState;

fn equipment_id(raw: &str) -> ApiResult<EquipmentId> {
    parse_id("equipo", raw)
}

fn location_id(raw: &str) -> ApiResult<LocationId> {
    parse_id("ubicacion", raw)
}

/// `GET /inventario/`
pub async fn dashboard(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<InventoryDashboard> {
    let contexto = state.workflows.reports.inventory_dashboard().await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /inventario/agregar/`
pub async fn add_shortcut() -> SeeOther {
    SeeOther::new(paths::ADD_EQUIPMENT)
}

// ============================================================================
// Equipment
// ============================================================================

/// `GET /inventario/equipos/?q=&tipo=&estado=`
pub async fn list_equipment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Query(params): Query<FormData>,
) -> PageResult<EquipmentList> {
    let contexto = state.workflows.inventory.list_equipment(&params).await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /inventario/equipos/agregar/`
pub async fn equipment_form(State(state): State<AppState>, Ctx(ctx): Ctx) -> PageResult<FormPage> {
    let contexto = state.workflows.inventory.equipment_form();
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/equipos/agregar/`
pub async fn create_equipment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let equipment = state.workflows.inventory.create_equipment(&ctx, &form).await?;
    Ok(SeeOther::new(paths::equipment(equipment.id)).success(format!(
        "Equipo {} registrado exitosamente.",
        equipment.data.inventory_code
    )))
}

/// `GET /inventario/equipos/{id}/`
pub async fn equipment_detail(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> PageResult<EquipmentDetail> {
    let contexto = state
        .workflows
        .inventory
        .equipment_detail(equipment_id(&id)?)
        .await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /inventario/equipos/editar/{id}/`
pub async fn edit_equipment_form(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> PageResult<FormPage> {
    let contexto = state
        .workflows
        .inventory
        .edit_equipment_form(equipment_id(&id)?)
        .await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/equipos/editar/{id}/`
pub async fn update_equipment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let equipment = state
        .workflows
        .inventory
        .update_equipment(&ctx, equipment_id(&id)?, &form)
        .await?;
    Ok(SeeOther::new(paths::equipment(equipment.id)).success(format!(
        "Equipo {} actualizado exitosamente.",
        equipment.data.inventory_code
    )))
}

// ============================================================================
// Maintenance
// ============================================================================

/// `GET /inventario/mantenimientos/`
pub async fn list_maintenance(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<Vec<MaintenanceView>> {
    let contexto = state.workflows.inventory.list_maintenance().await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /inventario/mantenimientos/agregar/`
pub async fn maintenance_form(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<ReferenceFormPage> {
    let contexto = state.workflows.inventory.maintenance_form(None).await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/mantenimientos/agregar/`
pub async fn create_maintenance(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    state
        .workflows
        .inventory
        .create_maintenance(&ctx, &form, None)
        .await?;
    Ok(SeeOther::new(paths::MAINTENANCE).success("Mantenimiento registrado exitosamente."))
}

/// `GET /inventario/mantenimientos/agregar/{equipo_id}/`
pub async fn equipment_maintenance_form(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(equipo_id): Path<String>,
) -> PageResult<ReferenceFormPage> {
    let contexto = state
        .workflows
        .inventory
        .maintenance_form(Some(equipment_id(&equipo_id)?))
        .await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/mantenimientos/agregar/{equipo_id}/`
///
/// The equipment comes from the path; any `equipo` form field is ignored.
pub async fn create_equipment_maintenance(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(equipo_id): Path<String>,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let id = equipment_id(&equipo_id)?;
    state
        .workflows
        .inventory
        .create_maintenance(&ctx, &form, Some(id))
        .await?;
    let message = match state.workflows.inventory.equipment_detail(id).await {
        Ok(detail) => format!(
            "Mantenimiento para {} registrado exitosamente.",
            detail.equipo.data.inventory_code
        ),
        Err(_) => "Mantenimiento registrado exitosamente.".to_string(),
    };
    Ok(SeeOther::new(paths::equipment(id)).success(message))
}

// ============================================================================
// Locations
// ============================================================================

/// `GET /inventario/ubicaciones/`
pub async fn list_locations(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<Vec<Location>> {
    let contexto = state.workflows.inventory.list_locations().await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /inventario/ubicaciones/agregar/`
pub async fn location_form(State(state): State<AppState>, Ctx(ctx): Ctx) -> PageResult<FormPage> {
    let contexto = state.workflows.inventory.location_form();
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/ubicaciones/agregar/`
pub async fn create_location(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let location = state.workflows.inventory.create_location(&ctx, &form).await?;
    Ok(SeeOther::new(paths::INVENTORY)
        .success(format!("Ubicación {location} creada exitosamente.")))
}

/// `GET /inventario/ubicaciones/{id}/`
pub async fn location_detail(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> PageResult<LocationDetail> {
    let contexto = state
        .workflows
        .inventory
        .location_detail(location_id(&id)?)
        .await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /inventario/ubicaciones/editar/{id}/`
pub async fn edit_location_form(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> PageResult<FormPage> {
    let contexto = state
        .workflows
        .inventory
        .edit_location_form(location_id(&id)?)
        .await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/ubicaciones/editar/{id}/`
pub async fn update_location(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let location = state
        .workflows
        .inventory
        .update_location(&ctx, location_id(&id)?, &form)
        .await?;
    Ok(SeeOther::new(paths::location(location.id))
        .success(format!("Ubicación {location} actualizada exitosamente.")))
}

// ============================================================================
// Assignments
// ============================================================================

/// `GET /inventario/asignaciones/agregar/`
pub async fn assignment_form(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<ReferenceFormPage> {
    let contexto = state.workflows.inventory.assignment_form(None).await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/asignaciones/agregar/`
pub async fn create_assignment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    assign(&state, &ctx, &form, None).await
}

/// `GET /inventario/asignaciones/agregar/{equipo_id}/`
pub async fn equipment_assignment_form(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(equipo_id): Path<String>,
) -> PageResult<ReferenceFormPage> {
    let contexto = state
        .workflows
        .inventory
        .assignment_form(Some(equipment_id(&equipo_id)?))
        .await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /inventario/asignaciones/agregar/{equipo_id}/`
pub async fn create_equipment_assignment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(equipo_id): Path<String>,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let id = equipment_id(&equipo_id)?;
    assign(&state, &ctx, &form, Some(id)).await
}

async fn assign(
    state: &AppState,
    ctx: &registro_core::RequestContext,
    form: &FormData,
    equipment: Option<EquipmentId>,
) -> ApiResult<SeeOther> {
    let assignment = state
        .workflows
        .inventory
        .create_assignment(ctx, form, equipment)
        .await?;
    let target = assignment.data.equipment;
    let message = match state.workflows.inventory.equipment_detail(target).await {
        Ok(EquipmentDetail {
            equipo,
            asignacion: Some(view),
            ..
        }) => match view.ubicacion {
            Some(ubicacion) => format!(
                "Equipo {} asignado a {}.",
                equipo.data.inventory_code, ubicacion.data.area
            ),
            None => format!("Equipo {} asignado.", equipo.data.inventory_code),
        },
        _ => "Equipo asignado exitosamente.".to_string(),
    };
    Ok(SeeOther::new(paths::equipment(target)).success(message))
}
