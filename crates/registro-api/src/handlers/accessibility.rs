//! Institution and survey handlers (`/accesibilidad`).

use axum::extract::{Path, State};
use axum::Form;

use registro_core::types::Institution;
use registro_core::{FormData, InstitutionId, SurveyId};
use registro_workflows::FormPage;
use registro_workflows::reports::AccessibilityDashboard;
use registro_workflows::survey::{
    InstitutionDetail, SelectionPage, SurveyDetail, SurveyFormPage, SurveyListItem,
};

use super::PageResult;
use crate::error::{ApiResult, parse_id};
use crate::router::paths;
use crate::session::{Ctx, Page, SeeOther};
use crate::state::AppState;

/// `GET /accesibilidad/`
pub async fn dashboard(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<AccessibilityDashboard> {
    let contexto = state.workflows.reports.accessibility_dashboard().await?;
    Page::render(&state, &ctx, contexto).await
}

// ============================================================================
// Institutions
// ============================================================================

/// `GET /accesibilidad/instituciones/`
pub async fn list_institutions(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<Vec<Institution>> {
    let contexto = state.workflows.survey.list_institutions().await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /accesibilidad/instituciones/nueva/`
pub async fn institution_form(State(state): State<AppState>, Ctx(ctx): Ctx) -> PageResult<FormPage> {
    let contexto = state.workflows.survey.institution_form();
    Page::render(&state, &ctx, contexto).await
}

/// `POST /accesibilidad/instituciones/nueva/`
pub async fn register_institution(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let institution = state.workflows.survey.register_institution(&ctx, &form).await?;
    Ok(SeeOther::new(paths::INSTITUTIONS).success(format!(
        "¡Institución \"{}\" registrada exitosamente!",
        institution.data.name
    )))
}

/// `GET /accesibilidad/instituciones/{id}/`
pub async fn institution_detail(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> PageResult<InstitutionDetail> {
    let id: InstitutionId = parse_id("institucion", &id)?;
    let contexto = state.workflows.survey.institution_detail(id).await?;
    Page::render(&state, &ctx, contexto).await
}

// ============================================================================
// Surveys
// ============================================================================

/// `GET /accesibilidad/encuestas/seleccionar/`
pub async fn selection_page(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<SelectionPage> {
    let contexto = state.workflows.survey.selection_page(&ctx).await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /accesibilidad/encuestas/seleccionar/`
pub async fn select_institution(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    state.workflows.survey.select_institution(&ctx, &form).await?;
    Ok(SeeOther::new(paths::CREATE_SURVEY))
}

/// `GET /accesibilidad/encuestas/crear/`
pub async fn survey_form(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<SurveyFormPage> {
    let contexto = state.workflows.survey.survey_form(&ctx).await?;
    Page::render(&state, &ctx, contexto).await
}

/// `POST /accesibilidad/encuestas/crear/`
pub async fn submit_survey(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Form(form): Form<FormData>,
) -> ApiResult<SeeOther> {
    let saved = state.workflows.survey.submit_survey(&ctx, &form).await?;
    Ok(SeeOther::new(paths::SURVEYS).success(format!(
        "¡Encuesta para {} creada exitosamente!",
        saved.institucion.data.name
    )))
}

/// `GET /accesibilidad/encuestas/nueva/`
pub async fn new_survey() -> SeeOther {
    SeeOther::new(paths::SELECT_INSTITUTION)
}

/// `GET /accesibilidad/encuestas/`
pub async fn list_surveys(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> PageResult<Vec<SurveyListItem>> {
    let contexto = state.workflows.survey.list_surveys().await?;
    Page::render(&state, &ctx, contexto).await
}

/// `GET /accesibilidad/encuestas/{id}/`
pub async fn survey_detail(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> PageResult<SurveyDetail> {
    let id: SurveyId = parse_id("encuesta", &id)?;
    let contexto = state.workflows.survey.survey_detail(id).await?;
    Page::render(&state, &ctx, contexto).await
}
