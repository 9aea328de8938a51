//! Integration tests for institution registration and survey submission.

use registro_core::types::{Question, Response, SurveySection};
use registro_core::{Error, ErrorKind, FormData, InstitutionId};
use registro_storage::{InstitutionStore, SurveyStore};
use registro_workflows::survey::NO_SELECTION;
use registro_workflows::{PendingSelection, SurveyStage};

use crate::common::{TestHarness, institution_form, selection, survey_form};

#[tokio::test]
async fn test_duplicate_amie_code_is_rejected() {
    let harness = TestHarness::new();
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;

    survey
        .register_institution(&ctx, &institution_form("Escuela Fiscal Mixta", "17H01234"))
        .await
        .unwrap();
    let err = survey
        .register_institution(&ctx, &institution_form("Otra Escuela", "17H01234"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UniquenessConflict);
    assert_eq!(err.user_message(), "Ya existe una institución con ese código AMIE");
    assert_eq!(harness.store.count_institutions().await.unwrap(), 1);
}

#[tokio::test]
async fn test_institution_form_errors_are_per_field() {
    let harness = TestHarness::new();
    let form = institution_form("Escuela", "17H00001")
        .with("codigo_amie", "")
        .with("tipo_institucion", "COMUNITARIA")
        .with("email", "no-es-correo");

    let err = harness
        .workflows
        .survey
        .register_institution(&harness.visitor(), &form)
        .await
        .unwrap_err();

    let fields = err.field_errors().unwrap();
    assert!(fields.contains("codigo_amie"));
    assert!(fields.contains("tipo_institucion"));
    assert!(fields.contains("email"));
    assert!(!fields.contains("nombre_institucion"));
    assert_eq!(harness.store.count_institutions().await.unwrap(), 0);
}

#[tokio::test]
async fn test_select_then_enter_binds_institution() {
    let harness = TestHarness::new();
    let school = harness.institution("Unidad Educativa Quito", "17H00001").await;
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;

    assert_eq!(survey.stage(&ctx).await.unwrap(), SurveyStage::NoSelection);
    survey.select_institution(&ctx, &selection(school.id)).await.unwrap();
    assert_eq!(
        survey.stage(&ctx).await.unwrap(),
        SurveyStage::InstitutionPending(school.id)
    );

    let page = survey.survey_form(&ctx).await.unwrap();
    assert_eq!(page.institucion.id, school.id);
    assert_eq!(page.secciones.len(), 2);
    assert_eq!(page.secciones[0].seccion, SurveySection::PhysicalBarriers);
    assert_eq!(page.secciones[0].campos.len(), 7);
    assert_eq!(page.secciones[1].campos.len(), 7);
    assert_eq!(page.secciones[1].campos[0].name, "p8_equipos");
    assert_eq!(page.generales.len(), 5);
    assert_eq!(page.respuestas.len(), 6);
}

#[tokio::test]
async fn test_selection_survives_unrelated_requests() {
    let harness = TestHarness::new();
    let first = harness.institution("Escuela A", "AMIE-A").await;
    let second = harness.institution("Escuela B", "AMIE-B").await;
    let ctx = harness.visitor();
    let other = harness.visitor();
    let survey = &harness.workflows.survey;

    survey.select_institution(&ctx, &selection(first.id)).await.unwrap();

    survey.select_institution(&other, &selection(second.id)).await.unwrap();
    survey.list_institutions().await.unwrap();
    survey.list_surveys().await.unwrap();
    harness.workflows.reports.accessibility_dashboard().await.unwrap();

    assert_eq!(survey.survey_form(&ctx).await.unwrap().institucion.id, first.id);
    assert_eq!(survey.survey_form(&other).await.unwrap().institucion.id, second.id);
}

#[tokio::test]
async fn test_reselecting_overwrites() {
    let harness = TestHarness::new();
    let first = harness.institution("Escuela A", "AMIE-A").await;
    let second = harness.institution("Escuela B", "AMIE-B").await;
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;

    survey.select_institution(&ctx, &selection(first.id)).await.unwrap();
    survey.select_institution(&ctx, &selection(second.id)).await.unwrap();

    let saved = survey.submit_survey(&ctx, &survey_form("NUNCA")).await.unwrap();
    assert_eq!(saved.encuesta.data.institution, second.id);
    assert_eq!(saved.institucion.id, second.id);
    assert_eq!(saved.institucion.data.name, "Escuela B");
}

#[tokio::test]
async fn test_selection_rejects_bad_ids() {
    let harness = TestHarness::new();
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;

    for raw in ["", "abc", "-3"] {
        let err = survey.select_institution(&ctx, &selection(raw)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed, "input {raw:?}");
        assert!(err.field_errors().unwrap().contains("institucion_id"));
    }

    let err = survey.select_institution(&ctx, &selection(999)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "institucion", .. }));
    assert_eq!(survey.stage(&ctx).await.unwrap(), SurveyStage::NoSelection);
}

#[tokio::test]
async fn test_enter_and_submit_require_selection() {
    let harness = TestHarness::new();
    harness.institution("Escuela", "17H00001").await;
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;

    let err = survey.survey_form(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(err.user_message(), NO_SELECTION);

    let err = survey.submit_survey(&ctx, &survey_form("SIEMPRE")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(harness.store.count_surveys().await.unwrap(), 0);
}

#[tokio::test]
async fn test_submit_stores_survey_and_clears_selection() {
    let harness = TestHarness::new();
    let mut last = None;
    for n in 1..=7 {
        last = Some(harness.institution(&format!("Escuela {n}"), &format!("AMIE-{n}")).await);
    }
    let school = last.unwrap();
    assert_eq!(school.id, InstitutionId::new(7));

    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;
    survey.select_institution(&ctx, &selection(7)).await.unwrap();
    let saved = survey.submit_survey(&ctx, &survey_form("SIEMPRE")).await.unwrap();

    assert_eq!(saved.encuesta.data.institution, InstitutionId::new(7));
    for (_, answer) in saved.encuesta.data.answers.iter() {
        assert_eq!(answer, Response::Siempre);
    }
    assert_eq!(harness.store.count_surveys().await.unwrap(), 1);
    assert_eq!(survey.stage(&ctx).await.unwrap(), SurveyStage::NoSelection);

    let err = survey.survey_form(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn test_incomplete_survey_keeps_selection() {
    let harness = TestHarness::new();
    let school = harness.institution("Escuela", "17H00001").await;
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;
    survey.select_institution(&ctx, &selection(school.id)).await.unwrap();

    let mut missing = survey_form("AVECES");
    missing.remove("p4_banos");
    let err = survey.submit_survey(&ctx, &missing).await.unwrap_err();
    let fields = err.field_errors().unwrap();
    assert_eq!(fields.len(), 1);
    assert!(fields.contains("p4_banos"));

    let bogus = survey_form("AVECES").with("p12_capacitacion", "TAL_VEZ");
    let err = survey.submit_survey(&ctx, &bogus).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("p12_capacitacion"));

    let undated = survey_form("AVECES").with("fecha_encuesta", "14/05/2024");
    let err = survey.submit_survey(&ctx, &undated).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("fecha_encuesta"));

    assert_eq!(harness.store.count_surveys().await.unwrap(), 0);
    assert_eq!(
        survey.stage(&ctx).await.unwrap(),
        SurveyStage::InstitutionPending(school.id)
    );

    let saved = survey.submit_survey(&ctx, &survey_form("AVECES")).await.unwrap();
    assert_eq!(saved.encuesta.data.answers.get(Question::Banos), Response::AVeces);
}

#[tokio::test]
async fn test_stale_selection_is_cleared() {
    let harness = TestHarness::new();
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;
    PendingSelection::save(harness.sessions.as_ref(), ctx.session, InstitutionId::new(41))
        .await
        .unwrap();

    let err = survey.submit_survey(&ctx, &survey_form("SIEMPRE")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(survey.stage(&ctx).await.unwrap(), SurveyStage::NoSelection);
    assert_eq!(harness.store.count_surveys().await.unwrap(), 0);
}

#[tokio::test]
async fn test_survey_listing_and_detail() {
    let harness = TestHarness::new();
    let school = harness.institution("Colegio Mejía", "17H00777").await;
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;

    survey.select_institution(&ctx, &selection(school.id)).await.unwrap();
    let older = survey
        .submit_survey(&ctx, &survey_form("CASI_NUNCA").with("fecha_encuesta", "2023-11-02"))
        .await
        .unwrap();
    survey.select_institution(&ctx, &selection(school.id)).await.unwrap();
    let newer = survey
        .submit_survey(&ctx, &survey_form("SIEMPRE").with("observaciones", "Sin rampas"))
        .await
        .unwrap();

    let listed = survey.list_surveys().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].encuesta.id, newer.encuesta.id);
    assert_eq!(listed[1].encuesta.id, older.encuesta.id);
    assert_eq!(listed[0].institucion_nombre.as_deref(), Some("Colegio Mejía"));

    let detail = survey.survey_detail(newer.encuesta.id).await.unwrap();
    assert_eq!(detail.institucion.id, school.id);
    assert_eq!(detail.encuesta.data.notes.as_deref(), Some("Sin rampas"));
    assert_eq!(detail.secciones.len(), 2);
    assert_eq!(detail.secciones[0].preguntas.len(), 7);
    assert_eq!(detail.secciones[1].preguntas[6].campo, "p14_recursos");

    let institution = survey.institution_detail(school.id).await.unwrap();
    assert_eq!(institution.encuestas.len(), 2);

    let err = survey
        .survey_detail(registro_core::SurveyId::new(99))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "encuesta", .. }));
}

#[tokio::test]
async fn test_selection_page_marks_current_choice() {
    let harness = TestHarness::new();
    harness.institution("Zamora", "Z-1").await;
    let school = harness.institution("Ambato", "A-1").await;
    let ctx = harness.visitor();
    let survey = &harness.workflows.survey;

    let page = survey.selection_page(&ctx).await.unwrap();
    assert_eq!(page.seleccionada, None);
    assert_eq!(page.instituciones[0].data.name, "Ambato");

    survey
        .select_institution(&ctx, &FormData::new().with("institucion_id", school.id.to_string()))
        .await
        .unwrap();
    let page = survey.selection_page(&ctx).await.unwrap();
    assert_eq!(page.seleccionada, Some(school.id));
}
