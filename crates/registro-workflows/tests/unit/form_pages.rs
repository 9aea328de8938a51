//! Unit tests for the blank forms and the selection property.

use proptest::prelude::*;

use registro_core::types::Response;
use registro_workflows::{SurveyStage, Workflows};

use crate::common::{TestHarness, selection};

#[test]
fn test_institution_form_fields() {
    let harness = TestHarness::new();
    let page = harness.workflows.survey.institution_form();

    assert_eq!(page.titulo, "Registrar Institución");
    let names: Vec<&str> = page.campos.iter().map(|f| f.name).collect();
    assert_eq!(names[0], "nombre_institucion");
    assert!(names.contains(&"codigo_amie"));
    let email = page.campos.iter().find(|f| f.name == "email").unwrap();
    assert!(!email.required);
    assert_eq!(email.max_length, Some(254));
    assert!(page.valores.is_empty());
}

#[test]
fn test_equipment_and_location_forms() {
    let harness = TestHarness::new();
    let inventory = &harness.workflows.inventory;

    let equipment = inventory.equipment_form();
    let kind = equipment.campos.iter().find(|f| f.name == "tipo").unwrap();
    assert_eq!(kind.choices.map(|c| c.len()), Some(10));

    let location = inventory.location_form();
    assert_eq!(location.titulo, "Agregar Ubicación");
    assert_eq!(location.campos.len(), 5);
}

#[test]
fn test_form_page_serializes_as_context() {
    let harness = TestHarness::new();
    let json = serde_json::to_value(harness.workflows.inventory.equipment_form()).unwrap();
    assert_eq!(json["titulo"], "Agregar Equipo");
    assert!(json["campos"].is_array());
    assert!(json["valores"].as_object().unwrap().is_empty());
}

fn workflows_with_institutions(count: usize) -> (TestHarness, tokio::runtime::Runtime) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let harness = TestHarness::new();
    runtime.block_on(async {
        for n in 0..count {
            harness
                .institution(&format!("Escuela {n}"), &format!("AMIE-{n}"))
                .await;
        }
    });
    (harness, runtime)
}

async fn select_all(workflows: &Workflows, picks: &[i64]) -> SurveyStage {
    let ctx = registro_core::RequestContext::anonymous(registro_core::SessionId::new());
    for id in picks {
        workflows
            .survey
            .select_institution(&ctx, &selection(id))
            .await
            .unwrap();
    }
    workflows.survey.stage(&ctx).await.unwrap()
}

proptest! {
    #[test]
    fn prop_last_selection_wins(picks in proptest::collection::vec(1i64..=5, 1..8)) {
        let (harness, runtime) = workflows_with_institutions(5);
        let stage = runtime.block_on(select_all(&harness.workflows, &picks));
        let last = *picks.last().unwrap();
        prop_assert_eq!(stage, SurveyStage::InstitutionPending(last.into()));
    }

    #[test]
    fn prop_uniform_survey_round_trips(index in 0usize..6) {
        let answer = Response::ALL[index];
        let (harness, runtime) = workflows_with_institutions(1);
        let saved = runtime.block_on(async {
            let ctx = harness.visitor();
            harness.workflows.survey.select_institution(&ctx, &selection(1)).await.unwrap();
            harness
                .workflows
                .survey
                .submit_survey(&ctx, &crate::common::survey_form(answer.code()))
                .await
                .unwrap()
        });
        prop_assert!(saved.encuesta.data.answers.iter().all(|(_, r)| r == answer));
    }
}
