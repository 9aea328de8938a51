//! Error classification as seen through the workflows.

use registro_core::{Error, ErrorKind, InstitutionId};
use registro_workflows::survey::NO_SELECTION;

use crate::common::TestHarness;

#[tokio::test]
async fn test_not_found_messages_name_the_record() {
    let harness = TestHarness::new();

    let err = harness
        .workflows
        .survey
        .institution_detail(InstitutionId::new(5))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.user_message(), "No se encontró el registro de institucion");

    let err = harness
        .workflows
        .inventory
        .equipment_detail(registro_core::EquipmentId::new(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "equipo", ref id } if id == "5"));
}

#[tokio::test]
async fn test_precondition_message_is_user_facing() {
    let harness = TestHarness::new();
    let err = harness
        .workflows
        .survey
        .survey_form(&harness.visitor())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PreconditionFailed { .. }));
    assert_eq!(err.user_message(), NO_SELECTION);
}

#[tokio::test]
async fn test_validation_summary_message() {
    let harness = TestHarness::new();
    let err = harness
        .workflows
        .inventory
        .create_location(&harness.visitor(), &registro_core::FormData::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.user_message(), "Por favor corrige los errores en el formulario");
}
