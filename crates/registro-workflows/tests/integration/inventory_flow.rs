//! Integration tests for the inventory workflows.

use rust_decimal::Decimal;

use registro_core::types::{EquipmentState, EquipmentType};
use registro_core::{EquipmentId, Error, ErrorKind, FormData, LocationId};
use registro_storage::{EquipmentStore, MaintenanceStore};

use crate::common::{TestHarness, assignment_form, equipment_form, location_form, maintenance_form};

#[tokio::test]
async fn test_duplicate_inventory_code_is_rejected() {
    let harness = TestHarness::new();
    let ctx = harness.user("tecnico");
    let inventory = &harness.workflows.inventory;

    inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-100", "LAPTOP", "OPERATIVO", "850.5"))
        .await
        .unwrap();
    let err = inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-200", "LAPTOP", "OPERATIVO", "900"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UniquenessConflict);
    assert_eq!(
        err.user_message(),
        "Ya existe un registro con codigo_inventario \"EQ-001\""
    );

    let err = inventory
        .create_equipment(&ctx, &equipment_form("EQ-002", "SN-100", "LAPTOP", "OPERATIVO", "900"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict { field: "numero_serie", .. }));

    let all = harness.store.list_equipment(&Default::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].data.cost.to_string(), "850.50");
}

#[tokio::test]
async fn test_equipment_form_validation() {
    let harness = TestHarness::new();
    let form = equipment_form("EQ-001", "SN-1", "PIZARRA", "OPERATIVO", "-1")
        .with("anio_adquisicion", "1999");

    let err = harness
        .workflows
        .inventory
        .create_equipment(&harness.user("tecnico"), &form)
        .await
        .unwrap_err();
    let fields = err.field_errors().unwrap();
    assert!(fields.contains("tipo"));
    assert!(fields.contains("costo"));
    assert!(fields.contains("anio_adquisicion"));
    assert_eq!(fields.len(), 3);
}

#[tokio::test]
async fn test_update_equipment() {
    let harness = TestHarness::new();
    let ctx = harness.user("tecnico");
    let inventory = &harness.workflows.inventory;
    let created = inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-1", "COMPUTADORA", "OPERATIVO", "500"))
        .await
        .unwrap();

    let page = inventory.edit_equipment_form(created.id).await.unwrap();
    assert_eq!(page.valores.value("codigo_inventario"), Some("EQ-001"));
    assert_eq!(page.valores.value("estado"), Some("OPERATIVO"));

    let edited = page.valores.clone().with("estado", "MANTENIMIENTO");
    let updated = inventory.update_equipment(&ctx, created.id, &edited).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.data.state, EquipmentState::Mantenimiento);

    let err = inventory
        .update_equipment(&ctx, EquipmentId::new(404), &FormData::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "equipo", .. }));
}

#[tokio::test]
async fn test_equipment_filters() {
    let harness = TestHarness::new();
    let ctx = harness.user("tecnico");
    let inventory = &harness.workflows.inventory;
    for (code, serial, kind, state) in [
        ("LAB-01", "AAA111", "COMPUTADORA", "OPERATIVO"),
        ("LAB-02", "BBB222", "COMPUTADORA", "DAÑADO"),
        ("LAB-03", "CCC333", "PROYECTOR", "OPERATIVO"),
        ("ADM-01", "DDD444", "IMPRESORA", "MANTENIMIENTO"),
    ] {
        inventory
            .create_equipment(&ctx, &equipment_form(code, serial, kind, state, "100"))
            .await
            .unwrap();
    }

    let operative = inventory
        .list_equipment(&FormData::new().with("estado", "OPERATIVO"))
        .await
        .unwrap();
    let codes: Vec<&str> = operative
        .equipos
        .iter()
        .map(|e| e.data.inventory_code.as_str())
        .collect();
    assert_eq!(codes, vec!["LAB-01", "LAB-03"]);
    assert_eq!(operative.filtros.state, Some(EquipmentState::Operativo));
    assert_eq!(operative.tipos.len(), EquipmentType::ALL.len());

    let intersect = inventory
        .list_equipment(&FormData::new().with("q", "lab").with("tipo", "COMPUTADORA"))
        .await
        .unwrap();
    assert_eq!(intersect.equipos.len(), 2);

    let blank = inventory
        .list_equipment(&FormData::new().with("q", " ").with("tipo", ""))
        .await
        .unwrap();
    assert_eq!(blank.equipos.len(), 4);

    let err = inventory
        .list_equipment(&FormData::new().with("tipo", "PIZARRA"))
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("tipo"));
}

#[tokio::test]
async fn test_equipment_specific_maintenance_forces_equipment() {
    let harness = TestHarness::new();
    let ctx = harness.user("rvaca");
    let inventory = &harness.workflows.inventory;
    let target = inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-1", "LAPTOP", "OPERATIVO", "100"))
        .await
        .unwrap();
    let other = inventory
        .create_equipment(&ctx, &equipment_form("EQ-002", "SN-2", "LAPTOP", "OPERATIVO", "100"))
        .await
        .unwrap();

    let event = inventory
        .create_maintenance(&ctx, &maintenance_form(other.id, "2024-04-02"), Some(target.id))
        .await
        .unwrap();
    assert_eq!(event.data.equipment, target.id);
    assert_eq!(event.data.performed_by.as_deref(), Some("rvaca"));
    assert_eq!(event.data.cost, Decimal::new(4550, 2));

    let mut form_without_equipment = maintenance_form(other.id, "2024-04-03");
    form_without_equipment.remove("equipo");
    inventory
        .create_maintenance(&ctx, &form_without_equipment, Some(target.id))
        .await
        .unwrap();
    assert_eq!(
        harness.store.maintenance_for_equipment(target.id).await.unwrap().len(),
        2
    );
    assert!(harness
        .store
        .maintenance_for_equipment(other.id)
        .await
        .unwrap()
        .is_empty());

    let err = inventory
        .create_maintenance(&ctx, &maintenance_form(other.id, "2024-04-02"), Some(EquipmentId::new(77)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = inventory.maintenance_form(Some(EquipmentId::new(77))).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let page = inventory.maintenance_form(Some(target.id)).await.unwrap();
    assert_eq!(page.equipo.map(|e| e.id), Some(target.id));
}

#[tokio::test]
async fn test_general_maintenance_entry_and_listing() {
    let harness = TestHarness::new();
    let ctx = harness.visitor();
    let inventory = &harness.workflows.inventory;
    let pc = inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-1", "COMPUTADORA", "OPERATIVO", "100"))
        .await
        .unwrap();

    let event = inventory
        .create_maintenance(&ctx, &maintenance_form(pc.id, "2024-01-10").with("costo_mantenimiento", ""), None)
        .await
        .unwrap();
    assert_eq!(event.data.performed_by, None);
    assert_eq!(event.data.cost.to_string(), "0.00");

    let err = inventory
        .create_maintenance(&ctx, &maintenance_form(999, "2024-01-10"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let listed = inventory.list_maintenance().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].equipo.as_ref().map(|e| e.id), Some(pc.id));
    assert_eq!(harness.store.count_maintenance().await.unwrap(), 1);
}

#[tokio::test]
async fn test_one_assignment_per_equipment() {
    let harness = TestHarness::new();
    let ctx = harness.user("coordinador");
    let inventory = &harness.workflows.inventory;
    let pc = inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-1", "COMPUTADORA", "OPERATIVO", "100"))
        .await
        .unwrap();
    let lab = inventory
        .create_location(&ctx, &location_form("Laboratorios", "Lab 1"))
        .await
        .unwrap();

    let saved = inventory
        .create_assignment(&ctx, &assignment_form(pc.id, lab.id), None)
        .await
        .unwrap();
    assert_eq!(saved.data.responsible.as_deref(), Some("coordinador"));

    let err = inventory
        .create_assignment(&ctx, &assignment_form(pc.id, lab.id), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UniquenessConflict);
    assert_eq!(err.user_message(), "Este equipo ya tiene una asignación registrada");
    assert_eq!(inventory.list_assignments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_assignment_entry_points() {
    let harness = TestHarness::new();
    let ctx = harness.user("coordinador");
    let inventory = &harness.workflows.inventory;
    let pc = inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-1", "COMPUTADORA", "OPERATIVO", "100"))
        .await
        .unwrap();
    let lab = inventory
        .create_location(&ctx, &location_form("Laboratorios", "Lab 1"))
        .await
        .unwrap();

    let err = inventory
        .create_assignment(&ctx, &assignment_form(pc.id, LocationId::new(50)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "ubicacion", .. }));

    let form = FormData::new()
        .with("ubicacion", lab.id.to_string())
        .with("responsable", "Lcda. Andrade");
    let saved = inventory.create_assignment(&ctx, &form, Some(pc.id)).await.unwrap();
    assert_eq!(saved.data.equipment, pc.id);
    assert_eq!(saved.data.responsible.as_deref(), Some("Lcda. Andrade"));

    let page = inventory.assignment_form(Some(pc.id)).await.unwrap();
    assert_eq!(page.ubicaciones.len(), 1);
    assert!(page.formulario.titulo.starts_with("Asignar Equipo: "));
}

#[tokio::test]
async fn test_equipment_detail() {
    let harness = TestHarness::new();
    let ctx = harness.user("tecnico");
    let inventory = &harness.workflows.inventory;
    let pc = inventory
        .create_equipment(&ctx, &equipment_form("EQ-001", "SN-1", "COMPUTADORA", "OPERATIVO", "100"))
        .await
        .unwrap();
    let lab = inventory
        .create_location(&ctx, &location_form("Laboratorios", "Lab 1"))
        .await
        .unwrap();

    let detail = inventory.equipment_detail(pc.id).await.unwrap();
    assert!(detail.mantenimientos.is_empty());
    assert!(detail.asignacion.is_none());

    inventory
        .create_maintenance(&ctx, &maintenance_form(pc.id, "2024-02-01"), None)
        .await
        .unwrap();
    inventory
        .create_maintenance(&ctx, &maintenance_form(pc.id, "2024-06-01"), None)
        .await
        .unwrap();
    inventory
        .create_assignment(&ctx, &assignment_form(pc.id, lab.id), None)
        .await
        .unwrap();

    let detail = inventory.equipment_detail(pc.id).await.unwrap();
    assert_eq!(detail.mantenimientos.len(), 2);
    assert!(detail.mantenimientos[0].data.date > detail.mantenimientos[1].data.date);
    let assignment = detail.asignacion.unwrap();
    assert_eq!(assignment.ubicacion.map(|l| l.id), Some(lab.id));

    let location = inventory.location_detail(lab.id).await.unwrap();
    assert_eq!(location.equipos.len(), 1);
    assert_eq!(location.equipos[0].id, pc.id);
}

#[tokio::test]
async fn test_locations() {
    let harness = TestHarness::new();
    let ctx = harness.user("tecnico");
    let inventory = &harness.workflows.inventory;

    let err = inventory
        .create_location(&ctx, &FormData::new().with("area", "Biblioteca"))
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("aula_laboratorio"));

    let library = inventory
        .create_location(&ctx, &location_form("Biblioteca", "Sala 1"))
        .await
        .unwrap();
    inventory
        .create_location(&ctx, &location_form("Administración", "Rectorado"))
        .await
        .unwrap();

    let page = inventory.edit_location_form(library.id).await.unwrap();
    assert_eq!(page.valores.value("area"), Some("Biblioteca"));

    let edited = page.valores.clone().with("edificio", "Bloque B");
    let updated = inventory.update_location(&ctx, library.id, &edited).await.unwrap();
    assert_eq!(updated.data.building.as_deref(), Some("Bloque B"));

    let areas: Vec<String> = inventory
        .list_locations()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.data.area)
        .collect();
    assert_eq!(areas, vec!["Administración", "Biblioteca"]);

    let err = inventory.edit_location_form(LocationId::new(9)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "ubicacion", .. }));
}
