//! Dashboard aggregates.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use registro_core::Result;
use registro_core::types::{
    EquipmentFilter, EquipmentState, EquipmentType, Institution, Maintenance, Survey,
};
use registro_storage::RecordStore;

use crate::store_err;

/// How many recent records a dashboard shows.
pub const RECENT_LIMIT: usize = 5;

/// Equipment count for one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    /// Equipment type
    pub tipo: EquipmentType,
    /// Type label
    pub etiqueta: &'static str,
    /// Number of pieces
    pub total: u64,
}

/// Inventory dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryDashboard {
    /// All equipment
    pub total_equipos: u64,
    /// Equipment in state `OPERATIVO`
    pub equipos_operativos: u64,
    /// Equipment in state `MANTENIMIENTO`
    pub equipos_mantenimiento: u64,
    /// All maintenance events
    pub total_mantenimientos: u64,
    /// Sum of equipment costs
    pub costo_total: Decimal,
    /// Newest maintenance events
    pub mantenimientos_recientes: Vec<Maintenance>,
    /// Count per equipment type, types with no equipment left out
    pub equipos_por_tipo: Vec<TypeCount>,
}

/// Accessibility dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AccessibilityDashboard {
    /// Most recently registered institutions
    pub instituciones_recientes: Vec<Institution>,
    /// Most recently registered surveys
    pub encuestas_recientes: Vec<Survey>,
    /// All institutions
    pub total_instituciones: u64,
    /// All surveys
    pub total_encuestas: u64,
}

/// Builds the dashboards.
#[derive(Clone)]
pub struct Reports {
    store: Arc<dyn RecordStore>,
}

impl Reports {
    /// Creates the reports over a record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Equipment counts, total cost and recent maintenance.
    pub async fn inventory_dashboard(&self) -> Result<InventoryDashboard> {
        let store = &self.store;
        let total_equipos = store
            .count_equipment(&EquipmentFilter::default())
            .await
            .map_err(store_err)?;
        let equipos_operativos = store
            .count_equipment(&EquipmentFilter::by_state(EquipmentState::Operativo))
            .await
            .map_err(store_err)?;
        let equipos_mantenimiento = store
            .count_equipment(&EquipmentFilter::by_state(EquipmentState::Mantenimiento))
            .await
            .map_err(store_err)?;
        let equipos_por_tipo = store
            .count_equipment_by_type()
            .await
            .map_err(store_err)?
            .into_iter()
            .map(|(tipo, total)| TypeCount {
                tipo,
                etiqueta: tipo.label(),
                total,
            })
            .collect();

        Ok(InventoryDashboard {
            total_equipos,
            equipos_operativos,
            equipos_mantenimiento,
            total_mantenimientos: store.count_maintenance().await.map_err(store_err)?,
            costo_total: store.total_equipment_cost().await.map_err(store_err)?,
            mantenimientos_recientes: store
                .recent_maintenance(RECENT_LIMIT)
                .await
                .map_err(store_err)?,
            equipos_por_tipo,
        })
    }

    /// Recent institutions and surveys with totals.
    pub async fn accessibility_dashboard(&self) -> Result<AccessibilityDashboard> {
        let store = &self.store;
        Ok(AccessibilityDashboard {
            instituciones_recientes: store
                .recent_institutions(RECENT_LIMIT)
                .await
                .map_err(store_err)?,
            encuestas_recientes: store
                .recent_surveys(RECENT_LIMIT)
                .await
                .map_err(store_err)?,
            total_instituciones: store.count_institutions().await.map_err(store_err)?,
            total_encuestas: store.count_surveys().await.map_err(store_err)?,
        })
    }
}
