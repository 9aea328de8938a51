//! SQLite record store.
//!
//! Creates its schema on connect. Uniqueness and references are enforced by
//! the schema; reference checks are also done up front so the error names
//! the missing record. Decimal amounts are stored as canonical text and
//! summed in Rust.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use registro_core::types::{
    Assignment, Equipment, EquipmentFilter, EquipmentType, Institution, Location, Maintenance,
    NewAssignment, NewEquipment, NewInstitution, NewLocation, NewMaintenance, NewSurvey, Question,
    Survey, SurveyAnswers,
};
use registro_core::{
    AssignmentId, EquipmentId, InstitutionId, LocationId, MaintenanceId, SurveyId,
};

use crate::traits::{
    AssignmentStore, EquipmentStore, InstitutionStore, LocationStore, MaintenanceStore,
    SurveyStore,
};
use crate::{Error, Result};

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `database_url` (e.g. `sqlite://registro.db`) and creates
    /// the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_options(database_url, 5).await
    }

    /// Connects with an explicit pool size.
    ///
    /// In-memory databases are private to their connection, so `:memory:`
    /// URLs always get a single long-lived connection.
    pub async fn connect_with_options(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };
        tracing::info!(database_url, "Connected to SQLite record store");
        Self::from_pool(pool).await
    }

    /// Opens (creating if needed) a database file.
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and creates the schema.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates every table that does not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        let answer_columns: String = Question::ALL
            .iter()
            .map(|q| format!("{} TEXT NOT NULL DEFAULT 'NO_APLICA',\n", q.field()))
            .collect();

        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS instituciones (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre_institucion TEXT NOT NULL,
                codigo_amie TEXT NOT NULL UNIQUE,
                provincia TEXT NOT NULL,
                canton TEXT NOT NULL,
                direccion TEXT NOT NULL,
                tipo_institucion TEXT NOT NULL,
                telefono TEXT,
                email TEXT,
                fecha_registro TEXT NOT NULL
            )
            "#
            .to_string(),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS encuestas (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    institucion_id INTEGER NOT NULL
                        REFERENCES instituciones(id) ON DELETE CASCADE,
                    fecha_encuesta TEXT NOT NULL,
                    encuestador TEXT,
                    cargo_encuestador TEXT,
                    {answer_columns}
                    observaciones TEXT,
                    recomendaciones TEXT,
                    fecha_registro TEXT NOT NULL
                )
                "#
            ),
            r#"
            CREATE TABLE IF NOT EXISTS equipos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                codigo_inventario TEXT NOT NULL UNIQUE,
                tipo TEXT NOT NULL,
                marca TEXT NOT NULL,
                modelo TEXT NOT NULL,
                numero_serie TEXT NOT NULL UNIQUE,
                anio_adquisicion INTEGER NOT NULL,
                costo TEXT NOT NULL,
                estado TEXT NOT NULL,
                condicion_fisica TEXT NOT NULL,
                descripcion TEXT,
                fecha_registro TEXT NOT NULL,
                fecha_actualizacion TEXT NOT NULL
            )
            "#
            .to_string(),
            r#"
            CREATE TABLE IF NOT EXISTS ubicaciones (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                area TEXT NOT NULL,
                aula_laboratorio TEXT NOT NULL,
                piso TEXT,
                edificio TEXT,
                descripcion TEXT
            )
            "#
            .to_string(),
            r#"
            CREATE TABLE IF NOT EXISTS asignaciones (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipo_id INTEGER NOT NULL UNIQUE
                    REFERENCES equipos(id) ON DELETE CASCADE,
                ubicacion_id INTEGER NOT NULL
                    REFERENCES ubicaciones(id) ON DELETE CASCADE,
                fecha_asignacion TEXT NOT NULL,
                responsable TEXT,
                observaciones TEXT
            )
            "#
            .to_string(),
            r#"
            CREATE TABLE IF NOT EXISTS mantenimientos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipo_id INTEGER NOT NULL
                    REFERENCES equipos(id) ON DELETE CASCADE,
                usuario TEXT,
                fecha TEXT NOT NULL,
                tipo TEXT NOT NULL,
                descripcion TEXT NOT NULL,
                actividades_realizadas TEXT NOT NULL,
                repuestos TEXT,
                costo_mantenimiento TEXT NOT NULL DEFAULT '0.00',
                estado_posterior TEXT NOT NULL,
                observaciones TEXT,
                proximo_mantenimiento TEXT,
                fecha_registro TEXT NOT NULL
            )
            "#
            .to_string(),
        ];

        for stmt in &ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Backend(format!("schema init failed: {e}")))?;
        }
        tracing::debug!(tables = ddl.len(), "SQLite schema ready");
        Ok(())
    }

    async fn exists(&self, table: &'static str, id: i64) -> Result<bool> {
        let row = sqlx::query(&format!("SELECT 1 FROM {table} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn count(&self, table: &'static str) -> Result<u64> {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS total FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }
}

// ============================================================================
// Row decoding
// ============================================================================

fn decode<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e| Error::Corrupt(format!("{column}: {e}")))
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn institution_from_row(row: &SqliteRow) -> Result<Institution> {
    Ok(Institution {
        id: InstitutionId::new(row.try_get("id")?),
        data: NewInstitution {
            name: row.try_get("nombre_institucion")?,
            amie_code: row.try_get("codigo_amie")?,
            province: row.try_get("provincia")?,
            canton: row.try_get("canton")?,
            address: row.try_get("direccion")?,
            institution_type: decode(row, "tipo_institucion")?,
            phone: row.try_get("telefono")?,
            email: row.try_get("email")?,
        },
        registered_at: row.try_get("fecha_registro")?,
    })
}

fn survey_from_row(row: &SqliteRow) -> Result<Survey> {
    let mut answers = SurveyAnswers::default();
    for question in Question::ALL {
        answers.set(question, decode(row, question.field())?);
    }
    Ok(Survey {
        id: SurveyId::new(row.try_get("id")?),
        data: NewSurvey {
            institution: InstitutionId::new(row.try_get("institucion_id")?),
            survey_date: row.try_get("fecha_encuesta")?,
            surveyor: row.try_get("encuestador")?,
            surveyor_role: row.try_get("cargo_encuestador")?,
            answers,
            notes: row.try_get("observaciones")?,
            recommendations: row.try_get("recomendaciones")?,
        },
        registered_at: row.try_get("fecha_registro")?,
    })
}

fn equipment_from_row(row: &SqliteRow) -> Result<Equipment> {
    Ok(Equipment {
        id: EquipmentId::new(row.try_get("id")?),
        data: NewEquipment {
            inventory_code: row.try_get("codigo_inventario")?,
            equipment_type: decode(row, "tipo")?,
            brand: row.try_get("marca")?,
            model: row.try_get("modelo")?,
            serial_number: row.try_get("numero_serie")?,
            acquisition_year: row.try_get("anio_adquisicion")?,
            cost: decode(row, "costo")?,
            state: decode(row, "estado")?,
            condition: decode(row, "condicion_fisica")?,
            description: row.try_get("descripcion")?,
        },
        registered_at: row.try_get("fecha_registro")?,
        updated_at: row.try_get("fecha_actualizacion")?,
    })
}

fn location_from_row(row: &SqliteRow) -> Result<Location> {
    Ok(Location {
        id: LocationId::new(row.try_get("id")?),
        data: NewLocation {
            area: row.try_get("area")?,
            room: row.try_get("aula_laboratorio")?,
            floor: row.try_get("piso")?,
            building: row.try_get("edificio")?,
            description: row.try_get("descripcion")?,
        },
    })
}

fn assignment_from_row(row: &SqliteRow) -> Result<Assignment> {
    Ok(Assignment {
        id: AssignmentId::new(row.try_get("id")?),
        data: NewAssignment {
            equipment: EquipmentId::new(row.try_get("equipo_id")?),
            location: LocationId::new(row.try_get("ubicacion_id")?),
            responsible: row.try_get("responsable")?,
            notes: row.try_get("observaciones")?,
        },
        assigned_on: row.try_get("fecha_asignacion")?,
    })
}

fn maintenance_from_row(row: &SqliteRow) -> Result<Maintenance> {
    Ok(Maintenance {
        id: MaintenanceId::new(row.try_get("id")?),
        data: NewMaintenance {
            equipment: EquipmentId::new(row.try_get("equipo_id")?),
            performed_by: row.try_get("usuario")?,
            date: row.try_get("fecha")?,
            maintenance_type: decode(row, "tipo")?,
            description: row.try_get("descripcion")?,
            activities: row.try_get("actividades_realizadas")?,
            parts: row.try_get("repuestos")?,
            cost: decode(row, "costo_mantenimiento")?,
            resulting_state: row.try_get("estado_posterior")?,
            notes: row.try_get("observaciones")?,
            next_due: row.try_get("proximo_mantenimiento")?,
        },
        registered_at: row.try_get("fecha_registro")?,
    })
}

/// Unique column, the form field it reports as, and the submitted value.
type UniqueKey<'a> = (&'static str, &'static str, &'a str);

fn map_write_error(err: sqlx::Error, entity: &'static str, keys: &[UniqueKey<'_>]) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            let key = keys
                .iter()
                .find(|(column, _, _)| message.contains(column))
                .or_else(|| keys.first());
            if let Some(&(_, field, value)) = key {
                return Error::conflict(entity, field, value);
            }
        }
        if db_err.is_foreign_key_violation() {
            return Error::missing_reference("referencia", db_err.message());
        }
    }
    Error::Database(err)
}

// ============================================================================
// Trait implementations
// ============================================================================

#[async_trait]
impl InstitutionStore for SqliteStore {
    async fn insert_institution(&self, new: NewInstitution) -> Result<Institution> {
        let registered_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO instituciones (
                nombre_institucion, codigo_amie, provincia, canton, direccion,
                tipo_institucion, telefono, email, fecha_registro
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.amie_code)
        .bind(&new.province)
        .bind(&new.canton)
        .bind(&new.address)
        .bind(new.institution_type.code())
        .bind(&new.phone)
        .bind(&new.email)
        .bind(registered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "institucion",
                &[("codigo_amie", "codigo_amie", new.amie_code.as_str())],
            )
        })?;

        Ok(Institution {
            id: InstitutionId::new(result.last_insert_rowid()),
            data: new,
            registered_at,
        })
    }

    async fn get_institution(&self, id: InstitutionId) -> Result<Option<Institution>> {
        sqlx::query("SELECT * FROM instituciones WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(institution_from_row)
            .transpose()
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        sqlx::query("SELECT * FROM instituciones ORDER BY nombre_institucion, id")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(institution_from_row)
            .collect()
    }

    async fn recent_institutions(&self, limit: usize) -> Result<Vec<Institution>> {
        sqlx::query("SELECT * FROM instituciones ORDER BY fecha_registro DESC, id DESC LIMIT ?")
            .bind(limit_param(limit))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(institution_from_row)
            .collect()
    }

    async fn count_institutions(&self) -> Result<u64> {
        self.count("instituciones").await
    }
}

#[async_trait]
impl SurveyStore for SqliteStore {
    async fn insert_survey(&self, new: NewSurvey) -> Result<Survey> {
        if !self.exists("instituciones", new.institution.get()).await? {
            return Err(Error::missing_reference("institucion", new.institution));
        }

        let answer_columns: Vec<&str> = Question::ALL.iter().map(|q| q.field()).collect();
        let placeholders = vec!["?"; answer_columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO encuestas (institucion_id, fecha_encuesta, encuestador, \
             cargo_encuestador, {}, observaciones, recomendaciones, fecha_registro) \
             VALUES (?, ?, ?, ?, {placeholders}, ?, ?, ?)",
            answer_columns.join(", ")
        );

        let registered_at = Utc::now();
        let mut query = sqlx::query(&sql)
            .bind(new.institution.get())
            .bind(new.survey_date)
            .bind(&new.surveyor)
            .bind(&new.surveyor_role);
        for (_, response) in new.answers.iter() {
            query = query.bind(response.code());
        }
        let result = query
            .bind(&new.notes)
            .bind(&new.recommendations)
            .bind(registered_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "encuesta", &[]))?;

        Ok(Survey {
            id: SurveyId::new(result.last_insert_rowid()),
            data: new,
            registered_at,
        })
    }

    async fn get_survey(&self, id: SurveyId) -> Result<Option<Survey>> {
        sqlx::query("SELECT * FROM encuestas WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(survey_from_row)
            .transpose()
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>> {
        sqlx::query("SELECT * FROM encuestas ORDER BY fecha_encuesta DESC, id DESC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(survey_from_row)
            .collect()
    }

    async fn surveys_for_institution(&self, id: InstitutionId) -> Result<Vec<Survey>> {
        sqlx::query(
            "SELECT * FROM encuestas WHERE institucion_id = ? \
             ORDER BY fecha_encuesta DESC, id DESC",
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(survey_from_row)
        .collect()
    }

    async fn recent_surveys(&self, limit: usize) -> Result<Vec<Survey>> {
        sqlx::query("SELECT * FROM encuestas ORDER BY fecha_registro DESC, id DESC LIMIT ?")
            .bind(limit_param(limit))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(survey_from_row)
            .collect()
    }

    async fn count_surveys(&self) -> Result<u64> {
        self.count("encuestas").await
    }
}

#[async_trait]
impl EquipmentStore for SqliteStore {
    async fn insert_equipment(&self, new: NewEquipment) -> Result<Equipment> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO equipos (
                codigo_inventario, tipo, marca, modelo, numero_serie, anio_adquisicion,
                costo, estado, condicion_fisica, descripcion,
                fecha_registro, fecha_actualizacion
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.inventory_code)
        .bind(new.equipment_type.code())
        .bind(&new.brand)
        .bind(&new.model)
        .bind(&new.serial_number)
        .bind(new.acquisition_year)
        .bind(new.cost.to_string())
        .bind(new.state.code())
        .bind(new.condition.code())
        .bind(&new.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "equipo", &equipment_keys(&new)))?;

        Ok(Equipment {
            id: EquipmentId::new(result.last_insert_rowid()),
            data: new,
            registered_at: now,
            updated_at: now,
        })
    }

    async fn update_equipment(&self, id: EquipmentId, data: NewEquipment) -> Result<Equipment> {
        let result = sqlx::query(
            r#"
            UPDATE equipos
               SET codigo_inventario = ?, tipo = ?, marca = ?, modelo = ?,
                   numero_serie = ?, anio_adquisicion = ?, costo = ?, estado = ?,
                   condicion_fisica = ?, descripcion = ?, fecha_actualizacion = ?
             WHERE id = ?
            "#,
        )
        .bind(&data.inventory_code)
        .bind(data.equipment_type.code())
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(data.acquisition_year)
        .bind(data.cost.to_string())
        .bind(data.state.code())
        .bind(data.condition.code())
        .bind(&data.description)
        .bind(Utc::now())
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "equipo", &equipment_keys(&data)))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("equipo", id));
        }
        self.get_equipment(id)
            .await?
            .ok_or_else(|| Error::not_found("equipo", id))
    }

    async fn get_equipment(&self, id: EquipmentId) -> Result<Option<Equipment>> {
        sqlx::query("SELECT * FROM equipos WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(equipment_from_row)
            .transpose()
    }

    async fn list_equipment(&self, filter: &EquipmentFilter) -> Result<Vec<Equipment>> {
        let mut sql = String::from("SELECT * FROM equipos WHERE 1 = 1");
        if filter.equipment_type.is_some() {
            sql.push_str(" AND tipo = ?");
        }
        if filter.state.is_some() {
            sql.push_str(" AND estado = ?");
        }
        sql.push_str(" ORDER BY codigo_inventario");

        let mut query = sqlx::query(&sql);
        if let Some(kind) = filter.equipment_type {
            query = query.bind(kind.code());
        }
        if let Some(state) = filter.state {
            query = query.bind(state.code());
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut matching = Vec::with_capacity(rows.len());
        for row in &rows {
            let equipment = equipment_from_row(row)?;
            if filter.matches(&equipment) {
                matching.push(equipment);
            }
        }
        Ok(matching)
    }

    async fn total_equipment_cost(&self) -> Result<Decimal> {
        let rows = sqlx::query("SELECT costo FROM equipos")
            .fetch_all(&self.pool)
            .await?;
        let mut total = Decimal::ZERO;
        for row in &rows {
            total += decode::<Decimal>(row, "costo")?;
        }
        total.rescale(2);
        Ok(total)
    }

    async fn count_equipment_by_type(&self) -> Result<Vec<(EquipmentType, u64)>> {
        let rows = sqlx::query("SELECT tipo, COUNT(*) AS total FROM equipos GROUP BY tipo")
            .fetch_all(&self.pool)
            .await?;
        let mut counts = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind: EquipmentType = decode(row, "tipo")?;
            let total: i64 = row.try_get("total")?;
            counts.push((kind, total.max(0) as u64));
        }
        counts.sort_by_key(|(kind, _)| EquipmentType::ALL.iter().position(|k| k == kind));
        Ok(counts)
    }
}

fn equipment_keys(data: &NewEquipment) -> [UniqueKey<'_>; 2] {
    [
        ("codigo_inventario", "codigo_inventario", data.inventory_code.as_str()),
        ("numero_serie", "numero_serie", data.serial_number.as_str()),
    ]
}

#[async_trait]
impl LocationStore for SqliteStore {
    async fn insert_location(&self, new: NewLocation) -> Result<Location> {
        let result = sqlx::query(
            "INSERT INTO ubicaciones (area, aula_laboratorio, piso, edificio, descripcion) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new.area)
        .bind(&new.room)
        .bind(&new.floor)
        .bind(&new.building)
        .bind(&new.description)
        .execute(&self.pool)
        .await?;

        Ok(Location {
            id: LocationId::new(result.last_insert_rowid()),
            data: new,
        })
    }

    async fn update_location(&self, id: LocationId, data: NewLocation) -> Result<Location> {
        let result = sqlx::query(
            "UPDATE ubicaciones SET area = ?, aula_laboratorio = ?, piso = ?, edificio = ?, \
             descripcion = ? WHERE id = ?",
        )
        .bind(&data.area)
        .bind(&data.room)
        .bind(&data.floor)
        .bind(&data.building)
        .bind(&data.description)
        .bind(id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("ubicacion", id));
        }
        Ok(Location { id, data })
    }

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>> {
        sqlx::query("SELECT * FROM ubicaciones WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(location_from_row)
            .transpose()
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        sqlx::query("SELECT * FROM ubicaciones ORDER BY area, aula_laboratorio")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(location_from_row)
            .collect()
    }
}

#[async_trait]
impl AssignmentStore for SqliteStore {
    async fn insert_assignment(&self, new: NewAssignment) -> Result<Assignment> {
        if !self.exists("equipos", new.equipment.get()).await? {
            return Err(Error::missing_reference("equipo", new.equipment));
        }
        if !self.exists("ubicaciones", new.location.get()).await? {
            return Err(Error::missing_reference("ubicacion", new.location));
        }

        let assigned_on = Utc::now().date_naive();
        let equipment = new.equipment.to_string();
        let result = sqlx::query(
            "INSERT INTO asignaciones (equipo_id, ubicacion_id, fecha_asignacion, responsable, \
             observaciones) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(new.equipment.get())
        .bind(new.location.get())
        .bind(assigned_on)
        .bind(&new.responsible)
        .bind(&new.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, "asignacion", &[("equipo_id", "equipo", equipment.as_str())])
        })?;

        Ok(Assignment {
            id: AssignmentId::new(result.last_insert_rowid()),
            data: new,
            assigned_on,
        })
    }

    async fn assignment_for_equipment(&self, id: EquipmentId) -> Result<Option<Assignment>> {
        sqlx::query("SELECT * FROM asignaciones WHERE equipo_id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(assignment_from_row)
            .transpose()
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        sqlx::query("SELECT * FROM asignaciones ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(assignment_from_row)
            .collect()
    }
}

#[async_trait]
impl MaintenanceStore for SqliteStore {
    async fn insert_maintenance(&self, new: NewMaintenance) -> Result<Maintenance> {
        if !self.exists("equipos", new.equipment.get()).await? {
            return Err(Error::missing_reference("equipo", new.equipment));
        }

        let registered_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO mantenimientos (
                equipo_id, usuario, fecha, tipo, descripcion, actividades_realizadas,
                repuestos, costo_mantenimiento, estado_posterior, observaciones,
                proximo_mantenimiento, fecha_registro
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.equipment.get())
        .bind(&new.performed_by)
        .bind(new.date)
        .bind(new.maintenance_type.code())
        .bind(&new.description)
        .bind(&new.activities)
        .bind(&new.parts)
        .bind(new.cost.to_string())
        .bind(&new.resulting_state)
        .bind(&new.notes)
        .bind(new.next_due)
        .bind(registered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "mantenimiento", &[]))?;

        Ok(Maintenance {
            id: MaintenanceId::new(result.last_insert_rowid()),
            data: new,
            registered_at,
        })
    }

    async fn list_maintenance(&self) -> Result<Vec<Maintenance>> {
        sqlx::query("SELECT * FROM mantenimientos ORDER BY fecha DESC, id DESC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(maintenance_from_row)
            .collect()
    }

    async fn maintenance_for_equipment(&self, id: EquipmentId) -> Result<Vec<Maintenance>> {
        sqlx::query("SELECT * FROM mantenimientos WHERE equipo_id = ? ORDER BY fecha DESC, id DESC")
            .bind(id.get())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(maintenance_from_row)
            .collect()
    }

    async fn recent_maintenance(&self, limit: usize) -> Result<Vec<Maintenance>> {
        sqlx::query("SELECT * FROM mantenimientos ORDER BY fecha DESC, id DESC LIMIT ?")
            .bind(limit_param(limit))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(maintenance_from_row)
            .collect()
    }

    async fn count_maintenance(&self) -> Result<u64> {
        self.count("mantenimientos").await
    }
}
