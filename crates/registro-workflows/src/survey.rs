//! Institution registration and the accessibility survey.
//!
//! A survey is submitted in two requests. The first selects an institution
//! and records it in the session as the [`PendingSelection`]; the second
//! submits the 14-question form, which is stored against that institution.
//! The selection is cleared once the survey is saved.
//!
//! ```text
//! NoSelection --select--> InstitutionPending --submit(valid)--> NoSelection
//!                             |   ^
//!                             +---+ select again / submit(invalid)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use registro_core::types::{
    Choice, INSTITUTION_SCHEMA, Institution, NewInstitution, Question, Response, SURVEY_SCHEMA,
    SectionAnswers, Survey, SurveyForm, SurveySection,
};
use registro_core::validation::{Constraint, FieldSpec, FormField, Schema, validate};
use registro_core::{Error, FormData, InstitutionId, RequestContext, Result, SurveyId};
use registro_storage::RecordStore;

use crate::session::{PendingSelection, SessionStore};
use crate::store_err;
use crate::views::FormPage;

/// Shown when the survey form is reached without a selected institution.
pub const NO_SELECTION: &str = "Primero debe seleccionar una institución";

const SELECTION_SCHEMA: Schema = Schema {
    record: "seleccion",
    fields: &[FieldSpec {
        name: PendingSelection::KEY,
        label: "Institución",
        constraints: &[Constraint::Required, Constraint::Reference],
    }],
};

/// Where a session stands in the survey flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyStage {
    /// No institution selected.
    NoSelection,
    /// An institution is selected and awaits its survey.
    InstitutionPending(InstitutionId),
}

// ============================================================================
// Context mappings
// ============================================================================

/// Institution with its surveys.
#[derive(Debug, Clone, Serialize)]
pub struct InstitutionDetail {
    /// The institution
    pub institucion: Institution,
    /// Its surveys, newest survey date first
    pub encuestas: Vec<Survey>,
}

/// The institution picker.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionPage {
    /// Every institution, by name
    pub instituciones: Vec<Institution>,
    /// Currently selected institution, if any
    pub seleccionada: Option<InstitutionId>,
}

/// Question fields of one survey section.
#[derive(Debug, Clone, Serialize)]
pub struct FormSection {
    /// Section
    pub seccion: SurveySection,
    /// Section title
    pub titulo: &'static str,
    /// Question fields
    pub campos: Vec<FormField>,
}

/// The survey form for the selected institution.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyFormPage {
    /// Institution being surveyed
    pub institucion: Institution,
    /// Date, surveyor and free-text fields
    pub generales: Vec<FormField>,
    /// Question fields grouped by section
    pub secciones: Vec<FormSection>,
    /// Allowed answers
    pub respuestas: Vec<Choice>,
}

/// A survey row in the survey listing.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyListItem {
    /// The survey
    #[serde(flatten)]
    pub encuesta: Survey,
    /// Name of the surveyed institution
    pub institucion_nombre: Option<String>,
}

/// A freshly stored survey and the institution it was bound to.
#[derive(Debug, Clone, Serialize)]
pub struct SavedSurvey {
    /// The stored survey
    pub encuesta: Survey,
    /// Institution the survey belongs to
    pub institucion: Institution,
}

/// A survey with its answers grouped by section.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyDetail {
    /// The survey
    pub encuesta: Survey,
    /// Surveyed institution
    pub institucion: Institution,
    /// Physical then technological barriers
    pub secciones: Vec<SectionAnswers>,
}

// ============================================================================
// Workflow
// ============================================================================

/// Institution and survey operations.
#[derive(Clone)]
pub struct SurveyWorkflow {
    store: Arc<dyn RecordStore>,
    sessions: Arc<dyn SessionStore>,
}

impl SurveyWorkflow {
    /// Creates the workflow over a record store and a session store.
    pub fn new(store: Arc<dyn RecordStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { store, sessions }
    }

    /// Where `ctx`'s session stands in the survey flow.
    pub async fn stage(&self, ctx: &RequestContext) -> Result<SurveyStage> {
        Ok(
            match PendingSelection::load(self.sessions.as_ref(), ctx.session).await? {
                Some(id) => SurveyStage::InstitutionPending(id),
                None => SurveyStage::NoSelection,
            },
        )
    }

    // ------------------------------------------------------------------------
    // Institutions
    // ------------------------------------------------------------------------

    /// The blank institution registration form.
    pub fn institution_form(&self) -> FormPage {
        FormPage::new("Registrar Institución", &INSTITUTION_SCHEMA)
    }

    /// Validates and stores a new institution.
    ///
    /// # Errors
    ///
    /// `Validation` on bad fields, `Conflict` when the AMIE code is taken.
    pub async fn register_institution(
        &self,
        ctx: &RequestContext,
        form: &FormData,
    ) -> Result<Institution> {
        let new = NewInstitution::from_form(form).inspect_err(|err| {
            tracing::warn!(session = %ctx.session, error = %err, "Rejected institution form");
        })?;
        let institution = self
            .store
            .insert_institution(new)
            .await
            .map_err(store_err)?;
        tracing::info!(
            institution = %institution.id,
            amie = %institution.data.amie_code,
            "Institution registered"
        );
        Ok(institution)
    }

    /// Every institution, by name.
    pub async fn list_institutions(&self) -> Result<Vec<Institution>> {
        self.store.list_institutions().await.map_err(store_err)
    }

    /// One institution and its surveys.
    pub async fn institution_detail(&self, id: InstitutionId) -> Result<InstitutionDetail> {
        let institucion = self.fetch_institution(id).await?;
        let encuestas = self
            .store
            .surveys_for_institution(id)
            .await
            .map_err(store_err)?;
        Ok(InstitutionDetail {
            institucion,
            encuestas,
        })
    }

    // ------------------------------------------------------------------------
    // Survey submission
    // ------------------------------------------------------------------------

    /// The institution picker, with the current selection marked.
    pub async fn selection_page(&self, ctx: &RequestContext) -> Result<SelectionPage> {
        Ok(SelectionPage {
            instituciones: self.list_institutions().await?,
            seleccionada: PendingSelection::load(self.sessions.as_ref(), ctx.session).await?,
        })
    }

    /// Binds an institution to the session, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// `Validation` on field `institucion_id` when the id is missing or
    /// malformed, `NotFound` when no such institution exists.
    pub async fn select_institution(
        &self,
        ctx: &RequestContext,
        form: &FormData,
    ) -> Result<Institution> {
        let cleaned = validate(&SELECTION_SCHEMA, form)?;
        let id: InstitutionId = cleaned.require_id(PendingSelection::KEY)?;
        let institution = self.fetch_institution(id).await?;

        PendingSelection::save(self.sessions.as_ref(), ctx.session, id).await?;
        tracing::info!(session = %ctx.session, institution = %id, "Institution selected for survey");
        Ok(institution)
    }

    /// The survey form for the selected institution.
    ///
    /// # Errors
    ///
    /// `PreconditionFailed` without a selection; `NotFound` if the selected
    /// institution no longer exists (the stale selection is cleared).
    pub async fn survey_form(&self, ctx: &RequestContext) -> Result<SurveyFormPage> {
        let institucion = self.pending_institution(ctx).await?;

        let mut generales = Vec::new();
        let mut physical = Vec::new();
        let mut technological = Vec::new();
        for field in SURVEY_SCHEMA.form_fields() {
            match Question::from_field(field.name).map(Question::section) {
                Some(SurveySection::PhysicalBarriers) => physical.push(field),
                Some(SurveySection::TechnologicalBarriers) => technological.push(field),
                None => generales.push(field),
            }
        }

        Ok(SurveyFormPage {
            institucion,
            generales,
            secciones: vec![
                FormSection {
                    seccion: SurveySection::PhysicalBarriers,
                    titulo: SurveySection::PhysicalBarriers.title(),
                    campos: physical,
                },
                FormSection {
                    seccion: SurveySection::TechnologicalBarriers,
                    titulo: SurveySection::TechnologicalBarriers.title(),
                    campos: technological,
                },
            ],
            respuestas: Response::choices(),
        })
    }

    /// Validates and stores the survey for the selected institution, then
    /// clears the selection.
    ///
    /// # Errors
    ///
    /// `PreconditionFailed` without a selection, `NotFound` if the selected
    /// institution is gone, `Validation` on bad fields (the selection is
    /// kept). Nothing is stored on any error.
    pub async fn submit_survey(
        &self,
        ctx: &RequestContext,
        form: &FormData,
    ) -> Result<SavedSurvey> {
        let institution = self.pending_institution(ctx).await?;

        let survey_form = SurveyForm::from_form(form).inspect_err(|err| {
            tracing::warn!(
                session = %ctx.session,
                institution = %institution.id,
                error = %err,
                "Rejected survey submission"
            );
        })?;

        let survey = self
            .store
            .insert_survey(survey_form.bind(institution.id))
            .await
            .map_err(store_err)?;
        PendingSelection::clear(self.sessions.as_ref(), ctx.session).await?;

        tracing::info!(
            session = %ctx.session,
            institution = %institution.id,
            survey = %survey.id,
            "Survey saved"
        );
        Ok(SavedSurvey {
            encuesta: survey,
            institucion: institution,
        })
    }

    // ------------------------------------------------------------------------
    // Survey listings
    // ------------------------------------------------------------------------

    /// Every survey, newest survey date first, with its institution name.
    pub async fn list_surveys(&self) -> Result<Vec<SurveyListItem>> {
        let names: HashMap<InstitutionId, String> = self
            .list_institutions()
            .await?
            .into_iter()
            .map(|i| (i.id, i.data.name))
            .collect();
        let surveys = self.store.list_surveys().await.map_err(store_err)?;
        Ok(surveys
            .into_iter()
            .map(|encuesta| SurveyListItem {
                institucion_nombre: names.get(&encuesta.data.institution).cloned(),
                encuesta,
            })
            .collect())
    }

    /// One survey with its answers grouped by section.
    pub async fn survey_detail(&self, id: SurveyId) -> Result<SurveyDetail> {
        let encuesta = self
            .store
            .get_survey(id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| Error::not_found("encuesta", id))?;
        let institucion = self.fetch_institution(encuesta.data.institution).await?;
        let secciones = encuesta.sections();
        Ok(SurveyDetail {
            encuesta,
            institucion,
            secciones,
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn fetch_institution(&self, id: InstitutionId) -> Result<Institution> {
        self.store
            .get_institution(id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| Error::not_found("institucion", id))
    }

    async fn pending_institution(&self, ctx: &RequestContext) -> Result<Institution> {
        let Some(id) = PendingSelection::load(self.sessions.as_ref(), ctx.session).await? else {
            return Err(Error::precondition(NO_SELECTION));
        };
        match self.store.get_institution(id).await.map_err(store_err)? {
            Some(institution) => Ok(institution),
            None => {
                tracing::warn!(
                    session = %ctx.session,
                    institution = %id,
                    "Selected institution no longer exists"
                );
                PendingSelection::clear(self.sessions.as_ref(), ctx.session).await?;
                Err(Error::not_found("institucion", id))
            }
        }
    }
}
