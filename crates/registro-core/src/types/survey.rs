//! Accessibility-barrier surveys.
//!
//! A survey answers fourteen fixed questions about one institution. Questions
//! 1–7 cover physical barriers and 8–14 technological barriers; every answer
//! is one of the six [`Response`] codes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use super::{InstitutionId, Response, SurveyId};
use crate::error::Result;
use crate::validation::{Constraint, FieldSpec, FormData, Schema, validate};

// ============================================================================
// Questions
// ============================================================================

/// Group of questions shown together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveySection {
    /// Questions 1–7
    PhysicalBarriers,
    /// Questions 8–14
    TechnologicalBarriers,
}

impl SurveySection {
    /// Heading shown above the section.
    pub const fn title(self) -> &'static str {
        match self {
            SurveySection::PhysicalBarriers => "Barreras Físicas",
            SurveySection::TechnologicalBarriers => "Barreras Tecnológicas",
        }
    }
}

/// One of the fourteen survey questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Question {
    /// Building entrances
    Accesos,
    /// Corridors and classrooms
    Pasillos,
    /// Ramps and lifts
    Rampas,
    /// Restrooms
    Banos,
    /// Classroom lighting and ventilation
    Puertas,
    /// Signage
    Senialetica,
    /// Furniture
    Iluminacion,
    /// Technology equipment
    Equipos,
    /// Internet connection
    Internet,
    /// Educational software
    Software,
    /// Teacher training
    Plataformas,
    /// Assistive technology
    Capacitacion,
    /// Technical support
    Soporte,
    /// Digital resources
    Recursos,
}

impl Question {
    /// All questions in order.
    pub const ALL: [Question; 14] = [
        Question::Accesos,
        Question::Pasillos,
        Question::Rampas,
        Question::Banos,
        Question::Puertas,
        Question::Senialetica,
        Question::Iluminacion,
        Question::Equipos,
        Question::Internet,
        Question::Software,
        Question::Plataformas,
        Question::Capacitacion,
        Question::Soporte,
        Question::Recursos,
    ];

    /// 1-based question number.
    pub const fn number(self) -> usize {
        self as usize + 1
    }

    /// Form and column name.
    pub const fn field(self) -> &'static str {
        match self {
            Question::Accesos => "p1_accesos",
            Question::Pasillos => "p2_pasillos",
            Question::Rampas => "p3_rampas",
            Question::Banos => "p4_banos",
            Question::Puertas => "p5_puertas",
            Question::Senialetica => "p6_senialetica",
            Question::Iluminacion => "p7_iluminacion",
            Question::Equipos => "p8_equipos",
            Question::Internet => "p9_internet",
            Question::Software => "p10_software",
            Question::Plataformas => "p11_plataformas",
            Question::Capacitacion => "p12_capacitacion",
            Question::Soporte => "p13_soporte",
            Question::Recursos => "p14_recursos",
        }
    }

    /// Question text.
    pub const fn label(self) -> &'static str {
        match self {
            Question::Accesos => {
                "1. Los accesos principales al edificio (puertas, rampas) son fáciles de usar"
            }
            Question::Pasillos => {
                "2. Los pasillos, aulas y espacios comunes están libres de obstáculos"
            }
            Question::Rampas => "3. Existen y están disponibles rampas o elevadores",
            Question::Banos => "4. Los baños son accesibles, cuentan con señales claras",
            Question::Puertas => "5. Las aulas tienen una iluminación y ventilación adecuadas",
            Question::Senialetica => "6. La señalización (letreros, pictogramas) es clara",
            Question::Iluminacion => "7. El mobiliario (sillas, mesas) es ajustable o adecuado",
            Question::Equipos => "8. La institución cuenta con equipos tecnológicos suficientes",
            Question::Internet => "9. La conexión a internet es estable, rápida y accesible",
            Question::Software => "10. Las plataformas y software educativos son accesibles",
            Question::Plataformas => {
                "11. Los docentes reciben capacitación en tecnologías accesibles"
            }
            Question::Capacitacion => {
                "12. Los estudiantes cuentan con tecnología de asistencia adecuada"
            }
            Question::Soporte => "13. Existe soporte técnico adecuado",
            Question::Recursos => "14. Los recursos digitales educativos son accesibles",
        }
    }

    /// Section the question belongs to.
    pub const fn section(self) -> SurveySection {
        if self.number() <= 7 {
            SurveySection::PhysicalBarriers
        } else {
            SurveySection::TechnologicalBarriers
        }
    }

    /// Looks a question up by its form field name.
    pub fn from_field(field: &str) -> Option<Question> {
        Self::ALL.iter().copied().find(|q| q.field() == field)
    }
}

// ============================================================================
// Answers
// ============================================================================

/// The fourteen answers of one survey, indexed by [`Question`].
///
/// Serialized as a map from field name (`p1_accesos`, ...) to response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurveyAnswers([Response; 14]);

impl SurveyAnswers {
    /// Every answer set to the same response.
    pub fn uniform(response: Response) -> Self {
        Self([response; 14])
    }

    /// Answer to a question.
    pub fn get(&self, question: Question) -> Response {
        self.0[question as usize]
    }

    /// Sets the answer to a question.
    pub fn set(&mut self, question: Question, response: Response) {
        self.0[question as usize] = response;
    }

    /// Question/answer pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (Question, Response)> + '_ {
        Question::ALL.iter().map(move |q| (*q, self.get(*q)))
    }
}

impl Serialize for SurveyAnswers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(14))?;
        for (question, response) in self.iter() {
            map.serialize_entry(question.field(), &response)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SurveyAnswers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, Response>::deserialize(deserializer)?;
        let mut answers = SurveyAnswers::default();
        for (field, response) in raw {
            let question = Question::from_field(&field).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown survey question '{field}'"))
            })?;
            answers.set(question, response);
        }
        Ok(answers)
    }
}

// ============================================================================
// Schema
// ============================================================================

const ANSWER: &[Constraint] = &[Constraint::Required, Constraint::OneOf(Response::CODES)];

const fn question_field(question: Question) -> FieldSpec {
    FieldSpec {
        name: question.field(),
        label: question.label(),
        constraints: ANSWER,
    }
}

const SURVEY_FIELDS: [FieldSpec; 19] = [
    FieldSpec {
        name: "fecha_encuesta",
        label: "Fecha de Encuesta",
        constraints: &[Constraint::Required, Constraint::Date],
    },
    FieldSpec {
        name: "encuestador",
        label: "Nombre del Encuestador",
        constraints: &[Constraint::MaxLength(200)],
    },
    FieldSpec {
        name: "cargo_encuestador",
        label: "Cargo del Encuestador",
        constraints: &[Constraint::MaxLength(100)],
    },
    question_field(Question::Accesos),
    question_field(Question::Pasillos),
    question_field(Question::Rampas),
    question_field(Question::Banos),
    question_field(Question::Puertas),
    question_field(Question::Senialetica),
    question_field(Question::Iluminacion),
    question_field(Question::Equipos),
    question_field(Question::Internet),
    question_field(Question::Software),
    question_field(Question::Plataformas),
    question_field(Question::Capacitacion),
    question_field(Question::Soporte),
    question_field(Question::Recursos),
    FieldSpec {
        name: "observaciones",
        label: "Observaciones",
        constraints: &[],
    },
    FieldSpec {
        name: "recomendaciones",
        label: "Recomendaciones",
        constraints: &[],
    },
];

/// Validation table for the survey form.
pub const SURVEY_SCHEMA: Schema = Schema {
    record: "encuesta",
    fields: &SURVEY_FIELDS,
};

// ============================================================================
// Records
// ============================================================================

/// A validated survey form, not yet bound to an institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyForm {
    /// Date the survey was taken
    pub survey_date: NaiveDate,
    /// Person who took the survey
    pub surveyor: Option<String>,
    /// Their role
    pub surveyor_role: Option<String>,
    /// The fourteen answers
    pub answers: SurveyAnswers,
    /// Free-text notes
    pub notes: Option<String>,
    /// Free-text recommendations
    pub recommendations: Option<String>,
}

impl SurveyForm {
    /// Validates a survey submission. Every question must be answered.
    pub fn from_form(form: &FormData) -> Result<Self> {
        let cleaned = validate(&SURVEY_SCHEMA, form)?;
        let mut answers = SurveyAnswers::default();
        for question in Question::ALL {
            answers.set(question, cleaned.require_choice(question.field())?);
        }
        Ok(Self {
            survey_date: cleaned.require_date("fecha_encuesta")?,
            surveyor: cleaned.text("encuestador"),
            surveyor_role: cleaned.text("cargo_encuestador"),
            answers,
            notes: cleaned.text("observaciones"),
            recommendations: cleaned.text("recomendaciones"),
        })
    }

    /// Binds the form to the institution it describes.
    pub fn bind(self, institution: InstitutionId) -> NewSurvey {
        NewSurvey {
            institution,
            survey_date: self.survey_date,
            surveyor: self.surveyor,
            surveyor_role: self.surveyor_role,
            answers: self.answers,
            notes: self.notes,
            recommendations: self.recommendations,
        }
    }
}

/// A survey ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurvey {
    /// Institution surveyed
    #[serde(rename = "institucion")]
    pub institution: InstitutionId,
    /// Date the survey was taken
    #[serde(rename = "fecha_encuesta")]
    pub survey_date: NaiveDate,
    /// Person who took the survey
    #[serde(rename = "encuestador")]
    pub surveyor: Option<String>,
    /// Their role
    #[serde(rename = "cargo_encuestador")]
    pub surveyor_role: Option<String>,
    /// The fourteen answers
    #[serde(rename = "respuestas")]
    pub answers: SurveyAnswers,
    /// Free-text notes
    #[serde(rename = "observaciones")]
    pub notes: Option<String>,
    /// Free-text recommendations
    #[serde(rename = "recomendaciones")]
    pub recommendations: Option<String>,
}

/// A stored survey. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    /// Store-assigned identifier
    pub id: SurveyId,
    /// Submitted data
    #[serde(flatten)]
    pub data: NewSurvey,
    /// When the record was created
    #[serde(rename = "fecha_registro")]
    pub registered_at: DateTime<Utc>,
}

/// One answered question as displayed on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnsweredQuestion {
    /// 1-based number
    pub numero: usize,
    /// Field name
    pub campo: &'static str,
    /// Question text
    pub pregunta: &'static str,
    /// Stored code
    pub respuesta: Response,
    /// Display label of the answer
    pub respuesta_texto: &'static str,
}

/// Answers of one section, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionAnswers {
    /// Which section
    pub seccion: SurveySection,
    /// Section heading
    pub titulo: &'static str,
    /// Answers in order
    pub preguntas: Vec<AnsweredQuestion>,
}

impl Survey {
    /// Answers grouped into the physical and technological sections.
    pub fn sections(&self) -> Vec<SectionAnswers> {
        [
            SurveySection::PhysicalBarriers,
            SurveySection::TechnologicalBarriers,
        ]
        .into_iter()
        .map(|section| SectionAnswers {
            seccion: section,
            titulo: section.title(),
            preguntas: self
                .data
                .answers
                .iter()
                .filter(|(q, _)| q.section() == section)
                .map(|(q, r)| AnsweredQuestion {
                    numero: q.number(),
                    campo: q.field(),
                    pregunta: q.label(),
                    respuesta: r,
                    respuesta_texto: r.label(),
                })
                .collect(),
        })
        .collect()
    }
}
