//! Record types for the accessibility survey and inventory modules.

mod assignment;
mod choices;
mod equipment;
mod ids;
mod institution;
mod location;
mod maintenance;
mod proptests;
mod survey;

pub use assignment::{ASSIGNMENT_SCHEMA, Assignment, NewAssignment};
pub use choices::{
    Choice, EquipmentState, EquipmentType, InstitutionType, MaintenanceType, PhysicalCondition,
    Response, UnknownChoice,
};
pub use equipment::{EQUIPMENT_SCHEMA, Equipment, EquipmentFilter, NewEquipment};
pub use ids::{
    AssignmentId, EquipmentId, InstitutionId, LocationId, MaintenanceId, SessionId, SurveyId,
};
pub use institution::{INSTITUTION_SCHEMA, Institution, NewInstitution};
pub use location::{LOCATION_SCHEMA, Location, NewLocation};
pub use maintenance::{MAINTENANCE_SCHEMA, Maintenance, NewMaintenance};
pub use survey::{
    AnsweredQuestion, NewSurvey, Question, SURVEY_SCHEMA, SectionAnswers, Survey, SurveyAnswers,
    SurveyForm, SurveySection,
};
