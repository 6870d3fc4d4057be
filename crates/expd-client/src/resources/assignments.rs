//! Expertise assignments: one claim file per damaged vehicle, linking the
//! vehicle, the insurer that ordered the expertise, the repairer and the
//! vehicle owner.

use chrono::NaiveDate;
use expd_core::{AuditStamps, EnvelopeShape, Identified, RecordId, StatusRef};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::resource::{Resource, ResourceService};

/// Assignment as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: RecordId,
    pub reference: String,
    #[serde(default)]
    pub claim_number: Option<String>,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<RecordId>,
    #[serde(default)]
    pub insurer_id: Option<RecordId>,
    #[serde(default)]
    pub repairer_id: Option<RecordId>,
    #[serde(default)]
    pub client_id: Option<RecordId>,
    #[serde(default)]
    pub expertise_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<StatusRef>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for Assignment {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        self.reference.clone()
    }
}

/// Create/update payload. Omitted fields are left unchanged on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repairer_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<RecordId>,
}

/// `assignments` resource.
#[derive(Debug)]
pub enum Assignments {}

impl Resource for Assignments {
    const NAME: &'static str = "assignment";
    const PATH: &'static str = "assignments";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Wrapped;
    type Record = Assignment;
    type Create = AssignmentInput;
    type Update = AssignmentInput;
}

impl ResourceService<Assignments> {
    /// Close the file once the expertise report is final.
    ///
    /// Calls `POST {base}/assignments/{id}/close`.
    pub async fn close(&self, id: RecordId) -> Result<Assignment, ApiError> {
        self.action(id, "close").await
    }

    /// Reopen a closed file.
    ///
    /// Calls `POST {base}/assignments/{id}/reopen`.
    pub async fn reopen(&self, id: RecordId) -> Result<Assignment, ApiError> {
        self.action(id, "reopen").await
    }
}
