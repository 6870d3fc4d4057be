//! Organisations and people an assignment refers to: insurers ordering the
//! expertise, repairers fixing the vehicle, and vehicle owners (clients).
//! The three share one record schema.

use expd_core::{AuditStamps, EnvelopeShape, Identified, RecordId};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// Insurer, repairer or client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for Party {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        match &self.code {
            Some(code) => format!("{} [{code}]", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// `insurers` resource.
#[derive(Debug)]
pub enum Insurers {}

impl Resource for Insurers {
    const NAME: &'static str = "insurer";
    const PATH: &'static str = "insurers";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Either;
    type Record = Party;
    type Create = PartyInput;
    type Update = PartyInput;
}

/// `repairers` resource.
#[derive(Debug)]
pub enum Repairers {}

impl Resource for Repairers {
    const NAME: &'static str = "repairer";
    const PATH: &'static str = "repairers";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Either;
    type Record = Party;
    type Create = PartyInput;
    type Update = PartyInput;
}

/// `clients` resource.
#[derive(Debug)]
pub enum Clients {}

impl Resource for Clients {
    const NAME: &'static str = "client";
    const PATH: &'static str = "clients";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Bare;
    type Record = Party;
    type Create = PartyInput;
    type Update = PartyInput;
}
