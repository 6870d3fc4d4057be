//! Vehicles and their reference tables (states, brands, models).

use chrono::NaiveDate;
use expd_core::{AuditStamps, EnvelopeShape, Identified, NamedRef, RecordId, StatusRef};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

// -- Vehicles -----------------------------------------------------------------

/// Vehicle under expertise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: RecordId,
    pub license_plate: String,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub brand: Option<NamedRef>,
    #[serde(default, rename = "vehicle_model")]
    pub model: Option<NamedRef>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(default)]
    pub first_registration: Option<NaiveDate>,
    #[serde(default, rename = "vehicle_state")]
    pub state: Option<StatusRef>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for Vehicle {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        match self.brand.as_ref().and_then(|b| b.name.as_deref()) {
            Some(brand) => format!("{} ({brand})", self.license_plate),
            None => self.license_plate.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_model_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_registration: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_state_id: Option<RecordId>,
}

/// `vehicles` resource.
#[derive(Debug)]
pub enum Vehicles {}

impl Resource for Vehicles {
    const NAME: &'static str = "vehicle";
    const PATH: &'static str = "vehicles";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Bare;
    type Record = Vehicle;
    type Create = VehicleInput;
    type Update = VehicleInput;
}

// -- Vehicle states -----------------------------------------------------------

/// Condition of a vehicle ("Neuf", "Occasion", "Épave", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub id: RecordId,
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for VehicleState {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        format!("{} ({})", self.label, self.code)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleStateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `vehicle-states` resource.
#[derive(Debug)]
pub enum VehicleStates {}

impl Resource for VehicleStates {
    const NAME: &'static str = "vehicle state";
    const PATH: &'static str = "vehicle-states";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Either;
    type Record = VehicleState;
    type Create = VehicleStateInput;
    type Update = VehicleStateInput;
}

// -- Brands -------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleBrand {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for VehicleBrand {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleBrandInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// `vehicle-brands` resource.
#[derive(Debug)]
pub enum VehicleBrands {}

impl Resource for VehicleBrands {
    const NAME: &'static str = "brand";
    const PATH: &'static str = "vehicle-brands";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Bare;
    type Record = VehicleBrand;
    type Create = VehicleBrandInput;
    type Update = VehicleBrandInput;
}

// -- Models -------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleModel {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub brand: Option<NamedRef>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for VehicleModel {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleModelInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<RecordId>,
}

/// `vehicle-models` resource.
#[derive(Debug)]
pub enum VehicleModels {}

impl Resource for VehicleModels {
    const NAME: &'static str = "model";
    const PATH: &'static str = "vehicle-models";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Bare;
    type Record = VehicleModel;
    type Create = VehicleModelInput;
    type Update = VehicleModelInput;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_decodes_embedded_references() {
        let v: Vehicle = serde_json::from_value(serde_json::json!({
            "id": 12,
            "license_plate": "AB-123-CD",
            "brand": {"id": 1, "name": "Renault"},
            "vehicle_model": {"id": 4, "name": "Clio"},
            "vehicle_state": {"id": 1, "code": "V1", "label": "Neuf"},
            "mileage": 48000,
            "first_registration": "2019-03-01",
            "created_at": "2026-01-15T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(v.display_label(), "AB-123-CD (Renault)");
        assert_eq!(v.state.unwrap().label.as_deref(), Some("Neuf"));
        assert!(v.stamps.created_at.is_some());
        assert!(v.stamps.updated_at.is_none());
    }

    #[test]
    fn input_omits_unset_fields() {
        let input = VehicleInput {
            license_plate: Some("AB-123-CD".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({"license_plate": "AB-123-CD"})
        );
    }
}
