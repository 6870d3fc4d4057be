//! Back-office resources.
//!
//! Each submodule declares record and payload types matching the backend
//! schema plus a marker type implementing [`crate::Resource`]. Records use
//! `#[serde(default)]` on optional fields for resilience against schema
//! evolution; unknown fields are ignored.
//!
//! | Marker | Path | Single-record shape |
//! |--------|------|---------------------|
//! | [`Assignments`] | `assignments` | wrapped |
//! | [`Vehicles`] | `vehicles` | bare |
//! | [`VehicleStates`] | `vehicle-states` | bare or wrapped |
//! | [`VehicleBrands`] | `vehicle-brands` | bare |
//! | [`VehicleModels`] | `vehicle-models` | bare |
//! | [`Insurers`] | `insurers` | bare or wrapped |
//! | [`Repairers`] | `repairers` | bare or wrapped |
//! | [`Clients`] | `clients` | bare |
//! | [`Payments`] | `payments` | wrapped |
//! | [`Invoices`] | `invoices` | wrapped |
//! | [`Users`] | `users` | bare or wrapped |

pub mod assignments;
pub mod finance;
pub mod parties;
pub mod users;
pub mod vehicles;

pub use assignments::{Assignment, AssignmentInput, Assignments};
pub use finance::{Invoice, InvoiceInput, Invoices, Payment, PaymentInput, Payments};
pub use parties::{Clients, Insurers, Party, PartyInput, Repairers};
pub use users::{UserInput, Users};
pub use vehicles::{
    Vehicle, VehicleBrand, VehicleBrandInput, VehicleBrands, VehicleInput, VehicleModel,
    VehicleModelInput, VehicleModels, VehicleState, VehicleStateInput, VehicleStates, Vehicles,
};
