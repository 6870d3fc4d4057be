//! # expd-client -- Typed Rust client for the ExpertDesk backend
//!
//! Provides typed access to the REST API behind the automotive-expertise
//! back office:
//! - **Auth** via `/auth/tokens` and `/auth/user`
//! - **Resources** (assignments, vehicles, reference tables, insurers,
//!   repairers, clients, invoices, payments, users) via one generic
//!   [`ResourceService`] per resource
//! - **Statistics** via `/statistics/dashboard`
//!
//! ## Architecture
//!
//! [`ApiClient`] is the single HTTP path: it attaches the bearer token from
//! the [`TokenStore`] and turns every 401 into a forced local logout.
//! Services are thin typed wrappers over it and never swallow errors.
//!
//! ## API Path Convention
//!
//! All paths are relative to one versioned base URL:
//! `{api_url}/{resource}[/{id}[/{action}]]`, e.g.
//! `https://expertise.example.com/api/v1/vehicle-states/3`.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod resources;
pub mod statistics;
pub mod storage;

pub use auth::{AuthService, Credentials, User, UserEntity, UserRole};
pub use config::ApiConfig;
pub use error::ApiError;
pub use http::ApiClient;
pub use resource::{Resource, ResourceService};
pub use storage::{AuthToken, FileTokenStore, MemoryTokenStore, TokenStore};

use std::sync::Arc;

use resources::{
    Assignments, Clients, Insurers, Invoices, Payments, Repairers, Users, VehicleBrands,
    VehicleModels, VehicleStates, Vehicles,
};

/// Top-level ExpertDesk client. Cheap to clone; all services share one
/// transport and one token store.
#[derive(Debug, Clone)]
pub struct ExpdClient {
    api: ApiClient,
    auth: AuthService,
    statistics: statistics::StatisticsService,
    revoke_on_logout: bool,
}

impl ExpdClient {
    /// Create a client from configuration and a token store.
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config, tokens)?;
        Ok(Self {
            auth: AuthService::new(api.clone()),
            statistics: statistics::StatisticsService::new(api.clone()),
            revoke_on_logout: config.revoke_on_logout,
            api,
        })
    }

    /// The shared transport.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Whether logout should call `DELETE /auth/tokens`.
    pub fn revoke_on_logout(&self) -> bool {
        self.revoke_on_logout
    }

    /// Access the auth client.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Access the statistics client.
    pub fn statistics(&self) -> &statistics::StatisticsService {
        &self.statistics
    }

    /// CRUD client for any resource.
    pub fn resource<R: Resource>(&self) -> ResourceService<R> {
        ResourceService::new(self.api.clone())
    }

    /// Access the assignments client.
    pub fn assignments(&self) -> ResourceService<Assignments> {
        self.resource()
    }

    /// Access the vehicles client.
    pub fn vehicles(&self) -> ResourceService<Vehicles> {
        self.resource()
    }

    /// Access the vehicle-states client.
    pub fn vehicle_states(&self) -> ResourceService<VehicleStates> {
        self.resource()
    }

    /// Access the vehicle-brands client.
    pub fn vehicle_brands(&self) -> ResourceService<VehicleBrands> {
        self.resource()
    }

    /// Access the vehicle-models client.
    pub fn vehicle_models(&self) -> ResourceService<VehicleModels> {
        self.resource()
    }

    /// Access the insurers client.
    pub fn insurers(&self) -> ResourceService<Insurers> {
        self.resource()
    }

    /// Access the repairers client.
    pub fn repairers(&self) -> ResourceService<Repairers> {
        self.resource()
    }

    /// Access the clients (vehicle owners) client.
    pub fn clients(&self) -> ResourceService<Clients> {
        self.resource()
    }

    /// Access the invoices client.
    pub fn invoices(&self) -> ResourceService<Invoices> {
        self.resource()
    }

    /// Access the payments client.
    pub fn payments(&self) -> ResourceService<Payments> {
        self.resource()
    }

    /// Access the users client.
    pub fn users(&self) -> ResourceService<Users> {
        self.resource()
    }
}
