//! One store per back-office resource, sharing a client and a notifier.

use std::sync::Arc;

use expd_client::resources::{
    Assignments, Clients, Insurers, Invoices, Payments, Repairers, Users, VehicleBrands,
    VehicleModels, VehicleStates, Vehicles,
};
use expd_client::{ExpdClient, Resource};

use crate::notify::Notifier;
use crate::store::ResourceStore;

/// Every resource store of the back office.
#[derive(Debug, Clone)]
pub struct Stores {
    pub assignments: ResourceStore<Assignments>,
    pub vehicles: ResourceStore<Vehicles>,
    pub vehicle_states: ResourceStore<VehicleStates>,
    pub vehicle_brands: ResourceStore<VehicleBrands>,
    pub vehicle_models: ResourceStore<VehicleModels>,
    pub insurers: ResourceStore<Insurers>,
    pub repairers: ResourceStore<Repairers>,
    pub clients: ResourceStore<Clients>,
    pub invoices: ResourceStore<Invoices>,
    pub payments: ResourceStore<Payments>,
    pub users: ResourceStore<Users>,
}

impl Stores {
    /// Empty stores over `client`, all reporting to `notifier`.
    pub fn new(client: &ExpdClient, notifier: Arc<dyn Notifier>) -> Self {
        fn store<R: Resource>(
            client: &ExpdClient,
            notifier: &Arc<dyn Notifier>,
        ) -> ResourceStore<R> {
            ResourceStore::new(client.resource::<R>(), Arc::clone(notifier))
        }
        Self {
            assignments: store(client, &notifier),
            vehicles: store(client, &notifier),
            vehicle_states: store(client, &notifier),
            vehicle_brands: store(client, &notifier),
            vehicle_models: store(client, &notifier),
            insurers: store(client, &notifier),
            repairers: store(client, &notifier),
            clients: store(client, &notifier),
            invoices: store(client, &notifier),
            payments: store(client, &notifier),
            users: store(client, &notifier),
        }
    }

    /// Clear every store, e.g. after logout.
    pub fn reset_all(&self) {
        self.assignments.reset();
        self.vehicles.reset();
        self.vehicle_states.reset();
        self.vehicle_brands.reset();
        self.vehicle_models.reset();
        self.insurers.reset();
        self.repairers.reset();
        self.clients.reset();
        self.invoices.reset();
        self.payments.reset();
        self.users.reset();
    }
}
