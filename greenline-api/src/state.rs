use crate::metrics::Metrics;
use greenline_catalog::TripCatalog;
use greenline_core::PaymentAdapter;
use greenline_inventory::SeatInventory;
use greenline_reservation::ReservationCoordinator;
use greenline_store::BusinessRules;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TripCatalog>,
    pub inventory: Arc<SeatInventory>,
    pub coordinator: Arc<ReservationCoordinator>,
    pub metrics: Arc<Metrics>,
    pub business_rules: BusinessRules,
}

impl AppState {
    pub fn new(
        catalog: Arc<TripCatalog>,
        payments: Arc<dyn PaymentAdapter>,
        business_rules: BusinessRules,
    ) -> Self {
        let inventory = Arc::new(SeatInventory::new(catalog.clone()));
        let coordinator = Arc::new(ReservationCoordinator::new(inventory.clone(), payments));
        Self {
            catalog,
            inventory,
            coordinator,
            metrics: Arc::new(Metrics::new()),
            business_rules,
        }
    }
}
