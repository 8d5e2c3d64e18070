use greenline_core::{
    PaymentAdapter, RequesterId, ReservationError, ReservationId, ReservationResult,
};
use greenline_inventory::{Reservation, SeatInventory};
use std::sync::Arc;
use tracing::{info, warn};

/// Drives a held reservation to its terminal state: `confirm` charges the
/// frozen fare through the payment collaborator and books the seats,
/// `cancel` returns a confirmed reservation's seats to the pool.
///
/// Payment runs strictly between two inventory critical sections, so a slow
/// provider never blocks seat mutation for the trip instance.
pub struct ReservationCoordinator {
    inventory: Arc<SeatInventory>,
    payments: Arc<dyn PaymentAdapter>,
}

impl ReservationCoordinator {
    pub fn new(inventory: Arc<SeatInventory>, payments: Arc<dyn PaymentAdapter>) -> Self {
        Self { inventory, payments }
    }

    /// Confirm a held reservation. On a declined or failed payment the hold
    /// is left untouched so the caller may retry with a fresh token until
    /// the TTL runs out; if the hold expired (before or during payment) the
    /// seats are already released and `ReservationExpired` is returned.
    pub async fn confirm(
        &self,
        id: ReservationId,
        payment_token: &str,
    ) -> ReservationResult<Reservation> {
        let charge = self.inventory.begin_confirm(id).await?;

        match self
            .payments
            .validate(payment_token, charge.amount_minor)
            .await
        {
            Ok(receipt) => {
                info!(
                    reservation_id = %id,
                    amount_minor = charge.amount_minor,
                    reference = %receipt.reference,
                    "payment captured"
                );
                self.inventory.complete_confirm(id).await
            }
            Err(err) => {
                warn!(reservation_id = %id, error = %err, "payment rejected, hold kept");
                Err(ReservationError::PaymentFailed(err.to_string()))
            }
        }
    }

    /// Cancel a confirmed reservation. Seats return to available
    /// immediately; any refund is between the caller and the payment
    /// collaborator.
    pub async fn cancel(&self, id: ReservationId) -> ReservationResult<Reservation> {
        self.inventory.cancel_booking(id).await
    }

    pub async fn reservation(&self, id: ReservationId) -> ReservationResult<Reservation> {
        self.inventory.reservation(id).await
    }

    pub async fn reservations_for(&self, requester: &RequesterId) -> Vec<Reservation> {
        self.inventory.reservations_for(requester).await
    }
}
