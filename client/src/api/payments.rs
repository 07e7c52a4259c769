//! Payment gateway stand-in.

use crate::transport::TransportClient;
use concert_booking_core::{PaymentReceipt, ReservationId, Result};

/// `/payments` endpoints
#[derive(Debug, Clone, Copy)]
pub struct PaymentsApi;

impl PaymentsApi {
    /// `POST /payments/mock/{reservation_id}`
    ///
    /// # Errors
    ///
    /// [`concert_booking_core::BookingError::PaymentDeclined`] when the
    /// gateway declines, or any transport error.
    pub async fn mock_payment(
        transport: &TransportClient,
        reservation_id: ReservationId,
    ) -> Result<PaymentReceipt> {
        let receipt: PaymentReceipt = transport
            .post_empty(&format!("/payments/mock/{reservation_id}"))
            .await?;
        tracing::debug!(
            reservation_id = %reservation_id,
            payment_id = %receipt.payment_id,
            "Payment accepted"
        );
        Ok(receipt)
    }
}
