//! The booking transaction engine. One skeleton, three inventory kinds:
//! lock the inventory row, recompute the price, write the PENDING header and
//! its item, decrement inventory, charge the gateway, write the billing row
//! and flip the header to its terminal state, all inside one transaction.
//! Events are published only after the transaction has decided the outcome.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use wayfare_catalog::pricing::check_expected_total;
use wayfare_core::booking::{BillingStatus, BillingTransaction, Booking, BookingItem, BookingStatus};
use wayfare_core::error::DomainError;
use wayfare_core::payment::{
    ChargeRequest, PaymentGateway, ERROR_INVALID_AMOUNT, ERROR_NETWORK, PAYMENT_METHOD_CARD,
};
use wayfare_core::principal::Principal;
use wayfare_store::booking_repo::{NewBillingTransaction, NewBooking};
use wayfare_store::error::map_sqlx;
use wayfare_store::{BookingRepository, EventPublisher, PgClient};

use crate::kinds::{CarKind, FlightKind, HotelKind, InventoryKind};
use crate::payload::{BookCarRequest, BookFlightRequest, BookHotelRequest, BookingPayload};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub booking: Booking,
    pub items: Vec<BookingItem>,
    pub billing: BillingTransaction,
}

pub struct BookingEngine {
    db: PgClient,
    gateway: Arc<dyn PaymentGateway>,
    publisher: EventPublisher,
    lock_timeout_ms: u64,
}

impl BookingEngine {
    pub fn new(
        db: PgClient,
        gateway: Arc<dyn PaymentGateway>,
        publisher: EventPublisher,
        lock_timeout_ms: u64,
    ) -> Self {
        Self {
            db,
            gateway,
            publisher,
            lock_timeout_ms,
        }
    }

    pub async fn book_flight(
        &self,
        principal: &Principal,
        payload: BookFlightRequest,
    ) -> Result<BookingOutcome, DomainError> {
        self.book::<FlightKind>(principal, payload).await
    }

    pub async fn book_hotel(
        &self,
        principal: &Principal,
        payload: BookHotelRequest,
    ) -> Result<BookingOutcome, DomainError> {
        self.book::<HotelKind>(principal, payload).await
    }

    pub async fn book_car(
        &self,
        principal: &Principal,
        payload: BookCarRequest,
    ) -> Result<BookingOutcome, DomainError> {
        self.book::<CarKind>(principal, payload).await
    }

    async fn book<K: InventoryKind>(
        &self,
        principal: &Principal,
        payload: K::Payload,
    ) -> Result<BookingOutcome, DomainError> {
        payload.pre_validate()?;
        let token = payload
            .payment_token()
            .filter(|t| !t.is_empty())
            .ok_or(DomainError::MissingPaymentMethod)?
            .to_string();

        let mut result = self.attempt::<K>(principal, &payload, &token).await;
        if matches!(&result, Err(e) if e.is_retryable()) {
            warn!("Booking attempt deadlocked; retrying once");
            result = self.attempt::<K>(principal, &payload, &token).await;
        }

        match &result {
            Ok(outcome) => {
                info!(
                    "Booking confirmed: {} total={} {}",
                    outcome.booking.id, outcome.booking.total_amount, outcome.booking.currency
                );
                self.publisher.publish_booking_confirmed(
                    &outcome.booking,
                    &outcome.items,
                    &outcome.billing,
                    principal.user_id,
                );
            }
            Err(e) => {
                // The transaction has rolled back; the event is best-effort
                // and never alters the response.
                self.publisher
                    .publish_booking_failed(None, principal.user_id, e.code());
            }
        }

        result.map_err(|e| {
            if e.is_retryable() {
                DomainError::internal("deadlock persisted after retry")
            } else {
                e
            }
        })
    }

    /// One transactional attempt. Any error return rolls the transaction
    /// back, restoring inventory with it.
    async fn attempt<K: InventoryKind>(
        &self,
        principal: &Principal,
        payload: &K::Payload,
        token: &str,
    ) -> Result<BookingOutcome, DomainError> {
        let mut tx = self.db.pool.begin().await.map_err(map_sqlx)?;
        BookingRepository::set_lock_timeout(&mut tx, self.lock_timeout_ms).await?;

        // 1. Lock and load the inventory row
        let row = K::lock_and_load(&mut tx, payload)
            .await?
            .ok_or_else(K::not_found)?;

        // 2-3. Verify it is sellable and recompute pricing from the row
        let quote = K::verify_and_quote(&row, payload)?;
        check_expected_total(payload.expected_total(), quote.total)?;

        // 4. PENDING booking header
        let booking = BookingRepository::create_booking(
            &mut tx,
            NewBooking {
                user_id: principal.user_id,
                total_amount: quote.total,
                currency: quote.currency.clone(),
                start_date: quote.start,
                end_date: quote.end,
                notes: payload.notes().map(str::to_string),
            },
        )
        .await?;

        // 5. Booking item
        let item = BookingRepository::create_booking_item(
            &mut tx,
            K::build_item(&row, payload, &quote, booking.id),
        )
        .await?;

        // 6. Inventory decrement, still under the row lock
        K::decrement(&mut tx, &row, payload).await?;

        // 7. Charge; the simulator is pure, so a success here means the
        // inventory is already reserved for this payer
        let charge = self.gateway.charge(&ChargeRequest {
            user_id: principal.user_id,
            amount: quote.total,
            currency: quote.currency.clone(),
            token: token.to_string(),
        });

        // 8. Billing row records the gateway's verdict either way
        let status = if charge.success {
            BillingStatus::Success
        } else {
            BillingStatus::Failed
        };
        let billing = BookingRepository::create_billing_transaction(
            &mut tx,
            NewBillingTransaction {
                booking_id: booking.id,
                user_id: principal.user_id,
                amount: quote.total,
                currency: quote.currency.clone(),
                payment_method: PAYMENT_METHOD_CARD.to_string(),
                payment_token: token.to_string(),
                provider_reference: charge.provider_ref.clone(),
                status,
                error_code: charge.error_type.clone(),
                raw_response: charge.raw_response.clone(),
            },
        )
        .await?;

        // 9. Terminal transition inside the same transaction
        if charge.success {
            BookingRepository::update_booking_status(&mut tx, booking.id, BookingStatus::Confirmed)
                .await?;
            tx.commit().await.map_err(map_sqlx)?;

            let mut booking = booking;
            booking.status = BookingStatus::Confirmed;
            Ok(BookingOutcome {
                booking,
                items: vec![item],
                billing,
            })
        } else {
            // Write FAILED then abort: the billing row and the flip roll
            // back together, and the emitted event carries the failure.
            BookingRepository::update_booking_status(&mut tx, booking.id, BookingStatus::Failed)
                .await?;
            tx.rollback().await.map_err(map_sqlx)?;

            Err(match charge.error_type.as_deref() {
                Some(ERROR_NETWORK) => DomainError::NetworkError,
                Some(ERROR_INVALID_AMOUNT) => DomainError::InvalidAmount,
                other => DomainError::PaymentFailed(other.unwrap_or("declined").to_string()),
            })
        }
    }
}
