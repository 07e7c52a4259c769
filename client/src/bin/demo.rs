//! Booking client walkthrough.
//!
//! Lists events, then signs in and prints the seat map of one event.
//! With `BOOKING_RESERVATION_ID` set, also watches that reservation until it
//! settles, re-reading it every `BOOKING_POLL_INTERVAL_SECS`.
//!
//! # Usage
//!
//! ```bash
//! BOOKING_API_BASE_URL=http://localhost:8080/api \
//! BOOKING_EMAIL=kim@example.com BOOKING_PASSWORD='secret12!' \
//!   cargo run --bin booking-demo -- 1
//! ```
//!
//! The positional argument is the event id to open (default: the first
//! bookable event). Without `BOOKING_EMAIL`/`BOOKING_PASSWORD` only the
//! public event list is printed. `.env` files are honoured.

use anyhow::Context;
use concert_booking_auth::SessionManager;
use concert_booking_client::{
    ClientConfig, EventsApi, ReqwestBackend, ReservationLifecycle, SeatCatalog, TransportClient,
};
use concert_booking_core::{Credentials, EventId, HttpBackend, ReservationId};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env();
    info!(api_base_url = %config.api_base_url, "=== Concert Booking Demo ===");

    let backend: Arc<dyn HttpBackend> =
        Arc::new(ReqwestBackend::from_config(&config).context("building HTTP backend")?);
    let session = SessionManager::new(config.token_store(), Arc::clone(&backend));
    let transport = TransportClient::new(session.clone(), backend);

    let events = EventsApi::list(&transport).await.context("listing events")?;
    for event in &events {
        info!(
            event_id = %event.id,
            title = %event.title,
            venue = %event.venue,
            available = event.available_seats,
            status = ?event.status,
            "Event"
        );
    }

    let requested = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<i64>().map(EventId::new))
        .transpose()
        .context("event id must be an integer")?;
    let Some(event_id) = requested.or_else(|| events.iter().find(|e| e.is_bookable()).map(|e| e.id))
    else {
        info!("No bookable event");
        return Ok(());
    };

    let (Ok(email), Ok(password)) = (std::env::var("BOOKING_EMAIL"), std::env::var("BOOKING_PASSWORD"))
    else {
        info!("Set BOOKING_EMAIL and BOOKING_PASSWORD to open the seat map");
        return Ok(());
    };

    if !session.is_authenticated().await {
        session
            .login(&Credentials::new(email, password))
            .await
            .context("signing in")?;
    }

    if let Ok(raw) = std::env::var("BOOKING_RESERVATION_ID") {
        let id = raw
            .parse::<i64>()
            .map(ReservationId::new)
            .context("BOOKING_RESERVATION_ID must be an integer")?;
        watch_reservation(&config, transport.clone(), id).await?;
    }

    let catalog = SeatCatalog::load(transport, event_id)
        .await
        .with_context(|| format!("loading seats of event {event_id}"))?;
    for row in catalog.rows() {
        let line: Vec<String> = row
            .seats
            .iter()
            .map(|seat| {
                if seat.is_available() {
                    seat.number.clone()
                } else {
                    "--".to_string()
                }
            })
            .collect();
        info!(row = row.label, seats = %line.join(" "), "Seat row");
    }
    info!(
        event_id = %event_id,
        available = catalog.available_count(),
        "Seat map loaded"
    );

    Ok(())
}

async fn watch_reservation(
    config: &ClientConfig,
    transport: TransportClient,
    id: ReservationId,
) -> anyhow::Result<()> {
    let lifecycle = ReservationLifecycle::attach(transport, id)
        .await
        .with_context(|| format!("loading reservation {id}"))?
        .configured(config);
    let _polling = lifecycle.start_polling();
    let mut views = lifecycle.subscribe();

    loop {
        let reservation = views.borrow_and_update().reservation.clone();
        info!(
            reservation_id = %reservation.id,
            status = %reservation.status,
            minutes_until_expiry = reservation.minutes_until_expiry,
            interval_secs = lifecycle.poll_interval().as_secs(),
            "Reservation"
        );
        if reservation.is_terminal() {
            return Ok(());
        }
        tokio::select! {
            changed = views.changed() => changed.context("reservation watch closed")?,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
