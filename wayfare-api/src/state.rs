use std::sync::Arc;

use wayfare_booking::BookingEngine;
use wayfare_docstore::DocStore;
use wayfare_store::{EventPublisher, PgClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgClient,
    pub docs: DocStore,
    pub engine: Arc<BookingEngine>,
    pub publisher: EventPublisher,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
}
