use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::info;

use wayfare_core::error::DomainError;

use crate::models::{
    ClickstreamEvent, Review, COLLECTION_ADMIN_AUDIT_LOGS, COLLECTION_CLICKSTREAM,
    COLLECTION_DEAL_SNAPSHOTS, COLLECTION_REVIEWS,
};

const DEFAULT_DATABASE: &str = "wayfare";

#[derive(Clone)]
pub struct DocStore {
    db: Database,
}

impl DocStore {
    pub async fn connect(uri: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        info!("Connected to document store database {}", db.name());
        Ok(Self { db })
    }

    pub fn reviews(&self) -> Collection<Review> {
        self.db.collection(COLLECTION_REVIEWS)
    }

    pub fn clickstream(&self) -> Collection<ClickstreamEvent> {
        self.db.collection(COLLECTION_CLICKSTREAM)
    }

    /// Creates the unique review key and the query indexes at boot.
    /// Index creation is idempotent on the server side.
    pub async fn ensure_indexes(&self) -> Result<(), DomainError> {
        let unique = IndexOptions::builder().unique(true).build();
        self.reviews()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "userId": 1, "listingType": 1, "listingId": 1 })
                    .options(unique)
                    .build(),
            )
            .await
            .map_err(DomainError::internal)?;

        self.reviews()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "listingType": 1, "listingId": 1, "createdAt": -1 })
                    .build(),
            )
            .await
            .map_err(DomainError::internal)?;

        let clickstream_keys = [
            doc! { "sessionId": 1, "createdAt": 1 },
            doc! { "userId": 1, "createdAt": 1 },
            doc! { "page": 1, "eventType": 1, "createdAt": -1 },
            doc! { "listingType": 1, "listingId": 1, "createdAt": -1 },
        ];
        for keys in clickstream_keys {
            self.clickstream()
                .create_index(IndexModel::builder().keys(keys).build())
                .await
                .map_err(DomainError::internal)?;
        }

        // Written by out-of-scope workers; only the read indexes live here.
        for name in [COLLECTION_DEAL_SNAPSHOTS, COLLECTION_ADMIN_AUDIT_LOGS] {
            self.db
                .collection::<bson::Document>(name)
                .create_index(
                    IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
                )
                .await
                .map_err(DomainError::internal)?;
        }

        info!("Document store indexes ensured");
        Ok(())
    }
}
