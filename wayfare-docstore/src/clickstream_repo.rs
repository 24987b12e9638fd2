use std::collections::{BTreeMap, HashSet};

use bson::{doc, Document};
use chrono::{DateTime, Duration, Utc};
use futures_util::TryStreamExt;
use serde::Serialize;

use wayfare_core::error::DomainError;

use crate::client::DocStore;
use crate::models::ClickstreamEvent;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageClickStat {
    pub page: String,
    pub event_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingClickStat {
    pub listing_type: String,
    pub listing_id: String,
    pub event_type: String,
    pub count: i64,
}

/// Aggregate block returned with a session's ordered events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_events: i64,
    pub events_by_type: BTreeMap<String, i64>,
    pub distinct_pages: i64,
    pub first_event_at: Option<DateTime<Utc>>,
    pub last_event_at: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
}

impl SessionStats {
    pub fn from_events(events: &[ClickstreamEvent]) -> Self {
        let mut events_by_type = BTreeMap::new();
        let mut pages = HashSet::new();
        for event in events {
            *events_by_type.entry(event.event_type.to_string()).or_insert(0) += 1;
            pages.insert(event.page.as_str());
        }
        let first_event_at = events.first().map(|e| e.created_at);
        let last_event_at = events.last().map(|e| e.created_at);
        let duration_seconds = match (first_event_at, last_event_at) {
            (Some(first), Some(last)) => (last - first).num_seconds().max(0),
            _ => 0,
        };

        SessionStats {
            total_events: events.len() as i64,
            events_by_type,
            distinct_pages: pages.len() as i64,
            first_event_at,
            last_event_at,
            duration_seconds,
        }
    }
}

fn doc_i64(doc: &Document, key: &str) -> i64 {
    doc.get_i64(key)
        .or_else(|_| doc.get_i32(key).map(i64::from))
        .unwrap_or(0)
}

pub struct ClickstreamRepository;

impl ClickstreamRepository {
    pub async fn insert_one(store: &DocStore, event: &ClickstreamEvent) -> Result<(), DomainError> {
        store
            .clickstream()
            .insert_one(event)
            .await
            .map_err(DomainError::internal)?;
        Ok(())
    }

    /// Per-document ingest: one bad event never fails the batch. Returns the
    /// number of stored documents; failures are logged and dropped.
    pub async fn insert_batch(store: &DocStore, events: &[ClickstreamEvent]) -> usize {
        let mut stored = 0;
        for event in events {
            match store.clickstream().insert_one(event).await {
                Ok(_) => stored += 1,
                Err(e) => {
                    tracing::warn!("clickstream batch insert dropped an event: {e}");
                }
            }
        }
        stored
    }

    /// Ordered events of one session, scoped to one user.
    pub async fn session_events(
        store: &DocStore,
        session_id: &str,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ClickstreamEvent>, DomainError> {
        let cursor = store
            .clickstream()
            .find(doc! { "sessionId": session_id, "userId": user_id })
            .sort(doc! { "createdAt": 1 })
            .limit(limit)
            .await
            .map_err(DomainError::internal)?;

        cursor.try_collect().await.map_err(DomainError::internal)
    }

    /// All of one user's events in time order, across sessions.
    pub async fn events_for_user(
        store: &DocStore,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ClickstreamEvent>, DomainError> {
        let cursor = store
            .clickstream()
            .find(doc! { "userId": user_id })
            .sort(doc! { "createdAt": 1 })
            .limit(limit)
            .await
            .map_err(DomainError::internal)?;

        cursor.try_collect().await.map_err(DomainError::internal)
    }

    /// Event counts grouped by (page, eventType) over a trailing window.
    pub async fn page_click_stats(
        store: &DocStore,
        since_days: i64,
        limit: i64,
    ) -> Result<Vec<PageClickStat>, DomainError> {
        let since = bson::DateTime::from_chrono(Utc::now() - Duration::days(since_days));
        let pipeline = vec![
            doc! { "$match": { "createdAt": { "$gte": since } } },
            doc! { "$group": {
                "_id": { "page": "$page", "eventType": "$eventType" },
                "count": { "$sum": 1 },
            } },
            doc! { "$sort": { "count": -1 } },
            doc! { "$limit": limit },
        ];

        let mut cursor = store
            .clickstream()
            .aggregate(pipeline)
            .await
            .map_err(DomainError::internal)?;

        let mut stats = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(DomainError::internal)? {
            let id = doc.get_document("_id").cloned().unwrap_or_default();
            stats.push(PageClickStat {
                page: id.get_str("page").unwrap_or_default().to_string(),
                event_type: id.get_str("eventType").unwrap_or_default().to_string(),
                count: doc_i64(&doc, "count"),
            });
        }
        Ok(stats)
    }

    /// Same grouping over (listingType, listingId); events without a listing
    /// reference are excluded.
    pub async fn listing_click_stats(
        store: &DocStore,
        since_days: i64,
        limit: i64,
    ) -> Result<Vec<ListingClickStat>, DomainError> {
        let since = bson::DateTime::from_chrono(Utc::now() - Duration::days(since_days));
        let pipeline = vec![
            doc! { "$match": {
                "createdAt": { "$gte": since },
                "listingType": { "$ne": null },
                "listingId": { "$ne": null },
            } },
            doc! { "$group": {
                "_id": {
                    "listingType": "$listingType",
                    "listingId": "$listingId",
                    "eventType": "$eventType",
                },
                "count": { "$sum": 1 },
            } },
            doc! { "$sort": { "count": -1 } },
            doc! { "$limit": limit },
        ];

        let mut cursor = store
            .clickstream()
            .aggregate(pipeline)
            .await
            .map_err(DomainError::internal)?;

        let mut stats = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(DomainError::internal)? {
            let id = doc.get_document("_id").cloned().unwrap_or_default();
            stats.push(ListingClickStat {
                listing_type: id.get_str("listingType").unwrap_or_default().to_string(),
                listing_id: id.get_str("listingId").unwrap_or_default().to_string(),
                event_type: id.get_str("eventType").unwrap_or_default().to_string(),
                count: doc_i64(&doc, "count"),
            });
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClickEventType;

    fn event(event_type: ClickEventType, page: &str, at: DateTime<Utc>) -> ClickstreamEvent {
        ClickstreamEvent {
            user_id: Some("u-1".into()),
            session_id: "s-1".into(),
            event_type,
            page: page.into(),
            referrer: None,
            element_id: None,
            element_label: None,
            listing_type: None,
            listing_id: None,
            ip: None,
            user_agent: None,
            metadata: serde_json::json!({}),
            created_at: at,
        }
    }

    #[test]
    fn empty_session_stats() {
        let stats = SessionStats::from_events(&[]);
        assert_eq!(stats.total_events, 0);
        assert!(stats.first_event_at.is_none());
        assert_eq!(stats.duration_seconds, 0);
    }

    #[test]
    fn session_stats_counts_and_duration() {
        let start = Utc::now();
        let events = vec![
            event(ClickEventType::PageView, "/search", start),
            event(ClickEventType::Click, "/search", start + Duration::seconds(10)),
            event(ClickEventType::PageView, "/hotels/1", start + Duration::seconds(45)),
        ];
        let stats = SessionStats::from_events(&events);
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.distinct_pages, 2);
        assert_eq!(stats.events_by_type["PAGE_VIEW"], 2);
        assert_eq!(stats.duration_seconds, 45);
    }
}
