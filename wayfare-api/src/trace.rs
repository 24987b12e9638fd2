//! Pure trace composition over clickstream events: per-session page
//! sequences for a single user, and sequence frequency across a cohort.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use wayfare_docstore::models::{ClickEventType, ClickstreamEvent};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTrace {
    pub session_id: String,
    pub pages: Vec<String>,
    pub event_count: i64,
    pub first_event_at: Option<DateTime<Utc>>,
    pub last_event_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceCount {
    pub pages: Vec<String>,
    pub count: i64,
}

/// Partitions time-ordered events by session, keeping sessions in
/// first-seen order. The page sequence is the PAGE_VIEW trail.
pub fn sessions_from_events(events: &[ClickstreamEvent]) -> Vec<SessionTrace> {
    let mut order: Vec<String> = Vec::new();
    let mut by_session: HashMap<String, SessionTrace> = HashMap::new();

    for event in events {
        let trace = by_session
            .entry(event.session_id.clone())
            .or_insert_with(|| {
                order.push(event.session_id.clone());
                SessionTrace {
                    session_id: event.session_id.clone(),
                    pages: Vec::new(),
                    event_count: 0,
                    first_event_at: None,
                    last_event_at: None,
                }
            });

        trace.event_count += 1;
        if trace.first_event_at.is_none() {
            trace.first_event_at = Some(event.created_at);
        }
        trace.last_event_at = Some(event.created_at);
        if event.event_type == ClickEventType::PageView {
            trace.pages.push(event.page.clone());
        }
    }

    order
        .into_iter()
        .filter_map(|session_id| by_session.remove(&session_id))
        .collect()
}

/// Counts identical page sequences across traces and returns the most
/// common ones. Empty sequences are skipped.
pub fn top_sequences(traces: &[SessionTrace], top: usize) -> Vec<SequenceCount> {
    let mut counts: HashMap<Vec<String>, i64> = HashMap::new();
    for trace in traces {
        if trace.pages.is_empty() {
            continue;
        }
        *counts.entry(trace.pages.clone()).or_default() += 1;
    }

    let mut ranked: Vec<SequenceCount> = counts
        .into_iter()
        .map(|(pages, count)| SequenceCount { pages, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.pages.cmp(&b.pages)));
    ranked.truncate(top);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn event(session: &str, event_type: ClickEventType, page: &str, offset: i64) -> ClickstreamEvent {
        ClickstreamEvent {
            user_id: Some("u-1".into()),
            session_id: session.into(),
            event_type,
            page: page.into(),
            referrer: None,
            element_id: None,
            element_label: None,
            listing_type: None,
            listing_id: None,
            ip: None,
            user_agent: None,
            metadata: json!({}),
            created_at: Utc::now() + Duration::seconds(offset),
        }
    }

    #[test]
    fn sessions_partition_in_first_seen_order() {
        let events = vec![
            event("s-1", ClickEventType::PageView, "/search", 0),
            event("s-2", ClickEventType::PageView, "/", 1),
            event("s-1", ClickEventType::Click, "/search", 2),
            event("s-1", ClickEventType::PageView, "/hotels/1", 3),
        ];
        let sessions = sessions_from_events(&events);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "s-1");
        assert_eq!(sessions[0].pages, vec!["/search", "/hotels/1"]);
        assert_eq!(sessions[0].event_count, 3);
        assert_eq!(sessions[1].pages, vec!["/"]);
    }

    #[test]
    fn clicks_do_not_enter_the_page_trail() {
        let events = vec![
            event("s-1", ClickEventType::Click, "/search", 0),
            event("s-1", ClickEventType::Scroll, "/search", 1),
        ];
        let sessions = sessions_from_events(&events);
        assert_eq!(sessions[0].event_count, 2);
        assert!(sessions[0].pages.is_empty());
    }

    #[test]
    fn identical_sequences_are_counted() {
        let mut traces = Vec::new();
        for i in 0..3 {
            traces.push(SessionTrace {
                session_id: format!("s-{i}"),
                pages: vec!["/".into(), "/search".into()],
                event_count: 2,
                first_event_at: None,
                last_event_at: None,
            });
        }
        traces.push(SessionTrace {
            session_id: "s-x".into(),
            pages: vec!["/deals".into()],
            event_count: 1,
            first_event_at: None,
            last_event_at: None,
        });
        traces.push(SessionTrace {
            session_id: "s-empty".into(),
            pages: vec![],
            event_count: 5,
            first_event_at: None,
            last_event_at: None,
        });

        let ranked = top_sequences(&traces, 20);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[0].pages, vec!["/", "/search"]);
    }
}
