use bson::doc;
use futures_util::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use serde::Serialize;

use wayfare_core::error::DomainError;

use crate::client::DocStore;
use crate::models::Review;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Default, Clone)]
pub struct ReviewFilter {
    pub listing_type: Option<String>,
    pub listing_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: i64,
    pub offset: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDistribution {
    pub buckets: Vec<RatingBucket>,
    pub total_reviews: i64,
    pub average_rating: Option<f64>,
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY_CODE
    )
}

pub struct ReviewRepository;

impl ReviewRepository {
    /// One review per (user, listingType, listingId); the unique index is
    /// the arbiter under concurrency.
    pub async fn insert(store: &DocStore, review: &Review) -> Result<(), DomainError> {
        store.reviews().insert_one(review).await.map_err(|e| {
            if is_duplicate_key(&e) {
                DomainError::DuplicateReview
            } else {
                tracing::error!("review insert failed: {e}");
                DomainError::internal(e)
            }
        })?;
        Ok(())
    }

    /// Newest first; every filter is optional.
    pub async fn find(store: &DocStore, filter: &ReviewFilter) -> Result<Vec<Review>, DomainError> {
        let mut query = doc! {};
        if let Some(listing_type) = &filter.listing_type {
            query.insert("listingType", listing_type);
        }
        if let Some(listing_id) = &filter.listing_id {
            query.insert("listingId", listing_id);
        }
        if let Some(user_id) = &filter.user_id {
            query.insert("userId", user_id);
        }

        let cursor = store
            .reviews()
            .find(query)
            .sort(doc! { "createdAt": -1 })
            .skip(filter.offset)
            .limit(filter.limit)
            .await
            .map_err(DomainError::internal)?;

        cursor.try_collect().await.map_err(DomainError::internal)
    }

    /// Rating histogram for one listing: buckets 1..=5 with counts and
    /// percentages; average is None when there are no reviews.
    pub async fn distribution(
        store: &DocStore,
        listing_type: &str,
        listing_id: &str,
    ) -> Result<ReviewDistribution, DomainError> {
        let pipeline = vec![
            doc! { "$match": { "listingType": listing_type, "listingId": listing_id } },
            doc! { "$group": { "_id": "$rating", "count": { "$sum": 1 } } },
        ];

        let mut cursor = store
            .reviews()
            .aggregate(pipeline)
            .await
            .map_err(DomainError::internal)?;

        let mut counts = [0i64; 5];
        while let Some(doc) = cursor.try_next().await.map_err(DomainError::internal)? {
            let rating = doc
                .get_i32("_id")
                .map(i64::from)
                .or_else(|_| doc.get_i64("_id"))
                .unwrap_or(0);
            let count = doc
                .get_i32("count")
                .map(i64::from)
                .or_else(|_| doc.get_i64("count"))
                .unwrap_or(0);
            if (1..=5).contains(&rating) {
                counts[(rating - 1) as usize] = count;
            }
        }

        Ok(build_distribution(counts))
    }
}

fn build_distribution(counts: [i64; 5]) -> ReviewDistribution {
    let total: i64 = counts.iter().sum();
    let buckets = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| RatingBucket {
            rating: i as i32 + 1,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64) * 100.0
            },
        })
        .collect();

    let average_rating = if total == 0 {
        None
    } else {
        let weighted: i64 = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as i64 + 1) * count)
            .sum();
        Some(weighted as f64 / total as f64)
    };

    ReviewDistribution {
        buckets,
        total_reviews: total,
        average_rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_distribution_has_no_average() {
        let dist = build_distribution([0; 5]);
        assert_eq!(dist.total_reviews, 0);
        assert!(dist.average_rating.is_none());
        assert!(dist.buckets.iter().all(|b| b.percentage == 0.0));
    }

    #[test]
    fn distribution_counts_and_percentages() {
        let dist = build_distribution([0, 0, 1, 1, 2]);
        assert_eq!(dist.total_reviews, 4);
        assert_eq!(dist.buckets[4].rating, 5);
        assert_eq!(dist.buckets[4].count, 2);
        assert!((dist.buckets[4].percentage - 50.0).abs() < f64::EPSILON);
        // (3 + 4 + 5 + 5) / 4
        assert!((dist.average_rating.unwrap() - 4.25).abs() < f64::EPSILON);
    }
}
