#![warn(missing_docs)]
//! # criadouro-core
//!
//! ## Purpose
//! Defines the pure domain model shared across the `criadouro` workspace.
//!
//! ## Responsibilities
//! - Represent analysis results, campaigns, and their server-owned statuses.
//! - Model the tri-state feedback rating as an explicit tagged variant.
//! - Canonicalize inconsistent wire records (field aliases, mixed timestamp
//!   encodings) into one client-side shape.
//! - Derive campaign summaries (active window, pending-result count).
//!
//! ## Data flow
//! Gateway code decodes raw wire records ([`RawResultRecord`],
//! [`CampaignRecord`]) and canonicalizes them into [`AnalysisResult`] and
//! [`CampaignSummary`] values consumed by view-state projections.
//!
//! ## Ownership and lifetimes
//! Canonical values own their strings and buffers; nothing borrows from
//! transient response bodies.
//!
//! ## Error model
//! Malformed timestamps and out-of-range values return [`CoreError`]
//! variants with caller-actionable categorization.
//!
//! ## Security and privacy notes
//! This crate holds no credentials or tokens; image references are opaque
//! URIs and are never fetched here.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-owned lifecycle state of one analysis result.
///
/// The client never transitions this state itself; the backend advances it
/// asynchronously and the client observes transitions on re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Image analysis is still running on the backend.
    Processing,
    /// Analysis finished; the user has not opened the result yet.
    Finished,
    /// The user has opened the result detail at least once.
    Visualized,
    /// Analysis failed terminally.
    Failed,
}

/// Submitter-chosen classification of the photographed location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteType {
    /// Open land / vacant lot.
    #[serde(rename = "terreno")]
    Land,
    /// Built property.
    #[serde(rename = "propriedade")]
    Property,
}

impl SiteType {
    /// Returns the wire name used in form fields and JSON payloads.
    pub fn wire_name(self) -> &'static str {
        match self {
            SiteType::Land => "terreno",
            SiteType::Property => "propriedade",
        }
    }
}

/// Tri-state satisfaction rating for one analysis result.
///
/// Replaces the wire encoding `like: boolean | null` with an explicit
/// variant so unrated and rated states cannot be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rating {
    /// No rating submitted yet.
    #[default]
    Unrated,
    /// Thumbs up.
    Liked,
    /// Thumbs down.
    Disliked,
}

impl Rating {
    /// Converts the wire `like` field into a rating.
    pub fn from_wire(like: Option<bool>) -> Self {
        match like {
            None => Rating::Unrated,
            Some(true) => Rating::Liked,
            Some(false) => Rating::Disliked,
        }
    }

    /// Converts the rating back into the wire `like` field.
    pub fn to_wire(self) -> Option<bool> {
        match self {
            Rating::Unrated => None,
            Rating::Liked => Some(true),
            Rating::Disliked => Some(false),
        }
    }

    /// Returns `true` when a rating has been chosen.
    pub fn is_rated(self) -> bool {
        self != Rating::Unrated
    }
}

/// Feedback as encoded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFeedback {
    /// `null` until rated, then the thumbs up/down value.
    pub like: Option<bool>,
    /// Free-text comment; `null` or empty until commented.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Canonical client-side feedback attached to one result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedback {
    /// Tri-state rating.
    pub rating: Rating,
    /// Comment text; `None` when absent or blank.
    pub comment: Option<String>,
}

impl From<WireFeedback> for Feedback {
    fn from(wire: WireFeedback) -> Self {
        Self {
            rating: Rating::from_wire(wire.like),
            comment: wire.comment.filter(|comment| !comment.trim().is_empty()),
        }
    }
}

/// Geographic point attached to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// Timestamp as the backend emits it: ISO-8601 string on current endpoints,
/// epoch milliseconds on older record shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    /// Epoch milliseconds.
    Millis(i64),
    /// RFC 3339 / ISO-8601 string.
    Iso(String),
}

impl WireTimestamp {
    /// Canonicalizes the timestamp into epoch milliseconds.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidTimestamp`] when the string form does not
    /// parse as RFC 3339.
    pub fn to_millis(&self) -> Result<i64, CoreError> {
        match self {
            WireTimestamp::Millis(millis) => Ok(*millis),
            WireTimestamp::Iso(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|parsed| parsed.timestamp_millis())
                .map_err(|error| CoreError::InvalidTimestamp {
                    raw: raw.clone(),
                    reason: error.to_string(),
                }),
        }
    }
}

/// One analysis result record as returned by the results endpoints.
///
/// Field aliases absorb the backend's inconsistent naming
/// (`original_image` vs `originalImage`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawResultRecord {
    /// Backend-assigned result identifier.
    pub id: u64,
    /// URI of the submitted photo.
    #[serde(alias = "originalImage")]
    pub original_image: String,
    /// URI of the processed counterpart; absent while processing.
    #[serde(default, alias = "resultImage")]
    pub result_image: Option<String>,
    /// Location classification chosen at capture time.
    #[serde(rename = "type")]
    pub site_type: SiteType,
    /// Server-owned lifecycle status.
    pub status: ResultStatus,
    /// Feedback block; absent until the user rates the result.
    #[serde(default)]
    pub feedback: Option<WireFeedback>,
    /// Submission timestamp.
    pub created_at: WireTimestamp,
    /// Owning campaign; absent for unlinked submissions.
    #[serde(default, alias = "campaignId")]
    pub campaign_id: Option<u64>,
    /// Detected breeding-site count inferred by the backend.
    #[serde(default)]
    pub object_count: Option<u32>,
    /// Capture coordinates when the device shared them.
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// Canonical client-side view of one analysis result.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Backend-assigned identifier.
    pub id: u64,
    /// URI of the submitted photo.
    pub original_image: String,
    /// URI of the processed counterpart; `None` while processing.
    pub result_image: Option<String>,
    /// Location classification.
    pub site_type: SiteType,
    /// Server-owned lifecycle status.
    pub status: ResultStatus,
    /// Canonical feedback state.
    pub feedback: Feedback,
    /// Submission time in epoch milliseconds.
    pub created_at_ms: i64,
    /// Owning campaign, when linked.
    pub campaign_id: Option<u64>,
    /// Detected breeding-site count, once analysis finished.
    pub detected_sites: Option<u32>,
    /// Capture coordinates, when known.
    pub location: Option<Coordinates>,
}

/// Canonicalizes one raw record into [`AnalysisResult`].
///
/// # Errors
/// Returns [`CoreError::InvalidTimestamp`] when `created_at` cannot be
/// canonicalized.
pub fn canonicalize_result(record: RawResultRecord) -> Result<AnalysisResult, CoreError> {
    let created_at_ms = record.created_at.to_millis()?;

    Ok(AnalysisResult {
        id: record.id,
        original_image: record.original_image,
        result_image: record.result_image.filter(|uri| !uri.trim().is_empty()),
        site_type: record.site_type,
        status: record.status,
        feedback: record.feedback.map(Feedback::from).unwrap_or_default(),
        created_at_ms,
        campaign_id: record.campaign_id,
        detected_sites: record.object_count,
        location: record.location,
    })
}

/// One campaign record as returned by the campaign endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignRecord {
    /// Backend-assigned campaign identifier.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Target city.
    #[serde(default)]
    pub city: String,
    /// Informational bullet points about the campaign.
    #[serde(default)]
    pub campaign_infos: Vec<String>,
    /// Submission instructions shown before capture.
    #[serde(default)]
    pub instruction_infos: Vec<String>,
    /// Campaign creation timestamp.
    pub created_at: WireTimestamp,
    /// End of the campaign's active window.
    pub finish_at: WireTimestamp,
    /// Nested raw result records for the requesting user.
    #[serde(default)]
    pub results: Vec<RawResultRecord>,
}

/// Campaign list projection used by overview screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSummary {
    /// Backend-assigned identifier.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Whether the campaign is still accepting submissions.
    pub is_active: bool,
    /// Count of nested results the user has not visualized yet.
    pub results_not_displayed: usize,
}

/// Campaign detail projection with canonicalized nested results.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignDetail {
    /// List projection of this campaign.
    pub summary: CampaignSummary,
    /// Target city.
    pub city: String,
    /// Informational bullet points.
    pub campaign_infos: Vec<String>,
    /// Submission instructions.
    pub instruction_infos: Vec<String>,
    /// Canonicalized nested results.
    pub results: Vec<AnalysisResult>,
}

/// Active-window comparison used for campaign summaries.
///
/// # Semantics
/// Strictly greater-than: a campaign whose `finish_at` equals the evaluation
/// instant is already closed.
pub fn campaign_is_active(finish_at_ms: i64, now_ms: i64) -> bool {
    finish_at_ms > now_ms
}

/// Projects one campaign record into its list summary.
///
/// # Errors
/// Returns [`CoreError::InvalidTimestamp`] when `finish_at` cannot be
/// canonicalized.
pub fn summarize_campaign(record: &CampaignRecord, now_ms: i64) -> Result<CampaignSummary, CoreError> {
    let finish_at_ms = record.finish_at.to_millis()?;
    let results_not_displayed = record
        .results
        .iter()
        .filter(|result| result.status != ResultStatus::Visualized)
        .count();

    Ok(CampaignSummary {
        id: record.id,
        title: record.title.clone(),
        description: record.description.clone(),
        is_active: campaign_is_active(finish_at_ms, now_ms),
        results_not_displayed,
    })
}

/// Projects one campaign record into its detail view.
///
/// # Errors
/// Returns [`CoreError::InvalidTimestamp`] when any nested timestamp cannot
/// be canonicalized.
pub fn campaign_detail(record: CampaignRecord, now_ms: i64) -> Result<CampaignDetail, CoreError> {
    let summary = summarize_campaign(&record, now_ms)?;
    let results = record
        .results
        .into_iter()
        .map(canonicalize_result)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CampaignDetail {
        summary,
        city: record.city,
        campaign_infos: record.campaign_infos,
        instruction_infos: record.instruction_infos,
        results,
    })
}

/// Error type for domain canonicalization failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Timestamp string did not parse as RFC 3339.
    #[error("invalid timestamp {raw:?}: {reason}")]
    InvalidTimestamp {
        /// Raw wire value.
        raw: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// JSON decoding error while canonicalizing embedded records.
    #[error("record decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for wire canonicalization and campaign projection.

    use super::*;

    #[test]
    fn rating_round_trips_wire_encoding() {
        assert_eq!(Rating::from_wire(None), Rating::Unrated);
        assert_eq!(Rating::from_wire(Some(true)).to_wire(), Some(true));
        assert_eq!(Rating::from_wire(Some(false)).to_wire(), Some(false));
        assert!(!Rating::Unrated.is_rated());
    }

    #[test]
    fn result_record_accepts_both_image_field_spellings() {
        let snake: RawResultRecord = serde_json::from_str(
            r#"{"id":1,"original_image":"a.jpg","result_image":"b.jpg",
                "type":"terreno","status":"finished","created_at":1000}"#,
        )
        .expect("snake_case record should decode");
        let camel: RawResultRecord = serde_json::from_str(
            r#"{"id":1,"originalImage":"a.jpg","resultImage":"b.jpg",
                "type":"terreno","status":"finished","created_at":1000}"#,
        )
        .expect("camelCase record should decode");

        assert_eq!(snake.original_image, camel.original_image);
        assert_eq!(snake.result_image, camel.result_image);
    }

    #[test]
    fn canonicalize_parses_iso_created_at() {
        let record: RawResultRecord = serde_json::from_str(
            r#"{"id":7,"original_image":"a.jpg","type":"propriedade",
                "status":"processing","created_at":"2025-03-01T12:00:00Z",
                "object_count":3}"#,
        )
        .expect("record should decode");

        let result = canonicalize_result(record).expect("record should canonicalize");
        assert_eq!(result.created_at_ms, 1_740_830_400_000);
        assert_eq!(result.detected_sites, Some(3));
        assert_eq!(result.feedback.rating, Rating::Unrated);
        assert!(result.result_image.is_none());
    }

    #[test]
    fn blank_comment_canonicalizes_to_none() {
        let feedback = Feedback::from(WireFeedback {
            like: Some(true),
            comment: Some("   ".to_string()),
        });
        assert_eq!(feedback.rating, Rating::Liked);
        assert!(feedback.comment.is_none());
    }

    #[test]
    fn campaign_active_boundary_is_exclusive() {
        assert!(campaign_is_active(1_001, 1_000));
        assert!(!campaign_is_active(1_000, 1_000));
        assert!(!campaign_is_active(999, 1_000));
    }

    #[test]
    fn summary_counts_non_visualized_results() {
        let record: CampaignRecord = serde_json::from_str(
            r#"{"id":5,"title":"Campanha Verão","description":"d",
                "created_at":"2025-01-01T00:00:00Z",
                "finish_at":"2025-12-31T23:59:59Z",
                "results":[
                  {"id":1,"original_image":"a.jpg","type":"terreno",
                   "status":"visualized","created_at":1},
                  {"id":2,"original_image":"b.jpg","type":"terreno",
                   "status":"finished","created_at":2},
                  {"id":3,"original_image":"c.jpg","type":"propriedade",
                   "status":"processing","created_at":3}
                ]}"#,
        )
        .expect("campaign should decode");

        let summary =
            summarize_campaign(&record, 1_750_000_000_000).expect("summary should build");
        assert_eq!(summary.results_not_displayed, 2);
        assert!(summary.is_active);
    }
}
