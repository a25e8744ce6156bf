use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// --- Venue Types ---

/// Who put a venue on the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddedBy {
    Admin,
    User,
    Community,
}

impl std::fmt::Display for AddedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddedBy::Admin => write!(f, "admin"),
            AddedBy::User => write!(f, "user"),
            AddedBy::Community => write!(f, "community"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueStatus {
    Verified,
    Pending,
}

impl VenueStatus {
    /// Admin entries are trusted; everything else waits for moderation.
    pub fn for_origin(added_by: AddedBy) -> Self {
        match added_by {
            AddedBy::Admin => VenueStatus::Verified,
            AddedBy::User | AddedBy::Community => VenueStatus::Pending,
        }
    }
}

impl std::fmt::Display for VenueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VenueStatus::Verified => write!(f, "verified"),
            VenueStatus::Pending => write!(f, "pending"),
        }
    }
}

pub const DEFAULT_LOCATION: &str = "Unknown";
pub const DEFAULT_SPECIALTY: &str = "Turkey and provolone";

/// A sandwich shop on the curated list. The name is the identity: two records
/// whose names match case-insensitively are the same venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub name: String,
    pub location: String,
    pub specialty: String,
    pub added_by: AddedBy,
    pub date_added: NaiveDate,
    pub status: VenueStatus,
    #[serde(rename = "comment_id", default, skip_serializing_if = "Option::is_none")]
    pub source_comment_id: Option<String>,
    #[serde(rename = "likes_when_added", default, skip_serializing_if = "Option::is_none")]
    pub likes_at_acceptance: Option<u32>,
}

impl VenueRecord {
    /// A new record with the status implied by its origin.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        specialty: impl Into<String>,
        added_by: AddedBy,
        date_added: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            specialty: specialty.into(),
            added_by,
            date_added,
            status: VenueStatus::for_origin(added_by),
            source_comment_id: None,
            likes_at_acceptance: None,
        }
    }

    /// A venue accepted from a popular comment.
    pub fn from_comment(
        name: impl Into<String>,
        comment_id: impl Into<String>,
        likes: u32,
        date_added: NaiveDate,
    ) -> Self {
        Self {
            source_comment_id: Some(comment_id.into()),
            likes_at_acceptance: Some(likes),
            ..Self::new(
                name,
                DEFAULT_LOCATION,
                DEFAULT_SPECIALTY,
                AddedBy::Community,
                date_added,
            )
        }
    }

    /// Lowercased name used for uniqueness checks.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn is_seed(&self) -> bool {
        self.added_by == AddedBy::Admin
    }
}

// --- Post Tracking Types ---

/// Bookkeeping for a published post that should be mined for comments later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPost {
    pub post_id: String,
    #[serde(rename = "timestamp")]
    pub published_at: DateTime<Utc>,
    #[serde(rename = "checked", default)]
    pub examined: bool,
}

impl TrackedPost {
    pub fn new(post_id: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            post_id: post_id.into(),
            published_at,
            examined: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn status_follows_origin() {
        assert_eq!(VenueStatus::for_origin(AddedBy::Admin), VenueStatus::Verified);
        assert_eq!(VenueStatus::for_origin(AddedBy::User), VenueStatus::Pending);
        assert_eq!(VenueStatus::for_origin(AddedBy::Community), VenueStatus::Pending);
    }

    #[test]
    fn comment_record_is_pending_community_entry() {
        let record = VenueRecord::from_comment("Tony's Deli", "c1", 7, day());
        assert_eq!(record.added_by, AddedBy::Community);
        assert_eq!(record.status, VenueStatus::Pending);
        assert_eq!(record.source_comment_id.as_deref(), Some("c1"));
        assert_eq!(record.likes_at_acceptance, Some(7));
        assert_eq!(record.location, DEFAULT_LOCATION);
    }

    #[test]
    fn venue_serializes_with_file_field_names() {
        let record = VenueRecord::from_comment("Tony's Deli", "c1", 7, day());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["added_by"], "community");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["date_added"], "2025-03-01");
        assert_eq!(json["comment_id"], "c1");
        assert_eq!(json["likes_when_added"], 7);
    }

    #[test]
    fn venue_without_optional_fields_deserializes() {
        let json = r#"{"name": "Corner Bistro", "location": "Main Street",
            "specialty": "Gourmet", "added_by": "user",
            "date_added": "2025-01-02", "status": "pending", "comment_id": null}"#;
        let record: VenueRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key(), "corner bistro");
        assert!(record.source_comment_id.is_none());
        assert!(record.likes_at_acceptance.is_none());
    }
}
