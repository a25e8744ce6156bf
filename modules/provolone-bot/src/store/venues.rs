use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use provolone_common::{AddedBy, VenueRecord, VenueStatus};

use super::write_json;
use crate::context::BotContext;
use crate::infra::activity_log::ActivityEvent;

/// Admin-curated venues. Defined in code and never written to the venue file,
/// so restarts do not duplicate them.
pub fn seed_venues() -> Vec<VenueRecord> {
    let seeded_on = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    vec![
        VenueRecord::new(
            "Tony's Deli",
            "Downtown",
            "Classic turkey and provolone on fresh Italian bread",
            AddedBy::Admin,
            seeded_on,
        ),
        VenueRecord::new(
            "Corner Bistro",
            "Main Street",
            "Gourmet turkey with aged provolone and herb aioli",
            AddedBy::Admin,
            seeded_on,
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VenueCounts {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
    pub community: usize,
}

/// In-memory venue list with case-insensitive name uniqueness.
///
/// There is no update or delete: once a name is taken, later submissions
/// with that name are rejected whatever their other fields say.
#[derive(Debug, Clone, Default)]
pub struct VenueStore {
    records: Vec<VenueRecord>,
}

impl VenueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding only the admin seeds.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        for record in seed_venues() {
            store.insert_if_absent(record);
        }
        store
    }

    pub fn records(&self) -> &[VenueRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.records.iter().any(|r| r.key() == key)
    }

    pub fn verified(&self) -> impl Iterator<Item = &VenueRecord> {
        self.records
            .iter()
            .filter(|r| r.status == VenueStatus::Verified)
    }

    /// Insert unless a record with the same case-insensitive name exists.
    pub fn insert_if_absent(&mut self, record: VenueRecord) -> bool {
        if self.contains(&record.name) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Merge records from a previously persisted file. Names already present
    /// are skipped, so merging the same file twice is a no-op the second time.
    /// Returns the number of records added. A missing file adds nothing.
    pub fn load_merge(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let loaded: Vec<VenueRecord> = serde_json::from_str(&json)
            .with_context(|| format!("parsing {}", path.display()))?;

        let mut added = 0;
        for record in loaded {
            if self.insert_if_absent(record) {
                added += 1;
            }
        }
        info!(added, path = %path.display(), "Loaded venues from file");
        Ok(added)
    }

    /// Write every non-seed record. Returns how many were written.
    pub fn persist(&self, path: &Path) -> Result<usize> {
        let user_records: Vec<&VenueRecord> =
            self.records.iter().filter(|r| !r.is_seed()).collect();
        write_json(path, &user_records)?;
        info!(count = user_records.len(), "Saved user venues");
        Ok(user_records.len())
    }

    /// Insert, rewrite the venue file and log the outcome. A duplicate is a
    /// logged no-op; a failed rewrite is logged and the in-memory insert kept.
    pub fn submit(&mut self, record: VenueRecord, ctx: &BotContext) -> bool {
        let name = record.name.clone();
        let added_by = record.added_by;

        if !self.insert_if_absent(record) {
            ctx.record(ActivityEvent::DuplicateIgnored { name });
            return false;
        }

        if let Err(e) = self.persist(&ctx.paths.venues_file()) {
            warn!(error = %e, "Failed to save venues");
            ctx.record(ActivityEvent::StoreSaveFailed {
                error: format!("{e:#}"),
            });
        }
        ctx.record(ActivityEvent::ShopAdded { name, added_by });
        true
    }

    pub fn counts(&self) -> VenueCounts {
        VenueCounts {
            total: self.records.len(),
            verified: self
                .records
                .iter()
                .filter(|r| r.status == VenueStatus::Verified)
                .count(),
            pending: self
                .records
                .iter()
                .filter(|r| r.status == VenueStatus::Pending)
                .count(),
            community: self
                .records
                .iter()
                .filter(|r| r.added_by == AddedBy::Community)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn user_venue(name: &str) -> VenueRecord {
        VenueRecord::new(name, "Uptown", "Turkey melt", AddedBy::User, day())
    }

    #[test]
    fn names_differing_only_in_case_collide() {
        let mut store = VenueStore::new();
        assert!(store.insert_if_absent(user_venue("Mario's Subs")));
        assert!(!store.insert_if_absent(user_venue("MARIO'S SUBS")));
        assert!(!store.insert_if_absent(user_venue("mario's subs")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].name, "Mario's Subs");
    }

    #[test]
    fn seed_names_block_community_duplicates() {
        let mut store = VenueStore::seeded();
        let record = VenueRecord::from_comment("tony's deli", "c1", 9, day());
        assert!(!store.insert_if_absent(record));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn persist_skips_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandwich_shops.json");

        let mut store = VenueStore::seeded();
        store.insert_if_absent(user_venue("Mario's Subs"));
        assert_eq!(store.persist(&path).unwrap(), 1);

        let written: Vec<VenueRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].name, "Mario's Subs");
    }

    #[test]
    fn load_merge_twice_adds_nothing_the_second_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandwich_shops.json");

        let mut source = VenueStore::new();
        source.insert_if_absent(user_venue("Mario's Subs"));
        source.insert_if_absent(VenueRecord::from_comment("Pastrami Palace", "c9", 12, day()));
        source.persist(&path).unwrap();

        let mut store = VenueStore::seeded();
        assert_eq!(store.load_merge(&path).unwrap(), 2);
        assert_eq!(store.load_merge(&path).unwrap(), 0);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn load_merge_drops_in_file_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandwich_shops.json");
        let records = vec![user_venue("Sal's"), user_venue("SAL'S"), user_venue("Corner Bistro")];
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let mut store = VenueStore::seeded();
        assert_eq!(store.load_merge(&path).unwrap(), 1);
        assert!(store.contains("sal's"));
    }

    #[test]
    fn load_merge_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = VenueStore::seeded();
        assert_eq!(store.load_merge(&dir.path().join("absent.json")).unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn load_merge_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandwich_shops.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = VenueStore::seeded();
        assert!(store.load_merge(&path).is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn submit_persists_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = BotContext::new(dir.path()).unwrap();
        let mut store = VenueStore::seeded();

        assert!(store.submit(user_venue("Mario's Subs"), &ctx));
        assert!(!store.submit(user_venue("mario's subs"), &ctx));

        let mut reloaded = VenueStore::seeded();
        assert_eq!(reloaded.load_merge(&ctx.paths.venues_file()).unwrap(), 1);

        let log = ctx.activity.entries().unwrap();
        assert!(log[0].ends_with("NEW SHOP ADDED: Mario's Subs (by user)"));
        assert!(log[1].ends_with("DUPLICATE SHOP IGNORED: mario's subs"));
    }

    #[test]
    fn counts_by_status_and_origin() {
        let mut store = VenueStore::seeded();
        store.insert_if_absent(user_venue("Mario's Subs"));
        store.insert_if_absent(VenueRecord::from_comment("Pastrami Palace", "c9", 12, day()));

        assert_eq!(
            store.counts(),
            VenueCounts {
                total: 4,
                verified: 2,
                pending: 2,
                community: 1,
            }
        );
    }
}
