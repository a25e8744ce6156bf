use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use provolone_common::VenueRecord;

use crate::context::BotContext;
use crate::infra::activity_log::ActivityEvent;
use crate::infra::util::file_timestamp;
use crate::store::{write_json, VenueStore};

/// Point-in-time snapshot of the venue list.
#[derive(Debug, Serialize)]
pub struct VenueReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub total_shops: usize,
    pub verified_shops: usize,
    pub pending_shops: usize,
    pub community_added: usize,
    pub shops: &'a [VenueRecord],
}

impl<'a> VenueReport<'a> {
    pub fn new(store: &'a VenueStore, now: DateTime<Utc>) -> Self {
        let counts = store.counts();
        Self {
            generated_at: now,
            total_shops: counts.total,
            verified_shops: counts.verified,
            pending_shops: counts.pending,
            community_added: counts.community,
            shops: store.records(),
        }
    }
}

/// Write `reports/sandwich_shops_report_<ts>.json`.
pub fn generate_report(ctx: &BotContext, store: &VenueStore, now: DateTime<Utc>) -> Result<PathBuf> {
    let path = ctx
        .paths
        .reports_dir()
        .join(format!("sandwich_shops_report_{}.json", file_timestamp(now)));
    let report = VenueReport::new(store, now);
    write_json(&path, &report)?;

    info!(path = %path.display(), total = report.total_shops, "Report generated");
    ctx.record(ActivityEvent::ReportGenerated { path: path.clone() });
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_context;
    use chrono::{NaiveDate, TimeZone};
    use provolone_common::AddedBy;

    #[test]
    fn report_counts_every_record() {
        let (_dir, ctx) = test_context();
        let mut store = VenueStore::seeded();
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        store.insert_if_absent(VenueRecord::from_comment("Mario's Subs", "c1", 7, day));
        store.insert_if_absent(VenueRecord::new("Bread Box", "Elm", "Club", AddedBy::User, day));
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap();

        let path = generate_report(&ctx, &store, now).unwrap();

        assert!(path.ends_with("sandwich_shops_report_20250302_080000.json"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["total_shops"], 4);
        assert_eq!(json["verified_shops"], 2);
        assert_eq!(json["pending_shops"], 2);
        assert_eq!(json["community_added"], 1);
        assert_eq!(json["shops"].as_array().unwrap().len(), 4);
        assert_eq!(json["shops"][2]["likes_when_added"], 7);

        let log = ctx.activity.entries().unwrap();
        assert!(log[0].contains("REPORT GENERATED: "));
    }
}
