//! Versioned data store
//!
//! Single source of truth for server content. Each content group carries
//! the version it was stamped with at merge time. Any declared version that
//! differs from the stored one replaces it, including a lower one after a
//! server restart, so "same version" always means "nothing new". Update
//! units copy versions, never payloads, and borrow the payload only to
//! render.
//!
//! The store also owns the fetch schedule and the local status fields.

pub mod fetch;
pub mod status;

use alloc::string::String;

use deskhud_protocol::{parse_feed, ContentGroup, Payload, PayloadFormat, GROUP_COUNT};

use crate::config::FetchConfig;
use crate::error::MergeError;
use crate::time::WallTime;

pub use fetch::{FetchSchedule, RetryDecision};
pub use status::{StatusBoard, MAX_STATUS_LEN};

/// Per-group version counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContentVersionSet {
    groups: [u32; GROUP_COUNT],
    global: u32,
}

impl ContentVersionSet {
    pub fn get(&self, group: ContentGroup) -> u32 {
        self.groups[group.index()]
    }

    /// Global counter (informational)
    pub fn global(&self) -> u32 {
        self.global
    }

    /// Take `version` for `group` if it differs from the stored one
    fn replace(&mut self, group: ContentGroup, version: u32) -> bool {
        swap_if_different(&mut self.groups[group.index()], version)
    }

    fn replace_global(&mut self, version: u32) -> bool {
        swap_if_different(&mut self.global, version)
    }
}

fn swap_if_different(slot: &mut u32, version: u32) -> bool {
    if *slot != version {
        *slot = version;
        true
    } else {
        false
    }
}

/// Payload held for one content group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPayload {
    pub format: PayloadFormat,
    /// Encoded body exactly as received
    pub data: String,
    pub width: Option<u16>,
    pub height: Option<u16>,
}

impl From<Payload<'_>> for StoredPayload {
    fn from(payload: Payload<'_>) -> Self {
        Self {
            format: payload.format,
            data: String::from(payload.data),
            width: payload.width,
            height: payload.height,
        }
    }
}

/// What a merge changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MergeReport {
    changed: [bool; GROUP_COUNT],
    /// The server changed the fetch interval
    pub interval_changed: bool,
}

impl MergeReport {
    /// Whether any group got a new version
    pub fn any(&self) -> bool {
        self.changed.iter().any(|&c| c)
    }

    pub fn contains(&self, group: ContentGroup) -> bool {
        self.changed[group.index()]
    }

    /// Groups that got a new version
    pub fn changed_groups(&self) -> impl Iterator<Item = ContentGroup> + '_ {
        ContentGroup::ALL
            .into_iter()
            .filter(move |g| self.changed[g.index()])
    }
}

/// Versioned content, fetch schedule and local status
#[derive(Debug, Clone)]
pub struct DataStore {
    versions: ContentVersionSet,
    payloads: [Option<StoredPayload>; GROUP_COUNT],
    fetch: FetchSchedule,
    status: StatusBoard,
}

impl DataStore {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            versions: ContentVersionSet::default(),
            payloads: Default::default(),
            fetch: FetchSchedule::new(config),
            status: StatusBoard::new(),
        }
    }

    /// Merge a raw feed response
    ///
    /// On a parse failure nothing but the error message changes. On success
    /// every group whose declared version differs from the stored one takes
    /// the new version (and payload, when one was sent in a supported
    /// format). Groups absent from the response are left alone.
    pub fn merge(&mut self, raw: &str) -> Result<MergeReport, MergeError> {
        let feed = match parse_feed(raw) {
            Ok(feed) => feed,
            Err(err) => {
                warn!("merge: {}", err);
                self.status.set_error(err);
                return Err(err.into());
            }
        };

        let mut report = MergeReport::default();

        for group in ContentGroup::ALL {
            let Some(update) = feed.group(group) else {
                continue;
            };

            if update.unsupported_format {
                warn!("merge: {} has an unsupported format", group.key());
            }

            let Some(version) = update.version else {
                continue;
            };

            let stored = self.versions.get(group);
            if !self.versions.replace(group, version) {
                continue;
            }
            if version < stored {
                info!("merge: {} version went back {} -> {}", group.key(), stored, version);
            }

            if let Some(payload) = update.payload {
                self.payloads[group.index()] = Some(payload.into());
            }
            report.changed[group.index()] = true;
            debug!("merge: {} -> v{}", group.key(), version);
        }

        if let Some(global) = feed.global_ver {
            self.versions.replace_global(global);
        }

        if let Some(ttl) = feed.ttl {
            let minutes = ttl.min(u16::MAX as u32) as u16;
            if self.fetch.set_interval(minutes) {
                info!("merge: fetch interval now {} min", minutes);
                report.interval_changed = true;
            }
        }

        self.status.clear_error();
        Ok(report)
    }

    /// Current version of a group (0 before any content)
    pub fn version(&self, group: ContentGroup) -> u32 {
        self.versions.get(group)
    }

    pub fn versions(&self) -> &ContentVersionSet {
        &self.versions
    }

    /// Latest payload of a group
    pub fn payload(&self, group: ContentGroup) -> Option<&StoredPayload> {
        self.payloads[group.index()].as_ref()
    }

    /// Whether a fetch is due; see [`FetchSchedule::should_fetch`]
    pub fn should_fetch(&mut self, now: Option<WallTime>) -> bool {
        self.fetch.should_fetch(now)
    }

    /// Advance the fetch schedule past `now`
    pub fn mark_fetched(&mut self, now: Option<WallTime>) {
        self.fetch.mark_fetched(now);
    }

    pub fn fetch_schedule(&self) -> &FetchSchedule {
        &self.fetch
    }

    pub fn fetch_schedule_mut(&mut self) -> &mut FetchSchedule {
        &mut self.fetch
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusBoard {
        &mut self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use deskhud_protocol::ParseError;

    fn store() -> DataStore {
        DataStore::new(&FetchConfig::default())
    }

    #[test]
    fn test_merge_updates_newer_groups() {
        let mut store = store();
        let report = store
            .merge(r#"{"wx_ver": 3, "wx": {"buffer": "AAAA"}, "cal_ver": 1}"#)
            .unwrap();

        assert!(report.any());
        assert!(report.contains(ContentGroup::Weather));
        assert!(report.contains(ContentGroup::Calendar));
        assert!(!report.contains(ContentGroup::Notes));
        assert_eq!(store.version(ContentGroup::Weather), 3);
        assert_eq!(store.payload(ContentGroup::Weather).unwrap().data, "AAAA");

        // Version without payload keeps no payload
        assert!(store.payload(ContentGroup::Calendar).is_none());
    }

    #[test]
    fn test_same_version_is_not_a_change() {
        let mut store = store();
        store
            .merge(r#"{"wx_ver": 3, "wx": {"buffer": "AAAA"}}"#)
            .unwrap();
        let report = store
            .merge(r#"{"wx_ver": 3, "wx": {"buffer": "////"}}"#)
            .unwrap();

        assert!(!report.any());
        assert_eq!(store.payload(ContentGroup::Weather).unwrap().data, "AAAA");
    }

    #[test]
    fn test_lower_version_replaces() {
        let mut store = store();
        store
            .merge(r#"{"wx_ver": 998, "wx": {"buffer": "OLD", "format": "text"}}"#)
            .unwrap();
        let report = store
            .merge(r#"{"wx_ver": 412, "wx": {"buffer": "NEW", "format": "text"}}"#)
            .unwrap();

        assert!(report.contains(ContentGroup::Weather));
        assert_eq!(store.version(ContentGroup::Weather), 412);
        assert_eq!(store.payload(ContentGroup::Weather).unwrap().data, "NEW");

        // Server restarted its counters from 1
        let report = store.merge(r#"{"wx_ver": 1}"#).unwrap();
        assert!(report.contains(ContentGroup::Weather));
        assert_eq!(store.version(ContentGroup::Weather), 1);
    }

    #[test]
    fn test_escaped_payloads_are_stored_unescaped() {
        let mut store = store();
        store
            .merge(
                r#"{"note_ver": 1, "note": {"buffer": "Buy milk\nEggs", "format": "text"},
                    "wx_ver": 1, "wx": {"buffer": "ab\/cd"}}"#,
            )
            .unwrap();

        assert_eq!(store.payload(ContentGroup::Notes).unwrap().data, "Buy milk\nEggs");
        assert_eq!(store.payload(ContentGroup::Weather).unwrap().data, "ab/cd");
    }

    #[test]
    fn test_partial_update_leaves_other_groups() {
        let mut store = store();
        store
            .merge(r#"{"sentence_ver": 1, "sentence": {"buffer": "AAAA"}, "wx_ver": 2}"#)
            .unwrap();
        store.merge(r#"{"wx_ver": 3}"#).unwrap();

        assert_eq!(store.version(ContentGroup::Sentence), 1);
        assert_eq!(store.version(ContentGroup::Weather), 3);
        assert!(store.payload(ContentGroup::Sentence).is_some());
    }

    #[test]
    fn test_parse_failure_leaves_store_untouched() {
        let mut store = store();
        store.merge(r#"{"cal_ver": 2, "cal": {"buffer": "AAAA"}}"#).unwrap();

        let err = store.merge(r#"{"cal_ver": 5, "cal": "#).unwrap_err();
        assert_eq!(err, MergeError::Parse(ParseError::Malformed));
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert_eq!(store.version(ContentGroup::Calendar), 2);
        assert_eq!(store.status().error(), "JSON parse error");

        // The next good merge clears the error
        store.merge(r#"{}"#).unwrap();
        assert_eq!(store.status().error(), "");
    }

    #[test]
    fn test_empty_body() {
        let mut store = store();
        assert_eq!(
            store.merge(""),
            Err(MergeError::Parse(ParseError::Empty))
        );
        assert_eq!(store.status().error(), "Empty response");
    }

    #[test]
    fn test_ttl_overrides_interval() {
        let mut store = store();
        let report = store.merge(r#"{"ttl": 15}"#).unwrap();
        assert!(report.interval_changed);
        assert!(!report.any());
        assert_eq!(store.fetch_schedule().interval_minutes(), 15);

        // Zero is not a valid interval
        let report = store.merge(r#"{"ttl": 0}"#).unwrap();
        assert!(!report.interval_changed);
        assert_eq!(store.fetch_schedule().interval_minutes(), 15);
    }

    #[test]
    fn test_hourly_ttl_fetches_on_the_hour() {
        let mut store = store();
        store.merge(r#"{"ttl": 60}"#).unwrap();
        store.mark_fetched(Some(WallTime::new(2025, 6, 1, 10, 2, 0)));
        assert_eq!(
            store.fetch_schedule().next_fetch(),
            Some(WallTime::new(2025, 6, 1, 11, 0, 0))
        );

        store.merge(r#"{"ttl": 120}"#).unwrap();
        store.mark_fetched(Some(WallTime::new(2025, 6, 1, 11, 0, 4)));
        assert_eq!(
            store.fetch_schedule().next_fetch(),
            Some(WallTime::new(2025, 6, 1, 12, 0, 0))
        );
        assert!(!store.should_fetch(Some(WallTime::new(2025, 6, 1, 11, 59, 59))));
        assert!(store.should_fetch(Some(WallTime::new(2025, 6, 1, 12, 0, 0))));
    }

    #[test]
    fn test_unsupported_format_keeps_payload() {
        let mut store = store();
        store
            .merge(r#"{"forecast_ver": 1, "forecast": {"buffer": "AAAA"}}"#)
            .unwrap();
        let report = store
            .merge(r#"{"forecast_ver": 2, "forecast": {"buffer": "<svg/>", "format": "svg"}}"#)
            .unwrap();

        assert!(report.contains(ContentGroup::Forecast));
        assert_eq!(store.version(ContentGroup::Forecast), 2);
        assert_eq!(store.payload(ContentGroup::Forecast).unwrap().data, "AAAA");
    }

    #[test]
    fn test_global_version() {
        let mut store = store();
        store.merge(r#"{"global_ver": 7}"#).unwrap();
        assert_eq!(store.versions().global(), 7);
        store.merge(r#"{"global_ver": 2}"#).unwrap();
        assert_eq!(store.versions().global(), 2);
    }

    #[test]
    fn test_changed_groups_iter() {
        let mut store = store();
        let report = store.merge(r#"{"note_ver": 1, "wx_ver": 1}"#).unwrap();
        let mut groups = report.changed_groups();
        assert_eq!(groups.next(), Some(ContentGroup::Weather));
        assert_eq!(groups.next(), Some(ContentGroup::Notes));
        assert_eq!(groups.next(), None);
    }

    mod proptests {
        use super::super::*;
        use alloc::format;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn last_declared_version_wins(versions in proptest::collection::vec((0usize..GROUP_COUNT, 0u32..50), 1..40)) {
                let mut store = DataStore::new(&FetchConfig::default());
                let mut expected = [0u32; GROUP_COUNT];

                for (index, version) in versions {
                    let group = ContentGroup::ALL[index];
                    let raw = format!(r#"{{"{}_ver": {}}}"#, group.key(), version);
                    let report = store.merge(&raw).unwrap();

                    prop_assert_eq!(report.contains(group), version != expected[index]);
                    expected[index] = version;
                    for other in ContentGroup::ALL {
                        prop_assert_eq!(store.version(other), expected[other.index()]);
                    }
                }
            }
        }
    }
}
