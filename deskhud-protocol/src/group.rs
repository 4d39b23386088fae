//! Content groups published by the DeskHUD server

/// One independently versioned unit of server content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContentGroup {
    /// Sentence of the day (top banner)
    Sentence,
    /// Current weather
    Weather,
    /// Date, weekday and lunar calendar
    Calendar,
    /// Free-form notes
    Notes,
    /// Weather forecast (free area)
    Forecast,
}

/// Number of content groups
pub const GROUP_COUNT: usize = 5;

// Wire keys for group objects
const KEY_SENTENCE: &str = "sentence";
const KEY_WEATHER: &str = "wx";
const KEY_CALENDAR: &str = "cal";
const KEY_NOTES: &str = "note";
const KEY_FORECAST: &str = "forecast";

impl ContentGroup {
    /// All groups in store order
    pub const ALL: [ContentGroup; GROUP_COUNT] = [
        ContentGroup::Sentence,
        ContentGroup::Weather,
        ContentGroup::Calendar,
        ContentGroup::Notes,
        ContentGroup::Forecast,
    ];

    /// Stable index into per-group tables
    pub const fn index(self) -> usize {
        match self {
            ContentGroup::Sentence => 0,
            ContentGroup::Weather => 1,
            ContentGroup::Calendar => 2,
            ContentGroup::Notes => 3,
            ContentGroup::Forecast => 4,
        }
    }

    /// Key of the group object in the feed
    pub const fn key(self) -> &'static str {
        match self {
            ContentGroup::Sentence => KEY_SENTENCE,
            ContentGroup::Weather => KEY_WEATHER,
            ContentGroup::Calendar => KEY_CALENDAR,
            ContentGroup::Notes => KEY_NOTES,
            ContentGroup::Forecast => KEY_FORECAST,
        }
    }

    /// Look up a group by its feed key
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            KEY_SENTENCE => Some(ContentGroup::Sentence),
            KEY_WEATHER => Some(ContentGroup::Weather),
            KEY_CALENDAR => Some(ContentGroup::Calendar),
            KEY_NOTES => Some(ContentGroup::Notes),
            KEY_FORECAST => Some(ContentGroup::Forecast),
            _ => None,
        }
    }
}
