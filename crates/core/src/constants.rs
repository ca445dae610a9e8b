use chrono_tz::Tz;

/// Timezone of the domestic market; all display times use it.
pub const DOMESTIC_TIMEZONE: Tz = chrono_tz::America::Argentina::Buenos_Aires;

/// Exchange suffix appended to domestic tickers before fetching.
pub const DOMESTIC_SYMBOL_SUFFIX: &str = ".BA";

/// Time of day (domestic) the foreign leg is anchored to.
pub const TARGET_HOUR: u32 = 17;
pub const TARGET_MINUTE: u32 = 0;

/// Half-width of the alignment window around the target time.
pub const ALIGNMENT_TOLERANCE_MINUTES: i64 = 10;

/// Domestic session during which the foreign feed is also delayed.
pub const SESSION_START_HOUR: u32 = 11;
pub const SESSION_START_MINUTE: u32 = 30;
pub const SESSION_END_HOUR: u32 = 17;
pub const SESSION_END_MINUTE: u32 = 0;

/// Decimal precision for display and export
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Placeholder for a value that could not be resolved.
pub const NOT_AVAILABLE: &str = "N/A";
