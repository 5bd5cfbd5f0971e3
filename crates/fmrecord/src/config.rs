//! Timezone-related configuration for temporal fields

use std::fmt;
use std::sync::Arc;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// A timezone able to localize naive times and convert aware ones
pub trait TimeZone: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Offset for a local wall-clock time, `None` if that time does not exist
    fn offset_for_local(&self, local: PrimitiveDateTime) -> Option<UtcOffset>;

    /// Offset outside of daylight saving time
    fn standard_offset(&self) -> UtcOffset;

    /// Daylight saving adjustment in effect at a local time
    fn dst(&self, _local: PrimitiveDateTime) -> Duration {
        Duration::ZERO
    }

    /// Offset in effect at a UTC instant
    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset;
}

/// A zone with a constant UTC offset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedZone {
    name: String,
    offset: UtcOffset,
}

impl FixedZone {
    pub fn new(name: impl Into<String>, offset: UtcOffset) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }

    pub fn utc() -> Self {
        Self::new("UTC", UtcOffset::UTC)
    }
}

impl TimeZone for FixedZone {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset_for_local(&self, _local: PrimitiveDateTime) -> Option<UtcOffset> {
        Some(self.offset)
    }

    fn standard_offset(&self) -> UtcOffset {
        self.offset
    }

    fn offset_at(&self, _instant: OffsetDateTime) -> UtcOffset {
        self.offset
    }
}

/// Settings carried by every field
#[derive(Clone, Debug)]
pub struct Config {
    /// Store aware datetimes normalised to UTC; when false, store naive local times
    pub use_tz: bool,
    /// Zone used to interpret naive times and epoch seconds
    pub zone: Arc<dyn TimeZone>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_tz: true,
            zone: Arc::new(FixedZone::utc()),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_use_tz(mut self, use_tz: bool) -> Self {
        self.use_tz = use_tz;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl TimeZone + 'static) -> Self {
        self.zone = Arc::new(zone);
        self
    }

    /// Attach the configured zone to a naive local time; a nonexistent local
    /// time takes the zone's standard offset
    pub fn localize(&self, local: PrimitiveDateTime) -> OffsetDateTime {
        let offset = self
            .zone
            .offset_for_local(local)
            .unwrap_or_else(|| self.zone.standard_offset());
        local.assume_offset(offset)
    }

    /// Convert an aware time to naive wall-clock time in the configured zone
    pub fn to_local(&self, aware: OffsetDateTime) -> PrimitiveDateTime {
        let local = aware.to_offset(self.zone.offset_at(aware));
        PrimitiveDateTime::new(local.date(), local.time())
    }

    /// Convert an aware time to the configured zone, keeping it aware
    pub fn normalize(&self, aware: OffsetDateTime) -> OffsetDateTime {
        aware.to_offset(self.zone.offset_at(aware))
    }
}
