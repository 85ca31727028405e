//! The two independently tracked data scopes and their fetch metadata.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// The period being served right now ("today").
    Current,
    /// The upcoming period ("tomorrow"), published during the afternoon.
    Next,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Current, Partition::Next];

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Current => "current",
            Partition::Next => "next",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subset of `{current, next}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionSet {
    current: bool,
    next: bool,
}

impl PartitionSet {
    pub const fn empty() -> Self {
        Self {
            current: false,
            next: false,
        }
    }

    pub const fn both() -> Self {
        Self {
            current: true,
            next: true,
        }
    }

    pub fn only(partition: Partition) -> Self {
        let mut set = Self::empty();
        set.insert(partition);
        set
    }

    pub fn from_flags(current: bool, next: bool) -> Self {
        Self { current, next }
    }

    pub fn insert(&mut self, partition: Partition) {
        match partition {
            Partition::Current => self.current = true,
            Partition::Next => self.next = true,
        }
    }

    pub fn remove(&mut self, partition: Partition) {
        match partition {
            Partition::Current => self.current = false,
            Partition::Next => self.next = false,
        }
    }

    pub fn contains(&self, partition: Partition) -> bool {
        match partition {
            Partition::Current => self.current,
            Partition::Next => self.next,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.current && !self.next
    }

    pub fn union(self, other: PartitionSet) -> PartitionSet {
        Self {
            current: self.current || other.current,
            next: self.next || other.next,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Partition> + '_ {
        Partition::ALL.into_iter().filter(|p| self.contains(*p))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

impl fmt::Display for PartitionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(|p| p.as_str()).collect();
        f.write_str(&names.join("+"))
    }
}

/// When a partition was last fetched successfully.
///
/// The instant, the local date and the local hour are always captured
/// together from one clock reading, so they can never disagree or be
/// partially present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStamp {
    pub fetched_at: DateTime<FixedOffset>,
    pub fetched_on: NaiveDate,
    pub fetched_hour: u32,
}

impl FetchStamp {
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self {
            fetched_at: now,
            fetched_on: now.date_naive(),
            fetched_hour: now.hour(),
        }
    }
}

/// Metadata for both partitions. `None` means "never fetched" (or cleared by
/// a date rollover).
///
/// Only the refresh coordinator holds a mutable `PartitionCache`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionCache {
    current: Option<FetchStamp>,
    next: Option<FetchStamp>,
}

impl PartitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, partition: Partition) -> Option<&FetchStamp> {
        match partition {
            Partition::Current => self.current.as_ref(),
            Partition::Next => self.next.as_ref(),
        }
    }

    pub fn record(&mut self, partition: Partition, stamp: FetchStamp) {
        let slot = match partition {
            Partition::Current => &mut self.current,
            Partition::Next => &mut self.next,
        };
        *slot = Some(stamp);
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.next = None;
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }
}
