use std::collections::BTreeMap;
use std::time::Instant;

use crate::assets::store::AssetKind;
use crate::foundation::core::{PlaceholderId, ViewId};

/// Milliseconds since an arbitrary epoch. Only differences matter.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Monotonic wall clock anchored at construction.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-advanced clock for deterministic timeouts.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::cell::Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: std::cell::Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// What a completed load will be attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadTarget {
    Garment { view: ViewId },
    Design { placeholder: PlaceholderId },
    ElementImage,
}

impl LoadTarget {
    pub fn asset_kind(&self) -> AssetKind {
        match self {
            LoadTarget::Garment { .. } => AssetKind::Garment,
            LoadTarget::Design { .. } | LoadTarget::ElementImage => AssetKind::Design,
        }
    }
}

/// Handle for one in-flight asset load.
///
/// A ticket is only honoured while its generation is current; anything issued before the last
/// [`LoadTracker::invalidate`] is stale and its result is dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: u64,
    pub url: String,
    pub target: LoadTarget,
    pub generation: u64,
    pub issued_at_ms: u64,
}

/// Why a ticket could not be completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketRejection {
    /// Issued before the last invalidation.
    Stale,
    /// Already completed, cancelled, or never issued.
    Unknown,
    /// Completed after the deadline.
    TimedOut,
}

/// Issues load tickets and decides whether their results may still be applied.
#[derive(Debug)]
pub struct LoadTracker {
    generation: u64,
    next_id: u64,
    timeout_ms: u64,
    pending: BTreeMap<u64, LoadTicket>,
}

impl LoadTracker {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            generation: 0,
            next_id: 1,
            timeout_ms,
            pending: BTreeMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn begin(&mut self, url: impl Into<String>, target: LoadTarget, now_ms: u64) -> LoadTicket {
        let ticket = LoadTicket {
            id: self.next_id,
            url: url.into(),
            target,
            generation: self.generation,
            issued_at_ms: now_ms,
        };
        self.next_id += 1;
        self.pending.insert(ticket.id, ticket.clone());
        tracing::debug!(id = ticket.id, url = %ticket.url, generation = ticket.generation, "load issued");
        ticket
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.pending.contains_key(&ticket.id)
    }

    /// Retire a ticket. `Ok` means its result should be applied.
    pub fn complete(&mut self, ticket: &LoadTicket, now_ms: u64) -> Result<(), TicketRejection> {
        let Some(issued) = self.pending.remove(&ticket.id) else {
            return Err(TicketRejection::Unknown);
        };
        if issued.generation != self.generation {
            return Err(TicketRejection::Stale);
        }
        if now_ms.saturating_sub(issued.issued_at_ms) > self.timeout_ms {
            return Err(TicketRejection::TimedOut);
        }
        Ok(())
    }

    /// Cancel every outstanding ticket and start a new generation.
    pub fn invalidate(&mut self) -> Vec<LoadTicket> {
        self.generation += 1;
        let cancelled: Vec<LoadTicket> = std::mem::take(&mut self.pending).into_values().collect();
        if !cancelled.is_empty() {
            tracing::debug!(count = cancelled.len(), generation = self.generation, "loads cancelled");
        }
        cancelled
    }

    /// Remove and return current tickets whose deadline has passed.
    pub fn take_expired(&mut self, now_ms: u64) -> Vec<LoadTicket> {
        let expired: Vec<u64> = self
            .pending
            .values()
            .filter(|t| now_ms.saturating_sub(t.issued_at_ms) > self.timeout_ms)
            .map(|t| t.id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| self.pending.remove(&id))
            .collect()
    }

    pub fn pending(&self) -> impl Iterator<Item = &LoadTicket> {
        self.pending.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
