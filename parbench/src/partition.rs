//! How `N` items, numbered `1..=N`, are divided among `T` workers.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{require_positive, Error, Result};

/// End-inclusive range of item numbers. `start > end` means empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkRange {
    pub start: u64,
    pub end: u64,
}

impl WorkRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            // Saturates only for 0..=u64::MAX, which item numbers never span.
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<u64> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Contiguous ranges fixed up front. With `materialize`, the items are
    /// first written into a read-only array that workers slice into.
    Static { materialize: bool },
    /// Chunks of `chunk` items claimed on demand from a shared cursor.
    Dynamic { chunk: u64 },
}

impl Partition {
    pub fn validate(&self) -> Result<()> {
        if let Partition::Dynamic { chunk } = *self {
            require_positive("chunk size", chunk)?;
        }
        Ok(())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Partition::Static { materialize: false } => "static",
            Partition::Static { materialize: true } => "static (materialized)",
            Partition::Dynamic { .. } => "dynamic",
        }
    }
}

/// Splits `1..=items` into `threads` back-to-back ranges. The first
/// `items % threads` ranges hold one extra item.
pub fn static_slices(items: u64, threads: usize) -> Result<Vec<WorkRange>> {
    require_positive("items", items)?;
    let threads = require_positive("threads", threads as u64)?;

    let base = items / threads;
    let extra = items % threads;
    let mut next = 1u64;
    let slices = (0..threads)
        .map(|i| {
            let len = base + u64::from(i < extra);
            let start = next;
            let end = (start - 1) + len;
            next = end.saturating_add(1);
            WorkRange::new(start, end)
        })
        .collect();
    Ok(slices)
}

/// Checks that a cursor over `items` can hand out `chunk`-sized claims to
/// `workers` concurrent claimants without the counter wrapping.
///
/// The counter stops advancing once it passes `items`, so it never exceeds
/// `items + workers * chunk`.
pub fn check_cursor_range(items: u64, chunk: u64, workers: usize) -> Result<()> {
    require_positive("chunk size", chunk)?;
    let headroom = (workers as u64)
        .checked_add(1)
        .and_then(|w| w.checked_mul(chunk))
        .and_then(|span| span.checked_add(items));
    match headroom {
        Some(_) => Ok(()),
        None => Err(Error::invalid(
            "items",
            format!("{items} items in chunks of {chunk} for {workers} workers overflows the cursor"),
        )),
    }
}

/// Shared cursor for dynamic chunking. Owned by a single run and lent to
/// its workers.
#[derive(Debug)]
pub struct WorkCursor {
    next: AtomicU64,
    chunk: u64,
    items: u64,
}

impl WorkCursor {
    /// `workers` is the number of threads that will claim concurrently.
    pub fn new(items: u64, chunk: u64, workers: usize) -> Result<Self> {
        check_cursor_range(items, chunk, workers)?;
        Ok(Self {
            next: AtomicU64::new(1),
            chunk,
            items,
        })
    }

    /// Claims the next chunk, or `None` once the domain is exhausted.
    ///
    /// Each call advances the cursor by exactly one chunk, so claims never
    /// overlap. The last chunk is clipped at `items`.
    pub fn claim(&self) -> Option<WorkRange> {
        // Only the counter itself is shared; no other memory is published
        // through it.
        if self.next.load(Ordering::Relaxed) > self.items {
            return None;
        }
        let start = self.next.fetch_add(self.chunk, Ordering::Relaxed);
        if start > self.items {
            return None;
        }
        let end = start.saturating_add(self.chunk - 1).min(self.items);
        Some(WorkRange::new(start, end))
    }

    pub fn chunk(&self) -> u64 {
        self.chunk
    }
}
