use crate::kernel::Kernel;
use crate::partition::{WorkCursor, WorkRange};

/// Where a worker pulls its items from.
#[derive(Debug, Clone, Copy)]
pub enum WorkSource<'a> {
    /// A fixed range of item numbers.
    Slice(WorkRange),
    /// A fixed slice of a pre-built, read-only input array.
    Items(&'a [u64]),
    /// Chunks claimed from the run's shared cursor until it runs dry.
    Cursor(&'a WorkCursor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Running,
    Terminated,
}

/// Accumulated contribution of one worker, handed back by value when the
/// worker finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialResult {
    pub worker: usize,
    pub total: u64,
    pub items: u64,
}

pub struct Worker<'a> {
    id: usize,
    source: WorkSource<'a>,
    state: WorkerState,
}

impl<'a> Worker<'a> {
    pub fn new(id: usize, source: WorkSource<'a>) -> Self {
        Self {
            id,
            source,
            state: WorkerState::Created,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Drains the work source through `kernel` and leaves the worker
    /// `Terminated`. The accumulator lives on this stack frame only; nothing
    /// else observes it until it is returned.
    ///
    /// A worker runs once. Calling `run` again yields an empty partial so
    /// its source is never counted twice.
    pub fn run<K: Kernel>(&mut self, kernel: &K) -> PartialResult {
        if self.state != WorkerState::Created {
            tracing::warn!(worker = self.id, state = ?self.state, "worker already ran");
            return PartialResult {
                worker: self.id,
                total: 0,
                items: 0,
            };
        }
        self.state = WorkerState::Running;
        let mut kstate = kernel.init_state(self.id);
        let mut total = 0u64;
        let mut items = 0u64;

        match self.source {
            WorkSource::Slice(range) => {
                for n in range.iter() {
                    total += kernel.apply(&mut kstate, n);
                }
                items = range.len();
            }
            WorkSource::Items(slice) => {
                for &n in slice {
                    total += kernel.apply(&mut kstate, n);
                }
                items = slice.len() as u64;
            }
            WorkSource::Cursor(cursor) => {
                while let Some(range) = cursor.claim() {
                    for n in range.iter() {
                        total += kernel.apply(&mut kstate, n);
                    }
                    items += range.len();
                }
            }
        }

        self.state = WorkerState::Terminated;
        tracing::trace!(worker = self.id, items, total, "worker terminated");
        PartialResult {
            worker: self.id,
            total,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{collatz_steps, Collatz};

    #[test]
    fn new_worker_starts_created() {
        let w = Worker::new(4, WorkSource::Slice(WorkRange::new(1, 2)));
        assert_eq!(w.state(), WorkerState::Created);
        assert_eq!(w.id(), 4);
    }

    #[test]
    fn run_moves_worker_to_terminated() {
        let mut w = Worker::new(1, WorkSource::Slice(WorkRange::new(1, 10)));
        let first = w.run(&Collatz);
        assert_eq!(w.state(), WorkerState::Terminated);
        assert_eq!(first.items, 10);

        let again = w.run(&Collatz);
        assert_eq!(again, PartialResult { worker: 1, total: 0, items: 0 });
        assert_eq!(w.state(), WorkerState::Terminated);
    }

    #[test]
    fn cursor_worker_terminates_after_draining() {
        #[derive(Clone)]
        struct CountItems;
        impl Kernel for CountItems {
            type State = ();
            fn name(&self) -> &'static str {
                "count"
            }
            fn init_state(&self, _worker: usize) {}
            fn apply(&self, _state: &mut (), _item: u64) -> u64 {
                1
            }
        }

        let cursor = WorkCursor::new(50, 8, 1).unwrap();
        let mut w = Worker::new(0, WorkSource::Cursor(&cursor));
        assert_eq!(w.state(), WorkerState::Created);
        assert_eq!(w.run(&CountItems).total, 50);
        assert_eq!(w.state(), WorkerState::Terminated);
    }

    #[test]
    fn slice_source_sums_its_range() {
        let p = Worker::new(0, WorkSource::Slice(WorkRange::new(1, 30))).run(&Collatz);
        let expected: u64 = (1..=30).map(collatz_steps).sum();
        assert_eq!(p.total, expected);
        assert_eq!(p.items, 30);
    }

    #[test]
    fn empty_slice_contributes_nothing() {
        let p = Worker::new(2, WorkSource::Slice(WorkRange::new(5, 4))).run(&Collatz);
        assert_eq!(p, PartialResult { worker: 2, total: 0, items: 0 });
    }

    #[test]
    fn items_source_reads_array_values() {
        let input = [27u64, 6, 1];
        let p = Worker::new(1, WorkSource::Items(&input)).run(&Collatz);
        assert_eq!(p.total, 111 + 8);
        assert_eq!(p.items, 3);
    }

    #[test]
    fn single_worker_drains_cursor() {
        let cursor = WorkCursor::new(1000, 64, 1).unwrap();
        let p = Worker::new(0, WorkSource::Cursor(&cursor)).run(&Collatz);
        assert_eq!(p.items, 1000);
        assert_eq!(p.total, (1..=1000).map(collatz_steps).sum::<u64>());
        assert_eq!(cursor.claim(), None);
    }
}
