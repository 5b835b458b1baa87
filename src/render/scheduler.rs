use std::collections::VecDeque;
use std::thread::{self, ThreadId};

/// Error type for renderer operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("{op} refused: not on the dispatch thread")]
    WrongThread { op: &'static str },
}

/// Single-threaded cooperative job queue.
///
/// The thread that creates the scheduler is its dispatch thread. Jobs are
/// plain values run in FIFO order by the owner; nothing here runs in
/// parallel, so the owner's state needs no locking.
#[derive(Debug)]
pub struct Scheduler<J> {
    owner: ThreadId,
    queue: VecDeque<J>,
}

impl<J> Default for Scheduler<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J> Scheduler<J> {
    pub fn new() -> Self {
        Scheduler {
            owner: thread::current().id(),
            queue: VecDeque::new(),
        }
    }

    pub fn is_dispatch_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Refuse (and log) a call made from any thread but the dispatch thread.
    pub fn check_thread(&self, op: &'static str) -> Result<(), RenderError> {
        if self.is_dispatch_thread() {
            Ok(())
        } else {
            log::error!("task list {} failed - not dispatch thread", op);
            Err(RenderError::WrongThread { op })
        }
    }

    /// Enqueue a continuation to run after everything already queued.
    pub fn invoke_later(&mut self, job: J) {
        self.queue.push_back(job);
    }

    pub fn next_job(&mut self) -> Option<J> {
        self.queue.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
