use std::collections::VecDeque;

use crate::guid::Guid;

/// Named queues, flushed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Queue {
    /// Work that must wait until the page has settled after a mount.
    RouterTransitions,
    /// Work that must see the freshly rendered document.
    AfterRender,
    /// Completion of loader removal.
    Destroy,
}

impl Queue {
    pub const ORDER: [Queue; 3] = [Queue::RouterTransitions, Queue::AfterRender, Queue::Destroy];

    const fn index(self) -> usize {
        match self {
            Self::RouterTransitions => 0,
            Self::AfterRender => 1,
            Self::Destroy => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Setup,
    LoadMoreIfNeeded,
    FinishDestroy,
}

/// Deferred per-loader work.
#[derive(Debug, Default)]
pub struct RunLoop {
    queues: [VecDeque<(Guid, Task)>; 3],
}

impl RunLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, queue: Queue, guid: Guid, task: Task) {
        self.queues[queue.index()].push_back((guid, task));
    }

    /// Schedule unless the same task for the same loader is already queued.
    /// Returns false when it was already there.
    pub fn schedule_once(&mut self, queue: Queue, guid: Guid, task: Task) -> bool {
        let q = &mut self.queues[queue.index()];
        if q.contains(&(guid, task)) {
            return false;
        }
        q.push_back((guid, task));
        true
    }

    /// Drop everything queued for a loader.
    pub fn cancel_all(&mut self, guid: Guid) {
        for q in &mut self.queues {
            q.retain(|(g, _)| *g != guid);
        }
    }

    /// Pop the next task, earliest queue first.
    pub fn next(&mut self) -> Option<(Queue, Guid, Task)> {
        Queue::ORDER.into_iter().find_map(|queue| {
            self.queues[queue.index()]
                .pop_front()
                .map(|(guid, task)| (queue, guid, task))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    pub fn pending(&self, queue: Queue) -> usize {
        self.queues[queue.index()].len()
    }
}
