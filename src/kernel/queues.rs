use std::collections::VecDeque;
use std::fmt;

use super::{Pid, ProcessControlBlock};

/// A logical queue of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueId {
    Ready,
    Waiting,
    Exit,
    /// Reserved for synchronization blocking. Always valid, currently unused.
    Blocked,
}

impl QueueId {
    pub const ALL: [QueueId; 4] = [
        QueueId::Ready,
        QueueId::Waiting,
        QueueId::Exit,
        QueueId::Blocked,
    ];
}

/// Integer tags of the legacy queue selector: 1 ready, 2 waiting, 4 exit,
/// 5 blocked. Tag 0 (new) and 3 (running) never named a queue.
impl TryFrom<i32> for QueueId {
    type Error = QueueError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(QueueId::Ready),
            2 => Ok(QueueId::Waiting),
            4 => Ok(QueueId::Exit),
            5 => Ok(QueueId::Blocked),
            _ => Err(QueueError::InvalidQueueSelector(tag)),
        }
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueId::Ready => "ready",
            QueueId::Waiting => "waiting",
            QueueId::Exit => "exit",
            QueueId::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    InvalidQueueSelector(i32),
    ProcessNotFound { queue: QueueId, pid: Pid },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::InvalidQueueSelector(tag) => write!(f, "no queue with selector {tag}"),
            QueueError::ProcessNotFound { queue, pid } => {
                write!(f, "process {pid} is not in the {queue} queue")
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// The four logical collections partitioning processes by status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSet {
    ready: VecDeque<ProcessControlBlock>,
    waiting: VecDeque<ProcessControlBlock>,
    exit: VecDeque<ProcessControlBlock>,
    blocked: VecDeque<ProcessControlBlock>,
}

impl QueueSet {
    pub fn new() -> QueueSet {
        QueueSet::default()
    }

    pub fn get(&self, queue: QueueId) -> &VecDeque<ProcessControlBlock> {
        match queue {
            QueueId::Ready => &self.ready,
            QueueId::Waiting => &self.waiting,
            QueueId::Exit => &self.exit,
            QueueId::Blocked => &self.blocked,
        }
    }

    fn get_mut(&mut self, queue: QueueId) -> &mut VecDeque<ProcessControlBlock> {
        match queue {
            QueueId::Ready => &mut self.ready,
            QueueId::Waiting => &mut self.waiting,
            QueueId::Exit => &mut self.exit,
            QueueId::Blocked => &mut self.blocked,
        }
    }

    /// Takes the whole queue out, leaving it empty until it is written back
    /// with [`QueueSet::set`].
    pub fn take(&mut self, queue: QueueId) -> VecDeque<ProcessControlBlock> {
        std::mem::take(self.get_mut(queue))
    }

    /// Replaces the whole queue.
    pub fn set(&mut self, queue: QueueId, processes: VecDeque<ProcessControlBlock>) {
        *self.get_mut(queue) = processes;
    }

    pub fn add_to(&mut self, queue: QueueId, pcb: ProcessControlBlock) {
        self.get_mut(queue).push_back(pcb);
    }

    pub fn remove_from(
        &mut self,
        queue: QueueId,
        pid: Pid,
    ) -> Result<ProcessControlBlock, QueueError> {
        let processes = self.get_mut(queue);
        let position = processes
            .iter()
            .position(|pcb| pcb.get_id() == pid)
            .ok_or(QueueError::ProcessNotFound { queue, pid })?;

        processes
            .remove(position)
            .ok_or(QueueError::ProcessNotFound { queue, pid })
    }

    pub fn find(&self, pid: Pid) -> Option<(QueueId, &ProcessControlBlock)> {
        QueueId::ALL.into_iter().find_map(|queue| {
            self.get(queue)
                .iter()
                .find(|pcb| pcb.get_id() == pid)
                .map(|pcb| (queue, pcb))
        })
    }

    pub fn len(&self) -> usize {
        QueueId::ALL.iter().map(|queue| self.get(*queue).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
