use std::collections::VecDeque;

use super::{FrameAllocator, Memory, Pid, ProcessControlBlock, ProcessState, QueueError, QueueId, QueueSet};

/// The owned scheduling context: queue set, running slot, PID counter and
/// frame allocator. Admission, dispatch, stepping and IO completion all take
/// `&mut self`, so the whole context is one exclusive resource.
#[derive(Debug)]
pub struct Scheduler<M: FrameAllocator = Memory> {
    pub(super) queues: QueueSet,
    pub(super) running: Option<ProcessControlBlock>,
    pub(super) memory: M,
    next_pid: Pid,
}

/// Owned copy of the scheduler's queues for external monitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub queues: QueueSet,
    pub running: Option<ProcessControlBlock>,
    pub free_frames: u32,
}

impl Scheduler<Memory> {
    pub fn new() -> Scheduler<Memory> {
        Scheduler::with_memory(Memory::new())
    }
}

impl Default for Scheduler<Memory> {
    fn default() -> Self {
        Scheduler::new()
    }
}

impl<M: FrameAllocator> Scheduler<M> {
    pub fn with_memory(memory: M) -> Scheduler<M> {
        Scheduler {
            queues: QueueSet::new(),
            running: None,
            memory,
            next_pid: 0,
        }
    }

    pub fn queue(&self, queue: QueueId) -> &VecDeque<ProcessControlBlock> {
        self.queues.get(queue)
    }

    pub fn set_queue(&mut self, queue: QueueId, processes: VecDeque<ProcessControlBlock>) {
        self.queues.set(queue, processes);
    }

    pub fn add_to(&mut self, queue: QueueId, pcb: ProcessControlBlock) {
        self.queues.add_to(queue, pcb);
    }

    /// Appends to the queue named by a legacy integer tag.
    pub fn add_to_tagged(&mut self, tag: i32, pcb: ProcessControlBlock) -> Result<(), QueueError> {
        let queue = QueueId::try_from(tag)?;
        self.queues.add_to(queue, pcb);
        Ok(())
    }

    /// Takes a process out of a queue and hands ownership to the caller.
    ///
    /// Its frames stay reserved: only termination credits them back, so a
    /// caller that drops the process instead of requeueing or terminating it
    /// leaks those frames.
    pub fn remove_from(&mut self, queue: QueueId, pid: Pid) -> Result<ProcessControlBlock, QueueError> {
        self.queues.remove_from(queue, pid)
    }

    pub fn running(&self) -> Option<&ProcessControlBlock> {
        self.running.as_ref()
    }

    pub fn free_frames(&self) -> u32 {
        self.memory.free_frames()
    }

    /// The next PID the counter will hand out.
    pub fn peek_next_pid(&self) -> Pid {
        self.next_pid
    }

    /// True when there is nothing left to run or wait on.
    pub fn is_idle(&self) -> bool {
        self.running.is_none()
            && self.queues.get(QueueId::Ready).is_empty()
            && self.queues.get(QueueId::Waiting).is_empty()
    }

    /// Looks a process up wherever it currently lives.
    pub fn find(&self, pid: Pid) -> Option<&ProcessControlBlock> {
        match &self.running {
            Some(pcb) if pcb.get_id() == pid => Some(pcb),
            _ => self.queues.find(pid).map(|(_, pcb)| pcb),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            queues: self.queues.clone(),
            running: self.running.clone(),
            free_frames: self.memory.free_frames(),
        }
    }

    pub(super) fn generate_pid(&mut self) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    /// Marks a process terminated, credits its pages back and appends it to
    /// the given exit queue.
    pub(super) fn terminate_into(
        &mut self,
        exit: &mut VecDeque<ProcessControlBlock>,
        mut pcb: ProcessControlBlock,
    ) {
        pcb.state = ProcessState::Terminated;
        self.memory.release(pcb.get_page_count());
        log::debug!("process {} terminated", pcb.get_id());
        exit.push_back(pcb);
    }
}
