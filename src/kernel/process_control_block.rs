use std::collections::VecDeque;
use std::fmt;

use super::Instruction;

/// Process id. Assigned from a strictly increasing counter, never reused.
pub type Pid = u32;

/// Lifecycle status of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Ready,
    Waiting,
    Running,
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::New => "new",
            ProcessState::Ready => "ready",
            ProcessState::Waiting => "waiting",
            ProcessState::Running => "running",
            ProcessState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// The process control block. Owns its instruction sequence exclusively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessControlBlock {
    pub state: ProcessState,
    pub instructions: VecDeque<Instruction>,

    id: Pid,
    name: String,
    priority: i32,
    page_count: u32,
}

impl ProcessControlBlock {
    pub fn new(
        id: Pid,
        name: String,
        priority: i32,
        page_count: u32,
        instructions: VecDeque<Instruction>,
    ) -> ProcessControlBlock {
        ProcessControlBlock {
            id,
            name,
            priority,
            page_count,
            instructions,
            state: ProcessState::New,
        }
    }

    pub fn get_id(&self) -> Pid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Lower value means higher priority.
    pub fn get_priority(&self) -> i32 {
        self.priority
    }

    pub fn get_page_count(&self) -> u32 {
        self.page_count
    }

    pub fn is_finished(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Pops leading compute instructions whose burst is already spent.
    /// Does not consume a tick.
    pub(crate) fn drop_finished_compute(&mut self) {
        while self
            .instructions
            .front()
            .is_some_and(Instruction::is_finished_compute)
        {
            self.instructions.pop_front();
        }
    }
}

impl fmt::Display for ProcessControlBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid={} name={:?} status={} priority={} pages={} instructions=[",
            self.id, self.name, self.state, self.priority, self.page_count
        )?;
        for (idx, instruction) in self.instructions.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{instruction}")?;
        }
        f.write_str("]")
    }
}
