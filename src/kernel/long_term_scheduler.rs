use std::fmt;

use super::{memory, FrameAllocator, Pid, ProcessControlBlock, ProcessState, QueueId, Scheduler};

use crate::io::ProgramDescription;

/// Priority given to a program that does not declare one.
pub const DEFAULT_PRIORITY: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    InsufficientMemory { requested_mb: u32, free_frames: u32 },
    MalformedProgram(&'static str),
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionError::InsufficientMemory {
                requested_mb,
                free_frames,
            } => write!(
                f,
                "process size {requested_mb} MB is greater than free memory {free_frames}"
            ),
            AdmissionError::MalformedProgram(reason) => write!(f, "malformed program: {reason}"),
        }
    }
}

impl std::error::Error for AdmissionError {}

impl<M: FrameAllocator> Scheduler<M> {
    /// Admits a parsed program as a Ready process.
    ///
    /// A PID is consumed for every attempt, before validation, so rejected
    /// programs still advance the counter. On failure nothing is queued and
    /// no frames are reserved.
    pub fn admit(&mut self, program: ProgramDescription) -> Result<Pid, AdmissionError> {
        let pid = self.generate_pid();

        let name = program
            .name
            .ok_or(AdmissionError::MalformedProgram("missing name"))?;
        let memory_mb = program
            .memory_mb
            .ok_or(AdmissionError::MalformedProgram("missing memory size"))?;

        let free_frames = self.memory.free_frames();
        if memory_mb > free_frames {
            log::warn!(
                "cannot admit {:?}: process size {} MB is greater than free memory {}",
                name,
                memory_mb,
                free_frames
            );
            return Err(AdmissionError::InsufficientMemory {
                requested_mb: memory_mb,
                free_frames,
            });
        }

        let page_count = memory::pages_for(memory_mb);
        self.memory
            .reserve(page_count)
            .map_err(|_| AdmissionError::InsufficientMemory {
                requested_mb: memory_mb,
                free_frames,
            })?;

        let priority = program.priority.unwrap_or(DEFAULT_PRIORITY);
        let mut pcb = ProcessControlBlock::new(
            pid,
            name,
            priority,
            page_count,
            program.instructions.into(),
        );
        pcb.state = ProcessState::Ready;

        log::info!(
            "admitted process {} ({:?}) with {} pages",
            pid,
            pcb.get_name(),
            page_count
        );
        self.queues.add_to(QueueId::Ready, pcb);

        Ok(pid)
    }

    /// Admits every program in order, returning the PIDs that made it in.
    pub fn admit_all(&mut self, programs: Vec<ProgramDescription>) -> Vec<Pid> {
        let mut process_ids = Vec::new();

        for program in programs {
            match self.admit(program) {
                Ok(pid) => process_ids.push(pid),
                Err(err) => log::warn!("admission rejected: {}", err),
            }
        }

        process_ids
    }
}
