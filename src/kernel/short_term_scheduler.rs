use std::fmt;
use std::num::NonZeroU32;

use super::{FrameAllocator, Instruction, Pid, ProcessControlBlock, ProcessState, QueueId, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// Nothing to schedule. Recoverable; the caller is idle.
    EmptyReadyQueue,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::EmptyReadyQueue => f.write_str("ready queue is empty"),
        }
    }
}

impl std::error::Error for StepError {}

/// Where the stepped process ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Back of Ready: quantum expired or the process yielded.
    Requeued,
    /// Blocked on the IO instruction now at the front of its sequence.
    Waiting,
    /// Out of instructions, moved to Exit.
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub pid: Pid,
    /// Ticks consumed by Compute and Print instructions.
    pub ticks_used: u32,
    pub disposition: Disposition,
}

impl<M: FrameAllocator> Scheduler<M> {
    /// Moves the Ready process with the lowest priority value into the
    /// Running slot. Ties go to the first one in queue order.
    ///
    /// A process already in the Running slot is displaced into Exit as
    /// Terminated, not returned to Ready. Does nothing when Ready is empty.
    pub fn dispatch(&mut self) -> Option<Pid> {
        let mut ready = self.queues.take(QueueId::Ready);

        let highest_priority = ready.iter().map(ProcessControlBlock::get_priority).min();
        let position = highest_priority.and_then(|priority| {
            ready
                .iter()
                .position(|pcb| pcb.get_priority() == priority)
        });

        let Some(mut next) = position.and_then(|idx| ready.remove(idx)) else {
            self.queues.set(QueueId::Ready, ready);
            return None;
        };

        if let Some(displaced) = self.running.take() {
            log::debug!("dispatch displaces running process {}", displaced.get_id());
            let mut exit = self.queues.take(QueueId::Exit);
            self.terminate_into(&mut exit, displaced);
            self.queues.set(QueueId::Exit, exit);
        }

        next.state = ProcessState::Running;
        let pid = next.get_id();
        log::debug!("dispatched process {} (priority {})", pid, next.get_priority());

        self.running = Some(next);
        self.queues.set(QueueId::Ready, ready);

        Some(pid)
    }

    /// Runs the process at the front of Ready for up to `quantum` ticks.
    ///
    /// A process left in the Running slot by [`Scheduler::dispatch`] goes
    /// back to the front of Ready first, so it is the one stepped: the
    /// dispatched process is resumed by identity, not reselected. The
    /// Running slot is empty when this returns; the stepped process ends up
    /// in exactly one of Ready, Waiting or Exit.
    pub fn round_robin_step(&mut self, quantum: NonZeroU32) -> Result<StepOutcome, StepError> {
        let mut ready = self.queues.take(QueueId::Ready);

        if let Some(mut preempted) = self.running.take() {
            preempted.state = ProcessState::Ready;
            ready.push_front(preempted);
        }

        let Some(mut pcb) = ready.pop_front() else {
            self.queues.set(QueueId::Ready, ready);
            return Err(StepError::EmptyReadyQueue);
        };

        let mut waiting = self.queues.take(QueueId::Waiting);
        let mut exit = self.queues.take(QueueId::Exit);

        pcb.state = ProcessState::Running;
        let pid = pcb.get_id();
        log::trace!("stepping process {} for {} ticks", pid, quantum);

        let (ticks_used, blocked_on_io) = run_quantum(&mut pcb, quantum.get());

        let disposition = if pcb.is_finished() {
            self.terminate_into(&mut exit, pcb);
            Disposition::Terminated
        } else if blocked_on_io {
            pcb.state = ProcessState::Waiting;
            log::debug!("process {} waiting on IO", pid);
            waiting.push_back(pcb);
            Disposition::Waiting
        } else {
            pcb.state = ProcessState::Ready;
            ready.push_back(pcb);
            Disposition::Requeued
        };

        self.queues.set(QueueId::Ready, ready);
        self.queues.set(QueueId::Waiting, waiting);
        self.queues.set(QueueId::Exit, exit);

        Ok(StepOutcome {
            pid,
            ticks_used,
            disposition,
        })
    }
}

/// Interprets instructions one tick at a time. Returns the ticks consumed and
/// whether the process stopped on an IO instruction.
fn run_quantum(pcb: &mut ProcessControlBlock, quantum: u32) -> (u32, bool) {
    let mut ticks_used = 0;

    for _ in 0..quantum {
        // Spent compute instructions are popped without consuming a tick.
        pcb.drop_finished_compute();

        let Some(instruction) = pcb.instructions.front().copied() else {
            break;
        };

        match instruction {
            Instruction::Compute { remaining_burst } => {
                ticks_used += 1;
                let remaining_burst = remaining_burst - 1;
                log::trace!("process {} burst time left: {}", pcb.get_id(), remaining_burst);

                if remaining_burst == 0 {
                    pcb.instructions.pop_front();
                } else if let Some(front) = pcb.instructions.front_mut() {
                    *front = Instruction::Compute { remaining_burst };
                }
            }
            Instruction::Io { .. } => return (ticks_used, true),
            Instruction::Yield => {
                pcb.instructions.pop_front();
                break;
            }
            Instruction::Print => {
                ticks_used += 1;
                log::info!("OUT: {}", pcb);
                pcb.instructions.pop_front();
            }
        }

        if pcb.instructions.is_empty() {
            break;
        }
    }

    pcb.drop_finished_compute();
    (ticks_used, false)
}
