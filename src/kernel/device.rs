use std::collections::VecDeque;

use super::{FrameAllocator, Instruction, Pid, ProcessState, QueueId, Scheduler};

impl<M: FrameAllocator> Scheduler<M> {
    /// Lets `ticks` of simulated time pass for every process in Waiting.
    ///
    /// Each waiting process counts down the duration of the IO instruction at
    /// the front of its sequence. When it reaches zero the instruction is
    /// popped and the process goes to the back of Ready, or to Exit if that was
    /// its last instruction. Returns the PIDs that left Waiting, in queue
    /// order.
    pub fn advance_io(&mut self, ticks: u32) -> Vec<Pid> {
        self.advance_io_except(ticks, None)
    }

    /// Like [`Scheduler::advance_io`], but leaves the countdown of
    /// `just_blocked` untouched. The process a step moved into Waiting only
    /// reached its IO at the end of that step, so the step's ticks are not
    /// IO time for it.
    pub fn advance_io_except(&mut self, ticks: u32, just_blocked: Option<Pid>) -> Vec<Pid> {
        let waiting = self.queues.take(QueueId::Waiting);
        if waiting.is_empty() {
            return Vec::new();
        }

        let mut ready = self.queues.take(QueueId::Ready);
        let mut exit = self.queues.take(QueueId::Exit);
        let mut still_waiting = VecDeque::with_capacity(waiting.len());
        let mut completed = Vec::new();

        for mut pcb in waiting {
            if just_blocked == Some(pcb.get_id()) {
                still_waiting.push_back(pcb);
                continue;
            }

            let done = match pcb.instructions.front_mut() {
                Some(Instruction::Io { duration }) => {
                    *duration = duration.saturating_sub(ticks);
                    *duration == 0
                }
                // Nothing to wait on.
                _ => true,
            };

            if !done {
                still_waiting.push_back(pcb);
                continue;
            }

            if pcb.instructions.front().is_some_and(Instruction::is_io) {
                pcb.instructions.pop_front();
            }
            pcb.drop_finished_compute();

            let pid = pcb.get_id();
            log::debug!("process {} finished IO", pid);
            completed.push(pid);

            if pcb.is_finished() {
                self.terminate_into(&mut exit, pcb);
            } else {
                pcb.state = ProcessState::Ready;
                ready.push_back(pcb);
            }
        }

        self.queues.set(QueueId::Waiting, still_waiting);
        self.queues.set(QueueId::Ready, ready);
        self.queues.set(QueueId::Exit, exit);

        completed
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::io::ProgramDescription;
    use crate::kernel::Memory;

    fn block_on_io(scheduler: &mut Scheduler, instructions: Vec<Instruction>) -> Pid {
        let pid = scheduler
            .admit(ProgramDescription::new("job", 16, instructions))
            .unwrap();
        scheduler
            .round_robin_step(NonZeroU32::new(20).unwrap())
            .unwrap();
        pid
    }

    #[test]
    fn test_advance_io_counts_down_then_requeues() {
        let mut scheduler = Scheduler::new();
        let pid = block_on_io(
            &mut scheduler,
            vec![Instruction::Io { duration: 5 }, Instruction::Compute { remaining_burst: 2 }],
        );

        assert!(scheduler.advance_io(3).is_empty());
        assert_eq!(
            scheduler.queue(QueueId::Waiting)[0].instructions.front(),
            Some(&Instruction::Io { duration: 2 })
        );

        assert_eq!(scheduler.advance_io(2), vec![pid]);
        assert!(scheduler.queue(QueueId::Waiting).is_empty());

        let ready = scheduler.queue(QueueId::Ready);
        assert_eq!(ready[0].state, ProcessState::Ready);
        assert_eq!(
            ready[0].instructions,
            vec![Instruction::Compute { remaining_burst: 2 }]
        );
    }

    #[test]
    fn test_advance_io_terminates_when_io_was_last() {
        let mut scheduler = Scheduler::with_memory(Memory::with_frames(50));
        let pid = block_on_io(&mut scheduler, vec![Instruction::Io { duration: 1 }]);
        assert_eq!(scheduler.free_frames(), 49);

        assert_eq!(scheduler.advance_io(10), vec![pid]);
        assert_eq!(scheduler.queue(QueueId::Exit)[0].state, ProcessState::Terminated);
        assert_eq!(scheduler.free_frames(), 50);
    }

    #[test]
    fn test_advance_io_keeps_waiting_order() {
        let mut scheduler = Scheduler::new();
        let slow = block_on_io(
            &mut scheduler,
            vec![Instruction::Io { duration: 9 }, Instruction::Yield],
        );
        let fast = block_on_io(
            &mut scheduler,
            vec![Instruction::Io { duration: 1 }, Instruction::Yield],
        );
        let slower = block_on_io(
            &mut scheduler,
            vec![Instruction::Io { duration: 12 }, Instruction::Yield],
        );

        assert_eq!(scheduler.advance_io(1), vec![fast]);

        let waiting: Vec<Pid> = scheduler
            .queue(QueueId::Waiting)
            .iter()
            .map(|pcb| pcb.get_id())
            .collect();
        assert_eq!(waiting, vec![slow, slower]);
    }

    #[test]
    fn test_advance_io_except_skips_just_blocked_process() {
        let mut scheduler = Scheduler::new();
        let earlier = block_on_io(
            &mut scheduler,
            vec![Instruction::Io { duration: 4 }, Instruction::Yield],
        );
        let just_blocked = block_on_io(
            &mut scheduler,
            vec![Instruction::Io { duration: 4 }, Instruction::Yield],
        );

        assert_eq!(scheduler.advance_io_except(4, Some(just_blocked)), vec![earlier]);

        let waiting = scheduler.queue(QueueId::Waiting);
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].get_id(), just_blocked);
        assert_eq!(
            waiting[0].instructions.front(),
            Some(&Instruction::Io { duration: 4 })
        );
    }

    #[test]
    fn test_advance_io_with_nothing_waiting() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.advance_io(5).is_empty());
        assert!(scheduler.is_idle());
    }
}
