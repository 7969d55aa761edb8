use std::num::NonZeroU32;
use std::path::Path;

use super::*;

use crate::io::loader;

const DEFAULT_QUANTUM: NonZeroU32 = match NonZeroU32::new(20) {
    Some(quantum) => quantum,
    None => unreachable!(),
};
const DEFAULT_MAX_CYCLES: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Ticks granted to the front Ready process per step.
    pub quantum: NonZeroU32,
    pub total_frames: u32,
    /// Upper bound on driver cycles before the run is cut short.
    pub max_cycles: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            quantum: DEFAULT_QUANTUM,
            total_frames: memory::DEFAULT_FRAME_COUNT,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

/// One finished (or abandoned) process in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub id: Pid,
    pub name: String,
    pub priority: i32,
    pub page_count: u32,
    pub state: ProcessState,
}

impl From<&ProcessControlBlock> for ProcessSummary {
    fn from(pcb: &ProcessControlBlock) -> Self {
        ProcessSummary {
            id: pcb.get_id(),
            name: pcb.get_name().to_string(),
            priority: pcb.get_priority(),
            page_count: pcb.get_page_count(),
            state: pcb.state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub cycles: u64,
    pub total_ticks: u64,
    pub rejected: usize,
    /// False when `max_cycles` ran out before every process finished.
    pub completed: bool,
    pub processes: Vec<ProcessSummary>,
}

/// Owns the scheduling context and drives it one step at a time.
pub struct Driver {
    config: SimulatorConfig,
    scheduler: Scheduler<Memory>,
    rejected: usize,
}

impl Driver {
    pub fn new(config: SimulatorConfig) -> Driver {
        Driver {
            config,
            scheduler: Scheduler::with_memory(Memory::with_frames(config.total_frames)),
            rejected: 0,
        }
    }

    pub fn scheduler(&self) -> &Scheduler<Memory> {
        &self.scheduler
    }

    /// Parses and admits each program file. Files that fail to load or are
    /// refused admission are logged and counted, never fatal.
    pub fn load_programs<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<Pid> {
        let mut programs = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            match loader::load_program(path) {
                Ok(program) => programs.push(program),
                Err(err) => {
                    log::error!("failed to load {}: {}", path.display(), err);
                    self.rejected += 1;
                }
            }
        }

        let attempted = programs.len();
        let process_ids = self.scheduler.admit_all(programs);
        self.rejected += attempted - process_ids.len();

        process_ids
    }

    /// Admits an already parsed program.
    pub fn admit(&mut self, program: crate::io::ProgramDescription) -> Result<Pid, AdmissionError> {
        self.scheduler.admit(program).inspect_err(|_| self.rejected += 1)
    }

    /// Steps until nothing is left to run or wait on, or `max_cycles` is hit.
    ///
    /// IO advances by the ticks each step consumed (at least one), and by a
    /// single idle tick whenever Ready is empty but processes still wait. A
    /// process that blocked during the step starts its countdown afterwards.
    pub fn run(&mut self) -> SimulationReport {
        log::info!(
            "starting round robin simulation (quantum {})",
            self.config.quantum
        );

        let mut cycles = 0;
        let mut total_ticks = 0;

        while !self.scheduler.is_idle() && cycles < self.config.max_cycles {
            cycles += 1;

            let mut just_blocked = None;
            let elapsed = match self.scheduler.round_robin_step(self.config.quantum) {
                Ok(outcome) => {
                    log::debug!(
                        "cycle {}: process {} ran {} ticks, {:?}",
                        cycles,
                        outcome.pid,
                        outcome.ticks_used,
                        outcome.disposition
                    );
                    if outcome.disposition == Disposition::Waiting {
                        just_blocked = Some(outcome.pid);
                    }
                    outcome.ticks_used.max(1)
                }
                Err(StepError::EmptyReadyQueue) => {
                    log::trace!("cycle {}: idle, waiting on IO", cycles);
                    1
                }
            };

            total_ticks += u64::from(elapsed);
            self.scheduler.advance_io_except(elapsed, just_blocked);
        }

        let completed = self.scheduler.is_idle();
        if !completed {
            log::warn!("stopped after {} cycles with work remaining", cycles);
        }

        let report = SimulationReport {
            cycles,
            total_ticks,
            rejected: self.rejected,
            completed,
            processes: self.summaries(),
        };

        log::info!(
            "simulation finished: {} cycles, {} ticks, {} processes, {} rejected",
            report.cycles,
            report.total_ticks,
            report.processes.len(),
            report.rejected
        );

        report
    }

    fn summaries(&self) -> Vec<ProcessSummary> {
        let mut processes: Vec<ProcessSummary> = QueueId::ALL
            .iter()
            .flat_map(|queue| self.scheduler.queue(*queue).iter())
            .chain(self.scheduler.running())
            .map(ProcessSummary::from)
            .collect();

        processes.sort_by_key(|summary| summary.id);
        processes
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::io::ProgramDescription;

    fn driver_with_frames(total_frames: u32) -> Driver {
        Driver::new(SimulatorConfig {
            total_frames,
            ..SimulatorConfig::default()
        })
    }

    #[test]
    fn test_driver_default_config() {
        let config = SimulatorConfig::default();
        assert_eq!(config.quantum.get(), 20);
        assert_eq!(config.total_frames, memory::DEFAULT_FRAME_COUNT);
    }

    #[test]
    fn test_driver_runs_all_processes_to_completion() {
        let mut driver = driver_with_frames(100);
        driver
            .admit(ProgramDescription::new(
                "a",
                32,
                vec![
                    Instruction::Compute { remaining_burst: 25 },
                    Instruction::Io { duration: 4 },
                    Instruction::Compute { remaining_burst: 3 },
                ],
            ))
            .unwrap();
        driver
            .admit(ProgramDescription::new(
                "b",
                16,
                vec![Instruction::Compute { remaining_burst: 10 }, Instruction::Print],
            ))
            .unwrap();

        let report = driver.run();

        assert!(report.completed);
        assert_eq!(report.rejected, 0);
        // 39 ticks of CPU work plus 4 idle ticks while `a` waits on its IO.
        assert_eq!(report.total_ticks, 25 + 3 + 10 + 1 + 4);
        assert_eq!(report.processes.len(), 2);
        assert!(report
            .processes
            .iter()
            .all(|summary| summary.state == ProcessState::Terminated));
        assert_eq!(driver.scheduler().free_frames(), 100);
    }

    #[test]
    fn test_driver_idles_while_waiting_on_io() {
        let mut driver = driver_with_frames(100);
        driver
            .admit(ProgramDescription::new(
                "io",
                16,
                vec![Instruction::Io { duration: 3 }, Instruction::Compute { remaining_burst: 1 }],
            ))
            .unwrap();

        let report = driver.run();

        assert!(report.completed);
        assert_eq!(report.processes[0].state, ProcessState::Terminated);
        assert!(report.cycles >= 3);
    }

    #[test]
    fn test_driver_io_starts_counting_after_it_is_reached() {
        let mut driver = driver_with_frames(100);
        driver
            .admit(ProgramDescription::new(
                "compute_then_io",
                16,
                vec![
                    Instruction::Compute { remaining_burst: 10 },
                    Instruction::Io { duration: 10 },
                    Instruction::Compute { remaining_burst: 1 },
                ],
            ))
            .unwrap();

        let report = driver.run();

        assert!(report.completed);
        assert_eq!(report.total_ticks, 10 + 10 + 1);
        assert_eq!(report.cycles, 1 + 10 + 1);
    }

    #[test]
    fn test_driver_stops_at_max_cycles() {
        let mut driver = Driver::new(SimulatorConfig {
            quantum: NonZeroU32::new(1).unwrap(),
            max_cycles: 3,
            ..SimulatorConfig::default()
        });
        driver
            .admit(ProgramDescription::new(
                "long",
                16,
                vec![Instruction::Compute { remaining_burst: 50 }],
            ))
            .unwrap();

        let report = driver.run();

        assert!(!report.completed);
        assert_eq!(report.cycles, 3);
        assert_eq!(report.processes[0].state, ProcessState::Ready);
    }

    #[test]
    fn test_driver_counts_rejected_programs() {
        let mut driver = driver_with_frames(10);
        assert!(driver
            .admit(ProgramDescription::new("big", 1000, vec![Instruction::Yield]))
            .is_err());

        let report = driver.run();
        assert_eq!(report.rejected, 1);
        assert!(report.processes.is_empty());
    }

    #[test]
    fn test_driver_load_programs_from_files() {
        let dir = std::env::temp_dir().join(format!("cpu-sim-driver-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.txt");
        let too_big = dir.join("too_big.txt");
        let missing = dir.join("missing.txt");
        fs::write(&good, "Name: good\nMemory: 32\nCALCULATE 4\nEXE\n").unwrap();
        fs::write(&too_big, "Name: big\nMemory: 4000\nCALCULATE 4\nEXE\n").unwrap();

        let mut driver = driver_with_frames(64);
        let process_ids = driver.load_programs(&[&good, &too_big, &missing]);

        assert_eq!(process_ids, vec![0]);

        let report = driver.run();
        assert_eq!(report.rejected, 2);
        assert_eq!(report.processes.len(), 1);
        assert_eq!(report.processes[0].name, "good");

        fs::remove_dir_all(&dir).unwrap();
    }
}
