mod device;
mod instruction;
mod long_term_scheduler;
mod process_control_block;
mod queues;
mod scheduler;
mod short_term_scheduler;

pub mod driver;
pub mod memory;

pub use driver::{Driver, ProcessSummary, SimulationReport, SimulatorConfig};
pub use instruction::Instruction;
pub use long_term_scheduler::{AdmissionError, DEFAULT_PRIORITY};
pub use memory::{FrameAllocator, Memory, MemoryError};
pub use process_control_block::{Pid, ProcessControlBlock, ProcessState};
pub use queues::{QueueError, QueueId, QueueSet};
pub use scheduler::{Scheduler, Snapshot};
pub use short_term_scheduler::{Disposition, StepError, StepOutcome};
