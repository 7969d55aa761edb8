use std::fmt;

/// One unit of work in a process's program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// CPU work, one tick per unit of burst.
    Compute { remaining_burst: u32 },
    /// Opaque device delay. The duration is only counted down by IO completion.
    Io { duration: u32 },
    /// Gives up the rest of the quantum.
    Yield,
    /// Dumps the owning process for inspection.
    Print,
}

impl Instruction {
    pub fn is_io(&self) -> bool {
        matches!(self, Instruction::Io { .. })
    }

    /// A compute instruction with no burst left has nothing more to do.
    pub fn is_finished_compute(&self) -> bool {
        matches!(self, Instruction::Compute { remaining_burst: 0 })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Compute { remaining_burst } => write!(f, "CALC({remaining_burst})"),
            Instruction::Io { duration } => write!(f, "I/O({duration})"),
            Instruction::Yield => write!(f, "YIELD"),
            Instruction::Print => write!(f, "OUT"),
        }
    }
}
