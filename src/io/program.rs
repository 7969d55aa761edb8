use crate::kernel::Instruction;

/// A parsed program, ready for admission.
///
/// Name and memory are optional here; admission rejects a description
/// missing either one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramDescription {
    pub name: Option<String>,
    pub total_runtime: Option<String>,
    pub memory_mb: Option<u32>,
    pub priority: Option<i32>,
    pub instructions: Vec<Instruction>,
}

impl ProgramDescription {
    pub fn new(name: &str, memory_mb: u32, instructions: Vec<Instruction>) -> ProgramDescription {
        ProgramDescription {
            name: Some(name.to_string()),
            memory_mb: Some(memory_mb),
            instructions,
            ..ProgramDescription::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> ProgramDescription {
        self.priority = Some(priority);
        self
    }
}
