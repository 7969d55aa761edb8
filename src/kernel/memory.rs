use std::fmt;

/// Size of one page frame in megabytes.
pub const PAGE_SIZE_MB: u32 = 16;

/// Default number of frames in a simulated machine.
pub const DEFAULT_FRAME_COUNT: u32 = 512;

/// Number of pages needed to hold `memory_mb` megabytes.
pub fn pages_for(memory_mb: u32) -> u32 {
    memory_mb.div_ceil(PAGE_SIZE_MB)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    OutOfFrames { requested: u32, free: u32 },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OutOfFrames { requested, free } => write!(
                f,
                "cannot reserve {requested} frames, only {free} free"
            ),
        }
    }
}

impl std::error::Error for MemoryError {}

/// Tracks free page frames. Only admission debits it and only termination
/// credits it.
pub trait FrameAllocator {
    fn free_frames(&self) -> u32;

    fn reserve(&mut self, pages: u32) -> Result<(), MemoryError>;

    fn release(&mut self, pages: u32);
}

/// Fixed-size frame pool.
#[derive(Debug, Clone)]
pub struct Memory {
    total_frames: u32,
    free_frames: u32,
}

impl Memory {
    pub fn new() -> Memory {
        Memory::with_frames(DEFAULT_FRAME_COUNT)
    }

    pub fn with_frames(total_frames: u32) -> Memory {
        Memory {
            total_frames,
            free_frames: total_frames,
        }
    }

    pub fn get_total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn get_reserved_frames(&self) -> u32 {
        self.total_frames - self.free_frames
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

impl FrameAllocator for Memory {
    fn free_frames(&self) -> u32 {
        self.free_frames
    }

    fn reserve(&mut self, pages: u32) -> Result<(), MemoryError> {
        if pages > self.free_frames {
            return Err(MemoryError::OutOfFrames {
                requested: pages,
                free: self.free_frames,
            });
        }

        self.free_frames -= pages;
        log::trace!("reserved {} frames, {} free", pages, self.free_frames);
        Ok(())
    }

    fn release(&mut self, pages: u32) {
        let released = pages.min(self.get_reserved_frames());
        if released < pages {
            log::warn!(
                "release of {} frames exceeds the {} reserved",
                pages,
                self.get_reserved_frames()
            );
        }

        self.free_frames += released;
        log::trace!("released {} frames, {} free", released, self.free_frames);
    }
}
