use crate::hal::mass_storage::{BlockWrites, Event};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub enum FakeEvent {
    NewFile,
    Chunk { sector: u32, bytes: Vec<u8> },
    EndOfFile,
}

/// Storage layer double replaying a queue of write events.
#[derive(Default)]
pub struct FakeStorage {
    pending: VecDeque<FakeEvent>,
    current: Option<FakeEvent>,
}

impl FakeStorage {
    /// Queues a whole file transfer, split in blocks of `block_size` bytes.
    pub fn queue_file(&mut self, file: &[u8], block_size: usize) {
        self.pending.push_back(FakeEvent::NewFile);
        for (sector, block) in file.chunks(block_size).enumerate() {
            let bytes = block.to_vec();
            self.pending.push_back(FakeEvent::Chunk { sector: sector as u32, bytes });
        }
        self.pending.push_back(FakeEvent::EndOfFile);
    }

    pub fn queue(&mut self, event: FakeEvent) { self.pending.push_back(event); }

    pub fn is_drained(&self) -> bool { self.pending.is_empty() }
}

impl BlockWrites for FakeStorage {
    fn next_event(&mut self) -> Option<Event<'_>> {
        self.current = self.pending.pop_front();
        match self.current.as_ref()? {
            FakeEvent::NewFile => Some(Event::NewFile),
            FakeEvent::Chunk { sector, bytes } => Some(Event::Chunk { sector: *sector, bytes }),
            FakeEvent::EndOfFile => Some(Event::EndOfFile),
        }
    }
}
