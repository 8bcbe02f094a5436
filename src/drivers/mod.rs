//! Driver implementations for all supported platforms. They offer
//! a safe API over the raw peripherals, and stay generic over
//! register access wherever that makes them testable on the host.

pub mod kinetis {
    pub mod ftfx;
}
