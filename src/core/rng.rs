//! Per-subsystem random streams
//!
//! Every subsystem draws from its own ChaCha stream derived from the world
//! seed, so adding a draw in one subsystem never shifts another's sequence.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::WorldSeed;

/// Independent random streams, one per subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Geography,
    Climate,
    Ecosystem,
    Civilization,
    Disasters,
}

impl Stream {
    fn index(self) -> u64 {
        match self {
            Stream::Geography => 1,
            Stream::Climate => 2,
            Stream::Ecosystem => 3,
            Stream::Civilization => 4,
            Stream::Disasters => 5,
        }
    }
}

/// Build the generator for one subsystem
pub fn stream_rng(seed: WorldSeed, stream: Stream) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream.index());
    rng
}
