//! The seeded random number generator shared by stochastic components.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A seeded ChaCha8 generator shared by every exponential time
/// distribution in a simulation.
pub type SharedRng = Arc<Mutex<ChaCha8Rng>>;

/// Create a shared generator from a seed.
pub fn shared_rng(seed: u64) -> SharedRng {
    Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed)))
}

/// Lock a shared generator.
///
/// A poisoned lock is recovered: the generator state is always whole.
pub fn lock_rng(rng: &SharedRng) -> MutexGuard<'_, ChaCha8Rng> {
    rng.lock().unwrap_or_else(PoisonError::into_inner)
}
