use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::Duration;

/// Source of every random draw in the console.
///
/// Boxed so a seeded generator, OS entropy or a test mock can be swapped in.
pub type Entropy = Box<dyn RngCore + Send>;

/// Build the session entropy source. A seed makes the session reproducible.
pub fn entropy(seed: Option<u64>) -> Entropy {
    match seed {
        Some(seed) => {
            log::debug!("using seeded entropy ({seed})");
            Box::new(StdRng::seed_from_u64(seed))
        }
        None => Box::new(StdRng::from_entropy()),
    }
}

/// Uniform draw in `[0, 1)`.
pub fn unit(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform latency in `[low, high)` milliseconds.
pub fn latency(rng: &mut dyn RngCore, low_ms: u64, high_ms: u64) -> Duration {
    let span = high_ms.saturating_sub(low_ms) as f64;
    Duration::from_millis(low_ms + (unit(rng) * span) as u64)
}
