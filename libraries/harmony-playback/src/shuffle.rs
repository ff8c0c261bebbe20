//! Shuffled song selection
//!
//! Shuffle here is stateless: each skip draws a fresh random index. There is
//! no shuffled order and no history, so "previous" under shuffle is simply
//! another random song.

use rand::Rng;

/// Pick a random queue index, avoiding `current` when possible
///
/// Re-samples up to `max_attempts` times while the draw equals `current`;
/// once the budget is spent the last draw is accepted as-is, even if it is
/// the current index. Returns `None` for an empty queue and `Some(0)` for a
/// single-song queue.
pub fn pick_index<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    current: Option<usize>,
    max_attempts: usize,
) -> Option<usize> {
    match len {
        0 => None,
        1 => Some(0),
        _ => {
            let mut index = rng.gen_range(0..len);
            let mut attempts = 1;
            while Some(index) == current && attempts < max_attempts {
                index = rng.gen_range(0..len);
                attempts += 1;
            }
            Some(index)
        }
    }
}
