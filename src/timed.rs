//! Wall-clock timing of blocking computations, such as a tuning run.

use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// The outcome of a computation together with how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<V> {
    pub value: V,
    pub elapsed: Duration,
}
impl<V> Timed<V> {
    /// Runs `f`, timing it only if it succeeds.
    pub fn result<E>(f: impl FnOnce() -> Result<V, E>) -> Result<Timed<V>, E> {
        let started = Instant::now();
        let value = f()?;
        Ok(Timed {
            value,
            elapsed: started.elapsed(),
        })
    }

    pub fn into_value(self) -> V {
        self.value
    }
}
impl<V: Display> Display for Timed<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in {:.3}s", self.value, self.elapsed.as_secs_f64())
    }
}
