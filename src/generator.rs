//! Random coupon generation from per-position eligible numbers.
//!
//! A [CouponGenerator] draws one number per position by rejection sampling. Spawned onto the
//! runtime, it becomes a tick loop that emits a coupon per tick over a bounded channel until it
//! is stopped or its receiver goes away. The stream is unbounded and may contain duplicates;
//! filtering and capping is up to the consumer.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tinyrand::{Rand, Seeded, StdRand};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::draw::GeneratedCoupon;
use crate::model::exclusion;

pub const DEFAULT_TICK: Duration = Duration::from_millis(50);
const BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponGenerator {
    eligible: Vec<Vec<u8>>,
    numbers_count: usize,
}
impl CouponGenerator {
    /// `eligible` holds one set of numbers per position; the `excluded` numbers are removed from
    /// every set up front.
    pub fn new(eligible: Vec<Vec<u8>>, excluded: &[u8], numbers_count: usize) -> Self {
        Self {
            eligible: exclusion::apply(eligible, excluded),
            numbers_count,
        }
    }

    pub fn eligible(&self) -> &[Vec<u8>] {
        &self.eligible
    }

    /// Draws a single coupon, re-drawing a position on collision with a number already chosen.
    /// Returns `None` if some position has no number left to choose from.
    pub fn prepare_coupon(&self, rand: &mut impl Rand) -> Option<GeneratedCoupon> {
        if self.eligible.len() < self.numbers_count {
            return None;
        }
        let mut coupon = Vec::with_capacity(self.numbers_count);
        for candidates in &self.eligible[..self.numbers_count] {
            if candidates.iter().all(|number| coupon.contains(number)) {
                return None;
            }
            loop {
                let number = candidates[rand.next_lim_u64(candidates.len() as u64) as usize];
                if !coupon.contains(&number) {
                    coupon.push(number);
                    break;
                }
            }
        }
        Some(GeneratedCoupon::new(coupon))
    }

    /// Spawns the tick loop, seeding the generator from the system clock.
    pub fn spawn(self, tick: Duration) -> GeneratorHandle {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        self.spawn_with(tick, StdRand::seed(seed))
    }

    pub fn spawn_with<R: Rand + Send + 'static>(self, tick: Duration, mut rand: R) -> GeneratorHandle {
        let (tx, rx) = mpsc::channel(BUFFER);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(coupon) = self.prepare_coupon(&mut rand) else {
                    trace!("abandoned coupon attempt: no eligible numbers left for some position");
                    continue;
                };
                match tx.try_send(coupon) {
                    Ok(()) => {}
                    Err(TrySendError::Full(coupon)) => {
                        trace!("dropped coupon {coupon}: consumer is behind");
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        });
        GeneratorHandle {
            coupons: rx,
            task,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Running,
    Stopped,
}

/// The consuming end of a spawned generator. Dropping the handle stops the generator.
#[derive(Debug)]
pub struct GeneratorHandle {
    coupons: mpsc::Receiver<GeneratedCoupon>,
    task: JoinHandle<()>,
}
impl GeneratorHandle {
    /// The next generated coupon, or `None` once the generator has stopped and every coupon
    /// already emitted has been received.
    pub async fn next(&mut self) -> Option<GeneratedCoupon> {
        self.coupons.recv().await
    }

    /// Halts the tick loop and discards any coupons not yet received.
    pub fn stop(&mut self) {
        self.task.abort();
        self.coupons.close();
        while self.coupons.try_recv().is_ok() {}
    }

    pub fn state(&self) -> GeneratorState {
        if self.task.is_finished() {
            GeneratorState::Stopped
        } else {
            GeneratorState::Running
        }
    }
}

impl Drop for GeneratorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lotto_positions() -> Vec<Vec<u8>> {
        vec![
            (1..=10).collect(),
            (5..=20).collect(),
            (15..=30).collect(),
            (20..=35).collect(),
            (30..=45).collect(),
            (40..=49).collect(),
        ]
    }

    #[test]
    fn prepared_coupons_are_well_formed() {
        let generator = CouponGenerator::new(lotto_positions(), &[], 6);
        let mut rand = StdRand::seed(17);
        for _ in 0..1_000 {
            let coupon = generator.prepare_coupon(&mut rand).unwrap();
            assert_eq!(6, coupon.len());
            assert!(coupon.numbers().windows(2).all(|pair| pair[0] < pair[1]));
            assert!(coupon.numbers().iter().all(|&number| (1..=49).contains(&number)));
        }
    }

    #[test]
    fn collisions_are_redrawn() {
        // every position shares the same small pool, so collisions are frequent
        let generator = CouponGenerator::new(vec![vec![1, 2, 3]; 3], &[], 3);
        let mut rand = StdRand::seed(5);
        for _ in 0..100 {
            let coupon = generator.prepare_coupon(&mut rand).unwrap();
            assert_eq!(vec![1, 2, 3], coupon.numbers().to_vec());
        }
    }

    #[test]
    fn empty_position_abandons_attempt() {
        let generator = CouponGenerator::new(vec![vec![1, 2], vec![], vec![3]], &[], 3);
        assert_eq!(None, generator.prepare_coupon(&mut StdRand::seed(1)));
    }

    #[test]
    fn exhausted_position_abandons_attempt() {
        let generator = CouponGenerator::new(vec![vec![4], vec![4], vec![1, 2]], &[], 3);
        assert_eq!(None, generator.prepare_coupon(&mut StdRand::seed(1)));
    }

    #[test]
    fn too_few_positions_abandons_attempt() {
        let generator = CouponGenerator::new(vec![vec![1, 2]], &[], 2);
        assert_eq!(None, generator.prepare_coupon(&mut StdRand::seed(1)));
    }

    #[test]
    fn excluded_numbers_never_appear() {
        let excluded = [3, 11, 23, 27, 34, 41];
        let generator = CouponGenerator::new(lotto_positions(), &excluded, 6);
        assert!(generator
            .eligible()
            .iter()
            .all(|numbers| numbers.iter().all(|number| !excluded.contains(number))));
        let mut rand = StdRand::seed(99);
        for _ in 0..1_000 {
            let coupon = generator.prepare_coupon(&mut rand).unwrap();
            assert!(coupon.numbers().iter().all(|number| !excluded.contains(number)));
        }
    }

    #[tokio::test]
    async fn spawned_generator_emits_until_stopped() {
        let generator = CouponGenerator::new(lotto_positions(), &[], 6);
        let mut handle = generator.spawn_with(Duration::from_millis(1), StdRand::seed(3));
        for _ in 0..10 {
            let coupon = handle.next().await.unwrap();
            assert_eq!(6, coupon.len());
        }
        assert_eq!(GeneratorState::Running, handle.state());

        handle.stop();
        assert_eq!(None, handle.next().await);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(GeneratorState::Stopped, handle.state());
    }

    #[tokio::test]
    async fn generator_with_empty_position_emits_nothing() {
        let generator = CouponGenerator::new(vec![vec![1, 2], vec![], vec![3]], &[], 3);
        let mut handle = generator.spawn_with(Duration::from_millis(1), StdRand::seed(3));
        let next = tokio::time::timeout(Duration::from_millis(50), handle.next()).await;
        assert!(next.is_err());
    }
}
