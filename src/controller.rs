//! Orchestration of a single coupon generation request.
//!
//! The controller takes a snapshot of the history, runs the three supporting models on blocking
//! workers, then drives a [CouponGenerator] and filters its output by friendliness and distance
//! until the requested number of coupons is accepted, the deadline passes or the request is
//! cancelled.

use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::spawn_blocking;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::draw::{DrawResult, DrawShape, DrawType, GeneratedCoupon};
use crate::generator::{CouponGenerator, DEFAULT_TICK};
use crate::model::age_per_position::AgesPerPositionModel;
use crate::model::best_friends::BestFriendsModel;
use crate::model::exclusion::ExclusionModel;
use crate::model::ModelParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub timeout: Duration,
    pub coupon_distance: usize,
    pub coupons_count: usize,
}
impl GenerationRequest {
    pub fn validate(&self, shape: &DrawShape) -> Result<(), ControllerError> {
        if self.timeout.is_zero() {
            return Err(ControllerError::ZeroTimeout);
        }
        if self.coupons_count == 0 {
            return Err(ControllerError::ZeroCouponsCount);
        }
        if self.coupon_distance > shape.numbers_count {
            return Err(ControllerError::CouponDistanceOutOfRange {
                distance: self.coupon_distance,
                numbers_count: shape.numbers_count,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("timeout must be positive")]
    ZeroTimeout,

    #[error("at least one coupon must be requested")]
    ZeroCouponsCount,

    #[error("coupon distance {distance} exceeds the {numbers_count} numbers of a coupon")]
    CouponDistanceOutOfRange { distance: usize, numbers_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum GenerationStatus {
    Completed,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub coupons: Vec<GeneratedCoupon>,
    pub status: GenerationStatus,
}
impl GenerationOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == GenerationStatus::Completed
    }
}

/// Remembers every accepted coupon and rejects candidates too close to any of them.
///
/// With a distance of zero only exact repeats are rejected. Otherwise a candidate `S` is rejected
/// if some accepted `T` leaves `|S − T| ≤ distance`.
#[derive(Debug, Default)]
pub struct DistanceFilter {
    distance: usize,
    accepted: Vec<FxHashSet<u8>>,
}
impl DistanceFilter {
    pub fn new(distance: usize) -> Self {
        Self {
            distance,
            accepted: vec![],
        }
    }

    /// Accepts the coupon if it is far enough from every coupon accepted before it.
    pub fn offer(&mut self, coupon: &GeneratedCoupon) -> bool {
        let candidate: FxHashSet<u8> = coupon.numbers().iter().copied().collect();
        let rejected = self.accepted.iter().any(|accepted| {
            if self.distance == 0 {
                *accepted == candidate
            } else {
                candidate.difference(accepted).count() <= self.distance
            }
        });
        if !rejected {
            self.accepted.push(candidate);
        }
        !rejected
    }

    pub fn accepted(&self) -> usize {
        self.accepted.len()
    }
}

/// Signals cancellation to whichever request the owning controller is running.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);
impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

struct Models {
    eligible: Vec<Vec<u8>>,
    excluded: Vec<u8>,
    best_friends: BestFriendsModel,
}

#[derive(Debug)]
pub struct CouponController {
    draw_type: DrawType,
    history: Arc<[DrawResult]>,
    params: ModelParams,
    tick: Duration,
    progress: watch::Sender<f64>,
    cancel: Arc<watch::Sender<bool>>,
}
impl CouponController {
    pub fn new(draw_type: DrawType, history: impl Into<Arc<[DrawResult]>>, params: ModelParams) -> Self {
        Self {
            draw_type,
            history: history.into(),
            params,
            tick: DEFAULT_TICK,
            progress: watch::channel(0.0).0,
            cancel: Arc::new(watch::channel(false).0),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn draw_type(&self) -> DrawType {
        self.draw_type
    }

    /// Replaces the history snapshot used by subsequent requests.
    pub fn update_history(&mut self, history: impl Into<Arc<[DrawResult]>>) {
        self.history = history.into();
    }

    /// Fraction of the requested coupons accepted so far by the current or most recent request.
    pub fn progress(&self) -> watch::Receiver<f64> {
        self.progress.subscribe()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel.clone())
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome, ControllerError> {
        let shape = self.draw_type.shape();
        request.validate(&shape)?;
        let deadline = Instant::now() + request.timeout;
        self.progress.send_replace(0.0);
        let mut cancel = self.cancel.subscribe();

        let models = tokio::select! {
            _ = cancelled(&mut cancel) => {
                return Ok(self.finish(vec![], GenerationStatus::Cancelled));
            }
            models = tokio::time::timeout_at(deadline, self.run_models(shape)) => models,
        };
        let models = match models {
            Ok(Some(models)) => models,
            Ok(None) => {
                warn!("supporting models are unavailable for this history");
                return Ok(self.finish(vec![], GenerationStatus::TimedOut));
            }
            Err(_) => {
                warn!("supporting models did not complete within {:?}", request.timeout);
                return Ok(self.finish(vec![], GenerationStatus::TimedOut));
            }
        };

        let Models {
            eligible,
            excluded,
            best_friends,
        } = models;
        let mut generator = CouponGenerator::new(eligible, &excluded, shape.numbers_count).spawn(self.tick);
        let mut filter = DistanceFilter::new(request.coupon_distance);
        let mut coupons = Vec::with_capacity(request.coupons_count);
        let status = loop {
            tokio::select! {
                _ = cancelled(&mut cancel) => break GenerationStatus::Cancelled,
                _ = tokio::time::sleep_until(deadline) => break GenerationStatus::TimedOut,
                coupon = generator.next() => {
                    let Some(coupon) = coupon else {
                        break GenerationStatus::TimedOut;
                    };
                    if !best_friends.is_result_in_scope(coupon.numbers()) {
                        trace!("{coupon} is out of friendliness scope");
                        continue;
                    }
                    if !filter.offer(&coupon) {
                        trace!("{coupon} is too close to an accepted coupon");
                        continue;
                    }
                    debug!("accepted {coupon}");
                    coupons.push(coupon);
                    self.progress
                        .send_replace(coupons.len() as f64 / request.coupons_count as f64);
                    if coupons.len() == request.coupons_count {
                        break GenerationStatus::Completed;
                    }
                }
            }
        };
        generator.stop();
        Ok(self.finish(coupons, status))
    }

    /// Runs the three supporting models concurrently over the current snapshot. Returns `None`
    /// if any of them finishes without a result.
    async fn run_models(&self, shape: DrawShape) -> Option<Models> {
        let params = self.params;
        let (history_ages, history_exclusion, history_friends) =
            (self.history.clone(), self.history.clone(), self.history.clone());
        let (eligible, excluded, best_friends) = tokio::join!(
            spawn_blocking(move || AgesPerPositionModel::new(shape, params).run(&history_ages)),
            spawn_blocking(move || ExclusionModel::new(shape).run(&history_exclusion)),
            spawn_blocking(move || BestFriendsModel::run(shape, &history_friends)),
        );
        let (eligible, excluded, best_friends) = match (eligible, excluded, best_friends) {
            (Ok(eligible), Ok(excluded), Ok(best_friends)) => (eligible, excluded, best_friends),
            _ => {
                warn!("a supporting model task failed");
                return None;
            }
        };
        Some(Models {
            eligible: eligible?,
            excluded,
            best_friends: best_friends?,
        })
    }

    /// Ends a request. A cancellation signalled before this point is consumed here, so one
    /// issued before a request starts still applies to it.
    fn finish(&self, coupons: Vec<GeneratedCoupon>, status: GenerationStatus) -> GenerationOutcome {
        self.cancel.send_replace(false);
        match status {
            GenerationStatus::Completed => info!("generated {} coupons", coupons.len()),
            GenerationStatus::TimedOut => warn!("timed out with {} coupons", coupons.len()),
            GenerationStatus::Cancelled => {
                self.progress.send_replace(0.0);
                info!("cancelled with {} coupons", coupons.len());
            }
        }
        GenerationOutcome { coupons, status }
    }
}

/// Resolves once cancellation is signalled. Never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|&cancelled| cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests;
