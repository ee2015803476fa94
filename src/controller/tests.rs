use std::time::Duration;

use tinyrand::{Seeded, StdRand};

use super::*;
use crate::generator::CouponGenerator;
use crate::testing::{draw, random_history};

const TICK: Duration = Duration::from_millis(1);

fn request(timeout: Duration, coupon_distance: usize, coupons_count: usize) -> GenerationRequest {
    GenerationRequest {
        timeout,
        coupon_distance,
        coupons_count,
    }
}

fn coupon(numbers: &[u8]) -> GeneratedCoupon {
    GeneratedCoupon::new(numbers.to_vec())
}

#[test]
fn validate_request() {
    let shape = DrawType::Lotto.shape();
    assert_eq!(Ok(()), request(Duration::from_secs(1), 6, 1).validate(&shape));
    assert_eq!(
        Err(ControllerError::ZeroTimeout),
        request(Duration::ZERO, 2, 1).validate(&shape)
    );
    assert_eq!(
        Err(ControllerError::ZeroCouponsCount),
        request(Duration::from_secs(1), 2, 0).validate(&shape)
    );
    assert_eq!(
        Err(ControllerError::CouponDistanceOutOfRange {
            distance: 7,
            numbers_count: 6
        }),
        request(Duration::from_secs(1), 7, 1).validate(&shape)
    );
}

#[test]
fn distance_zero_rejects_exact_repeats_only() {
    let mut filter = DistanceFilter::new(0);
    assert!(filter.offer(&coupon(&[1, 2, 3, 4, 5, 6])));
    assert!(!filter.offer(&coupon(&[6, 5, 4, 3, 2, 1])));
    assert!(filter.offer(&coupon(&[1, 2, 3, 4, 5, 7])));
    assert_eq!(2, filter.accepted());
}

#[test]
fn distance_rejects_near_duplicates_of_any_accepted() {
    let mut filter = DistanceFilter::new(2);
    assert!(filter.offer(&coupon(&[1, 2, 3, 4, 5, 6])));
    // two new numbers
    assert!(!filter.offer(&coupon(&[1, 2, 3, 4, 10, 11])));
    // three new numbers
    assert!(filter.offer(&coupon(&[1, 2, 3, 10, 11, 12])));
    // far from the first coupon but only two away from the second
    assert!(!filter.offer(&coupon(&[1, 2, 10, 11, 12, 13])));
    assert!(!filter.offer(&coupon(&[1, 2, 3, 10, 20, 21])));
    assert_eq!(2, filter.accepted());
}

#[test]
fn accepted_coupons_are_always_further_than_distance() {
    let generator = CouponGenerator::new(vec![(1..=12).collect(); 6], &[], 6);
    let mut rand = StdRand::seed(23);
    for distance in 0..=3 {
        let mut filter = DistanceFilter::new(distance);
        let mut accepted: Vec<GeneratedCoupon> = vec![];
        for _ in 0..2_000 {
            let candidate = generator.prepare_coupon(&mut rand).unwrap();
            if filter.offer(&candidate) {
                accepted.push(candidate);
            }
        }
        assert!(!accepted.is_empty());
        for (i, first) in accepted.iter().enumerate() {
            for second in &accepted[i + 1..] {
                let differing = second
                    .numbers()
                    .iter()
                    .filter(|number| !first.numbers().contains(number))
                    .count();
                if distance == 0 {
                    assert_ne!(first, second);
                } else {
                    assert!(differing > distance, "{first} vs {second} at distance {distance}");
                }
            }
        }
    }
}

#[tokio::test]
async fn end_to_end_lotto() {
    let history = random_history(&DrawType::Lotto.shape(), 200, 42);
    let controller = CouponController::new(DrawType::Lotto, history, ModelParams::default()).with_tick(TICK);
    let progress = controller.progress();
    let outcome = controller
        .generate(request(Duration::from_secs(10), 2, 10))
        .await
        .unwrap();

    match outcome.status {
        GenerationStatus::Completed => {
            assert_eq!(10, outcome.coupons.len());
            assert_eq!(1.0, *progress.borrow());
        }
        GenerationStatus::TimedOut => assert!(outcome.coupons.len() < 10),
        GenerationStatus::Cancelled => panic!("unexpected cancellation"),
    }
    for coupon in &outcome.coupons {
        assert_eq!(6, coupon.len());
        assert!(coupon.numbers().windows(2).all(|pair| pair[0] < pair[1]));
        assert!(coupon.numbers().iter().all(|&number| (1..=49).contains(&number)));
    }
}

#[tokio::test]
async fn never_emits_numbers_of_last_draw() {
    let excluded = [3, 11, 23, 27, 34, 41];
    let mut history = random_history(&DrawType::Lotto.shape(), 199, 8);
    history.push(draw(200, &excluded));
    let controller = CouponController::new(DrawType::Lotto, history, ModelParams::default()).with_tick(TICK);
    let outcome = controller
        .generate(request(Duration::from_secs(2), 0, 20))
        .await
        .unwrap();
    assert_ne!(GenerationStatus::Cancelled, outcome.status);
    for coupon in &outcome.coupons {
        assert!(coupon.numbers().iter().all(|number| !excluded.contains(number)));
    }
}

#[tokio::test]
async fn unavailable_models_end_the_run_early() {
    let history = random_history(&DrawType::Lotto.shape(), 5, 1);
    let controller = CouponController::new(DrawType::Lotto, history, ModelParams::default()).with_tick(TICK);
    let started = Instant::now();
    let outcome = controller
        .generate(request(Duration::from_secs(30), 2, 10))
        .await
        .unwrap();
    assert_eq!(GenerationStatus::TimedOut, outcome.status);
    assert!(outcome.coupons.is_empty());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn invalid_request_is_rejected() {
    let controller = CouponController::new(DrawType::MiniLotto, Vec::<DrawResult>::new(), ModelParams::default());
    assert_eq!(
        Err(ControllerError::ZeroCouponsCount),
        controller.generate(request(Duration::from_secs(1), 1, 0)).await
    );
}

#[tokio::test]
async fn cancellation_stops_the_run() {
    let history = random_history(&DrawType::Lotto.shape(), 200, 42);
    let controller = CouponController::new(DrawType::Lotto, history, ModelParams::default()).with_tick(TICK);
    let cancel = controller.cancel_handle();
    let progress = controller.progress();
    let started = Instant::now();
    // at the full distance every coupon after the first is rejected, so only cancellation ends it
    let (outcome, _) = tokio::join!(
        controller.generate(request(Duration::from_secs(30), 6, 10)),
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            cancel.cancel();
        }
    );
    let outcome = outcome.unwrap();
    assert_eq!(GenerationStatus::Cancelled, outcome.status);
    assert!(outcome.coupons.len() <= 1);
    assert_eq!(0.0, *progress.borrow());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn cancel_before_request_applies_to_it() {
    let history = random_history(&DrawType::Lotto.shape(), 200, 42);
    let controller = CouponController::new(DrawType::Lotto, history, ModelParams::default()).with_tick(TICK);
    controller.cancel_handle().cancel();
    let started = Instant::now();
    let outcome = controller
        .generate(request(Duration::from_secs(30), 6, 10))
        .await
        .unwrap();
    assert_eq!(GenerationStatus::Cancelled, outcome.status);
    assert!(outcome.coupons.is_empty());
    assert!(started.elapsed() < Duration::from_secs(10));

    // the signal is consumed by the cancelled request
    let outcome = controller
        .generate(request(Duration::from_millis(300), 6, 10))
        .await
        .unwrap();
    assert_eq!(GenerationStatus::TimedOut, outcome.status);
}
