mod common;

use chrono::Utc;
use sqlx::PgPool;

use cinema_booking::error::ServiceError;
use cinema_booking::models::BookingStatus;

use common::{available_seats, seat_status_count, seed_screen, test_state, TICKET_PRICE};

#[sqlx::test(migrations = "./src/migrations")]
async fn booking_holds_seats_and_decrements_counter(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A", "B"], 5).await;

    let created = state
        .reservations
        .create_booking(7, screen.showtime_id, &screen.seat_ids[..3])
        .await
        .unwrap();

    assert!(created.booking_code.starts_with("BK"));
    assert_eq!(created.total_amount, TICKET_PRICE * 3.0);
    assert_eq!(available_seats(&pool, screen.showtime_id).await, 7);
    assert_eq!(seat_status_count(&pool, screen.showtime_id).await, 3);

    let booking = state.lifecycle.get_booking(created.booking_id).await.unwrap();
    assert_eq!(booking.booking_status, BookingStatus::Pending);
    assert_eq!(booking.user_id, 7);

    let deadlines: Vec<chrono::DateTime<Utc>> = sqlx::query_scalar(
        "SELECT reserved_until FROM seat_status WHERE booking_id = $1 AND status = 'reserved'",
    )
    .bind(created.booking_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(deadlines.len(), 3);
    for deadline in deadlines {
        let remaining = deadline - Utc::now();
        assert!(remaining > chrono::Duration::minutes(14));
        assert!(remaining <= chrono::Duration::minutes(15));
    }
}

#[sqlx::test(migrations = "./src/migrations")]
async fn full_showtime_rejects_further_bookings(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 2).await;

    state
        .reservations
        .create_booking(1, screen.showtime_id, &[screen.seat_ids[0]])
        .await
        .unwrap();
    state
        .reservations
        .create_booking(2, screen.showtime_id, &[screen.seat_ids[1]])
        .await
        .unwrap();
    assert_eq!(available_seats(&pool, screen.showtime_id).await, 0);

    for &seat_id in &screen.seat_ids {
        let err = state
            .reservations
            .create_booking(3, screen.showtime_id, &[seat_id])
            .await
            .unwrap_err();
        assert!(err.is_seat_conflict(), "unexpected error: {err:?}");
    }
    assert_eq!(available_seats(&pool, screen.showtime_id).await, 0);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn held_seat_is_unavailable_to_others(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 4).await;
    let (first, second) = (screen.seat_ids[0], screen.seat_ids[1]);

    state
        .reservations
        .create_booking(1, screen.showtime_id, &[first])
        .await
        .unwrap();

    let err = state
        .reservations
        .create_booking(2, screen.showtime_id, &[second, first])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::SeatUnavailable { seat_id } if seat_id == first));

    // The failed attempt left nothing behind.
    assert_eq!(available_seats(&pool, screen.showtime_id).await, 3);
    assert_eq!(seat_status_count(&pool, screen.showtime_id).await, 1);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn concurrent_requests_for_last_seat_have_one_winner(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 2).await;
    state
        .reservations
        .create_booking(1, screen.showtime_id, &[screen.seat_ids[0]])
        .await
        .unwrap();
    let last = screen.seat_ids[1];

    let attempts = (10..18).map(|user_id| {
        let engine = state.reservations.clone();
        let showtime_id = screen.showtime_id;
        tokio::spawn(async move { engine.create_booking(user_id, showtime_id, &[last]).await })
    });
    let results: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(result.is_seat_conflict(), "unexpected error: {result:?}");
    }
    assert_eq!(available_seats(&pool, screen.showtime_id).await, 0);
    assert_eq!(seat_status_count(&pool, screen.showtime_id).await, 2);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn concurrent_disjoint_bookings_all_succeed(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A", "B"], 4).await;

    let attempts = screen.seat_ids.chunks(2).enumerate().map(|(i, seats)| {
        let engine = state.reservations.clone();
        let showtime_id = screen.showtime_id;
        let seats = seats.to_vec();
        tokio::spawn(async move { engine.create_booking(i as i64 + 1, showtime_id, &seats).await })
    });
    for joined in futures::future::join_all(attempts).await {
        joined.unwrap().unwrap();
    }

    assert_eq!(available_seats(&pool, screen.showtime_id).await, 0);
    assert_eq!(seat_status_count(&pool, screen.showtime_id).await, 8);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn requesting_more_than_available_is_rejected(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 3).await;
    state
        .reservations
        .create_booking(1, screen.showtime_id, &[screen.seat_ids[0], screen.seat_ids[1]])
        .await
        .unwrap();

    let other_screen = seed_screen(&state, &["A"], 3).await;
    let err = state
        .reservations
        .create_booking(2, screen.showtime_id, &other_screen.seat_ids[..2])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::CapacityExceeded { requested: 2, available: 1 }
    ));
}

#[sqlx::test(migrations = "./src/migrations")]
async fn user_cannot_rebook_a_confirmed_seat(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 3).await;
    let seat = screen.seat_ids[0];

    let created = state
        .reservations
        .create_booking(5, screen.showtime_id, &[seat])
        .await
        .unwrap();
    state.lifecycle.confirm_payment(created.booking_id).await.unwrap();

    let err = state
        .reservations
        .create_booking(5, screen.showtime_id, &[screen.seat_ids[1], seat])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateConfirmedBooking { seat_id } if seat_id == seat));

    let err = state
        .reservations
        .create_booking(6, screen.showtime_id, &[seat])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::SeatUnavailable { seat_id } if seat_id == seat));
}

#[sqlx::test(migrations = "./src/migrations")]
async fn seats_must_belong_to_the_showtime_theater(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 2).await;
    let other = seed_screen(&state, &["A"], 2).await;

    let err = state
        .reservations
        .create_booking(1, screen.showtime_id, &[other.seat_ids[0]])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = state
        .reservations
        .create_booking(1, screen.showtime_id, &[i64::MAX])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(available_seats(&pool, screen.showtime_id).await, 2);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn malformed_requests_are_rejected(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 2).await;
    let seat = screen.seat_ids[0];

    for seats in [vec![], vec![seat, seat], vec![-1]] {
        let err = state
            .reservations
            .create_booking(1, screen.showtime_id, &seats)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)), "{seats:?}: {err:?}");
    }

    let err = state
        .reservations
        .create_booking(1, screen.showtime_id + 1000, &[seat])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "Showtime", .. }));
}

#[sqlx::test(migrations = "./src/migrations")]
async fn inactive_showtime_cannot_be_booked(pool: PgPool) {
    let state = test_state(pool.clone());
    let screen = seed_screen(&state, &["A"], 2).await;
    state.catalog.delete_showtime(screen.showtime_id).await.unwrap();

    let err = state
        .reservations
        .create_booking(1, screen.showtime_id, &[screen.seat_ids[0]])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}
