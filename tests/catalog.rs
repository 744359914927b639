mod common;

use sqlx::PgPool;

use cinema_booking::error::ServiceError;
use cinema_booking::models::catalog::{
    CreateMovieRequest, MovieFilter, TheaterFilter, UpdateMovieRequest, UpdateTheaterRequest,
};
use cinema_booking::models::seat::{
    BulkCreateSeatsRequest, CreateSeatRequest, SeatFilter, UpdateSeatRequest,
};
use cinema_booking::models::showtime::{CreateShowtimeRequest, ShowtimeFilter};

use common::{seed_screen, test_state};

fn movie(title: &str, genre: &str) -> CreateMovieRequest {
    CreateMovieRequest {
        title: title.to_string(),
        description: None,
        duration_minutes: 95,
        genre: Some(genre.to_string()),
        language: None,
        subtitle: None,
        poster_url: None,
        release_date: None,
    }
}

#[sqlx::test(migrations = "./src/migrations")]
async fn movies_partial_update_and_soft_delete(pool: PgPool) {
    let state = test_state(pool);
    let catalog = &state.catalog;

    let heat = catalog.create_movie(movie("Heat", "Crime")).await.unwrap();
    catalog.create_movie(movie("Up", "Animation")).await.unwrap();

    let updated = catalog
        .update_movie(
            heat.movie_id,
            UpdateMovieRequest {
                duration_minutes: Some(170),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Heat");
    assert_eq!(updated.duration_minutes, 170);
    assert_eq!(updated.genre.as_deref(), Some("Crime"));

    catalog.delete_movie(heat.movie_id).await.unwrap();
    assert!(!catalog.get_movie(heat.movie_id).await.unwrap().is_active);

    let active = catalog
        .list_movies(&MovieFilter {
            is_active: Some(true),
            genre: None,
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "Up");

    assert_eq!(catalog.list_movies(&MovieFilter::default()).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn invalid_movie_is_rejected(pool: PgPool) {
    let state = test_state(pool);
    let mut req = movie("", "Drama");
    req.duration_minutes = 0;
    let err = state.catalog.create_movie(req).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = state
        .catalog
        .update_movie(404, UpdateMovieRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "Movie", .. }));
}

#[sqlx::test(migrations = "./src/migrations")]
async fn bulk_seats_skip_existing_positions(pool: PgPool) {
    let state = test_state(pool);
    let screen = seed_screen(&state, &["A"], 3).await;

    let result = state
        .catalog
        .bulk_create_seats(BulkCreateSeatsRequest {
            theater_id: screen.theater_id,
            rows: vec!["a".into(), "B".into()],
            seats_per_row: 4,
            seat_type: Some("vip".into()),
        })
        .await
        .unwrap();
    assert_eq!(result.total, 8);
    assert_eq!(result.created, 5);
    assert_eq!(result.skipped, 3);

    let seats = state
        .catalog
        .list_seats(&SeatFilter {
            theater_id: Some(screen.theater_id),
            is_active: None,
        })
        .await
        .unwrap();
    assert_eq!(seats.len(), 8);
    assert_eq!(seats[0].seat_type, "standard");
    assert_eq!(seats[3].seat_type, "vip");
}

#[sqlx::test(migrations = "./src/migrations")]
async fn duplicate_seat_is_a_conflict(pool: PgPool) {
    let state = test_state(pool);
    let screen = seed_screen(&state, &["A"], 2).await;

    let err = state
        .catalog
        .create_seat(CreateSeatRequest {
            theater_id: screen.theater_id,
            seat_row: "A".into(),
            seat_number: 1,
            seat_type: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let seat = state
        .catalog
        .create_seat(CreateSeatRequest {
            theater_id: screen.theater_id,
            seat_row: "A".into(),
            seat_number: 3,
            seat_type: None,
        })
        .await
        .unwrap();
    assert_eq!(seat.seat_type, "standard");
}

#[sqlx::test(migrations = "./src/migrations")]
async fn seat_listing_requires_a_theater(pool: PgPool) {
    let state = test_state(pool);
    let err = state.catalog.list_seats(&SeatFilter::default()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[sqlx::test(migrations = "./src/migrations")]
async fn showtime_starts_with_full_theater(pool: PgPool) {
    let state = test_state(pool);
    let screen = seed_screen(&state, &["A", "B", "C"], 5).await;

    let showtime = state.catalog.get_showtime(screen.showtime_id).await.unwrap();
    assert_eq!(showtime.available_seats, 15);
    assert_eq!(showtime.cinema_id, screen.cinema_id);

    let listed = state
        .catalog
        .list_showtimes(&ShowtimeFilter {
            movie_id: Some(screen.movie_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].showtime_id, screen.showtime_id);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn showtime_needs_existing_movie_and_theater(pool: PgPool) {
    let state = test_state(pool);
    let screen = seed_screen(&state, &["A"], 1).await;

    let err = state
        .catalog
        .create_showtime(CreateShowtimeRequest {
            movie_id: screen.movie_id,
            theater_id: 9999,
            show_date: chrono::NaiveDate::from_ymd_opt(2030, 2, 1).unwrap(),
            show_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            price: 50.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "Theater", .. }));
}

#[sqlx::test(migrations = "./src/migrations")]
async fn theaters_filter_by_cinema(pool: PgPool) {
    let state = test_state(pool);
    let first = seed_screen(&state, &["A"], 1).await;
    seed_screen(&state, &["A"], 1).await;

    let theaters = state
        .catalog
        .list_theaters(&TheaterFilter {
            cinema_id: Some(first.cinema_id),
            is_active: None,
        })
        .await
        .unwrap();
    assert_eq!(theaters.len(), 1);

    let renamed = state
        .catalog
        .update_theater(
            first.theater_id,
            UpdateTheaterRequest {
                theater_name: Some("IMAX".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.theater_name, "IMAX");
    assert_eq!(renamed.total_seats, 1);
}

#[sqlx::test(migrations = "./src/migrations")]
async fn deactivated_seat_leaves_the_seat_map(pool: PgPool) {
    let state = test_state(pool);
    let screen = seed_screen(&state, &["A"], 3).await;
    seed_screen(&state, &["A"], 1).await;
    let late_show = state
        .catalog
        .create_showtime(CreateShowtimeRequest {
            movie_id: screen.movie_id,
            theater_id: screen.theater_id,
            show_date: chrono::NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            show_time: chrono::NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            price: 70.0,
        })
        .await
        .unwrap();

    let ids = state.catalog.theater_showtime_ids(screen.theater_id).await.unwrap();
    assert_eq!(ids, [screen.showtime_id, late_show.showtime_id]);

    assert_eq!(state.views.seat_map(screen.showtime_id).await.unwrap().len(), 3);
    state.catalog.delete_seat(screen.seat_ids[1]).await.unwrap();
    state
        .catalog
        .update_seat(
            screen.seat_ids[2],
            UpdateSeatRequest {
                seat_type: Some("vip".into()),
                is_active: None,
            },
        )
        .await
        .unwrap();

    for showtime_id in ids {
        let map = state.views.seat_map(showtime_id).await.unwrap();
        let seat_ids: Vec<i64> = map.iter().map(|s| s.seat_id).collect();
        assert_eq!(seat_ids, [screen.seat_ids[0], screen.seat_ids[2]]);
        assert_eq!(map[1].seat_type, "vip");
    }

    let err = state.catalog.delete_seat(9999).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "Seat", .. }));
}
