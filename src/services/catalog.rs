//! Admin-managed catalog: movies, cinemas, theaters, showtimes and seats.
//!
//! Deletes are soft (`is_active = false`); partial updates keep any field the
//! request leaves out.

use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::cache::CacheService;
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::catalog::{
    CinemaFilter, CreateCinemaRequest, CreateMovieRequest, CreateTheaterRequest, MovieFilter,
    TheaterFilter, UpdateCinemaRequest, UpdateMovieRequest, UpdateTheaterRequest,
};
use crate::models::seat::{
    BulkCreateSeatsRequest, BulkCreateSeatsResult, CreateSeatRequest, SeatFilter,
    UpdateSeatRequest, DEFAULT_SEAT_TYPE,
};
use crate::models::showtime::{CreateShowtimeRequest, ShowtimeFilter, UpdateShowtimeRequest};
use crate::models::{Cinema, Movie, Seat, Showtime, ShowtimeDetails, Theater};

const MOVIE_COLUMNS: &str = "movie_id, title, description, duration_minutes, genre, language, \
     subtitle, poster_url, release_date, is_active, created_at, updated_at";
const CINEMA_COLUMNS: &str = "cinema_id, cinema_name, address, city, is_active, created_at, updated_at";
const THEATER_COLUMNS: &str = "theater_id, cinema_id, theater_name, total_seats, theater_type, \
     is_active, created_at, updated_at";
const SHOWTIME_COLUMNS: &str = "showtime_id, movie_id, theater_id, show_date, show_time, end_time, \
     price, available_seats, is_active, created_at, updated_at";
const SEAT_COLUMNS: &str = "seat_id, theater_id, seat_row, seat_number, seat_type, is_active, created_at";

const SHOWTIME_DETAILS_SELECT: &str = "
    SELECT st.showtime_id, st.movie_id, m.title AS movie_title,
           st.theater_id, t.theater_name, t.cinema_id, c.cinema_name,
           st.show_date, st.show_time, st.end_time, st.price, st.available_seats,
           st.is_active, st.created_at, st.updated_at
    FROM showtimes st
    JOIN movies m ON m.movie_id = st.movie_id
    JOIN theaters t ON t.theater_id = st.theater_id
    JOIN cinemas c ON c.cinema_id = t.cinema_id";

pub(crate) async fn load_movies(pool: &PgPool, filter: &MovieFilter) -> ServiceResult<Vec<Movie>> {
    let movies = sqlx::query_as::<_, Movie>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies
         WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
           AND ($2::TEXT IS NULL OR genre = $2)
         ORDER BY title, movie_id"
    ))
    .bind(filter.is_active)
    .bind(filter.genre.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(movies)
}

fn normalize_row(row: &str) -> ServiceResult<String> {
    let row = row.trim().to_uppercase();
    if row.is_empty() || row.len() > 5 {
        return Err(ServiceError::Validation(format!(
            "Seat row '{row}' must be 1 to 5 characters"
        )));
    }
    Ok(row)
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    cache: CacheService,
}

impl CatalogService {
    pub fn new(db: Database, cache: CacheService) -> Self {
        Self { db, cache }
    }

    fn pool(&self) -> &PgPool {
        &self.db.pool
    }

    // ---------- movies ----------

    pub async fn list_movies(&self, filter: &MovieFilter) -> ServiceResult<Vec<Movie>> {
        if filter.is_empty() {
            return self.cache.movies().await;
        }
        load_movies(self.pool(), filter).await
    }

    pub async fn get_movie(&self, movie_id: i64) -> ServiceResult<Movie> {
        sqlx::query_as::<_, Movie>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE movie_id = $1"))
            .bind(movie_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| ServiceError::not_found("Movie", movie_id))
    }

    pub async fn create_movie(&self, req: CreateMovieRequest) -> ServiceResult<Movie> {
        req.validate()?;

        let movie = sqlx::query_as::<_, Movie>(&format!(
            "INSERT INTO movies
                 (title, description, duration_minutes, genre, language, subtitle, poster_url, release_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.duration_minutes)
        .bind(&req.genre)
        .bind(&req.language)
        .bind(&req.subtitle)
        .bind(&req.poster_url)
        .bind(req.release_date)
        .fetch_one(self.pool())
        .await?;

        self.cache.invalidate_movies().await;
        info!(movie_id = movie.movie_id, title = %movie.title, "Movie created");
        Ok(movie)
    }

    pub async fn update_movie(&self, movie_id: i64, req: UpdateMovieRequest) -> ServiceResult<Movie> {
        req.validate()?;

        let movie = sqlx::query_as::<_, Movie>(&format!(
            "UPDATE movies SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 duration_minutes = COALESCE($4, duration_minutes),
                 genre = COALESCE($5, genre),
                 language = COALESCE($6, language),
                 subtitle = COALESCE($7, subtitle),
                 poster_url = COALESCE($8, poster_url),
                 release_date = COALESCE($9, release_date),
                 is_active = COALESCE($10, is_active),
                 updated_at = NOW()
             WHERE movie_id = $1
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(movie_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.duration_minutes)
        .bind(&req.genre)
        .bind(&req.language)
        .bind(&req.subtitle)
        .bind(&req.poster_url)
        .bind(req.release_date)
        .bind(req.is_active)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Movie", movie_id))?;

        self.cache.invalidate_movies().await;
        Ok(movie)
    }

    pub async fn delete_movie(&self, movie_id: i64) -> ServiceResult<()> {
        self.deactivate("movies", "movie_id", "Movie", movie_id).await?;
        self.cache.invalidate_movies().await;
        Ok(())
    }

    // ---------- cinemas ----------

    pub async fn list_cinemas(&self, filter: &CinemaFilter) -> ServiceResult<Vec<Cinema>> {
        let cinemas = sqlx::query_as::<_, Cinema>(&format!(
            "SELECT {CINEMA_COLUMNS} FROM cinemas
             WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
             ORDER BY cinema_name, cinema_id"
        ))
        .bind(filter.is_active)
        .fetch_all(self.pool())
        .await?;

        Ok(cinemas)
    }

    pub async fn get_cinema(&self, cinema_id: i64) -> ServiceResult<Cinema> {
        sqlx::query_as::<_, Cinema>(&format!("SELECT {CINEMA_COLUMNS} FROM cinemas WHERE cinema_id = $1"))
            .bind(cinema_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| ServiceError::not_found("Cinema", cinema_id))
    }

    pub async fn create_cinema(&self, req: CreateCinemaRequest) -> ServiceResult<Cinema> {
        req.validate()?;

        let cinema = sqlx::query_as::<_, Cinema>(&format!(
            "INSERT INTO cinemas (cinema_name, address, city)
             VALUES ($1, $2, $3)
             RETURNING {CINEMA_COLUMNS}"
        ))
        .bind(&req.cinema_name)
        .bind(&req.address)
        .bind(&req.city)
        .fetch_one(self.pool())
        .await?;

        info!(cinema_id = cinema.cinema_id, "Cinema created");
        Ok(cinema)
    }

    pub async fn update_cinema(&self, cinema_id: i64, req: UpdateCinemaRequest) -> ServiceResult<Cinema> {
        req.validate()?;

        sqlx::query_as::<_, Cinema>(&format!(
            "UPDATE cinemas SET
                 cinema_name = COALESCE($2, cinema_name),
                 address = COALESCE($3, address),
                 city = COALESCE($4, city),
                 is_active = COALESCE($5, is_active),
                 updated_at = NOW()
             WHERE cinema_id = $1
             RETURNING {CINEMA_COLUMNS}"
        ))
        .bind(cinema_id)
        .bind(&req.cinema_name)
        .bind(&req.address)
        .bind(&req.city)
        .bind(req.is_active)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Cinema", cinema_id))
    }

    pub async fn delete_cinema(&self, cinema_id: i64) -> ServiceResult<()> {
        self.deactivate("cinemas", "cinema_id", "Cinema", cinema_id).await
    }

    // ---------- theaters ----------

    pub async fn list_theaters(&self, filter: &TheaterFilter) -> ServiceResult<Vec<Theater>> {
        let theaters = sqlx::query_as::<_, Theater>(&format!(
            "SELECT {THEATER_COLUMNS} FROM theaters
             WHERE ($1::BIGINT IS NULL OR cinema_id = $1)
               AND ($2::BOOLEAN IS NULL OR is_active = $2)
             ORDER BY cinema_id, theater_name, theater_id"
        ))
        .bind(filter.cinema_id)
        .bind(filter.is_active)
        .fetch_all(self.pool())
        .await?;

        Ok(theaters)
    }

    pub async fn get_theater(&self, theater_id: i64) -> ServiceResult<Theater> {
        sqlx::query_as::<_, Theater>(&format!(
            "SELECT {THEATER_COLUMNS} FROM theaters WHERE theater_id = $1"
        ))
        .bind(theater_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Theater", theater_id))
    }

    pub async fn create_theater(&self, req: CreateTheaterRequest) -> ServiceResult<Theater> {
        req.validate()?;
        self.get_cinema(req.cinema_id).await?;

        let theater = sqlx::query_as::<_, Theater>(&format!(
            "INSERT INTO theaters (cinema_id, theater_name, total_seats, theater_type)
             VALUES ($1, $2, $3, $4)
             RETURNING {THEATER_COLUMNS}"
        ))
        .bind(req.cinema_id)
        .bind(&req.theater_name)
        .bind(req.total_seats)
        .bind(&req.theater_type)
        .fetch_one(self.pool())
        .await?;

        info!(theater_id = theater.theater_id, cinema_id = theater.cinema_id, "Theater created");
        Ok(theater)
    }

    /// `total_seats` is fixed at creation: existing showtimes derive their
    /// counters from it.
    pub async fn update_theater(&self, theater_id: i64, req: UpdateTheaterRequest) -> ServiceResult<Theater> {
        req.validate()?;

        sqlx::query_as::<_, Theater>(&format!(
            "UPDATE theaters SET
                 theater_name = COALESCE($2, theater_name),
                 theater_type = COALESCE($3, theater_type),
                 is_active = COALESCE($4, is_active),
                 updated_at = NOW()
             WHERE theater_id = $1
             RETURNING {THEATER_COLUMNS}"
        ))
        .bind(theater_id)
        .bind(&req.theater_name)
        .bind(&req.theater_type)
        .bind(req.is_active)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Theater", theater_id))
    }

    pub async fn delete_theater(&self, theater_id: i64) -> ServiceResult<()> {
        self.deactivate("theaters", "theater_id", "Theater", theater_id).await
    }

    // ---------- showtimes ----------

    pub async fn list_showtimes(&self, filter: &ShowtimeFilter) -> ServiceResult<Vec<ShowtimeDetails>> {
        let showtimes = sqlx::query_as::<_, ShowtimeDetails>(&format!(
            "{SHOWTIME_DETAILS_SELECT}
             WHERE ($1::BIGINT IS NULL OR st.movie_id = $1)
               AND ($2::BIGINT IS NULL OR st.theater_id = $2)
               AND ($3::DATE IS NULL OR st.show_date = $3)
               AND ($4::BOOLEAN IS NULL OR st.is_active = $4)
             ORDER BY st.show_date, st.show_time, st.showtime_id"
        ))
        .bind(filter.movie_id)
        .bind(filter.theater_id)
        .bind(filter.show_date)
        .bind(filter.is_active)
        .fetch_all(self.pool())
        .await?;

        Ok(showtimes)
    }

    pub async fn get_showtime(&self, showtime_id: i64) -> ServiceResult<ShowtimeDetails> {
        sqlx::query_as::<_, ShowtimeDetails>(&format!(
            "{SHOWTIME_DETAILS_SELECT} WHERE st.showtime_id = $1"
        ))
        .bind(showtime_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Showtime", showtime_id))
    }

    /// New showtimes start with every seat of the theater available.
    pub async fn create_showtime(&self, req: CreateShowtimeRequest) -> ServiceResult<Showtime> {
        req.validate()?;
        self.get_movie(req.movie_id).await?;
        let theater = self.get_theater(req.theater_id).await?;

        let showtime = sqlx::query_as::<_, Showtime>(&format!(
            "INSERT INTO showtimes
                 (movie_id, theater_id, show_date, show_time, end_time, price, available_seats)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {SHOWTIME_COLUMNS}"
        ))
        .bind(req.movie_id)
        .bind(req.theater_id)
        .bind(req.show_date)
        .bind(req.show_time)
        .bind(req.end_time)
        .bind(req.price)
        .bind(theater.total_seats)
        .fetch_one(self.pool())
        .await?;

        info!(showtime_id = showtime.showtime_id, theater_id = showtime.theater_id, "Showtime created");
        Ok(showtime)
    }

    pub async fn update_showtime(&self, showtime_id: i64, req: UpdateShowtimeRequest) -> ServiceResult<Showtime> {
        req.validate()?;

        let showtime = sqlx::query_as::<_, Showtime>(&format!(
            "UPDATE showtimes SET
                 show_date = COALESCE($2, show_date),
                 show_time = COALESCE($3, show_time),
                 end_time = COALESCE($4, end_time),
                 price = COALESCE($5, price),
                 is_active = COALESCE($6, is_active),
                 updated_at = NOW()
             WHERE showtime_id = $1
             RETURNING {SHOWTIME_COLUMNS}"
        ))
        .bind(showtime_id)
        .bind(req.show_date)
        .bind(req.show_time)
        .bind(req.end_time)
        .bind(req.price)
        .bind(req.is_active)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Showtime", showtime_id))?;

        self.cache.invalidate_seat_map(showtime_id).await;
        Ok(showtime)
    }

    pub async fn delete_showtime(&self, showtime_id: i64) -> ServiceResult<()> {
        self.deactivate("showtimes", "showtime_id", "Showtime", showtime_id).await?;
        self.cache.invalidate_seat_map(showtime_id).await;
        Ok(())
    }

    // ---------- seats ----------

    pub async fn list_seats(&self, filter: &SeatFilter) -> ServiceResult<Vec<Seat>> {
        let theater_id = filter
            .theater_id
            .ok_or_else(|| ServiceError::Validation("theater_id is required".into()))?;

        let seats = sqlx::query_as::<_, Seat>(&format!(
            "SELECT {SEAT_COLUMNS} FROM seats
             WHERE theater_id = $1
               AND ($2::BOOLEAN IS NULL OR is_active = $2)
             ORDER BY seat_row, seat_number"
        ))
        .bind(theater_id)
        .bind(filter.is_active)
        .fetch_all(self.pool())
        .await?;

        Ok(seats)
    }

    pub async fn get_seat(&self, seat_id: i64) -> ServiceResult<Seat> {
        sqlx::query_as::<_, Seat>(&format!("SELECT {SEAT_COLUMNS} FROM seats WHERE seat_id = $1"))
            .bind(seat_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| ServiceError::not_found("Seat", seat_id))
    }

    pub async fn create_seat(&self, req: CreateSeatRequest) -> ServiceResult<Seat> {
        req.validate()?;
        self.get_theater(req.theater_id).await?;
        let row = normalize_row(&req.seat_row)?;

        sqlx::query_as::<_, Seat>(&format!(
            "INSERT INTO seats (theater_id, seat_row, seat_number, seat_type)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_seats_position DO NOTHING
             RETURNING {SEAT_COLUMNS}"
        ))
        .bind(req.theater_id)
        .bind(&row)
        .bind(req.seat_number)
        .bind(req.seat_type.as_deref().unwrap_or(DEFAULT_SEAT_TYPE))
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| {
            ServiceError::Conflict(format!(
                "Seat {row}{} already exists in theater {}",
                req.seat_number, req.theater_id
            ))
        })
    }

    /// Creates `seats_per_row` seats in each row, skipping positions that
    /// already exist. All or nothing.
    pub async fn bulk_create_seats(&self, req: BulkCreateSeatsRequest) -> ServiceResult<BulkCreateSeatsResult> {
        req.validate()?;
        self.get_theater(req.theater_id).await?;

        let rows = req
            .rows
            .iter()
            .map(|row| normalize_row(row))
            .collect::<ServiceResult<Vec<_>>>()?;

        let mut tx = self.db.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO seats (theater_id, seat_row, seat_number, seat_type)
             SELECT $1, r.seat_row, n.seat_number, $2
             FROM unnest($3::TEXT[]) AS r(seat_row)
             CROSS JOIN generate_series(1, $4) AS n(seat_number)
             ON CONFLICT ON CONSTRAINT uq_seats_position DO NOTHING",
        )
        .bind(req.theater_id)
        .bind(req.seat_type.as_deref().unwrap_or(DEFAULT_SEAT_TYPE))
        .bind(&rows)
        .bind(req.seats_per_row)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;

        // Duplicate row labels in the request collapse onto the same positions.
        let mut distinct = rows.clone();
        distinct.sort();
        distinct.dedup();
        let total = u32::try_from(distinct.len() as u64 * u64::from(req.seats_per_row.unsigned_abs()))
            .map_err(|_| ServiceError::Validation("Too many seats requested".into()))?;
        let created = u32::try_from(inserted).unwrap_or(total);

        info!(theater_id = req.theater_id, created, total, "Seats bulk created");
        Ok(BulkCreateSeatsResult {
            created,
            skipped: total.saturating_sub(created),
            total,
        })
    }

    pub async fn update_seat(&self, seat_id: i64, req: UpdateSeatRequest) -> ServiceResult<Seat> {
        req.validate()?;

        let seat = sqlx::query_as::<_, Seat>(&format!(
            "UPDATE seats SET
                 seat_type = COALESCE($2, seat_type),
                 is_active = COALESCE($3, is_active)
             WHERE seat_id = $1
             RETURNING {SEAT_COLUMNS}"
        ))
        .bind(seat_id)
        .bind(&req.seat_type)
        .bind(req.is_active)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Seat", seat_id))?;

        self.invalidate_theater_seat_maps(seat.theater_id).await?;
        Ok(seat)
    }

    pub async fn delete_seat(&self, seat_id: i64) -> ServiceResult<()> {
        let theater_id: i64 = sqlx::query_scalar(
            "UPDATE seats SET is_active = FALSE WHERE seat_id = $1 RETURNING theater_id",
        )
        .bind(seat_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ServiceError::not_found("Seat", seat_id))?;

        self.invalidate_theater_seat_maps(theater_id).await
    }

    /// Ids of every showtime scheduled in the theater, active or not.
    pub async fn theater_showtime_ids(&self, theater_id: i64) -> ServiceResult<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT showtime_id FROM showtimes WHERE theater_id = $1 ORDER BY showtime_id",
        )
        .bind(theater_id)
        .fetch_all(self.pool())
        .await?;
        Ok(ids)
    }

    async fn invalidate_theater_seat_maps(&self, theater_id: i64) -> ServiceResult<()> {
        let showtime_ids = self.theater_showtime_ids(theater_id).await?;
        self.cache.invalidate_seat_maps(&showtime_ids).await;
        Ok(())
    }

    async fn deactivate(
        &self,
        table: &'static str,
        id_column: &'static str,
        entity: &'static str,
        id: i64,
    ) -> ServiceResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE {table} SET is_active = FALSE, updated_at = NOW() WHERE {id_column} = $1"
        ))
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found(entity, id));
        }
        info!(entity, id, "Deactivated");
        Ok(())
    }
}
