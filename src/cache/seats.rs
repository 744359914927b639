use crate::cache::CacheService;
use crate::error::ServiceResult;
use crate::models::SeatMapEntry;
use crate::services::inventory;

const SEAT_MAP_TTL_SECS: u64 = 30;

fn seat_map_key(showtime_id: i64) -> String {
    format!("showtime:{showtime_id}:seats")
}

impl CacheService {
    /// Seat map for a showtime, served from Redis when warm.
    pub async fn seat_map(&self, showtime_id: i64) -> ServiceResult<Vec<SeatMapEntry>> {
        let key = seat_map_key(showtime_id);
        if let Some(seats) = self.get_json(&key).await {
            return Ok(seats);
        }

        let seats = inventory::load_seat_map(&self.db.pool, showtime_id).await?;
        self.set_json(&key, &seats, SEAT_MAP_TTL_SECS).await;
        Ok(seats)
    }

    pub async fn invalidate_seat_map(&self, showtime_id: i64) {
        self.delete(&seat_map_key(showtime_id)).await;
    }

    pub async fn invalidate_seat_maps(&self, showtime_ids: &[i64]) {
        for &showtime_id in showtime_ids {
            self.invalidate_seat_map(showtime_id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_scoped_by_showtime() {
        assert_eq!(seat_map_key(12), "showtime:12:seats");
    }
}
