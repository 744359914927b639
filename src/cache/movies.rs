use crate::cache::CacheService;
use crate::error::ServiceResult;
use crate::models::Movie;
use crate::services::catalog;

const MOVIES_KEY: &str = "movies:all";
const MOVIES_TTL_SECS: u64 = 3600;

impl CacheService {
    /// Unfiltered movie listing. Filtered listings bypass the cache.
    pub async fn movies(&self) -> ServiceResult<Vec<Movie>> {
        if let Some(movies) = self.get_json(MOVIES_KEY).await {
            return Ok(movies);
        }

        let movies = catalog::load_movies(&self.db.pool, &Default::default()).await?;
        self.set_json(MOVIES_KEY, &movies, MOVIES_TTL_SECS).await;
        Ok(movies)
    }

    pub async fn invalidate_movies(&self) {
        self.delete(MOVIES_KEY).await;
    }
}
