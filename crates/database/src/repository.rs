use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{AnonId, FavoriteBreed, LeaderboardOrder, RaterActivity, RatingValue};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use sqlx::postgres::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A dog as shown to a rater before they rate it. Community numbers are left
/// out so they can't sway the rating.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DogCard {
    pub id: i32,
    pub image_url: String,
    pub breed_id: i32,
    pub breed_slug: String,
    pub breed_name: String,
}

/// A dog joined with its breed and the community's ratings of it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DogDetail {
    pub id: i32,
    pub image_url: String,
    pub image_source: String,
    pub breed_id: i32,
    pub breed_slug: String,
    pub breed_name: String,
    pub created_at: DateTime<Utc>,
    pub rating_count: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_rating: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct DogStats {
    pub rating_count: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_rating: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RatingRecord {
    pub id: i64,
    pub dog_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
}

/// What a rater learns right after rating a dog.
#[derive(Debug, Clone, Serialize)]
pub struct RatingOutcome {
    pub rating: RatingRecord,
    /// Stats over every rating of the dog, including the new one.
    pub dog_stats: DogStats,
    /// Stats over everyone else's ratings of the dog.
    pub others: DogStats,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BreedSummary {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub dog_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BreedDetail {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub dog_ceo_path: Option<String>,
    pub dog_count: i64,
    pub rating_count: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_rating: Option<Decimal>,
}

/// One row of the breed leaderboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BreedStanding {
    pub breed_id: i32,
    pub slug: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_rating: Decimal,
    pub rating_count: i64,
    pub rated_dogs: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RatingHistoryEntry {
    pub rating_id: i64,
    pub dog_id: i32,
    pub image_url: String,
    pub breed_slug: String,
    pub breed_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub community_average: Option<Decimal>,
    pub rated_at: DateTime<Utc>,
}

/// A slice of a longer list.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// An image to import, already attributed to a breed.
#[derive(Debug, Clone)]
pub struct NewDog {
    pub breed_id: i32,
    pub image_url: String,
}

#[derive(FromRow)]
struct FavoriteBreedRow {
    slug: String,
    name: String,
    average: Decimal,
    ratings: i64,
}

// Refreshes `last_seen_at` for returning raters.
const TOUCH_USER_SQL: &str = r#"
    INSERT INTO users (anon_id) VALUES ($1)
    ON CONFLICT (anon_id) DO UPDATE SET last_seen_at = NOW()
"#;

const DOG_DETAIL_SELECT: &str = r#"
    SELECT
        d.id, d.image_url, d.image_source, d.breed_id,
        b.slug AS breed_slug, b.name AS breed_name, d.created_at,
        COUNT(r.id) AS rating_count,
        ROUND(AVG(r.value), 2) AS average_rating
    FROM dogs AS d
    JOIN breeds AS b ON b.id = d.breed_id
    LEFT JOIN ratings AS r ON r.dog_id = d.id
"#;

/// Row offset of the first item on `page` (1-based).
pub(crate) fn offset_for(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit)
}

/// Folds `(value, count)` rows from a `GROUP BY value` query into a distribution.
pub(crate) fn distribution_from_rows(rows: &[(Decimal, i64)]) -> [u64; 10] {
    let mut distribution = [0u64; 10];
    for (value, count) in rows {
        match RatingValue::try_from(*value) {
            Ok(rating) => distribution[rating.bucket_index()] += (*count).max(0) as u64,
            Err(e) => tracing::warn!(error = %e, "Ignoring a stored rating outside the legal range."),
        }
    }
    distribution
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records that a rater was seen, creating them on their first visit.
    pub async fn touch_user(&self, anon: AnonId) -> Result<(), DbError> {
        sqlx::query(TOUCH_USER_SQL)
            .bind(anon.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Picks a random approved dog the rater has neither rated nor skipped.
    /// Returns `None` once they have seen everything (in the breed, if given).
    pub async fn next_dog_for(
        &self,
        anon: AnonId,
        breed_slug: Option<&str>,
    ) -> Result<Option<DogCard>, DbError> {
        let dog = sqlx::query_as::<_, DogCard>(
            r#"
            SELECT d.id, d.image_url, d.breed_id, b.slug AS breed_slug, b.name AS breed_name
            FROM dogs AS d
            JOIN breeds AS b ON b.id = d.breed_id
            WHERE d.is_approved
              AND ($2::TEXT IS NULL OR b.slug = $2)
              AND NOT EXISTS (SELECT 1 FROM ratings AS r WHERE r.dog_id = d.id AND r.anon_id = $1)
              AND NOT EXISTS (SELECT 1 FROM skips AS s WHERE s.dog_id = d.id AND s.anon_id = $1)
            ORDER BY random()
            LIMIT 1
            "#,
        )
        .bind(anon.as_uuid())
        .bind(breed_slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(dog)
    }

    /// Fetches one dog with its breed and community stats.
    pub async fn get_dog(&self, dog_id: i32) -> Result<DogDetail, DbError> {
        let query = format!("{DOG_DETAIL_SELECT} WHERE d.id = $1 GROUP BY d.id, b.id");
        sqlx::query_as::<_, DogDetail>(&query)
            .bind(dog_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    /// Saves a rating within a single transaction for atomicity.
    ///
    /// Fails with `NotFound` when the dog doesn't exist and with `Duplicate`
    /// when this rater already rated it; in both cases nothing is written.
    pub async fn save_rating(
        &self,
        anon: AnonId,
        dog_id: i32,
        value: RatingValue,
    ) -> Result<RatingOutcome, DbError> {
        let mut tx = self.pool.begin().await?;

        let dog_exists: Option<i32> = sqlx::query_scalar("SELECT id FROM dogs WHERE id = $1")
            .bind(dog_id)
            .fetch_optional(&mut *tx)
            .await?;
        if dog_exists.is_none() {
            return Err(DbError::NotFound);
        }

        sqlx::query(TOUCH_USER_SQL)
            .bind(anon.as_uuid())
            .execute(&mut *tx)
            .await?;

        let rating = sqlx::query_as::<_, RatingRecord>(
            r#"
            INSERT INTO ratings (dog_id, anon_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (dog_id, anon_id) DO NOTHING
            RETURNING id, dog_id, value, created_at
            "#,
        )
        .bind(dog_id)
        .bind(anon.as_uuid())
        .bind(value.as_decimal())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::Duplicate)?;

        let dog_stats = sqlx::query_as::<_, DogStats>(
            "SELECT COUNT(*) AS rating_count, ROUND(AVG(value), 2) AS average_rating FROM ratings WHERE dog_id = $1",
        )
        .bind(dog_id)
        .fetch_one(&mut *tx)
        .await?;

        let others = sqlx::query_as::<_, DogStats>(
            "SELECT COUNT(*) AS rating_count, ROUND(AVG(value), 2) AS average_rating FROM ratings WHERE dog_id = $1 AND anon_id <> $2",
        )
        .bind(dog_id)
        .bind(anon.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(RatingOutcome {
            rating,
            dog_stats,
            others,
        })
    }

    /// Records that a rater passed on a dog. Skipping twice is a no-op.
    pub async fn save_skip(&self, anon: AnonId, dog_id: i32) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let dog_exists: Option<i32> = sqlx::query_scalar("SELECT id FROM dogs WHERE id = $1")
            .bind(dog_id)
            .fetch_optional(&mut *tx)
            .await?;
        if dog_exists.is_none() {
            return Err(DbError::NotFound);
        }

        sqlx::query(TOUCH_USER_SQL)
            .bind(anon.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO skips (dog_id, anon_id) VALUES ($1, $2) ON CONFLICT (dog_id, anon_id) DO NOTHING",
        )
        .bind(dog_id)
        .bind(anon.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Fetches all breeds with the number of approved dogs in each.
    pub async fn list_breeds(&self) -> Result<Vec<BreedSummary>, DbError> {
        let breeds = sqlx::query_as::<_, BreedSummary>(
            r#"
            SELECT b.id, b.slug, b.name, COUNT(d.id) AS dog_count
            FROM breeds AS b
            LEFT JOIN dogs AS d ON d.breed_id = b.id AND d.is_approved
            GROUP BY b.id
            ORDER BY b.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(breeds)
    }

    pub async fn get_breed(&self, slug: &str) -> Result<BreedDetail, DbError> {
        sqlx::query_as::<_, BreedDetail>(
            r#"
            SELECT
                b.id, b.slug, b.name, b.dog_ceo_path,
                COUNT(DISTINCT d.id) AS dog_count,
                COUNT(r.id) AS rating_count,
                ROUND(AVG(r.value), 2) AS average_rating
            FROM breeds AS b
            LEFT JOIN dogs AS d ON d.breed_id = b.id AND d.is_approved
            LEFT JOIN ratings AS r ON r.dog_id = d.id
            WHERE b.slug = $1
            GROUP BY b.id
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// One page of a breed's approved dogs, best rated first.
    pub async fn list_dogs_for_breed(
        &self,
        breed_id: i32,
        page: i64,
        limit: i64,
    ) -> Result<Page<DogDetail>, DbError> {
        let query = format!(
            "{DOG_DETAIL_SELECT} WHERE d.breed_id = $1 AND d.is_approved GROUP BY d.id, b.id \
             ORDER BY average_rating DESC NULLS LAST, d.id ASC LIMIT $2 OFFSET $3"
        );
        let items_future = sqlx::query_as::<_, DogDetail>(&query)
            .bind(breed_id)
            .bind(limit)
            .bind(offset_for(page, limit))
            .fetch_all(&self.pool);

        let total_future =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dogs WHERE breed_id = $1 AND is_approved")
                .bind(breed_id)
                .fetch_one(&self.pool);

        let (items, total) = tokio::join!(items_future, total_future);
        Ok(Page {
            items: items?,
            page,
            limit,
            total: total?,
        })
    }

    /// Ranks breeds by the average of every rating their dogs received.
    pub async fn breed_leaderboard(
        &self,
        min_ratings: i64,
        limit: i64,
        order: LeaderboardOrder,
    ) -> Result<Vec<BreedStanding>, DbError> {
        let query = format!(
            r#"
            SELECT
                b.id AS breed_id, b.slug, b.name,
                ROUND(AVG(r.value), 2) AS average_rating,
                COUNT(r.id) AS rating_count,
                COUNT(DISTINCT d.id) AS rated_dogs
            FROM breeds AS b
            JOIN dogs AS d ON d.breed_id = b.id
            JOIN ratings AS r ON r.dog_id = d.id
            GROUP BY b.id
            HAVING COUNT(r.id) >= $1
            ORDER BY average_rating {}, rating_count DESC, b.name ASC
            LIMIT $2
            "#,
            order.sql_direction()
        );
        let standings = sqlx::query_as::<_, BreedStanding>(&query)
            .bind(min_ratings)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(standings)
    }

    /// The best rated individual dogs.
    pub async fn top_dogs(&self, min_ratings: i64, limit: i64) -> Result<Vec<DogDetail>, DbError> {
        let query = format!(
            "{DOG_DETAIL_SELECT} WHERE d.is_approved GROUP BY d.id, b.id HAVING COUNT(r.id) >= $1 \
             ORDER BY average_rating DESC, rating_count DESC, d.id ASC LIMIT $2"
        );
        let dogs = sqlx::query_as::<_, DogDetail>(&query)
            .bind(min_ratings)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(dogs)
    }

    /// Gathers every aggregate a rater's statistics are built from.
    ///
    /// The queries are independent, so they run concurrently on the pool.
    pub async fn rater_activity(
        &self,
        anon: AnonId,
        favorite_min_ratings: i64,
    ) -> Result<RaterActivity, DbError> {
        let anon_id: Uuid = anon.as_uuid();

        let distribution_future = sqlx::query_as::<_, (Decimal, i64)>(
            "SELECT value, COUNT(*) FROM ratings WHERE anon_id = $1 GROUP BY value",
        )
        .bind(anon_id)
        .fetch_all(&self.pool);

        let skips_future = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM skips WHERE anon_id = $1")
            .bind(anon_id)
            .fetch_one(&self.pool);

        let breadth_future = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(DISTINCT d.breed_id),
                COUNT(DISTINCT (r.created_at AT TIME ZONE 'UTC')::DATE)
            FROM ratings AS r
            JOIN dogs AS d ON d.id = r.dog_id
            WHERE r.anon_id = $1
            "#,
        )
        .bind(anon_id)
        .fetch_one(&self.pool);

        let contrarian_future = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM ratings AS r
            JOIN LATERAL (
                SELECT AVG(o.value) AS average, COUNT(*) AS raters
                FROM ratings AS o
                WHERE o.dog_id = r.dog_id AND o.anon_id <> r.anon_id
            ) AS community ON TRUE
            WHERE r.anon_id = $1
              AND community.raters >= 3
              AND ABS(r.value - community.average) >= 1.5
            "#,
        )
        .bind(anon_id)
        .fetch_one(&self.pool);

        let favorite_future = sqlx::query_as::<_, FavoriteBreedRow>(
            r#"
            SELECT b.slug, b.name, ROUND(AVG(r.value), 2) AS average, COUNT(*) AS ratings
            FROM ratings AS r
            JOIN dogs AS d ON d.id = r.dog_id
            JOIN breeds AS b ON b.id = d.breed_id
            WHERE r.anon_id = $1
            GROUP BY b.id
            HAVING COUNT(*) >= $2
            ORDER BY average DESC, ratings DESC, b.name ASC
            LIMIT 1
            "#,
        )
        .bind(anon_id)
        .bind(favorite_min_ratings)
        .fetch_optional(&self.pool);

        let (distribution, skips, breadth, contrarian, favorite) = tokio::join!(
            distribution_future,
            skips_future,
            breadth_future,
            contrarian_future,
            favorite_future
        );

        let (distinct_breeds, active_days) = breadth?;
        Ok(RaterActivity {
            distribution: distribution_from_rows(&distribution?),
            total_skips: skips?.max(0) as u64,
            distinct_breeds: distinct_breeds.max(0) as u64,
            active_days: active_days.max(0) as u64,
            contrarian_ratings: contrarian?.max(0) as u64,
            favorite_breed: favorite?.map(|row| FavoriteBreed {
                slug: row.slug,
                name: row.name,
                average: row.average,
                ratings: row.ratings.max(0) as u64,
            }),
        })
    }

    /// A rater's ratings, newest first, next to what the community thinks.
    pub async fn rating_history(
        &self,
        anon: AnonId,
        page: i64,
        limit: i64,
    ) -> Result<Page<RatingHistoryEntry>, DbError> {
        let items_future = sqlx::query_as::<_, RatingHistoryEntry>(
            r#"
            SELECT
                r.id AS rating_id, r.dog_id, d.image_url,
                b.slug AS breed_slug, b.name AS breed_name,
                r.value, r.created_at AS rated_at,
                (SELECT ROUND(AVG(o.value), 2) FROM ratings AS o WHERE o.dog_id = r.dog_id) AS community_average
            FROM ratings AS r
            JOIN dogs AS d ON d.id = r.dog_id
            JOIN breeds AS b ON b.id = d.breed_id
            WHERE r.anon_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(anon.as_uuid())
        .bind(limit)
        .bind(offset_for(page, limit))
        .fetch_all(&self.pool);

        let total_future = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings WHERE anon_id = $1")
            .bind(anon.as_uuid())
            .fetch_one(&self.pool);

        let (items, total) = tokio::join!(items_future, total_future);
        Ok(Page {
            items: items?,
            page,
            limit,
            total: total?,
        })
    }

    // --- Import side ---

    /// Inserts a breed or refreshes its display name, returning its id.
    pub async fn upsert_breed(
        &self,
        slug: &str,
        name: &str,
        dog_ceo_path: Option<&str>,
    ) -> Result<i32, DbError> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO breeds (slug, name, dog_ceo_path)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE
                SET name = EXCLUDED.name,
                    dog_ceo_path = COALESCE(breeds.dog_ceo_path, EXCLUDED.dog_ceo_path)
            RETURNING id
            "#,
        )
        .bind(slug)
        .bind(name)
        .bind(dog_ceo_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Inserts a batch of dogs in one transaction.
    ///
    /// Uses `ON CONFLICT DO NOTHING` on the image URL so re-running an import
    /// is harmless. Returns how many rows were actually inserted.
    pub async fn insert_dogs(&self, dogs: &[NewDog], image_source: &str) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for dog in dogs {
            let result = sqlx::query(
                r#"
                INSERT INTO dogs (breed_id, image_url, image_source)
                VALUES ($1, $2, $3)
                ON CONFLICT (image_url) DO NOTHING
                "#,
            )
            .bind(dog.breed_id)
            .bind(&dog.image_url)
            .bind(image_source)
            .execute(&mut *tx) // Note: must use the transaction object `tx` here
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Every image URL already in the catalog, for de-duplicating imports.
    pub async fn existing_image_urls(&self) -> Result<HashSet<String>, DbError> {
        let urls = sqlx::query_scalar::<_, String>("SELECT image_url FROM dogs")
            .fetch_all(&self.pool)
            .await?;
        Ok(urls.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_offset_for_first_page_is_zero() {
        assert_eq!(offset_for(1, 20), 0);
        assert_eq!(offset_for(3, 20), 40);
    }

    #[test]
    fn test_offset_for_clamps_page() {
        assert_eq!(offset_for(0, 10), 0);
        assert_eq!(offset_for(-4, 10), 0);
    }

    #[test]
    fn test_offset_for_saturates_instead_of_overflowing() {
        assert_eq!(offset_for(i64::MAX, 100), i64::MAX);
    }

    #[test]
    fn test_distribution_from_rows() {
        let rows = vec![(dec!(5.0), 3), (dec!(0.5), 1), (dec!(2.5), 2)];
        let distribution = distribution_from_rows(&rows);
        assert_eq!(distribution[9], 3);
        assert_eq!(distribution[0], 1);
        assert_eq!(distribution[4], 2);
        assert_eq!(distribution.iter().sum::<u64>(), 6);
    }

    #[test]
    fn test_distribution_ignores_illegal_values() {
        let rows = vec![(dec!(7.0), 4), (dec!(4.0), 1)];
        let distribution = distribution_from_rows(&rows);
        assert_eq!(distribution.iter().sum::<u64>(), 1);
        assert_eq!(distribution[7], 1);
    }

    // The tests below run against a fresh database created by `sqlx::test`
    // from `DATABASE_URL`, with the crate's migrations applied.

    async fn seed_breed(repo: &DbRepository, slug: &str, urls: &[&str]) -> Vec<i32> {
        let breed_id = repo.upsert_breed(slug, slug, None).await.unwrap();
        let dogs: Vec<NewDog> = urls
            .iter()
            .map(|url| NewDog {
                breed_id,
                image_url: url.to_string(),
            })
            .collect();
        repo.insert_dogs(&dogs, "test").await.unwrap();
        sqlx::query_scalar("SELECT id FROM dogs WHERE breed_id = $1 ORDER BY id")
            .bind(breed_id)
            .fetch_all(&repo.pool)
            .await
            .unwrap()
    }

    fn rating(halves: u8) -> RatingValue {
        RatingValue::from_halves(halves).unwrap()
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_second_rating_of_same_dog_is_duplicate(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let dogs = seed_breed(&repo, "pug", &["https://img/pug-1.jpg"]).await;
        let anon = AnonId::generate();

        let first = repo.save_rating(anon, dogs[0], rating(8)).await.unwrap();
        assert_eq!(first.dog_stats.rating_count, 1);
        assert_eq!(first.others.rating_count, 0);
        assert_eq!(first.others.average_rating, None);

        let second = repo.save_rating(anon, dogs[0], rating(2)).await;
        assert!(matches!(second, Err(DbError::Duplicate)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE dog_id = $1")
            .bind(dogs[0])
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_rating_and_skipping_unknown_dog_is_not_found(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let anon = AnonId::generate();
        assert!(matches!(
            repo.save_rating(anon, 4242, rating(10)).await,
            Err(DbError::NotFound)
        ));
        assert!(matches!(repo.save_skip(anon, 4242).await, Err(DbError::NotFound)));
        assert!(matches!(repo.get_dog(4242).await, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_skipping_twice_keeps_one_skip(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let dogs = seed_breed(&repo, "beagle", &["https://img/beagle-1.jpg"]).await;
        let anon = AnonId::generate();

        repo.save_skip(anon, dogs[0]).await.unwrap();
        repo.save_skip(anon, dogs[0]).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skips WHERE anon_id = $1")
            .bind(anon.as_uuid())
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_next_dog_excludes_rated_and_skipped(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let pugs = seed_breed(&repo, "pug", &["https://img/pug-1.jpg", "https://img/pug-2.jpg"]).await;
        let corgis = seed_breed(&repo, "corgi", &["https://img/corgi-1.jpg"]).await;
        let anon = AnonId::generate();

        let corgi = repo.next_dog_for(anon, Some("corgi")).await.unwrap().unwrap();
        assert_eq!(corgi.id, corgis[0]);
        assert_eq!(corgi.breed_slug, "corgi");

        repo.save_rating(anon, pugs[0], rating(6)).await.unwrap();
        repo.save_skip(anon, corgis[0]).await.unwrap();

        let next = repo.next_dog_for(anon, None).await.unwrap().unwrap();
        assert_eq!(next.id, pugs[1]);
        assert!(repo.next_dog_for(anon, Some("corgi")).await.unwrap().is_none());

        repo.save_rating(anon, pugs[1], rating(6)).await.unwrap();
        assert!(repo.next_dog_for(anon, None).await.unwrap().is_none());

        // Someone else still sees everything.
        let stranger = AnonId::generate();
        assert!(repo.next_dog_for(stranger, Some("corgi")).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_insert_dogs_counts_only_new_images(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let breed_id = repo.upsert_breed("akita", "Akita", Some("akita")).await.unwrap();
        let dog = |url: &str| NewDog {
            breed_id,
            image_url: url.to_string(),
        };

        let first = repo
            .insert_dogs(&[dog("https://img/a-1.jpg"), dog("https://img/a-2.jpg")], "dog_ceo")
            .await
            .unwrap();
        assert_eq!(first, 2);

        let second = repo
            .insert_dogs(&[dog("https://img/a-2.jpg"), dog("https://img/a-3.jpg")], "dog_ceo")
            .await
            .unwrap();
        assert_eq!(second, 1);

        let urls = repo.existing_image_urls().await.unwrap();
        assert_eq!(urls.len(), 3);
        assert!(urls.contains("https://img/a-3.jpg"));
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_upsert_breed_keeps_one_row_per_slug(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let first = repo.upsert_breed("bulldog-french", "French Bulldog", Some("bulldog/french")).await.unwrap();
        let again = repo.upsert_breed("bulldog-french", "Frenchie", None).await.unwrap();
        assert_eq!(first, again);

        let breed = repo.get_breed("bulldog-french").await.unwrap();
        assert_eq!(breed.name, "Frenchie");
        assert_eq!(repo.list_breeds().await.unwrap().len(), 1);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_contrarian_ratings_need_enough_other_raters(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let dogs = seed_breed(
            &repo,
            "husky",
            &["https://img/h-1.jpg", "https://img/h-2.jpg", "https://img/h-3.jpg"],
        )
        .await;
        let me = AnonId::generate();
        let others: Vec<AnonId> = (0..3).map(|_| AnonId::generate()).collect();

        // Three others loved it, I did not: contrarian.
        for other in &others {
            repo.save_rating(*other, dogs[0], rating(10)).await.unwrap();
        }
        repo.save_rating(me, dogs[0], rating(2)).await.unwrap();

        // Same gap, but only two other raters.
        for other in &others[..2] {
            repo.save_rating(*other, dogs[1], rating(10)).await.unwrap();
        }
        repo.save_rating(me, dogs[1], rating(2)).await.unwrap();

        // Three other raters, but only a one point gap.
        for other in &others {
            repo.save_rating(*other, dogs[2], rating(6)).await.unwrap();
        }
        repo.save_rating(me, dogs[2], rating(8)).await.unwrap();

        let activity = repo.rater_activity(me, 1).await.unwrap();
        assert_eq!(activity.contrarian_ratings, 1);
        assert_eq!(activity.distribution.iter().sum::<u64>(), 3);
        assert_eq!(activity.distinct_breeds, 1);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_touch_user_creates_rater_once(pool: PgPool) {
        let repo = DbRepository::new(pool);
        let anon = AnonId::generate();
        repo.touch_user(anon).await.unwrap();
        repo.touch_user(anon).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE anon_id = $1")
            .bind(anon.as_uuid())
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
