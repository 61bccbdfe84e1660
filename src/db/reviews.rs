use super::{
    models::{NewReview, Review, ReviewStats},
    Store,
};

impl Store {
    pub async fn list_reviews(&self) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT id, name, rating, comment, date FROM reviews ORDER BY date DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await
    }

    pub async fn find_review(&self, id: i64) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT id, name, rating, comment, date FROM reviews WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    /// Inserts and re-reads by the generated id so server defaults (`date`)
    /// come back as stored.
    pub async fn insert_review(&self, review: &NewReview) -> Result<Review, sqlx::Error> {
        let result = sqlx::query("INSERT INTO reviews (name, rating, comment) VALUES (?, ?, ?)")
            .bind(&review.name)
            .bind(review.rating)
            .bind(&review.comment)
            .execute(self.pool())
            .await?;

        self.find_review(result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn review_stats(&self) -> Result<ReviewStats, sqlx::Error> {
        sqlx::query_as::<_, ReviewStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                AVG(rating) AS average,
                COUNT(CASE WHEN rating = 5 THEN 1 END) AS five_star,
                COUNT(CASE WHEN rating = 4 THEN 1 END) AS four_star,
                COUNT(CASE WHEN rating = 3 THEN 1 END) AS three_star,
                COUNT(CASE WHEN rating = 2 THEN 1 END) AS two_star,
                COUNT(CASE WHEN rating = 1 THEN 1 END) AS one_star
            FROM reviews
            "#,
        )
        .fetch_one(self.pool())
        .await
    }

    pub async fn count_reviews(&self) -> Result<i64, sqlx::Error> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(self.pool())
            .await?;
        Ok(total)
    }
}
