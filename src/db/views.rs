use super::Store;

impl Store {
    /// Single atomic statement; concurrent callers never lose an increment.
    pub async fn increment_views(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            UPDATE views
            SET count = count + 1, last_updated = CURRENT_TIMESTAMP
            WHERE id = 1
            RETURNING count
            "#,
        )
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }

    pub async fn view_count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT count FROM views WHERE id = 1")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
