use super::{
    models::{Certificate, NewCertificate},
    Store,
};

impl Store {
    /// Newest first; rows sharing a timestamp fall back to insertion order.
    pub async fn list_certificates(&self) -> Result<Vec<Certificate>, sqlx::Error> {
        sqlx::query_as::<_, Certificate>(
            r#"
            SELECT id, name, category, filename, filepath, upload_date
            FROM certificates
            ORDER BY upload_date DESC, rowid DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
    }

    pub async fn find_certificate(&self, id: &str) -> Result<Option<Certificate>, sqlx::Error> {
        sqlx::query_as::<_, Certificate>(
            "SELECT id, name, category, filename, filepath, upload_date FROM certificates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    pub async fn insert_certificate(
        &self,
        certificate: &NewCertificate,
    ) -> Result<Certificate, sqlx::Error> {
        sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (id, name, category, filename, filepath)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, category, filename, filepath, upload_date
            "#,
        )
        .bind(&certificate.id)
        .bind(&certificate.name)
        .bind(&certificate.category)
        .bind(&certificate.filename)
        .bind(&certificate.filepath)
        .fetch_one(self.pool())
        .await
    }

    /// Returns `false` when no row had that id.
    pub async fn delete_certificate(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{models::NewCertificate, tests::temp_store};

    fn new_certificate(id: &str) -> NewCertificate {
        NewCertificate {
            id: id.to_string(),
            name: "AWS Practitioner".to_string(),
            category: "cloud".to_string(),
            filename: format!("{}.pdf", id),
            filepath: format!("/uploads/{}.pdf", id),
        }
    }

    #[tokio::test]
    async fn test_insert_returns_row_with_upload_date() {
        let (store, _dir) = temp_store().await;
        let created = store.insert_certificate(&new_certificate("c1")).await.unwrap();
        assert_eq!(created.id, "c1");
        assert_eq!(created.category, "cloud");
        assert!(created.upload_date.is_some());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (store, _dir) = temp_store().await;
        for id in ["first", "second", "third"] {
            store.insert_certificate(&new_certificate(id)).await.unwrap();
        }
        let ids: Vec<String> = store
            .list_certificates()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let (store, _dir) = temp_store().await;
        store.insert_certificate(&new_certificate("dup")).await.unwrap();
        assert!(store.insert_certificate(&new_certificate("dup")).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let (store, _dir) = temp_store().await;
        store.insert_certificate(&new_certificate("gone")).await.unwrap();
        assert!(store.delete_certificate("gone").await.unwrap());
        assert!(!store.delete_certificate("gone").await.unwrap());
        assert!(store.find_certificate("gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_id_is_bound_not_interpolated() {
        let (store, _dir) = temp_store().await;
        store.insert_certificate(&new_certificate("keep")).await.unwrap();
        assert!(!store.delete_certificate("x' OR '1'='1").await.unwrap());
        assert_eq!(store.list_certificates().await.unwrap().len(), 1);
    }
}
