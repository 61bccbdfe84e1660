use std::sync::Arc;

use crate::{db::Store, mail::Mailer, secret::DeleteSecret, uploads::UploadDir};

/// Everything a handler needs, built once in `run` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub uploads: UploadDir,
    pub mailer: Arc<dyn Mailer>,
    pub delete_secret: Option<Arc<DeleteSecret>>,
}

impl AppState {
    pub fn new(
        store: Store,
        uploads: UploadDir,
        mailer: Arc<dyn Mailer>,
        delete_secret: Option<DeleteSecret>,
    ) -> Self {
        Self {
            store,
            uploads,
            mailer,
            delete_secret: delete_secret.map(Arc::new),
        }
    }

    /// No configured secret means nothing can be deleted.
    pub fn authorize_delete(&self, candidate: Option<&str>) -> bool {
        match (&self.delete_secret, candidate) {
            (Some(secret), Some(candidate)) => secret.verify(candidate),
            _ => false,
        }
    }
}
