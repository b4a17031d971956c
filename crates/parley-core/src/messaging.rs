use std::sync::Arc;

use tracing::info;

use parley_crypto::Subject;
use parley_db::Store;
use parley_types::models::Message;

use crate::error::CoreError;
use crate::{new_id, now};

pub struct MessagingService {
    store: Arc<dyn Store>,
}

impl MessagingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Store a new message owned by `owner`.
    pub async fn create(&self, owner: &Subject, body: &str) -> Result<Message, CoreError> {
        let now = now();
        let message = Message {
            id: new_id(),
            body: body.to_string(),
            owner_id: owner.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.store.create_message(&message).await?;
        info!("User {} created message {}", owner, message.id);
        Ok(message)
    }

    pub async fn get_one(&self, id: &str) -> Result<Message, CoreError> {
        Ok(self.store.get_message(id).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<Message>, CoreError> {
        Ok(self.store.list_messages().await?)
    }

    /// Replace the body of a message `owner` created. Someone else's message
    /// yields `NotFound`, same as a missing one.
    pub async fn update(&self, id: &str, body: &str, owner: &Subject) -> Result<Message, CoreError> {
        let message = self
            .store
            .update_message(id, body, owner.as_str(), now())
            .await?;
        info!("User {} updated message {}", owner, id);
        Ok(message)
    }

    pub async fn delete(&self, id: &str, owner: &Subject) -> Result<(), CoreError> {
        self.store.delete_message(id, owner.as_str()).await?;
        info!("User {} deleted message {}", owner, id);
        Ok(())
    }
}
