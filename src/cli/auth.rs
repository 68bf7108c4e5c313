use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{spotify, types::AuthFlowState};

pub async fn auth(shared_state: Arc<Mutex<Option<AuthFlowState>>>) {
    spotify::auth::authorize(shared_state).await;
}
