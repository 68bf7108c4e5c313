use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{spotify, types::AuthFlowState, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthFlowState>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        warning!("Authorization denied: {}", error);
        return Html("<h4>Authorization failed.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut state = shared_state.lock().await;
    let Some(ref mut flow) = state.as_mut() else {
        return Html("<h4>No authorization flow in progress.</h4>");
    };

    // Reject callbacks that don't echo the state value of this flow.
    if params.get("state").map(String::as_str) != Some(flow.csrf_state.as_str()) {
        warning!("Callback carried an unexpected state value");
        return Html("<h4>State mismatch.</h4>");
    }

    match spotify::auth::exchange_code(code).await {
        Ok(token) => {
            flow.token = Some(token);
            Html("<h2>Authorization successful.</h2><p>You can close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Token exchange failed.</h4>")
        }
    }
}
