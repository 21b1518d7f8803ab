use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::{Mutex, oneshot};

use crate::{
    Res,
    error::SpotError,
    spotify::auth::{self, Credentials},
    types::{PkceToken, Token},
    warning,
};

/// State shared with the callback handler for a single login attempt.
///
/// `sender` is taken by the first request, so exactly one callback completes
/// the login; later requests are turned away.
pub struct CallbackState {
    pub pkce: PkceToken,
    pub credentials: Credentials,
    pub sender: Option<oneshot::Sender<Res<Token>>>,
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<CallbackState>>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(sender) = state.sender.take() else {
        return Html("<h4>Login already handled.</h4>");
    };

    let result = handle_params(&params, &state.pkce, &state.credentials).await;
    let page = match &result {
        Ok(_) => Html("<h2>Authentication successful.</h2><p>Close browser window.</p>"),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    };

    if sender.send(result).is_err() {
        warning!("Nobody is waiting for the login anymore.");
    }
    page
}

async fn handle_params(
    params: &HashMap<String, String>,
    pkce: &PkceToken,
    credentials: &Credentials,
) -> Res<Token> {
    if let Some(error) = params.get("error") {
        return Err(SpotError::Auth(format!("authorization denied: {}", error)));
    }

    if params.get("state") != Some(&pkce.state) {
        return Err(SpotError::Auth("state mismatch in callback".to_string()));
    }

    let code = params
        .get("code")
        .ok_or_else(|| SpotError::Auth("missing authorization code".to_string()))?;

    auth::exchange_code_pkce(credentials, code, &pkce.code_verifier).await
}
