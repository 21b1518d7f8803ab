use std::{sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
};

use crate::{
    Res,
    api::CallbackState,
    config::{Config, CredentialsFlow},
    error::SpotError,
    info,
    management::TokenManager,
    server,
    spotify::SpotifyClient,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything needed to talk to the Spotify accounts service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri(),
            scope: config.scope.clone(),
        }
    }

    fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    expires_in: u64,
}

impl TokenResponse {
    fn into_token(self, previous_refresh_token: Option<String>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            scope: self.scope.unwrap_or_default(),
            expires_in: self.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

async fn request_token(credentials: &Credentials, form: &[(&str, &str)]) -> Res<TokenResponse> {
    let client = Client::new();
    let res = client
        .post(&credentials.token_url)
        .header("Authorization", credentials.basic_auth())
        .form(form)
        .send()
        .await
        .map_err(|e| SpotError::http(&credentials.token_url, e))?;

    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(SpotError::Auth(format!(
            "token endpoint answered {}: {}",
            status, body
        )));
    }

    res.json::<TokenResponse>()
        .await
        .map_err(|e| SpotError::http(&credentials.token_url, e))
}

/// Obtains an application token through the client-credentials flow.
///
/// These tokens carry no user context, so only public data (public profiles,
/// public playlists, catalog lookups) is reachable with them.
pub async fn client_credentials_token(credentials: &Credentials) -> Res<Token> {
    let response = request_token(credentials, &[("grant_type", "client_credentials")]).await?;
    Ok(response.into_token(None))
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may or may not rotate the refresh token; when it doesn't, the
/// previous one is kept so the token stays refreshable.
pub async fn refresh_token(credentials: &Credentials, refresh_token: &str) -> Res<Token> {
    let response = request_token(
        credentials,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", credentials.client_id.as_str()),
        ],
    )
    .await?;
    Ok(response.into_token(Some(refresh_token.to_string())))
}

/// Exchanges an authorization code received on the callback for a token.
pub async fn exchange_code_pkce(
    credentials: &Credentials,
    code: &str,
    verifier: &str,
) -> Res<Token> {
    let response = request_token(
        credentials,
        &[
            ("grant_type", "authorization_code"),
            ("client_id", credentials.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ],
    )
    .await?;
    Ok(response.into_token(None))
}

/// Gets a fresh token for an expired one, by refresh token when there is one
/// and by client credentials otherwise.
pub async fn renew(credentials: &Credentials, token: &Token) -> Res<Token> {
    match &token.refresh_token {
        Some(refresh) => refresh_token(credentials, refresh).await,
        None => client_credentials_token(credentials).await,
    }
}

pub fn authorize_url(credentials: &Credentials, code_challenge: &str, state: &str) -> String {
    format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&state={state}&scope={scope}",
        auth_url = credentials.auth_url,
        client_id = credentials.client_id,
        redirect_uri = credentials.redirect_uri,
        code_challenge = code_challenge,
        state = state,
        scope = credentials.scope.replace(' ', "%20"),
    )
}

/// Runs the browser based OAuth 2.0 PKCE flow.
///
/// 1. Generates the code verifier, challenge and state
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the default browser
/// 4. Waits for the one callback request to deliver the token, for ctrl-c
///    or for the login timeout, whichever comes first
/// 5. Shuts the callback server down
///
/// # Errors
///
/// Returns [`SpotError::Cancelled`] on ctrl-c and [`SpotError::Auth`] when the
/// exchange fails or the login times out.
pub async fn redirect_login(config: &Config, credentials: &Credentials) -> Res<Token> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| SpotError::Auth(format!("cannot bind callback server to {}: {}", addr, e)))?;

    let (token_tx, token_rx) = oneshot::channel();
    let callback_state = Arc::new(Mutex::new(CallbackState {
        pkce: PkceToken {
            code_verifier,
            state: state.clone(),
        },
        credentials: credentials.clone(),
        sender: Some(token_tx),
    }));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    info!("Starting server on {}", addr);
    let server_handle = tokio::spawn(server::start_api_server(
        listener,
        callback_state,
        shutdown_rx,
    ));

    let auth_url = authorize_url(credentials, &code_challenge, &state);
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let result = tokio::select! {
        token = token_rx => token.unwrap_or_else(|_| {
            Err(SpotError::Auth("callback server stopped before a token was received".to_string()))
        }),
        _ = tokio::signal::ctrl_c() => Err(SpotError::Cancelled),
        _ = tokio::time::sleep(LOGIN_TIMEOUT) => {
            Err(SpotError::Auth("authentication timed out".to_string()))
        }
    };

    server::shutdown(server_handle, shutdown_tx).await;
    result
}

/// Builds an authenticated client for the configured credentials flow.
///
/// For the redirect flow a cached token is reused when it is still valid or
/// can be refreshed; otherwise the browser login runs and its token is
/// written to the token cache.
pub async fn connect(config: &Config) -> Res<SpotifyClient> {
    let credentials = Credentials::from_config(config);

    let tokens = match config.credentials_flow {
        CredentialsFlow::ClientCredentials => {
            let token = client_credentials_token(&credentials).await?;
            success!("Spotify client successfully authenticated");
            TokenManager::new(token, None)
        }
        CredentialsFlow::Redirect => redirect_tokens(config, &credentials).await?,
    };

    Ok(SpotifyClient::new(
        config.api_url.clone(),
        credentials,
        tokens,
    ))
}

async fn redirect_tokens(config: &Config, credentials: &Credentials) -> Res<TokenManager> {
    let path = config.token_cache_path();

    match TokenManager::load(&path).await {
        Ok(Some(mut cached)) => {
            if cached.get_valid_token(credentials).await.is_ok() {
                info!(
                    "Using cached token from {} with scope {}",
                    path.display(),
                    cached.current_token().scope
                );
                return Ok(cached);
            }
            warning!("Cached token could not be refreshed, logging in again.");
        }
        Ok(None) => {}
        Err(e) => warning!("Ignoring unreadable token cache: {}", e),
    }

    let token = redirect_login(config, credentials).await?;
    let tokens = TokenManager::new(token, Some(path));
    if let Err(e) = tokens.persist().await {
        warning!("Failed to write to token cache: {}", e);
    }
    success!("Authentication successful!");
    Ok(tokens)
}
