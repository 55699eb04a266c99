//! The API handle: owns credentials and performs authenticated requests.

use reqwest::{header::HeaderMap, Method};
use serde_json::Value;
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, warn};

use crate::{
    auth::{Authorizer, CredentialStore, Credentials, OAuth1, VerifierPrompt},
    core::{config::ApiConfig, decode},
    types::{GameKey, LeagueKey, PlayerKey, TeamKey},
    yahoo::{
        http::{HttpRequest, HttpResponse, ReqwestTransport, Transport},
        resources::{Game, GameInfo, League, Player, Team},
    },
    Result, YahooError,
};

#[cfg(test)]
mod tests;

/// Every successful payload is wrapped in this key.
pub const CONTENT_KEY: &str = "fantasy_content";

struct ApiInner {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    authorizer: Arc<dyn Authorizer>,
    store: Arc<dyn CredentialStore>,
    credentials: Mutex<Credentials>,
}

/// Handle to the Fantasy Sports API.
///
/// Cloning is cheap and clones share credentials, so resources keep their own
/// clone to issue follow-up requests. Requests are issued one at a time; a
/// refresh replaces the shared credentials for every clone.
#[derive(Clone)]
pub struct FantasyApi {
    inner: Arc<ApiInner>,
}

impl fmt::Debug for FantasyApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FantasyApi")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("format", &self.inner.config.format)
            .finish_non_exhaustive()
    }
}

/// Best-effort error text: `error.description` from a JSON body, else the body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("description")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

impl FantasyApi {
    /// Assemble a handle from its capabilities. Credentials come from `store`.
    pub fn with_parts(
        config: ApiConfig,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self> {
        let credentials = store.load()?;
        credentials.require_consumer()?;
        Ok(Self {
            inner: Arc::new(ApiInner {
                config,
                transport,
                authorizer,
                store,
                credentials: Mutex::new(credentials),
            }),
        })
    }

    /// reqwest transport and the Yahoo OAuth1 login service.
    pub fn connect(
        config: ApiConfig,
        store: Arc<dyn CredentialStore>,
        prompt: Arc<dyn VerifierPrompt>,
    ) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new()?);
        let authorizer = Arc::new(OAuth1::new(Arc::clone(&transport), prompt)?);
        Self::with_parts(config, store, transport, authorizer)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Snapshot of the credentials currently in use.
    pub fn credentials(&self) -> Credentials {
        self.lock_credentials().clone()
    }

    fn lock_credentials(&self) -> std::sync::MutexGuard<'_, Credentials> {
        self.inner
            .credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The handle switches to the new token first; a failed save is still
    /// reported to the caller.
    fn replace_credentials(&self, credentials: Credentials) -> Result<()> {
        *self.lock_credentials() = credentials.clone();
        self.inner.store.save(&credentials)
    }

    async fn ensure_registered(&self) -> Result<()> {
        let current = self.credentials();
        if current.has_access_token() {
            return Ok(());
        }
        debug!("no access token, starting registration");
        let registered = self.inner.authorizer.register(&current).await?;
        self.replace_credentials(registered)
    }

    async fn refresh(&self) -> Result<()> {
        let current = self.credentials();
        let refreshed = self.inner.authorizer.refresh(&current).await?;
        self.replace_credentials(refreshed)
    }

    async fn send_signed(&self, template: &HttpRequest) -> Result<HttpResponse> {
        let credentials = self.credentials();
        let signed = self.inner.authorizer.sign(template.clone(), &credentials)?;
        self.inner.transport.send(signed).await
    }

    /// `GET` a path relative to the base URL and return the unwrapped payload.
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(path, Method::GET, &[], HeaderMap::new()).await
    }

    /// Issue an authenticated request.
    ///
    /// A rejected request triggers exactly one token refresh and one retry.
    /// If the retry is also rejected the call fails with [`YahooError::Api`].
    /// Only a refusal of the refresh handshake itself is tolerated; transport
    /// or persistence failures during refresh end the call.
    /// On success the value under `fantasy_content` is returned.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        form: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Value> {
        self.ensure_registered().await?;

        let mut template = HttpRequest::new(method, self.inner.config.endpoint(path)?)
            .query("format", self.inner.config.format.as_str());
        template.headers = headers;
        template.form = form
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut response = self.send_signed(&template).await?;
        if !response.is_success() {
            warn!(status = response.status, path, "request rejected, refreshing token");
            match self.refresh().await {
                Ok(()) => {}
                Err(e @ YahooError::OAuth { .. }) => {
                    warn!(error = %e, "token refresh rejected, retrying with current token");
                }
                Err(e) => return Err(e),
            }
            response = self.send_signed(&template).await?;
        }

        if !response.is_success() {
            return Err(YahooError::Api {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        let mut body: Value = serde_json::from_str(&response.body)?;
        body.get_mut(CONTENT_KEY)
            .map(Value::take)
            .ok_or_else(|| YahooError::MissingWrapper {
                key: CONTENT_KEY.to_string(),
            })
    }

    /// A game with its stat categories, weeks, position types and roster
    /// positions loaded.
    pub async fn get_game(&self, game_key: &GameKey) -> Result<Game> {
        let data = self.get(&format!("game/{game_key}")).await?;
        let (fields, _) = decode::unwrap_tuple(&data, "game", 0)?;
        Game::load(self.clone(), fields).await
    }

    /// Games the current user takes part in, without their metadata tables.
    pub async fn get_games(&self, available_only: bool) -> Result<Vec<GameInfo>> {
        let query = if available_only {
            "users;use_login=1/games;is_available=1"
        } else {
            "users;use_login=1/games"
        };
        let data = self.get(query).await?;

        let mut games = Vec::new();
        for user in decode::decode_counted_array(decode::require(&data, "users")?)? {
            let (_, user_data) = decode::unwrap_tuple(user, "user", 1)?;
            for game in decode::decode_counted_array(decode::require(user_data, "games")?)? {
                let (_, fields) = decode::unwrap_tuple(game, "game", 0)?;
                games.push(GameInfo::from_wire(fields)?);
            }
        }
        debug!(count = games.len(), "decoded games");
        Ok(games)
    }

    pub async fn get_league(&self, league_key: &LeagueKey) -> Result<League> {
        let data = self.get(&format!("league/{league_key}")).await?;
        let (fields, _) = decode::unwrap_tuple(&data, "league", 0)?;
        League::from_wire(self.clone(), fields)
    }

    pub async fn get_team(&self, team_key: &TeamKey) -> Result<Team> {
        let data = self.get(&format!("team/{team_key}")).await?;
        Team::from_wire(self.clone(), decode::require(&data, "team")?)
    }

    pub async fn get_player(&self, player_key: &PlayerKey) -> Result<Player> {
        let data = self.get(&format!("player/{player_key}")).await?;
        Player::from_wire(self.clone(), decode::require(&data, "player")?)
    }
}
