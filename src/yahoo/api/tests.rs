//! Unit tests for the API handle: refresh-and-retry, registration and unwrapping

use super::*;
use crate::yahoo::testing::{harness, harness_with, signed_in, FakeAuthorizer, TOKEN_HEADER};
use serde_json::json;

const UNAUTHORIZED: &str =
    r#"{"error": {"lang": "en-US", "description": "Please provide valid credentials."}}"#;

#[cfg(test)]
mod request_tests {
    use super::*;

    #[tokio::test]
    async fn test_success_returns_unwrapped_payload() {
        let h = harness();
        h.transport
            .respond_content("game/nfl", json!({"game": [{"game_key": "423"}]}));

        let data = h.api.get("game/nfl").await.unwrap();

        assert_eq!(data, json!({"game": [{"game_key": "423"}]}));
        assert_eq!(h.authorizer.refreshes(), 0);
        assert_eq!(h.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_format_query_parameter_is_sent() {
        let h = harness();
        h.transport.respond_content("game/nfl", json!({}));

        h.api.get("game/nfl").await.unwrap();

        let request = &h.transport.requests()[0];
        assert!(request
            .query
            .contains(&("format".to_string(), "json".to_string())));
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.headers[TOKEN_HEADER], "initial");
    }

    #[tokio::test]
    async fn test_rejected_twice_raises_api_error_after_one_refresh() {
        let h = harness();
        h.transport
            .respond("league/nfl.l.1", 401, UNAUTHORIZED)
            .respond("league/nfl.l.1", 401, UNAUTHORIZED)
            .respond_content("league/nfl.l.1", json!({"unused": true}));

        let err = h.api.get("league/nfl.l.1").await.unwrap_err();

        match err {
            YahooError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Please provide valid credentials.");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
        assert_eq!(h.authorizer.refreshes(), 1);
        assert_eq!(h.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_then_accepted_returns_retry_payload() {
        let h = harness();
        h.transport
            .respond("league/nfl.l.1", 401, UNAUTHORIZED)
            .respond_content("league/nfl.l.1", json!({"league": [{"league_key": "nfl.l.1"}]}));

        let data = h.api.get("league/nfl.l.1").await.unwrap();

        assert_eq!(data["league"][0]["league_key"], "nfl.l.1");
        assert_eq!(h.authorizer.refreshes(), 1);

        let requests = h.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].headers[TOKEN_HEADER], "initial");
        assert_eq!(requests[1].headers[TOKEN_HEADER], "refreshed-1");
    }

    #[tokio::test]
    async fn test_refreshed_credentials_are_persisted() {
        let h = harness();
        h.transport
            .respond("game/nfl", 401, UNAUTHORIZED)
            .respond_content("game/nfl", json!({}));

        h.api.get("game/nfl").await.unwrap();

        let stored = h.store.load().unwrap();
        assert_eq!(stored.oauth_access_token.as_deref(), Some("refreshed-1"));
        assert_eq!(stored.oauth_session_handle.as_deref(), Some("handle"));
        assert_eq!(h.api.credentials(), stored);
    }

    #[tokio::test]
    async fn test_failed_refresh_still_retries_once() {
        let h = harness_with(signed_in(), FakeAuthorizer::failing_refresh());
        h.transport
            .respond("game/nfl", 401, UNAUTHORIZED)
            .respond_content("game/nfl", json!({"ok": 1}));

        let data = h.api.get("game/nfl").await.unwrap();

        assert_eq!(data, json!({"ok": 1}));
        assert_eq!(h.authorizer.refreshes(), 1);
        assert_eq!(h.transport.requests().len(), 2);
        assert_eq!(
            h.store.load().unwrap().oauth_access_token.as_deref(),
            Some("initial")
        );
    }

    #[tokio::test]
    async fn test_missing_access_token_triggers_registration() {
        let h = harness_with(
            Credentials::new("consumer", "consumer-secret"),
            FakeAuthorizer::new(),
        );
        h.transport.respond_content("game/nfl", json!({}));

        h.api.get("game/nfl").await.unwrap();
        h.transport.respond_content("game/nfl", json!({}));
        h.api.get("game/nfl").await.unwrap();

        assert_eq!(h.authorizer.registrations(), 1);
        assert_eq!(h.transport.requests()[0].headers[TOKEN_HEADER], "registered");
        assert!(h.store.load().unwrap().has_access_token());
    }

    #[tokio::test]
    async fn test_missing_wrapper_is_protocol_error() {
        let h = harness();
        h.transport
            .respond("game/nfl", 200, r#"{"something_else": {}}"#);

        let err = h.api.get("game/nfl").await.unwrap_err();

        match err {
            YahooError::MissingWrapper { key } => assert_eq!(key, CONTENT_KEY),
            other => panic!("Expected MissingWrapper, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_json_error() {
        let h = harness();
        h.transport.respond("game/nfl", 200, "<html>");

        let err = h.api.get("game/nfl").await.unwrap_err();
        assert!(matches!(err, YahooError::Json(_)));
    }

    #[tokio::test]
    async fn test_form_and_headers_are_forwarded() {
        let h = harness();
        h.transport.respond_content("team/nfl.l.1.t.1/roster", json!({}));

        let mut headers = HeaderMap::new();
        headers.insert("x-extra", "1".parse().unwrap());
        h.api
            .request(
                "team/nfl.l.1.t.1/roster",
                Method::PUT,
                &[("body", "<fantasy_content/>")],
                headers,
            )
            .await
            .unwrap();

        let request = &h.transport.requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.headers["x-extra"], "1");
        assert!(request.headers.contains_key(TOKEN_HEADER));
        assert_eq!(
            request.form,
            vec![("body".to_string(), "<fantasy_content/>".to_string())]
        );
    }
}

#[cfg(test)]
mod refresh_failure_tests {
    use super::*;
    use crate::{
        auth::MemoryCredentialStore,
        yahoo::testing::{ScriptedTransport, TEST_BASE},
    };
    use async_trait::async_trait;
    use std::{io, sync::Arc};

    /// Loads fine, refuses every save.
    struct ReadOnlyStore(MemoryCredentialStore);

    impl CredentialStore for ReadOnlyStore {
        fn load(&self) -> Result<Credentials> {
            self.0.load()
        }

        fn save(&self, _credentials: &Credentials) -> Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    /// Signs like the fake authorizer but cannot reach the token endpoint.
    struct OfflineAuthorizer(FakeAuthorizer);

    #[async_trait]
    impl Authorizer for OfflineAuthorizer {
        fn sign(&self, request: HttpRequest, credentials: &Credentials) -> Result<HttpRequest> {
            self.0.sign(request, credentials)
        }

        async fn register(&self, credentials: &Credentials) -> Result<Credentials> {
            self.0.register(credentials).await
        }

        async fn refresh(&self, _credentials: &Credentials) -> Result<Credentials> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "token endpoint down").into())
        }
    }

    fn build(
        store: Arc<dyn CredentialStore>,
        authorizer: Arc<dyn Authorizer>,
    ) -> (FantasyApi, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let api = FantasyApi::with_parts(
            ApiConfig::new(TEST_BASE).unwrap(),
            store,
            transport.clone(),
            authorizer,
        )
        .unwrap();
        (api, transport)
    }

    #[tokio::test]
    async fn test_unsaved_refresh_is_reported_but_token_is_kept() {
        let store = ReadOnlyStore(MemoryCredentialStore::new(signed_in()));
        let (api, transport) = build(Arc::new(store), Arc::new(FakeAuthorizer::new()));
        transport
            .respond("game/nfl", 401, UNAUTHORIZED)
            .respond_content("game/nfl", json!({"ok": 1}));

        let err = api.get("game/nfl").await.unwrap_err();

        match err {
            YahooError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("Expected Io error, got {other:?}"),
        }
        assert_eq!(
            api.credentials().oauth_access_token.as_deref(),
            Some("refreshed-1")
        );
        assert_eq!(transport.requests().len(), 1);

        // The next call signs with the refreshed token.
        let data = api.get("game/nfl").await.unwrap();
        assert_eq!(data, json!({"ok": 1}));
        assert_eq!(transport.requests()[1].headers[TOKEN_HEADER], "refreshed-1");
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint_is_not_retried() {
        let store = MemoryCredentialStore::new(signed_in());
        let authorizer = OfflineAuthorizer(FakeAuthorizer::new());
        let (api, transport) = build(Arc::new(store), Arc::new(authorizer));
        transport
            .respond("game/nfl", 401, UNAUTHORIZED)
            .respond_content("game/nfl", json!({"ok": 1}));

        let err = api.get("game/nfl").await.unwrap_err();

        match err {
            YahooError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionRefused),
            other => panic!("Expected Io error, got {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(
            api.credentials().oauth_access_token.as_deref(),
            Some("initial")
        );
    }
}

#[cfg(test)]
mod construction_tests {
    use super::*;
    use crate::{auth::MemoryCredentialStore, yahoo::testing::ScriptedTransport};
    use std::sync::Arc;

    #[test]
    fn test_missing_consumer_key_is_rejected() {
        let result = FantasyApi::with_parts(
            ApiConfig::new(crate::core::DEFAULT_BASE_URL).unwrap(),
            Arc::new(MemoryCredentialStore::new(Credentials::default())),
            Arc::new(ScriptedTransport::new()),
            Arc::new(FakeAuthorizer::new()),
        );

        assert!(matches!(result, Err(YahooError::Credentials { .. })));
    }

    #[test]
    fn test_debug_does_not_print_credentials() {
        let h = harness();
        let debug = format!("{:?}", h.api);
        assert!(debug.contains("FantasyApi"));
        assert!(!debug.contains("initial-secret"));
    }
}

#[cfg(test)]
mod error_message_tests {
    use super::*;

    #[test]
    fn test_description_is_extracted() {
        assert_eq!(error_message(UNAUTHORIZED), "Please provide valid credentials.");
    }

    #[test]
    fn test_falls_back_to_raw_body() {
        assert_eq!(error_message("Service Unavailable"), "Service Unavailable");
        assert_eq!(
            error_message(r#"{"error": {"code": 7}}"#),
            r#"{"error": {"code": 7}}"#
        );
    }
}

#[cfg(test)]
mod endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_games_decodes_user_games() {
        let h = harness();
        h.transport.respond_content(
            "users;use_login=1/games",
            json!({
                "users": {
                    "0": {"user": [
                        {"guid": "ABC"},
                        {"games": {
                            "0": {"game": [{
                                "game_key": "423", "game_id": "423", "name": "Football",
                                "code": "nfl", "type": "full", "season": "2023",
                                "is_game_over": 1, "is_offseason": 1
                            }]},
                            "1": {"game": [{
                                "game_key": "449", "game_id": "449", "name": "Football",
                                "code": "nfl", "type": "full", "season": "2024",
                                "is_game_over": 0, "is_offseason": 0
                            }]},
                            "count": 2
                        }}
                    ]},
                    "count": 1
                }
            }),
        );

        let games = h.api.get_games(false).await.unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_key.as_str(), "423");
        assert!(games[0].is_game_over);
        assert_eq!(games[1].season, 2024);
        assert!(!games[1].is_offseason);
    }

    #[tokio::test]
    async fn test_get_games_available_only_path() {
        let h = harness();
        h.transport.respond_content(
            "users;use_login=1/games;is_available=1",
            json!({"users": {"0": {"user": [{"guid": "ABC"}, {"games": {"count": 0}}]}, "count": 1}}),
        );

        let games = h.api.get_games(true).await.unwrap();

        assert!(games.is_empty());
        assert_eq!(
            h.transport.request_paths(),
            vec!["users;use_login=1/games;is_available=1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_get_league_and_team() {
        let h = harness();
        h.transport.respond_content(
            "league/nfl.l.1",
            json!({"league": [{
                "league_key": "nfl.l.1", "league_id": "1", "name": "Work League",
                "num_teams": 10, "current_week": "3", "is_finished": 0
            }]}),
        );
        h.transport.respond_content(
            "team/nfl.l.1.t.2",
            json!({"team": [[
                {"team_key": "nfl.l.1.t.2"},
                {"team_id": "2"},
                {"name": "Gridiron Gurus"},
                [],
                {"managers": [{"manager": {"manager_id": "2", "nickname": "Sam", "is_current_login": "1"}}]}
            ]]}),
        );

        let league = h.api.get_league(&LeagueKey::new("nfl.l.1")).await.unwrap();
        assert_eq!(league.name(), "Work League");
        assert_eq!(league.info.current_week, Some(3));
        assert!(!league.is_finished());

        let team = h.api.get_team(&TeamKey::new("nfl.l.1.t.2")).await.unwrap();
        assert_eq!(team.name(), "Gridiron Gurus");
        assert!(team.is_current_login());
    }

    #[tokio::test]
    async fn test_get_player() {
        let h = harness();
        h.transport.respond_content(
            "player/nfl.p.30123",
            json!({"player": [[
                {"player_key": "nfl.p.30123"},
                {"player_id": "30123"},
                {"name": {"full": "Patrick Mahomes", "first": "Patrick", "last": "Mahomes"}},
                {"display_position": "QB"},
                {"eligible_positions": [{"position": "QB"}]}
            ]]}),
        );

        let player = h
            .api
            .get_player(&PlayerKey::new("nfl.p.30123"))
            .await
            .unwrap();

        assert_eq!(player.full_name(), "Patrick Mahomes");
        assert_eq!(player.eligible_positions(), ["QB".to_string()]);
    }
}
