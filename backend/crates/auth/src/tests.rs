//! Scenario tests for the auth crate
//! In-memory repositories and cache; no database or Redis needed.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use kernel::id::UserId;
    use platform::cache::{Cache, MemoryCache};
    use platform::password::HashCost;

    use crate::application::{
        AuthConfig, AuthService, ClientInfo, LoginInput, LoginOutput, RegisterInput,
        SessionService,
    };
    use crate::infra::{MemorySessionRepository, MemoryUserRepository};

    pub const SECRET: &str = "scenario-test-secret";
    pub const PASSWORD: &str = "tr0ub4dor&3-bus";
    pub const CHROME_ON_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    pub type Service = AuthService<MemorySessionRepository, MemoryUserRepository, MemoryCache>;

    pub struct Harness {
        pub service: Service,
        pub sessions: Arc<MemorySessionRepository>,
        pub users: Arc<MemoryUserRepository>,
        pub cache: Cache<MemoryCache>,
        pub config: Arc<AuthConfig>,
    }

    pub fn harness() -> Harness {
        let mut config = AuthConfig::new(SECRET);
        config.hash_cost = HashCost::MINIMAL;
        let config = Arc::new(config);

        let sessions = Arc::new(MemorySessionRepository::new());
        let users = Arc::new(MemoryUserRepository::new());
        let cache = Cache::new(MemoryCache::new());

        let session_service = SessionService::new(
            sessions.clone(),
            users.clone(),
            cache.clone(),
            config.clone(),
        );
        let service = AuthService::new(session_service, sessions.clone(), users.clone(), config.clone());

        Harness {
            service,
            sessions,
            users,
            cache,
            config,
        }
    }

    pub fn register_input(username: &str, email: &str) -> RegisterInput {
        RegisterInput {
            name: "Ana Souza".into(),
            username: username.into(),
            email: email.into(),
            password: PASSWORD.into(),
            avatar_url: None,
        }
    }

    pub fn client() -> ClientInfo {
        ClientInfo {
            ip: "200.128.60.10".into(),
            user_agent: CHROME_ON_MAC.into(),
        }
    }

    impl Harness {
        /// Registered and activated user.
        pub async fn active_user(&self, username: &str, email: &str) -> UserId {
            let user_id = self
                .service
                .register(register_input(username, email))
                .await
                .unwrap();
            self.service.activate(&user_id).await.unwrap();
            user_id
        }

        pub async fn login(&self, email: &str) -> LoginOutput {
            self.service
                .login(
                    LoginInput {
                        email: email.into(),
                        password: PASSWORD.into(),
                    },
                    client(),
                )
                .await
                .unwrap()
        }
    }
}

#[cfg(test)]
mod registration_tests {
    use super::support::*;
    use crate::application::LoginInput;
    use crate::domain::repository::UserRepository;
    use crate::error::AuthError;
    use kernel::error::kind::ErrorKind;
    use kernel::error::tag::ErrorTag;

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let h = harness();
        h.service
            .register(register_input("ana", "a@x.com"))
            .await
            .unwrap();

        let err = h
            .service
            .register(register_input("bia", "A@X.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "e-mail already taken");
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let h = harness();
        h.service
            .register(register_input("ana", "a@x.com"))
            .await
            .unwrap();

        let err = h
            .service
            .register(register_input("ANA", "b@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_invalid_input_is_unprocessable() {
        let h = harness();

        let err = h
            .service
            .register(register_input("ana", "not-an-email"))
            .await
            .unwrap_err();
        assert_eq!(err.tag(), ErrorTag::InvalidEntity);
        assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);

        let mut input = register_input("ana", "a@x.com");
        input.password = "12345678".into();
        let err = h.service.register(input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);
    }

    #[tokio::test]
    async fn test_registered_user_starts_disabled_with_hashed_password() {
        let h = harness();
        let user_id = h
            .service
            .register(register_input("ana", "a@x.com"))
            .await
            .unwrap();

        let user = h.users.get_by_id(&user_id).await.unwrap().unwrap();
        assert!(!user.enabled);
        assert!(!user.locked);
        assert!(user.activated_at.is_none());
        assert!(user.password.as_phc_string().starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_activate_twice_is_expired() {
        let h = harness();
        let user_id = h
            .service
            .register(register_input("ana", "a@x.com"))
            .await
            .unwrap();

        h.service.activate(&user_id).await.unwrap();
        let err = h.service.activate(&user_id).await.unwrap_err();

        assert!(matches!(err, AuthError::ActivationExpired));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.tag(), ErrorTag::Expired);
    }

    #[tokio::test]
    async fn test_activate_unknown_user_is_not_found() {
        let h = harness();
        let err = h
            .service
            .activate(&kernel::id::UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_activation_unblocks_login() {
        let h = harness();
        let user_id = h
            .service
            .register(register_input("ana", "a@x.com"))
            .await
            .unwrap();

        let attempt = || {
            h.service.login(
                LoginInput {
                    email: "a@x.com".into(),
                    password: PASSWORD.into(),
                },
                client(),
            )
        };

        assert!(matches!(attempt().await, Err(AuthError::AccountDisabled)));
        h.service.activate(&user_id).await.unwrap();
        assert!(attempt().await.is_ok());
    }
}

#[cfg(test)]
mod login_tests {
    use super::support::*;
    use crate::application::LoginInput;
    use crate::domain::repository::{SessionRepository, UserRepository};
    use crate::error::AuthError;
    use kernel::error::kind::ErrorKind;
    use kernel::error::tag::ErrorTag;
    use platform::token;

    fn input(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let h = harness();
        h.active_user("ana", "a@x.com").await;

        let wrong = h
            .service
            .login(input("a@x.com", "not-the-password"), client())
            .await
            .unwrap_err();
        let unknown = h
            .service
            .login(input("nobody@x.com", PASSWORD), client())
            .await
            .unwrap_err();

        for err in [wrong, unknown] {
            assert!(matches!(err, AuthError::InvalidCredentials));
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
            assert_eq!(err.to_string(), "invalid credentials");
        }
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_email_still_run_a_hash_check() {
        let h = harness();
        assert!(!h.service.has_dummy_hash());

        let err = h
            .service
            .login(input("not-an-email", PASSWORD), client())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(h.service.has_dummy_hash());

        let err = h
            .service
            .login(input("nobody@x.com", PASSWORD), client())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_locked_and_disabled_have_distinct_reasons() {
        let h = harness();
        let locked_id = h.active_user("ana", "a@x.com").await;
        h.service
            .register(register_input("bia", "b@x.com"))
            .await
            .unwrap();

        let mut user = h.users.get_by_id(&locked_id).await.unwrap().unwrap();
        user.lock();
        h.users.update(&user).await.unwrap();

        let locked = h
            .service
            .login(input("a@x.com", PASSWORD), client())
            .await
            .unwrap_err();
        let disabled = h
            .service
            .login(input("b@x.com", PASSWORD), client())
            .await
            .unwrap_err();

        assert_eq!(locked.kind(), ErrorKind::Unauthorized);
        assert_eq!(locked.tag(), ErrorTag::LockedUser);
        assert_eq!(disabled.kind(), ErrorKind::Unauthorized);
        assert_eq!(disabled.tag(), ErrorTag::DisabledUser);
        assert_ne!(locked.to_string(), disabled.to_string());
    }

    #[tokio::test]
    async fn test_locked_user_with_wrong_password_gets_invalid_credentials() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        let mut user = h.users.get_by_id(&user_id).await.unwrap().unwrap();
        user.lock();
        h.users.update(&user).await.unwrap();

        let err = h
            .service
            .login(input("a@x.com", "not-the-password"), client())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_issues_tokens_and_session() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;

        let out = h.login("a@x.com").await;

        let access = token::verify(&h.config.jwt_secret, &out.access_token).unwrap();
        let refresh = token::verify(&h.config.jwt_secret, &out.refresh_token).unwrap();
        assert_eq!(access.user_id(), user_id.as_str());
        assert_eq!(refresh.user_id(), user_id.as_str());
        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(refresh.exp - refresh.iat, 30 * 24 * 3600);

        let session = h.sessions.get_by_id(&out.session_id).await.unwrap().unwrap();
        assert!(session.active);
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.refresh_token, out.refresh_token);
        assert_eq!(session.agent, "Chrome on macOS");
        assert_eq!(session.ip, "200.128.60.10");

        let key = format!("sess:{user_id}");
        assert!(h.cache.has(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_login_leaves_exactly_one_active_session() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;

        let first = h.login("a@x.com").await;
        let second = h.login("a@x.com").await;

        assert_eq!(h.sessions.count_active(&user_id).await, 1);
        let active = h
            .sessions
            .get_active_by_user_id(&user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.id, second.session_id);

        let old = h.sessions.get_by_id(&first.session_id).await.unwrap().unwrap();
        assert!(!old.active);

        let cached = h
            .service
            .sessions()
            .get_session_by_user_id(&user_id)
            .await
            .unwrap();
        assert_eq!(cached.id, second.session_id);
    }

    #[tokio::test]
    async fn test_unknown_agent_is_described() {
        let h = harness();
        h.active_user("ana", "a@x.com").await;

        let mut info = client();
        info.user_agent = String::new();
        let out = h
            .service
            .login(input("a@x.com", PASSWORD), info)
            .await
            .unwrap();

        let session = h.sessions.get_by_id(&out.session_id).await.unwrap().unwrap();
        assert_eq!(session.agent, platform::client::UNKNOWN_AGENT);
    }
}

#[cfg(test)]
mod session_tests {
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};
    use kernel::id::UserId;
    use platform::token;

    use super::support::*;
    use crate::application::AuthUser;
    use crate::domain::entity::{Session, SessionSummary};
    use crate::domain::repository::SessionRepository;
    use crate::error::AuthError;
    use kernel::error::kind::ErrorKind;
    use kernel::error::tag::ErrorTag;

    #[tokio::test]
    async fn test_renew_issues_access_token_only() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        let out = h.login("a@x.com").await;

        let renewed = h
            .service
            .sessions()
            .renew_access_token(&out.refresh_token)
            .await
            .unwrap();

        let claims = token::verify(&h.config.jwt_secret, &renewed.access_token).unwrap();
        assert_eq!(claims.user_id(), user_id.as_str());
        assert_eq!(claims.expires_at(), Some(renewed.access_token_expires_at));

        // Not rotated
        let session = h.sessions.get_by_id(&out.session_id).await.unwrap().unwrap();
        assert_eq!(session.refresh_token, out.refresh_token);
        assert!(session.active);
    }

    #[tokio::test]
    async fn test_renew_rejects_mismatched_owner() {
        let h = harness();
        let owner = h.active_user("ana", "a@x.com").await;
        let intruder = UserId::new();

        let (refresh, _) =
            token::generate(SECRET, intruder.as_str(), h.config.refresh_token_ttl).unwrap();
        let session = Session::new(owner, "10.0.0.1", "Firefox on Linux", refresh.clone()).unwrap();
        h.sessions.insert(&session).await.unwrap();

        let err = h
            .service
            .sessions()
            .renew_access_token(&refresh)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserMismatch));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.to_string(), "unauthorized user");
    }

    #[tokio::test]
    async fn test_renew_rejects_expired_session_with_live_token() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;

        let (refresh, _) =
            token::generate(SECRET, user_id.as_str(), h.config.refresh_token_ttl).unwrap();
        let mut session =
            Session::new(user_id, "10.0.0.1", "Firefox on Linux", refresh.clone()).unwrap();
        session.expires_at = Utc::now() - Duration::seconds(1);
        h.sessions.insert(&session).await.unwrap();

        let err = h
            .service
            .sessions()
            .renew_access_token(&refresh)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionExpired));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.to_string(), "session has expired");
    }

    #[tokio::test]
    async fn test_renew_rejects_unknown_and_garbage_tokens() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        let (orphan, _) =
            token::generate(SECRET, user_id.as_str(), h.config.refresh_token_ttl).unwrap();

        for presented in [orphan.as_str(), "garbage"] {
            let err = h
                .service
                .sessions()
                .renew_access_token(presented)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::InvalidRefreshToken), "{presented}");
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
        }
    }

    #[tokio::test]
    async fn test_renew_after_logout_is_rejected() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        let out = h.login("a@x.com").await;

        h.service
            .logout(Some(&AuthUser::new(user_id)))
            .await
            .unwrap();

        let err = h
            .service
            .sessions()
            .renew_access_token(&out.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn test_cached_session_past_expiry_is_rejected() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        h.login("a@x.com").await;

        let key = format!("sess:{user_id}");
        let mut stale: SessionSummary = h.cache.get_struct(&key).await.unwrap();
        stale.expires_at = Utc::now() - Duration::seconds(1);
        h.cache
            .set_struct(&key, &stale, StdDuration::from_secs(60))
            .await
            .unwrap();

        let err = h
            .service
            .sessions()
            .get_session_by_user_id(&user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionExpired));
        assert_eq!(err.tag(), ErrorTag::Expired);
    }

    #[tokio::test]
    async fn test_session_read_falls_back_and_repopulates() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        let out = h.login("a@x.com").await;

        let key = format!("sess:{user_id}");
        h.cache.delete(&[key.clone()]).await.unwrap();

        let summary = h
            .service
            .sessions()
            .get_session_by_user_id(&user_id)
            .await
            .unwrap();
        assert_eq!(summary.id, out.session_id);
        assert!(h.cache.has(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_session_read_ignores_undecodable_cache_entry() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        let out = h.login("a@x.com").await;

        let key = format!("sess:{user_id}");
        h.cache
            .set(&key, b"{broken".to_vec(), StdDuration::from_secs(60))
            .await
            .unwrap();

        let summary = h
            .service
            .sessions()
            .get_session_by_user_id(&user_id)
            .await
            .unwrap();
        assert_eq!(summary.id, out.session_id);
    }

    #[tokio::test]
    async fn test_session_read_without_session_is_not_found() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;

        let err = h
            .service
            .sessions()
            .get_session_by_user_id(&user_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_session_for_unknown_user_is_not_found() {
        let h = harness();
        let err = h
            .service
            .sessions()
            .create_session(&UserId::new(), "10.0.0.1", CHROME_ON_MAC, "rt")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        let caller = AuthUser::new(user_id);

        let none = h
            .service
            .sessions()
            .get_all_sessions(Some(&caller))
            .await
            .unwrap();
        assert!(none.is_empty());

        let first = h.login("a@x.com").await;
        tokio::time::sleep(StdDuration::from_millis(5)).await;
        let second = h.login("a@x.com").await;

        let all = h
            .service
            .sessions()
            .get_all_sessions(Some(&caller))
            .await
            .unwrap();
        let ids: Vec<_> = all.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![second.session_id, first.session_id]);

        let err = h.service.sessions().get_all_sessions(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}

#[cfg(test)]
mod logout_tests {
    use super::support::*;
    use crate::application::AuthUser;
    use crate::error::AuthError;
    use kernel::error::kind::ErrorKind;
    use kernel::id::UserId;

    #[tokio::test]
    async fn test_logout_without_caller_is_unauthorized() {
        let h = harness();
        let err = h.service.logout(None).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_logout_without_active_session_is_not_found() {
        let h = harness();
        let caller = AuthUser::new(UserId::new());
        let err = h.service.logout(Some(&caller)).await.unwrap_err();
        assert!(matches!(err, AuthError::ActiveSessionNotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_logout_deactivates_and_drops_cache() {
        let h = harness();
        let user_id = h.active_user("ana", "a@x.com").await;
        h.login("a@x.com").await;
        let key = format!("sess:{user_id}");
        assert!(h.cache.has(&key).await.unwrap());

        let caller = AuthUser::new(user_id.clone());
        h.service.logout(Some(&caller)).await.unwrap();

        assert_eq!(h.sessions.count_active(&user_id).await, 0);
        assert!(!h.cache.has(&key).await.unwrap());

        let err = h.service.logout(Some(&caller)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[cfg(test)]
mod signed_user_tests {
    use super::support::*;
    use crate::application::AuthUser;
    use crate::domain::entity::UserSummary;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_signed_user_is_cached_and_activation_invalidates() {
        let h = harness();
        let user_id = h
            .service
            .register(register_input("ana", "a@x.com"))
            .await
            .unwrap();
        let caller = AuthUser::new(user_id.clone());
        let key = format!("user:{user_id}");

        let before = h.service.get_signed_user(Some(&caller)).await.unwrap();
        assert!(!before.enabled);
        let cached: UserSummary = h.cache.get_struct(&key).await.unwrap();
        assert_eq!(cached, before);

        h.service.activate(&user_id).await.unwrap();
        assert!(!h.cache.has(&key).await.unwrap());

        let after = h.service.get_signed_user(Some(&caller)).await.unwrap();
        assert!(after.enabled);
        assert_eq!(after.username, "ana");
    }

    #[tokio::test]
    async fn test_signed_user_requires_caller() {
        let h = harness();
        assert!(matches!(
            h.service.get_signed_user(None).await,
            Err(AuthError::Unauthenticated)
        ));
    }
}

#[cfg(test)]
mod unavailable_cache_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use platform::cache::{Cache, CacheError, CacheResult, CacheStore};
    use platform::password::HashCost;

    use super::support::{PASSWORD, SECRET, client, register_input};
    use crate::application::{AuthConfig, AuthService, AuthUser, LoginInput, SessionService};
    use crate::infra::{MemorySessionRepository, MemoryUserRepository};

    /// Every call fails, like a Redis that went away.
    struct DownCache;

    fn down() -> CacheError {
        CacheError::Serialization(serde_json::from_str::<()>("down").unwrap_err())
    }

    impl CacheStore for DownCache {
        async fn get(&self, _key: &str) -> CacheResult<Vec<u8>> {
            Err(down())
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
            Err(down())
        }

        async fn has(&self, _key: &str) -> CacheResult<bool> {
            Err(down())
        }

        async fn delete(&self, _keys: &[String]) -> CacheResult<()> {
            Err(down())
        }

        async fn keys(&self, _pattern: &str) -> CacheResult<Vec<String>> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn test_every_flow_survives_a_failing_cache() {
        let mut config = AuthConfig::new(SECRET);
        config.hash_cost = HashCost::MINIMAL;
        let config = Arc::new(config);
        let sessions = Arc::new(MemorySessionRepository::new());
        let users = Arc::new(MemoryUserRepository::new());
        let session_service = SessionService::new(
            sessions.clone(),
            users.clone(),
            Cache::new(DownCache),
            config.clone(),
        );
        let service = AuthService::new(session_service, sessions.clone(), users, config);

        let user_id = service
            .register(register_input("ana", "a@x.com"))
            .await
            .unwrap();
        service.activate(&user_id).await.unwrap();

        let login = service
            .login(
                LoginInput {
                    email: "a@x.com".into(),
                    password: PASSWORD.into(),
                },
                client(),
            )
            .await
            .unwrap();

        let session = service
            .sessions()
            .get_session_by_user_id(&user_id)
            .await
            .unwrap();
        assert_eq!(session.id, login.session_id);
        assert!(session.active);

        let caller = AuthUser::new(user_id.clone());
        let user = service.get_signed_user(Some(&caller)).await.unwrap();
        assert_eq!(user.username, "ana");
        assert!(user.enabled);

        service.logout(Some(&caller)).await.unwrap();
        assert_eq!(sessions.count_active(&user_id).await, 0);
    }
}

#[cfg(test)]
mod http_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::*;
    use crate::presentation::{AccessTokenVerifier, auth_router, session_router};

    fn app(h: &Harness) -> Router {
        let verifier = AccessTokenVerifier::new(&h.config);
        Router::new()
            .nest("/auth", auth_router(h.service.clone(), verifier.clone()))
            .nest("/sessions", session_router(h.service.clone(), verifier))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, CHROME_ON_MAC)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_flow_over_http() {
        let h = harness();
        let app = app(&h);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/auth/register",
                json!({
                    "name": "Ana Souza",
                    "username": "ana",
                    "email": "a@x.com",
                    "password": PASSWORD,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let user_id = body["user_id"].as_str().unwrap().to_string();

        let activate = Request::builder()
            .uri(format!("/auth/activate/{user_id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, activate).await;
        assert_eq!(status, StatusCode::OK);

        let (status, login) = send(
            &app,
            json_request(
                "POST",
                "/auth/login",
                json!({ "email": "a@x.com", "password": PASSWORD }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = login["access_token"].as_str().unwrap().to_string();
        let refresh = login["refresh_token"].as_str().unwrap().to_string();
        assert!(login["session_id"].as_str().unwrap().starts_with("sess_"));

        let (status, me) = send(&app, authed("GET", "/auth/me", &access)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "ana");
        assert!(me.get("password").is_none());

        let (status, sessions) = send(&app, authed("GET", "/sessions", &access)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sessions.as_array().unwrap().len(), 1);

        let (status, current) = send(&app, authed("GET", "/sessions/me", &access)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(current["id"], login["session_id"]);

        let (status, renewed) = send(
            &app,
            json_request("POST", "/sessions/refresh", json!({ "refresh_token": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(renewed["access_token"].is_string());
        assert!(renewed["access_token_expires"].is_string());

        let (status, _) = send(&app, authed("PATCH", "/auth/logout", &access)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            json_request("POST", "/sessions/refresh", json!({ "refresh_token": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "invalid refresh token");
    }

    #[tokio::test]
    async fn test_protected_routes_reject_missing_and_bad_tokens() {
        let h = harness();
        let app = app(&h);

        let bare = Request::builder().uri("/auth/me").body(Body::empty()).unwrap();
        let (status, body) = send(&app, bare).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
        assert_eq!(body["tag"], "UNAUTHORIZED");
        assert_eq!(body["message"], "access token not provided");

        let (status, body) = send(&app, authed("GET", "/sessions", "nonsense")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "invalid access token");
    }

    #[tokio::test]
    async fn test_error_bodies_carry_tags() {
        let h = harness();
        let app = app(&h);

        let register = json!({
            "name": "Ana Souza",
            "username": "ana",
            "email": "a@x.com",
            "password": PASSWORD,
        });
        send(&app, json_request("POST", "/auth/register", register.clone())).await;
        let (status, body) = send(&app, json_request("POST", "/auth/register", register)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["tag"], "CONFLICT");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/auth/login",
                json!({ "email": "a@x.com", "password": PASSWORD }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["tag"], "DISABLED_USER");

        let bad_id = Request::builder()
            .uri("/auth/activate/not-an-id")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, bad_id).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
