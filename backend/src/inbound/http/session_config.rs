//! Session cookie configuration.
//!
//! Loads the signing key named by the server settings and builds the
//! cookie-backed session middleware carrying the principal claims.

use std::path::{Path, PathBuf};

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use tracing::warn;

/// Minimum key material accepted by the cookie signer.
const SESSION_KEY_MIN_LEN: usize = 32;
/// Release builds demand a longer key.
const RELEASE_SESSION_KEY_MIN_LEN: usize = 64;
const SESSION_COOKIE_NAME: &str = "session";
const SESSION_TTL_HOURS: i64 = 2;

/// Build mode for session key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to an ephemeral key when the file is missing.
    Debug,
    /// Release builds require a readable key of full length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use restaurants::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn min_key_len(self) -> usize {
        match self {
            Self::Debug => SESSION_KEY_MIN_LEN,
            Self::Release => RELEASE_SESSION_KEY_MIN_LEN,
        }
    }
}

/// Errors raised while loading the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short for the build mode.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Read and derive the session signing key from `path`.
///
/// # Errors
/// Release builds fail when the file is unreadable; any build fails when the
/// key material is shorter than the mode's minimum.
pub fn load_session_key(path: &Path, mode: BuildMode) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let min_len = mode.min_key_len();
            if bytes.len() < min_len {
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length: bytes.len(),
                    min_len,
                });
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(error) if mode == BuildMode::Debug => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

/// Build the private cookie session middleware.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(CookieDuration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}
