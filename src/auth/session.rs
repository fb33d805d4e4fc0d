use std::sync::RwLock;

use rusqlite::Connection;
use serde::Serialize;
use tokio::sync::watch;

use crate::db::queries::{
    clear_session, get_session_value, remove_session_value, set_session_value, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthState {
    LoggedIn,
    LoggedOut,
}

#[derive(Debug, Clone, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Process-wide session: tokens persisted in the local store plus a change
/// feed every open view can subscribe to. A logout in one view reaches all
/// subscribers through the feed.
#[derive(Debug)]
pub struct SessionStore {
    tokens: RwLock<Tokens>,
    state_tx: watch::Sender<AuthState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        let (state_tx, _) = watch::channel(AuthState::LoggedOut);
        SessionStore {
            tokens: RwLock::new(Tokens::default()),
            state_tx,
        }
    }
}

impl SessionStore {
    /// Restore tokens saved by a previous run.
    pub fn load(conn: &Connection) -> Result<Self, rusqlite::Error> {
        let store = SessionStore::default();
        let access = get_session_value(conn, ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty());
        let refresh = get_session_value(conn, REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty());
        store.replace(Tokens { access, refresh });
        Ok(store)
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh
    }

    pub fn has_token(&self) -> bool {
        self.read().access.is_some()
    }

    pub fn state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// Record a successful login. A refresh token is only stored when given.
    pub fn login(
        &self,
        conn: &Connection,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), rusqlite::Error> {
        set_session_value(conn, ACCESS_TOKEN_KEY, access_token)?;
        if let Some(refresh) = refresh_token {
            set_session_value(conn, REFRESH_TOKEN_KEY, refresh)?;
        }

        let mut tokens = self.read();
        tokens.access = Some(access_token.to_string());
        if let Some(refresh) = refresh_token {
            tokens.refresh = Some(refresh.to_string());
        }
        self.replace(tokens);
        Ok(())
    }

    /// Drop the access token only, as after a failed token validation.
    pub fn clear_access_token(&self, conn: &Connection) -> Result<(), rusqlite::Error> {
        remove_session_value(conn, ACCESS_TOKEN_KEY)?;
        let mut tokens = self.read();
        tokens.access = None;
        self.replace(tokens);
        Ok(())
    }

    /// Forget everything; subscribers observe `LoggedOut`.
    pub fn clear(&self, conn: &Connection) -> Result<(), rusqlite::Error> {
        clear_session(conn)?;
        self.replace(Tokens::default());
        Ok(())
    }

    fn read(&self) -> Tokens {
        match self.tokens.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, tokens: Tokens) {
        let next = if tokens.access.is_some() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        };
        match self.tokens.write() {
            Ok(mut guard) => *guard = tokens,
            Err(poisoned) => *poisoned.into_inner() = tokens,
        }
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}
