//! Stores shared across screens. They are plain values owned by the caller
//! and handed to whatever needs them.

use std::collections::BTreeSet;

use api_types::user::User;
use uuid::Uuid;

use crate::{Client, ClientError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
    Error,
}

/// Who is logged in, as last reported by the server.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    status: AuthStatus,
    user: Option<User>,
}

impl AuthState {
    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn on_login(&mut self, user: User) {
        self.user = Some(user);
        self.status = AuthStatus::Authenticated;
    }

    pub fn on_logout(&mut self) {
        self.user = None;
        self.status = AuthStatus::Unauthenticated;
    }

    /// Applies the outcome of a `user/me` call. A 401 means logged out, any
    /// other failure leaves the user in place and flags the error.
    pub fn on_me(&mut self, result: Result<User, ClientError>) {
        match result {
            Ok(user) => self.on_login(user),
            Err(err) if err.needs_login() => self.on_logout(),
            Err(err) => {
                tracing::warn!("could not load current user: {err:?}");
                self.status = AuthStatus::Error;
            }
        }
    }

    pub async fn refresh(&mut self, client: &Client) {
        let result = client.me().await;
        self.on_me(result);
    }
}

/// Rows picked in the transaction table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    rows: BTreeSet<Uuid>,
}

impl Selection {
    pub fn set(&mut self, id: Uuid, selected: bool) {
        if selected {
            self.rows.insert(id);
        } else {
            self.rows.remove(&id);
        }
    }

    pub fn toggle(&mut self, id: Uuid) {
        let selected = !self.rows.contains(&id);
        self.set(id, selected);
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.rows.extend(ids);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Drops ids that are no longer listed, e.g. after a reload.
    pub fn retain_listed(&mut self, listed: &[Uuid]) {
        self.rows.retain(|id| listed.contains(id));
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.rows.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.rows.iter().copied().collect()
    }

    /// Deletes the selected rows and clears the selection on success.
    pub async fn delete_selected(&mut self, client: &Client) -> Result<(), ClientError> {
        if self.rows.is_empty() {
            return Ok(());
        }
        client.delete_transactions(&self.ids()).await?;
        self.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "user".to_string(),
        }
    }

    #[test]
    fn auth_starts_loading() {
        let auth = AuthState::default();
        assert_eq!(auth.status(), AuthStatus::Loading);
        assert!(auth.user().is_none());
    }

    #[test]
    fn me_result_drives_status() {
        let mut auth = AuthState::default();
        let user = user();

        auth.on_me(Ok(user.clone()));
        assert_eq!(auth.status(), AuthStatus::Authenticated);
        assert_eq!(auth.user(), Some(&user));

        auth.on_me(Err(ClientError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal error".to_string(),
        }));
        assert_eq!(auth.status(), AuthStatus::Error);
        assert_eq!(auth.user(), Some(&user));

        auth.on_me(Err(ClientError::Unauthorized));
        assert_eq!(auth.status(), AuthStatus::Unauthenticated);
        assert!(auth.user().is_none());
    }

    #[test]
    fn selection_tracks_rows() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::default();

        selection.toggle(a);
        selection.set(b, true);
        assert_eq!(selection.len(), 2);
        assert!(selection.is_selected(a));

        selection.toggle(a);
        assert!(!selection.is_selected(a));

        selection.select_all([a, c]);
        selection.retain_listed(&[a, b]);
        assert_eq!(selection.len(), 2);
        assert!(!selection.is_selected(c));

        selection.clear();
        assert!(selection.is_empty());
    }
}
