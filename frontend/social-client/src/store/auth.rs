use serde::Serialize;

use super::{Action, Change};
use crate::models::{Session, UserSummary};

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthState {
    pub session: Option<Session>,
    /// Counterpart of the open chat thread
    pub selected_user: Option<UserSummary>,
    pub suggested_users: Vec<UserSummary>,
}

pub(super) fn reduce(state: &mut AuthState, action: Action) -> Option<Change> {
    match action {
        Action::SetSession(session) => {
            if state.session == session {
                return None;
            }
            state.session = session;
            Some(Change::Session)
        }
        Action::SelectUser(user) => {
            if state.selected_user == user {
                return None;
            }
            state.selected_user = user;
            Some(Change::SelectedUser)
        }
        Action::SetSuggestedUsers(users) => {
            state.suggested_users = users;
            Some(Change::SuggestedUsers)
        }
        _ => None,
    }
}
