use serde::Serialize;

use super::{Action, Change};
use crate::models::{LikeNotification, NotificationKind};

/// Pending like notifications, most recent last
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationState {
    pub items: Vec<LikeNotification>,
}

impl NotificationState {
    pub fn unread_count(&self) -> usize {
        self.items.len()
    }
}

pub(super) fn reduce(state: &mut NotificationState, action: Action) -> Option<Change> {
    match action {
        Action::LikeNotificationReceived(notification) => match notification.kind {
            NotificationKind::Like => {
                state.items.push(notification);
                Some(Change::Notifications)
            }
            // A dislike retracts the matching pending like and is never listed itself
            NotificationKind::Dislike => {
                let before = state.items.len();
                state.items.retain(|n| {
                    !(n.kind == NotificationKind::Like && n.same_subject(&notification))
                });
                (state.items.len() != before).then_some(Change::Notifications)
            }
        },
        Action::NotificationsAcknowledged(ids) => {
            let before = state.items.len();
            state.items.retain(|n| !ids.contains(&n.id));
            (state.items.len() != before).then_some(Change::Notifications)
        }
        Action::NotificationsCleared => {
            if state.items.is_empty() {
                return None;
            }
            state.items.clear();
            Some(Change::Notifications)
        }
        _ => None,
    }
}
