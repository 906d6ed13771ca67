use serde::Serialize;

use super::{Action, Change};
use crate::models::{Post, PostId};

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostState {
    /// Feed order, newest first
    pub posts: Vec<Post>,
    pub selected_post: Option<PostId>,
}

impl PostState {
    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    pub fn selected(&self) -> Option<&Post> {
        self.selected_post.as_deref().and_then(|id| self.get(id))
    }

    fn get_mut(&mut self, post_id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == post_id)
    }
}

fn set_membership(list: &mut Vec<String>, user_id: &str, present: bool) -> bool {
    let has = list.iter().any(|id| id == user_id);
    match (has, present) {
        (false, true) => {
            list.push(user_id.to_string());
            true
        }
        (true, false) => {
            list.retain(|id| id != user_id);
            true
        }
        _ => false,
    }
}

pub(super) fn reduce(state: &mut PostState, action: Action) -> Option<Change> {
    match action {
        Action::SetPosts(posts) => {
            state.posts = posts;
            if state.selected().is_none() {
                state.selected_post = None;
            }
            Some(Change::Posts)
        }
        Action::PostAdded(post) => {
            state.posts.retain(|p| p.id != post.id);
            state.posts.insert(0, post);
            Some(Change::Posts)
        }
        Action::PostDeleted(post_id) => {
            let before = state.posts.len();
            state.posts.retain(|p| p.id != post_id);
            let deselected = state.selected_post.as_deref() == Some(post_id.as_str());
            if deselected {
                state.selected_post = None;
            }

            if state.posts.len() != before {
                Some(Change::Posts)
            } else if deselected {
                Some(Change::SelectedPost)
            } else {
                None
            }
        }
        Action::SelectPost(post_id) => {
            if state.selected_post == post_id {
                return None;
            }
            state.selected_post = post_id;
            Some(Change::SelectedPost)
        }
        Action::PostLikeSet {
            post_id,
            user_id,
            liked,
        } => {
            let post = state.get_mut(&post_id)?;
            set_membership(&mut post.likes, &user_id, liked).then_some(Change::Posts)
        }
        Action::PostBookmarkSet {
            post_id,
            user_id,
            bookmarked,
        } => {
            let post = state.get_mut(&post_id)?;
            set_membership(&mut post.bookmarks, &user_id, bookmarked).then_some(Change::Posts)
        }
        Action::CommentAdded { post_id, comment } => {
            let post = state.get_mut(&post_id)?;
            if post.comments.iter().any(|c| c.id == comment.id) {
                return None;
            }
            post.comments.push(comment);
            Some(Change::Posts)
        }
        _ => None,
    }
}
