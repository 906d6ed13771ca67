use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{normalize_text, Comment, ImageUpload, LikeAction, Post, PostId};
use crate::store::{Action, Store};

/// Post interactions: likes, comments, bookmarks, create and delete
#[derive(Clone)]
pub struct PostService {
    api: ApiClient,
    store: Store,
}

impl PostService {
    pub fn new(api: ApiClient, store: Store) -> Self {
        Self { api, store }
    }

    pub fn set_posts(&self, posts: Vec<Post>) {
        self.store.dispatch(Action::SetPosts(posts));
    }

    pub fn select_post(&self, post_id: Option<PostId>) {
        self.store.dispatch(Action::SelectPost(post_id));
    }

    fn session_user_id(&self) -> Result<String> {
        self.store.session_user_id().ok_or(ClientError::NoSession)
    }

    fn post(&self, post_id: &str) -> Result<Post> {
        self.store
            .select(|s| s.posts.get(post_id).cloned())
            .ok_or_else(|| ClientError::Validation(format!("unknown post {post_id}")))
    }

    /// Like when not yet liked by the session user, otherwise dislike.
    /// Returns the new liked state.
    pub async fn toggle_like(&self, post_id: &str) -> Result<bool> {
        let user_id = self.session_user_id()?;
        let action = LikeAction::toggle_from(self.post(post_id)?.is_liked_by(&user_id));

        if let Err(e) = self.api.set_like(post_id, action).await {
            error!(post_id, action = action.as_path(), error = %e, "Failed to update like");
            return Err(e);
        }

        let liked = action == LikeAction::Like;
        self.store.dispatch(Action::PostLikeSet {
            post_id: post_id.to_string(),
            user_id,
            liked,
        });
        Ok(liked)
    }

    /// Comment text follows the same normalization as direct messages
    pub async fn add_comment(&self, post_id: &str, text: &str) -> Result<Option<Comment>> {
        let Some(text) = normalize_text(text) else {
            debug!(post_id, "Empty comment not sent");
            return Ok(None);
        };

        let comment = match self.api.add_comment(post_id, &text).await {
            Ok(comment) => comment,
            Err(e) => {
                error!(post_id, error = %e, "Failed to add comment");
                return Err(e);
            }
        };

        self.store.dispatch(Action::CommentAdded {
            post_id: post_id.to_string(),
            comment: comment.clone(),
        });
        Ok(Some(comment))
    }

    /// Returns whether the post is bookmarked afterwards
    pub async fn toggle_bookmark(&self, post_id: &str) -> Result<bool> {
        let user_id = self.session_user_id()?;
        let bookmarked = !self.post(post_id)?.is_bookmarked_by(&user_id);

        if let Err(e) = self.api.toggle_bookmark(post_id).await {
            error!(post_id, error = %e, "Failed to toggle bookmark");
            return Err(e);
        }

        self.store.dispatch(Action::PostBookmarkSet {
            post_id: post_id.to_string(),
            user_id,
            bookmarked,
        });
        Ok(bookmarked)
    }

    pub async fn create_post(&self, caption: &str, image: Option<ImageUpload>) -> Result<Post> {
        self.session_user_id()?;

        let post = match self.api.create_post(caption, image).await {
            Ok(post) => post,
            Err(e) => {
                error!(error = %e, "Failed to create post");
                return Err(e);
            }
        };

        self.store.dispatch(Action::PostAdded(post.clone()));
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        if let Err(e) = self.api.delete_post(post_id).await {
            error!(post_id, error = %e, "Failed to delete post");
            return Err(e);
        }

        self.store.dispatch(Action::PostDeleted(post_id.to_string()));
        info!(post_id, "Post deleted");
        Ok(())
    }
}
