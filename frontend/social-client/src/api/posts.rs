use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Ack, ApiClient};
use crate::error::Result;
use crate::models::{Comment, ImageUpload, LikeAction, Post};

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub comment: Comment,
}

#[derive(Debug, Deserialize)]
pub struct PostBody {
    pub post: Post,
}

impl ApiClient {
    /// GET `/api/v1/post/{post_id}/like` or `/dislike`
    pub async fn set_like(&self, post_id: &str, action: LikeAction) -> Result<Option<String>> {
        let request = self
            .get(&["api", "v1", "post", post_id, action.as_path()])?;
        let envelope = self.execute::<Ack>(request).await?;
        Ok(envelope.message)
    }

    /// POST `/api/v1/post/{post_id}/comment`
    pub async fn add_comment(&self, post_id: &str, text: &str) -> Result<Comment> {
        let request = self
            .post(&["api", "v1", "post", post_id, "comment"])?
            .json(&CommentRequest { text });
        let envelope = self.execute::<CommentBody>(request).await?;
        Ok(envelope.data.comment)
    }

    /// GET `/api/v1/post/{post_id}/bookmark`; the backend toggles
    pub async fn toggle_bookmark(&self, post_id: &str) -> Result<Option<String>> {
        let request = self.get(&["api", "v1", "post", post_id, "bookmark"])?;
        let envelope = self.execute::<Ack>(request).await?;
        Ok(envelope.message)
    }

    /// POST `/api/v1/post/addpost` as multipart `caption` + `image`
    pub async fn create_post(&self, caption: &str, image: Option<ImageUpload>) -> Result<Post> {
        let mut form = Form::new().text("caption", caption.to_string());
        if let Some(image) = image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(image.content_type.as_ref())?;
            form = form.part("image", part);
        }

        let request = self.post(&["api", "v1", "post", "addpost"])?.multipart(form);
        let envelope = self.execute::<PostBody>(request).await?;
        info!(post_id = %envelope.data.post.id, "Post created");
        Ok(envelope.data.post)
    }

    /// DELETE `/api/v1/post/delete/{post_id}`
    pub async fn delete_post(&self, post_id: &str) -> Result<Option<String>> {
        let request = self.delete(&["api", "v1", "post", "delete", post_id])?;
        let envelope = self.execute::<Ack>(request).await?;
        Ok(envelope.message)
    }
}
