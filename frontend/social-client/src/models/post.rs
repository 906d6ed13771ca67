use serde::{Deserialize, Serialize};

use super::{PostId, UserId, UserSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: PostId,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub image: Option<String>,
    pub author: UserSummary,
    #[serde(default)]
    pub likes: Vec<UserId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub bookmarks: Vec<UserId>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    pub fn is_bookmarked_by(&self, user_id: &str) -> bool {
        self.bookmarks.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub author: UserSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Dislike,
}

impl LikeAction {
    /// Action that flips the current state
    pub fn toggle_from(currently_liked: bool) -> Self {
        if currently_liked {
            LikeAction::Dislike
        } else {
            LikeAction::Like
        }
    }

    pub fn as_path(&self) -> &'static str {
        match self {
            LikeAction::Like => "like",
            LikeAction::Dislike => "dislike",
        }
    }
}

/// Image attached to a new post; passed through to the backend as-is
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: mime::Mime,
}

impl ImageUpload {
    /// Content type is derived from the file extension
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_image_mime(&file_name);
        Self {
            file_name,
            bytes,
            content_type,
        }
    }
}

fn guess_image_mime(file_name: &str) -> mime::Mime {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp"
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_wire_shape() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "caption": "sunset",
            "image": "https://cdn.example.com/p1.jpg",
            "author": {"_id": "u1", "username": "alice", "profilePicture": null},
            "likes": ["u2"],
            "comments": [{"_id": "c1", "text": "nice", "author": {"_id": "u2", "username": "bob"}}]
        }))
        .unwrap();

        assert!(post.is_liked_by("u2"));
        assert!(!post.is_bookmarked_by("u2"));
        assert_eq!(post.comments[0].author.username, "bob");
    }

    #[test]
    fn test_like_action_toggles() {
        assert_eq!(LikeAction::toggle_from(false).as_path(), "like");
        assert_eq!(LikeAction::toggle_from(true).as_path(), "dislike");
    }

    #[test]
    fn test_upload_mime_from_extension() {
        assert_eq!(ImageUpload::new("a.JPG", vec![]).content_type, mime::IMAGE_JPEG);
        assert_eq!(ImageUpload::new("b.webp", vec![]).content_type.as_ref(), "image/webp");
        assert_eq!(
            ImageUpload::new("noext", vec![]).content_type,
            mime::APPLICATION_OCTET_STREAM
        );
    }
}
