mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::{Comment, CommentView};
pub use follow::Follow;
pub use group::Group;
pub use post::{FeedEntry, Post, PostDraft};
pub use user::User;
