//! Service layer
//!
//! Business logic between the HTTP handlers and the data layer.

mod account;
mod feed;
mod notification;
mod post;

pub use account::{AccountService, FollowAction, Profile};
pub use feed::FeedService;
pub use notification::NotificationService;
pub use post::{LikeAction, PostService};
