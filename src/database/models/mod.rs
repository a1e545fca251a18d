pub mod feed_item;
pub mod user;

pub use feed_item::{FeedItem, NewFeedItem};
pub use user::{NewUser, User, UserChanges};
