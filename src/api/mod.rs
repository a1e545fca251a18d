pub mod format;
pub mod serializers;

pub use format::{FeedItemView, ProfileView};
