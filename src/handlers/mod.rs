pub mod feed;
pub mod hello;
pub mod login;
pub mod profiles;
pub mod resource;
pub mod system;

pub use feed::Feed;
pub use profiles::Profiles;
pub use resource::Resource;
