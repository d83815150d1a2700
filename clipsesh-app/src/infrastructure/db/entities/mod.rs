pub mod admin_config;
pub mod comment;
pub mod post;
pub mod rating;
pub mod season_zip;
pub mod user;
pub mod vote;

pub use admin_config::Entity as AdminConfig;
pub use comment::Entity as Comment;
pub use post::Entity as Post;
pub use rating::Entity as Rating;
pub use season_zip::Entity as SeasonZip;
pub use user::Entity as User;
pub use vote::Entity as Vote;
