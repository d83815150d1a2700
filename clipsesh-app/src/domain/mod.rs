mod admin_config;
mod post;
mod rating;
mod role;
mod season;
mod user;
mod vote;

pub use admin_config::{AdminConfig, ConfigUpdate, DEFAULT_DENY_THRESHOLD};
pub use post::{Comment, NewPost, Post, PostChanges, SearchPage};
pub use rating::{
    is_denied, most_chosen, RatingCount, RatingRequest, RatingSummary, RatingUser, RatingValue,
};
pub use role::{intersects, Role};
pub use season::{ClipDescriptor, EligibleClips, SeasonArchive};
pub use user::{Identity, User, UserStatus, DEFAULT_PROFILE_PICTURE};
pub use vote::{Tally, VoteAction, VoteDirection};
