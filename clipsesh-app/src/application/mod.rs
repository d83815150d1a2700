mod accounts;
mod admin_config;
mod comments;
mod posts;
mod ratings;
mod season_archive;
mod vote_ledger;

pub use accounts::{Accounts, AdminUserUpdate, ProfileUpdate};
pub use admin_config::ConfigService;
pub use comments::CommentThread;
pub use posts::{CreatePost, PostCatalog, PostSource, DEFAULT_PAGE_SIZE};
pub use ratings::RatingBoard;
pub use season_archive::{ArchiveBuild, SeasonArchiver};
pub use vote_ledger::VoteLedger;
