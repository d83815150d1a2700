use crate::application::{
    Accounts, CommentThread, ConfigService, PostCatalog, RatingBoard, SeasonArchiver, VoteLedger,
};
use crate::infrastructure::auth::{TokenService, VoterFingerprinter};
use crate::infrastructure::db::{
    CommentRepository, ConfigRepository, PostRepository, RatingRepository, SeasonZipRepository,
    UserRepository, VoteRepository,
};
use crate::infrastructure::fetch::{ClipSource, HttpClipSource};
use crate::infrastructure::notify::LogResetNotifier;
use crate::infrastructure::security::RateLimiter;
use crate::infrastructure::storage::MediaStore;
use crate::settings::Settings;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub posts: Arc<PostCatalog>,
    pub votes: Arc<VoteLedger>,
    pub comments: Arc<CommentThread>,
    pub ratings: Arc<RatingBoard>,
    pub archives: Arc<SeasonArchiver>,
    pub config: Arc<ConfigService>,
    pub accounts: Arc<Accounts>,
    pub search_limiter: RateLimiter,
    pub settings: Arc<Settings>,
}

impl AppContext {
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self::with_clip_source(db, settings, Arc::new(HttpClipSource::new()))
    }

    pub fn with_clip_source(
        db: DatabaseConnection,
        settings: Settings,
        clip_source: Arc<dyn ClipSource>,
    ) -> Self {
        let post_repo = PostRepository::new(db.clone());
        let comment_repo = CommentRepository::new(db.clone());

        let base = &settings.public_base_url;
        let uploads = MediaStore::new(settings.upload_dir.clone(), base, "uploads");
        let downloads = MediaStore::new(settings.download_dir.clone(), base, "download");
        let pictures = MediaStore::new(settings.profile_picture_dir.clone(), base, "profilePictures");

        // Shared by the rating board and the admin routes, so both see one cache.
        let config = ConfigService::new(ConfigRepository::new(db.clone()));

        Self {
            posts: Arc::new(PostCatalog::new(
                post_repo.clone(),
                comment_repo.clone(),
                uploads,
            )),
            votes: Arc::new(VoteLedger::new(
                post_repo.clone(),
                VoteRepository::new(db.clone()),
                comment_repo.clone(),
                VoterFingerprinter::new(&settings.vote_secret),
            )),
            comments: Arc::new(CommentThread::new(post_repo.clone(), comment_repo)),
            ratings: Arc::new(RatingBoard::new(
                post_repo,
                RatingRepository::new(db.clone()),
                config.clone(),
            )),
            archives: Arc::new(SeasonArchiver::new(
                SeasonZipRepository::new(db.clone()),
                downloads,
                clip_source,
            )),
            config: Arc::new(config),
            accounts: Arc::new(Accounts::new(
                UserRepository::new(db),
                TokenService::new(&settings.secret_key),
                Arc::new(LogResetNotifier),
                pictures,
                settings.admin_username.clone(),
            )),
            search_limiter: RateLimiter::new(settings.search_rate_limit),
            settings: Arc::new(settings),
        }
    }
}
