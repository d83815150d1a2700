use crate::domain::{Identity, Role, User, UserStatus, DEFAULT_PROFILE_PICTURE};
use crate::infrastructure::auth::{hash_password, verify_password, TokenService};
use crate::infrastructure::db::entities::user;
use crate::infrastructure::db::{NewUser, UserChanges, UserRepository};
use crate::infrastructure::notify::PasswordResetNotifier;
use crate::infrastructure::storage::MediaStore;
use clipsesh_errors::AppError;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use uuid::Uuid;

const PLACEHOLDER_FILE: &str = "profile_placeholder.png";

/// Fields a user may change on their own account.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub discord_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub discord_username: Option<Option<String>>,
}

/// Fields only an admin may change.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<Role>>,
    pub profile_picture: Option<String>,
    pub status: Option<UserStatus>,
}

// Distinguishes an explicit `null` (clear) from an absent key (keep).
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Clone)]
pub struct Accounts {
    users: UserRepository,
    tokens: TokenService,
    notifier: Arc<dyn PasswordResetNotifier>,
    pictures: MediaStore,
    bootstrap_admin: String,
}

impl Accounts {
    pub fn new(
        users: UserRepository,
        tokens: TokenService,
        notifier: Arc<dyn PasswordResetNotifier>,
        pictures: MediaStore,
        bootstrap_admin: String,
    ) -> Self {
        Self {
            users,
            tokens,
            notifier,
            pictures,
            bootstrap_admin,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<String, AppError> {
        let (username, password) = credentials(username, password)?;
        self.ensure_username_free(&username).await?;

        let created = self
            .users
            .create(NewUser {
                username,
                password_hash: hash_password(&password)?,
                roles: vec![Role::User],
                status: UserStatus::Active,
            })
            .await
            .map_err(AppError::internal)?;

        tracing::info!("Registered user {}", created.username);
        self.session_for(created)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let invalid = || AppError::Validation("Invalid username or password".to_string());
        let found = self
            .users
            .find_by_username(username.trim())
            .await
            .map_err(AppError::internal)?
            .ok_or_else(invalid)?;

        if found.status != UserStatus::Active.as_str() {
            return Err(AppError::Forbidden("Account not active".to_string()));
        }
        if !verify_password(password, &found.password_hash) {
            return Err(invalid());
        }

        self.session_for(found)
    }

    pub async fn me(&self, id: Uuid) -> Result<User, AppError> {
        Ok(self.require(id).await?.into())
    }

    /// Everyone except the bootstrap admin.
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows = self
            .users
            .list_except(&self.bootstrap_admin)
            .await
            .map_err(AppError::internal)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_profile(
        &self,
        requester: &Identity,
        target: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, AppError> {
        if requester.id != target && !requester.is_admin() {
            return Err(AppError::Forbidden("Permission denied".to_string()));
        }
        let current = self.require(target).await?;

        let mut changes = UserChanges {
            discord_id: update.discord_id,
            discord_username: update.discord_username,
            ..Default::default()
        };
        if let Some(username) = non_blank(update.username) {
            if username != current.username {
                self.ensure_username_free(&username).await?;
            }
            changes.username = Some(username);
        }
        if let Some(password) = non_blank(update.password) {
            changes.password_hash = Some(hash_password(&password)?);
        }
        if let Some(email) = non_blank(update.email) {
            if current.email.as_deref() != Some(email.as_str()) {
                self.ensure_email_free(&email).await?;
            }
            changes.email = Some(email);
        }

        let saved = self
            .users
            .update(current, changes)
            .await
            .map_err(AppError::internal)?;
        Ok(saved.into())
    }

    /// Store a new picture for `id` and drop the one it replaces, unless that
    /// was the shared placeholder.
    pub async fn set_profile_picture(
        &self,
        id: Uuid,
        file_name: Option<&str>,
        data: &[u8],
    ) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::Validation("A profile picture is required".to_string()));
        }
        let current = self.require(id).await?;
        let previous = current.profile_picture.clone();

        let stored = self
            .pictures
            .save(Some(file_name.unwrap_or("picture.png")), data)
            .await
            .map_err(AppError::internal)?;

        let saved = self
            .users
            .update(
                current,
                UserChanges {
                    profile_picture: Some(stored.url.clone()),
                    ..Default::default()
                },
            )
            .await;
        if let Err(e) = saved {
            self.pictures.remove(&stored.name).await;
            return Err(AppError::internal(e));
        }

        if !previous.contains(PLACEHOLDER_FILE) {
            self.pictures.remove_by_url(&previous).await;
        }
        Ok(stored.url)
    }

    pub async fn admin_update(&self, target: Uuid, update: AdminUserUpdate) -> Result<User, AppError> {
        let current = self.require(target).await?;

        let mut changes = UserChanges {
            roles: update.roles,
            status: update.status,
            profile_picture: non_blank(update.profile_picture),
            ..Default::default()
        };
        if let Some(username) = non_blank(update.username) {
            if username != current.username {
                self.ensure_username_free(&username).await?;
            }
            changes.username = Some(username);
        }
        if let Some(password) = non_blank(update.password) {
            changes.password_hash = Some(hash_password(&password)?);
        }

        let saved = self
            .users
            .update(current, changes)
            .await
            .map_err(AppError::internal)?;
        Ok(saved.into())
    }

    pub async fn admin_create(
        &self,
        username: &str,
        password: &str,
        roles: Option<Vec<Role>>,
    ) -> Result<User, AppError> {
        let (username, password) = credentials(username, password)?;
        self.ensure_username_free(&username).await?;

        let roles = roles.filter(|r| !r.is_empty()).unwrap_or_else(|| vec![Role::User]);
        let created = self
            .users
            .create(NewUser {
                username,
                password_hash: hash_password(&password)?,
                roles,
                status: UserStatus::Active,
            })
            .await
            .map_err(AppError::internal)?;
        Ok(created.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.users.delete(id).await.map_err(AppError::internal)?;
        if removed == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: UserStatus) -> Result<User, AppError> {
        let current = self.require(id).await?;
        let saved = self
            .users
            .update(
                current,
                UserChanges {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .map_err(AppError::internal)?;
        Ok(saved.into())
    }

    /// Issue a one-hour reset token and hand it to the notifier.
    pub async fn request_reset(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        let found = self
            .users
            .find_by_email(email)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::NotFound("User not found or no email linked".to_string()))?;

        let token = self.tokens.issue_reset(found.id)?;
        self.notifier.send_reset(email, &found.username, &token).await;
        Ok(())
    }

    pub async fn confirm_reset(&self, token: &str, password: &str) -> Result<(), AppError> {
        if token.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Token and new password are required.".to_string(),
            ));
        }
        let id = self.tokens.verify_reset(token.trim())?;
        let current = self
            .users
            .find_by_id(id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        self.users
            .update(
                current,
                UserChanges {
                    password_hash: Some(hash_password(password)?),
                    ..Default::default()
                },
            )
            .await
            .map_err(AppError::internal)?;
        Ok(())
    }

    /// Create the bootstrap admin, or force an existing one back to a known state.
    pub async fn ensure_admin(&self, password: &str) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;
        let existing = self
            .users
            .find_by_username(&self.bootstrap_admin)
            .await
            .map_err(AppError::internal)?;

        let saved = match existing {
            Some(current) => {
                self.users
                    .update(
                        current,
                        UserChanges {
                            password_hash: Some(password_hash),
                            roles: Some(vec![Role::Admin]),
                            status: Some(UserStatus::Active),
                            profile_picture: Some(DEFAULT_PROFILE_PICTURE.to_string()),
                            ..Default::default()
                        },
                    )
                    .await
            }
            None => {
                self.users
                    .create(NewUser {
                        username: self.bootstrap_admin.clone(),
                        password_hash,
                        roles: vec![Role::Admin],
                        status: UserStatus::Active,
                    })
                    .await
            }
        }
        .map_err(AppError::internal)?;

        tracing::info!("Admin account {} is ready", saved.username);
        Ok(saved.into())
    }

    pub fn verify_session(&self, token: &str) -> Result<Identity, AppError> {
        self.tokens.verify_session(token)
    }

    fn session_for(&self, account: user::Model) -> Result<String, AppError> {
        let identity = Identity {
            id: account.id,
            username: account.username,
            roles: Role::split(&account.roles),
        };
        self.tokens.issue_session(&identity)
    }

    async fn require(&self, id: Uuid) -> Result<user::Model, AppError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn ensure_username_free(&self, username: &str) -> Result<(), AppError> {
        let taken = self
            .users
            .find_by_username(username)
            .await
            .map_err(AppError::internal)?;
        if taken.is_some() {
            return Err(AppError::Validation("Username already exists".to_string()));
        }
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), AppError> {
        let taken = self
            .users
            .find_by_email(email)
            .await
            .map_err(AppError::internal)?;
        if taken.is_some() {
            return Err(AppError::Validation("Email already in use".to_string()));
        }
        Ok(())
    }
}

fn credentials(username: &str, password: &str) -> Result<(String, String), AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }
    Ok((username.to_string(), password.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::memory_db;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingNotifier(Mutex<Vec<String>>);

    #[async_trait]
    impl PasswordResetNotifier for CapturingNotifier {
        async fn send_reset(&self, _email: &str, _username: &str, token: &str) {
            self.0.lock().unwrap().push(token.to_string());
        }
    }

    async fn accounts() -> (Accounts, Arc<CapturingNotifier>) {
        accounts_in(Path::new("profilePictures")).await
    }

    async fn accounts_in(pictures: &Path) -> (Accounts, Arc<CapturingNotifier>) {
        let db = memory_db().await.unwrap();
        let notifier = Arc::new(CapturingNotifier::default());
        let accounts = Accounts::new(
            UserRepository::new(db),
            TokenService::new("test-secret"),
            notifier.clone(),
            MediaStore::new(pictures, "http://localhost:5000", "profilePictures"),
            "admin".to_string(),
        );
        (accounts, notifier)
    }

    #[tokio::test]
    async fn register_then_login() {
        let (accounts, _) = accounts().await;
        let token = accounts.register("alice", "pw").await.unwrap();
        let who = accounts.verify_session(&token).unwrap();
        assert_eq!(who.username, "alice");
        assert_eq!(who.roles, vec![Role::User]);

        assert!(accounts.login("alice", "pw").await.is_ok());
        assert!(matches!(
            accounts.login("alice", "nope").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            accounts.register("alice", "other").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn disabled_account_cannot_log_in() {
        let (accounts, _) = accounts().await;
        let token = accounts.register("bob", "pw").await.unwrap();
        let bob = accounts.verify_session(&token).unwrap();

        accounts.set_status(bob.id, UserStatus::Disabled).await.unwrap();
        assert!(matches!(accounts.login("bob", "pw").await, Err(AppError::Forbidden(_))));

        accounts.set_status(bob.id, UserStatus::Active).await.unwrap();
        assert!(accounts.login("bob", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn only_self_or_admin_edits_profile() {
        let (accounts, _) = accounts().await;
        let alice = accounts
            .verify_session(&accounts.register("alice", "pw").await.unwrap())
            .unwrap();
        let bob = accounts
            .verify_session(&accounts.register("bob", "pw").await.unwrap())
            .unwrap();

        let err = accounts
            .update_profile(&bob, alice.id, ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let update: ProfileUpdate =
            serde_json::from_str(r#"{"email":"a@example.com","discordId":"42"}"#).unwrap();
        let user = accounts.update_profile(&alice, alice.id, update).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.discord_id.as_deref(), Some("42"));

        let clear: ProfileUpdate = serde_json::from_str(r#"{"discordId":null}"#).unwrap();
        let user = accounts.update_profile(&alice, alice.id, clear).await.unwrap();
        assert_eq!(user.discord_id, None);
    }

    #[tokio::test]
    async fn password_reset_round_trip() {
        let (accounts, notifier) = accounts().await;
        let alice = accounts
            .verify_session(&accounts.register("alice", "old").await.unwrap())
            .unwrap();
        let update = ProfileUpdate {
            email: Some("alice@example.com".into()),
            ..Default::default()
        };
        accounts.update_profile(&alice, alice.id, update).await.unwrap();

        assert!(matches!(
            accounts.request_reset("ghost@example.com").await,
            Err(AppError::NotFound(_))
        ));
        accounts.request_reset("alice@example.com").await.unwrap();
        let token = notifier.0.lock().unwrap().pop().unwrap();

        assert!(matches!(
            accounts.confirm_reset("garbage", "new").await,
            Err(AppError::Validation(_))
        ));
        accounts.confirm_reset(&token, "new").await.unwrap();
        assert!(accounts.login("alice", "new").await.is_ok());
        assert!(accounts.login("alice", "old").await.is_err());
    }

    #[tokio::test]
    async fn bootstrap_admin_is_reset_and_hidden() {
        let (accounts, _) = accounts().await;
        accounts.ensure_admin("first").await.unwrap();
        let admin = accounts.ensure_admin("second").await.unwrap();
        assert_eq!(admin.roles, vec![Role::Admin]);
        assert!(accounts.login("admin", "second").await.is_ok());

        accounts.admin_create("carol", "pw", Some(vec![Role::Clipteam])).await.unwrap();
        let listed: Vec<_> = accounts
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(listed, vec!["carol"]);
    }

    #[tokio::test]
    async fn new_profile_picture_replaces_the_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let (accounts, _) = accounts_in(dir.path()).await;
        let alice = accounts
            .verify_session(&accounts.register("alice", "pw").await.unwrap())
            .unwrap();
        assert_eq!(accounts.me(alice.id).await.unwrap().profile_picture, DEFAULT_PROFILE_PICTURE);

        let first = accounts
            .set_profile_picture(alice.id, Some("me.JPG"), b"jpeg")
            .await
            .unwrap();
        assert!(first.starts_with("http://localhost:5000/profilePictures/"));
        assert!(first.ends_with(".jpg"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        let second = accounts
            .set_profile_picture(alice.id, Some("me.png"), b"png")
            .await
            .unwrap();
        assert_eq!(accounts.me(alice.id).await.unwrap().profile_picture, second);
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(second.ends_with(&names[0]));

        assert!(matches!(
            accounts.set_profile_picture(alice.id, Some("x.png"), b"").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            accounts.set_profile_picture(Uuid::new_v4(), Some("x.png"), b"png").await,
            Err(AppError::NotFound(_))
        ));
    }
}
