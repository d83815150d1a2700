use super::entities::{user, User};
use crate::domain::{Role, UserStatus, DEFAULT_PROFILE_PICTURE};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub status: UserStatus,
}

/// Partial account update; `None` leaves a column untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
    pub roles: Option<Vec<Role>>,
    pub status: Option<UserStatus>,
    pub discord_id: Option<Option<String>>,
    pub discord_username: Option<Option<String>>,
}

#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>, DbErr> {
        User::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    pub async fn list_except(&self, username: &str) -> Result<Vec<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Username.ne(username))
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn create(&self, data: NewUser) -> Result<user::Model, DbErr> {
        let now = chrono::Utc::now();
        let active = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(data.username),
            email: Set(None),
            password_hash: Set(data.password_hash),
            profile_picture: Set(DEFAULT_PROFILE_PICTURE.to_string()),
            roles: Set(Role::join(&data.roles)),
            status: Set(data.status.as_str().to_string()),
            discord_id: Set(None),
            discord_username: Set(None),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        active.insert(&self.db).await
    }

    pub async fn update(&self, model: user::Model, changes: UserChanges) -> Result<user::Model, DbErr> {
        let mut active: user::ActiveModel = model.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(hash) = changes.password_hash {
            active.password_hash = Set(hash);
        }
        if let Some(email) = changes.email {
            active.email = Set(Some(email));
        }
        if let Some(picture) = changes.profile_picture {
            active.profile_picture = Set(picture);
        }
        if let Some(roles) = changes.roles {
            active.roles = Set(Role::join(&roles));
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(discord_id) = changes.discord_id {
            active.discord_id = Set(discord_id);
        }
        if let Some(discord_username) = changes.discord_username {
            active.discord_username = Set(discord_username);
        }
        active.updated_at = Set(Some(chrono::Utc::now()));
        active.update(&self.db).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = User::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}

impl From<user::Model> for crate::domain::User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            profile_picture: m.profile_picture,
            roles: Role::split(&m.roles),
            status: m.status.parse().unwrap_or(UserStatus::Disabled),
            discord_id: m.discord_id,
            discord_username: m.discord_username,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
