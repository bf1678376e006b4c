use crate::sqlx_repo::SQLxRepo;
use crate::user_repo::UserRepoError::{EmailAlreadyExists, EmailNotFound, UserNotFound};
use crate::user_repo::{NewUser, Role, User, UserId, UserRepo, UserRepoError};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use std::collections::BTreeSet;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i32,
    email: String,
    password_hash: String,
    roles: Vec<String>,
}

impl TryFrom<UserEntry> for User {
    type Error = anyhow::Error;

    fn try_from(value: UserEntry) -> Result<Self, Self::Error> {
        let roles = value
            .roles
            .iter()
            .map(|r| r.parse::<Role>())
            .collect::<Result<BTreeSet<Role>, _>>()
            .with_context(|| format!("Invalid roles stored for user {}", value.id))?;
        Ok(User {
            id: value.id,
            email: value.email,
            password_hash: value.password_hash,
            roles,
        })
    }
}

fn role_names(roles: &BTreeSet<Role>) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_owned()).collect()
}

fn check_updated(rows_affected: u64, user_id: UserId) -> Result<(), UserRepoError> {
    if rows_affected == 1 {
        Ok(())
    } else {
        Err(UserNotFound(user_id))
    }
}

#[async_trait]
impl UserRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get user {}", user_id))?;
        Ok(user.ok_or(UserNotFound(user_id))?.try_into()?)
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get user {}", email))?;
        Ok(user
            .ok_or_else(|| EmailNotFound(email.to_owned()))?
            .try_into()?)
    }

    #[instrument(skip(self))]
    async fn get_users(&self) -> Result<Vec<User>, UserRepoError> {
        let users: Vec<UserEntry> = query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Unable to get users")?;
        let users = users
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<User>, _>>()?;
        Ok(users)
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let id: Option<i32> = query_scalar(
            "INSERT INTO users(email, password_hash, roles) VALUES ($1, $2, $3) ON CONFLICT (email) DO NOTHING RETURNING id",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(role_names(&new_user.roles))
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create user {}", new_user.email))?;

        match id {
            Some(id) => Ok(new_user.to_user(id)),
            None => Err(EmailAlreadyExists(new_user.email)),
        }
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError> {
        let result = query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update password for {}", user_id))?;
        check_updated(result.rows_affected(), user_id)
    }

    #[instrument(skip(self))]
    async fn update_email(&self, user_id: UserId, email: &str) -> Result<(), UserRepoError> {
        let taken: bool =
            query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)")
                .bind(email)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Unable to check email {}", email))?;
        if taken {
            return Err(EmailAlreadyExists(email.to_owned()));
        }

        let result = query("UPDATE users SET email = $1 WHERE id = $2")
            .bind(email)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update email for {}", user_id))?;
        check_updated(result.rows_affected(), user_id)
    }

    #[instrument(skip(self))]
    async fn update_roles(
        &self,
        user_id: UserId,
        roles: &BTreeSet<Role>,
    ) -> Result<(), UserRepoError> {
        let result = query("UPDATE users SET roles = $1 WHERE id = $2")
            .bind(role_names(roles))
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update roles for {}", user_id))?;
        check_updated(result.rows_affected(), user_id)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let result = query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete user {}", user_id))?;
        check_updated(result.rows_affected(), user_id)
    }
}
