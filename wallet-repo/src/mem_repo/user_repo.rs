use crate::mem_repo::{MemRepo, State};
use crate::user_repo::UserRepoError::{EmailAlreadyExists, EmailNotFound, UserNotFound};
use crate::user_repo::{NewUser, Role, User, UserId, UserRepo, UserRepoError};
use async_trait::async_trait;
use std::collections::BTreeSet;

impl State {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn user_mut(&mut self, user_id: UserId) -> Result<&mut User, UserRepoError> {
        self.users.get_mut(&user_id).ok_or(UserNotFound(user_id))
    }
}

#[async_trait]
impl UserRepo for MemRepo {
    async fn get_user(&self, user_id: UserId) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UserNotFound(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| EmailNotFound(email.to_owned()))
    }

    async fn get_users(&self) -> Result<Vec<User>, UserRepoError> {
        let read_guard = self.read_lock()?;

        Ok(read_guard.users.values().cloned().collect())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.email_taken(&new_user.email, None) {
            return Err(EmailAlreadyExists(new_user.email));
        }

        let id = write_guard.user_ids.next();
        let user = new_user.to_user(id);
        write_guard.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard.user_mut(user_id)?.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn update_email(&self, user_id: UserId, email: &str) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.email_taken(email, Some(user_id)) {
            return Err(EmailAlreadyExists(email.to_owned()));
        }
        write_guard.user_mut(user_id)?.email = email.to_owned();
        Ok(())
    }

    async fn update_roles(
        &self,
        user_id: UserId,
        roles: &BTreeSet<Role>,
    ) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard.user_mut(user_id)?.roles = roles.clone();
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.remove(&user_id).is_some() {
            Ok(())
        } else {
            Err(UserNotFound(user_id))
        }
    }
}
