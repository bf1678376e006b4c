mod handlers;

use crate::auth::handlers::{check_email, check_password_length};
use crate::auth::password;
use crate::config::AdminConfig;
use crate::error::HandlerError;
use crate::user::UserView;
use actix_web::{web, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;
use wallet_repo::user_repo::{NewUser, Role, UserRepo, UserRepoError};

/// Fields an admin may change on a user. Missing fields are left as they are.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
    pub password: Option<String>,
}

pub fn admin_service() -> Scope {
    web::scope("/admin/users")
        .service(handlers::get_users)
        .service(handlers::get_user)
        .service(handlers::update_user)
}

/// Makes sure the configured admin account exists and has `ROLE_ADMIN`. An existing account
/// keeps its password.
pub async fn ensure_admin(
    user_repo: &dyn UserRepo,
    admin: &AdminConfig,
) -> Result<UserView, HandlerError> {
    check_email(&admin.email)?;

    let user = match user_repo.get_user_by_email(&admin.email).await {
        Ok(user) if user.has_role(Role::Admin) => user,
        Ok(user) => {
            let mut roles = user.roles.clone();
            roles.extend([Role::User, Role::Admin]);
            user_repo.update_roles(user.id, &roles).await?;
            info!(user_id = user.id, "Granted admin role");
            user_repo.get_user(user.id).await?
        }
        Err(UserRepoError::EmailNotFound(_)) => {
            check_password_length(&admin.password)?;
            let password_hash = password::encode_password(&admin.password)?;
            let user = user_repo
                .create_user(NewUser::new(
                    admin.email.clone(),
                    password_hash,
                    BTreeSet::from([Role::User, Role::Admin]),
                ))
                .await?;
            info!(user_id = user.id, "Created admin account");
            user
        }
        Err(e) => return Err(e.into()),
    };
    Ok(UserView::from(user))
}
