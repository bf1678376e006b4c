mod handlers;

pub use handlers::{EmailChange, PasswordChange};

use actix_web::{web, Resource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wallet_repo::user_repo::{Role, User, UserId};

/// A user as shown to clients. Never carries the password hash.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub roles: BTreeSet<Role>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            email: user.email,
            roles: user.roles,
        }
    }
}

/// Account settings of the authenticated user. Each resource still has to be wrapped in an
/// authentication middleware.
pub fn account_resources() -> Vec<Resource> {
    vec![
        web::resource("/change-password").route(web::post().to(handlers::change_password)),
        web::resource("/change-email").route(web::post().to(handlers::change_email)),
    ]
}
