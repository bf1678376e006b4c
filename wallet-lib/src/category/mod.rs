mod handlers;

use actix_web::{web, Scope};

/// Categories are readable by every user; changing them requires the admin role.
pub fn category_service() -> Scope {
    web::scope("/category")
        .service(handlers::get_categories)
        .service(handlers::create_category)
        .service(handlers::get_category)
        .service(handlers::update_category)
        .service(handlers::delete_category)
}
