mod handlers;

use actix_web::{web, Scope};

pub fn tag_service() -> Scope {
    web::scope("/tag")
        .service(handlers::get_tags)
        .service(handlers::create_tag)
        .service(handlers::get_tag)
        .service(handlers::update_tag)
        .service(handlers::delete_tag)
}
