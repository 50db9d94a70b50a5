use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct SessionAuthModifier;

impl Modify for SessionAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::health_handler,
        crate::web::routes::auth::signup_handler,
        crate::web::routes::auth::login_handler,
        crate::web::routes::auth::logout_handler,
        crate::web::routes::auth::me_handler,
        crate::web::routes::courses::course_list_handler,
        crate::web::routes::courses::course_get_handler,
        crate::web::routes::courses::course_create_handler,
        crate::web::routes::courses::course_update_handler,
        crate::web::routes::courses::course_delete_handler,
        crate::web::routes::courses::course_enroll_handler,
        crate::web::routes::courses::module_list_handler,
        crate::web::routes::courses::module_create_handler,
        crate::web::routes::consultations::slot_list_handler,
        crate::web::routes::consultations::slot_create_handler,
        crate::web::routes::consultations::consultation_all_handler,
        crate::web::routes::consultations::consultation_book_handler,
        crate::web::routes::consultations::consultation_mine_handler,
        crate::web::routes::consultations::consultation_cancel_handler,
        crate::web::routes::users::profile_get_handler,
        crate::web::routes::users::profile_update_handler,
        crate::web::routes::users::my_courses_handler,
        crate::web::routes::users::progress_update_handler,
        crate::web::routes::users::user_list_handler,
        crate::web::routes::users::user_role_handler,
        crate::web::routes::users::user_status_handler,
    ),
    modifiers(&SessionAuthModifier),
    tags(
        (name = "auth", description = "Accounts and sessions"),
        (name = "courses", description = "Catalog, modules and enrollment"),
        (name = "consultations", description = "Slot booking"),
        (name = "users", description = "Profiles, progress and administration"),
    )
)]
pub struct ApiDoc;
