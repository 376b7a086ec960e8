use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::auth::{LoginReqDto, LoginResponse};
use crate::api::users::CreateUser;
use crate::model::division::{Division, DivisionUpdate, NewDivision};
use crate::model::form::{Form, FormStatus, FormType, NewForm, StatusChange};
use crate::model::lookup::{Lookup, NewLookup};
use crate::model::notification::Notification;
use crate::model::page::{FormPage, UserPage};
use crate::model::time_keeping::TimeKeeping;
use crate::model::user::{User, UserFlags};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DRS API",
        version = "1.0.0",
        description = r#"
## Daily Request System

Staff submit request forms (report, leave early, leave out, in late) to a
recipient inside a division. The recipient, the division manager or an
administrator approves, rejects, forwards or cancels each pending form, and
every decision lands in the other party's notification feed.

### Features
- **Accounts**: email login, staff and superuser roles
- **Organization**: divisions with managers and a parent tree, positions, skills
- **Forms**: submission, filtered listing, status workflow
- **Notifications**: per-user feed with read flags
- **Time keeping**: daily check-in and check-out

### Security
Everything except `/auth/login` requires a JWT bearer token.
"#,
    ),
    paths(
        crate::api::auth::login,
        crate::api::auth::me,

        crate::api::users::create,
        crate::api::users::list,
        crate::api::users::get,
        crate::api::users::update,
        crate::api::users::delete,

        crate::api::divisions::create_division,
        crate::api::divisions::list_divisions,
        crate::api::divisions::get_division,
        crate::api::divisions::update_division,
        crate::api::divisions::ancestors,
        crate::api::divisions::delete_division,

        crate::api::lookups::create_position,
        crate::api::lookups::list_positions,
        crate::api::lookups::delete_position,
        crate::api::lookups::create_skill,
        crate::api::lookups::list_skills,
        crate::api::lookups::delete_skill,

        crate::api::forms::create_form,
        crate::api::forms::list_forms,
        crate::api::forms::get_form,
        crate::api::forms::update_status,
        crate::api::forms::delete_form,

        crate::api::notifications::list_notifications,
        crate::api::notifications::unread_count,
        crate::api::notifications::read_notification,

        crate::api::time_keeping::check_in_today,
        crate::api::time_keeping::check_out_today,
        crate::api::time_keeping::list_time_keeping,

        crate::api::admin::registry,
        crate::api::admin::registry_entry
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            CreateUser,
            User,
            UserFlags,
            UserPage,
            Division,
            NewDivision,
            DivisionUpdate,
            Lookup,
            NewLookup,
            Form,
            FormType,
            FormStatus,
            NewForm,
            StatusChange,
            FormPage,
            Notification,
            TimeKeeping
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and current user"),
        (name = "User", description = "Account management APIs"),
        (name = "Division", description = "Division tree APIs"),
        (name = "Directory", description = "Positions and skills"),
        (name = "Form", description = "Request forms and approval workflow"),
        (name = "Notification", description = "Notification feed"),
        (name = "TimeKeeping", description = "Daily check-in and check-out"),
        (name = "Admin", description = "Administrative view registry"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
