//! The registration page for creating an account with the remote API.
//!
//! The remote API has accepted two different registration payloads over
//! time, the one in use is picked at start-up with [RegistrationSchema].

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState,
    api::{ApiClient, Registration, RegistrationSchema},
    auth::cookie::{get_session_from_cookies, set_session_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, loading_spinner, log_in_register, password_input,
        text_input,
    },
};

/// Shown when a field of the registration form is blank.
pub const MISSING_FIELDS_ERROR_MSG: &str = "All fields are required.";
/// Shown when registration fails and the API gave no reason.
pub const REGISTRATION_FAILED_ERROR_MSG: &str = "Registration failed. Please try again.";

fn registration_form(
    schema: RegistrationSchema,
    values: &RegisterForm,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            @match schema {
                RegistrationSchema::NameEmail => {
                    (text_input("name", "Name", "text", &values.name, true))
                    (text_input("email", "Email", "email", &values.email, false))
                }
                RegistrationSchema::Username => {
                    (text_input("username", "Username", "text", &values.username, true))
                    (text_input("firstname", "First Name", "text", &values.firstname, false))
                    (text_input("lastname", "Last Name", "text", &values.lastname, false))
                }
            }

            (password_input("", error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// The state needed for creating a new account.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which the session cookie is valid.
    pub cookie_duration: Duration,
    /// The client for the remote expense API.
    pub api: ApiClient,
    /// The registration payload the remote API expects.
    pub registration_schema: RegistrationSchema,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            api: state.api.clone(),
            registration_schema: state.registration_schema,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// Display the registration page.
///
/// Users that already have a valid session are sent to the dashboard.
pub async fn get_register_page(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
) -> Response {
    if get_session_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    let form = registration_form(state.registration_schema, &RegisterForm::default(), None);
    let content = log_in_register("Create an account", &form);
    base("Register", &[], &content).into_response()
}

/// The raw data entered by the user in the registration form.
///
/// Only the fields of the configured [RegistrationSchema] are rendered, the
/// others stay empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterForm {
    /// Build the payload for `schema`, or `None` if one of its fields is blank.
    fn to_registration(&self, schema: RegistrationSchema) -> Option<Registration> {
        let required = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_owned())
        };
        // Passwords are sent as typed.
        let password = (!self.password.is_empty()).then(|| self.password.clone())?;

        match schema {
            RegistrationSchema::NameEmail => Some(Registration::NameEmail {
                name: required(&self.name)?,
                email: required(&self.email)?,
                password,
            }),
            RegistrationSchema::Username => Some(Registration::Username {
                username: required(&self.username)?,
                firstname: required(&self.firstname)?,
                lastname: required(&self.lastname)?,
                password,
            }),
        }
    }
}

/// Create an account with the remote API.
///
/// If the API starts a session straight away the user is logged in and sent
/// to the dashboard, otherwise they are sent to the log-in page.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let schema = state.registration_schema;

    let Some(registration) = user_data.to_registration(schema) else {
        return registration_form(schema, &user_data, Some(MISSING_FIELDS_ERROR_MSG))
            .into_response();
    };

    let auth_response = match state.api.register(&registration).await {
        Ok(auth_response) => auth_response,
        Err(error) => {
            tracing::warn!("Registration failed: {error}");
            let message = error.user_message(REGISTRATION_FAILED_ERROR_MSG);
            return registration_form(schema, &user_data, Some(&message)).into_response();
        }
    };

    let Some(token) = auth_response.session_token() else {
        return (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response();
    };

    let display_name = auth_response
        .user
        .as_ref()
        .and_then(|user| user.display_name())
        .unwrap_or_default();

    match set_session_cookie(jar, token, display_name, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            // The account exists, so the user can still log in by hand.
            tracing::error!("An error occurred while setting the session cookie: {error}");
            (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
    }
}
