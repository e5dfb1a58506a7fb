//! Sessions with the remote expense API and the pages for starting and ending them.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register;
mod session;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use cookie::{
    COOKIE_SESSION, get_session_from_cookies, invalidate_session_cookie, set_session_cookie,
};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::post_log_out;
pub(crate) use log_out::{session_expired, session_expired_hx};
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use register::{get_register_page, register_user};
pub use session::Session;
