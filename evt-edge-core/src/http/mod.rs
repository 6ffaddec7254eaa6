//! HTTP building blocks shared by the edge pipeline
//!
//! - [`cookies`] - request cookie parsing and `Set-Cookie` building
//! - [`utils`] - response constructors, query helpers and access logging

pub mod cookies;
pub mod utils;

pub use cookies::{CookieJar, SameSitePolicy, SetCookie};
pub use utils::{
    body_from, empty_body, json_error_response, json_response, not_found_response,
    read_body_limited, redirect_response, BodyReadError, BoxError, ClientAddr, Resp, RespBody,
};
