//! Token cookie construction.
//!
//! Both tokens travel as HttpOnly cookies so browser scripts never see them.
//! The access token is additionally accepted as a Bearer header for non-browser
//! clients.

use crate::config::Config;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

fn build_cookie(name: &str, value: &str, max_age: u64, config: &Config) -> String {
    let cookies = &config.auth.cookies;
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite={}; Max-Age={max_age}", cookies.same_site);
    if cookies.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Cookie carrying the access token, expiring with the token.
pub fn access_token_cookie(token: &str, config: &Config) -> String {
    build_cookie(ACCESS_TOKEN_COOKIE, token, config.auth.access.ttl.as_secs(), config)
}

/// Cookie carrying the refresh token, expiring with the token.
pub fn refresh_token_cookie(token: &str, config: &Config) -> String {
    build_cookie(REFRESH_TOKEN_COOKIE, token, config.auth.refresh.ttl.as_secs(), config)
}

/// Expired cookies that clear both tokens in the browser.
pub fn clearing_cookies(config: &Config) -> [String; 2] {
    [
        build_cookie(ACCESS_TOKEN_COOKIE, "", 0, config),
        build_cookie(REFRESH_TOKEN_COOKIE, "", 0, config),
    ]
}
