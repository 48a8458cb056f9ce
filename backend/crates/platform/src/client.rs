//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;
use woothee::parser::Parser;

use crate::token::strip_bearer;

/// Placeholder stored on a session when the user agent cannot be described.
pub const UNKNOWN_AGENT: &str = "unknown agent";

/// What woothee reports for a field it could not identify.
const PARSER_UNKNOWN: &str = "UNKNOWN";

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Raw `User-Agent` header, if present and valid ASCII.
pub fn extract_user_agent(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
}

/// Token from the `Authorization` header, with or without the `Bearer ` prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(strip_bearer)
        .filter(|token| !token.is_empty())
}

// ============================================================================
// User agent description
// ============================================================================

/// Human readable description such as `"Chrome on macOS"`.
///
/// Returns [`UNKNOWN_AGENT`] when either the browser or the OS is unknown.
pub fn describe_user_agent(user_agent: &str) -> String {
    let Some(parsed) = Parser::new().parse(user_agent) else {
        return UNKNOWN_AGENT.to_string();
    };

    let browser = Some(parsed.name).filter(|name| known(name));
    match (browser, os_family(parsed.os)) {
        (Some(browser), Some(os)) => format!("{browser} on {os}"),
        _ => UNKNOWN_AGENT.to_string(),
    }
}

fn known(value: &str) -> bool {
    !value.is_empty() && value != PARSER_UNKNOWN
}

/// Folds woothee's OS names ("Windows 10", "Mac OSX", "iPhone") into families.
fn os_family(os: &str) -> Option<&'static str> {
    let family = match os {
        "Mac OSX" => "macOS",
        "iPhone" | "iPod" => "iOS",
        "iPad" => "iPadOS",
        "Android" => "Android",
        "ChromeOS" => "ChromeOS",
        "Linux" => "Linux",
        os if os.starts_with("Windows Phone") => "Windows Phone",
        os if os.starts_with("Windows") => "Windows",
        _ => return None,
    };
    Some(family)
}
