//! HTTP Basic authentication for firmware upload
//!
//! The upload endpoint is guarded by the OTA credentials from
//! [`OtaSettings`]. Credentials travel as `Basic base64(user:password)`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::settings::OtaSettings;

/// Build an `Authorization` header value
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Decode a Basic `Authorization` header into username and password
///
/// The password may itself contain `:`; only the first one separates.
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

/// Whether the header carries the configured OTA credentials
pub fn authorize(header: Option<&str>, settings: &OtaSettings) -> bool {
    header
        .and_then(parse_basic_auth)
        .is_some_and(|(user, pass)| settings.matches(&user, &pass))
}
