//! Userid and group conventions.
//!
//! Userids are carried in `acct:name@authority` form throughout the
//! service. The public group every authority shares is `__world__`.

/// The public group, readable without authentication.
pub const WORLD_GROUP: &str = "__world__";

/// Check that a userid is in `acct:name@authority` form.
///
/// Both the name and the authority must be non-empty; the authority must
/// not itself contain an `@`.
#[must_use]
pub fn is_valid_userid(userid: &str) -> bool {
    let Some(rest) = userid.strip_prefix("acct:") else {
        return false;
    };
    match rest.split_once('@') {
        Some((name, auth)) => !name.is_empty() && !auth.is_empty() && !auth.contains('@'),
        None => false,
    }
}

/// Extract the authority from a userid, if well-formed.
#[must_use]
pub fn authority(userid: &str) -> Option<&str> {
    if !is_valid_userid(userid) {
        return None;
    }
    userid.rsplit_once('@').map(|(_, auth)| auth)
}
