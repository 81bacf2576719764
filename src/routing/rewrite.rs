//! Upstream path rewriting.
//!
//! Backends mount their API under `/v1/<service>`, while clients may send the
//! bare remainder (`/login`), the already-prefixed path (`/v1/auth/login`), or
//! the path including the gateway mount (`/api/v1/auth/login`). All three map
//! to the same upstream path. Rule order matters: the idempotence check runs
//! before the gateway-mount strip.

const GATEWAY_MOUNT: &str = "/api";

/// Rewrite an inbound remainder path into the upstream path for `prefix`.
///
/// An empty `prefix` means the service takes paths verbatim.
pub fn rewrite(prefix: &str, raw_path: &str) -> String {
    let path = format!("/{}", raw_path.trim_start_matches('/'));

    if prefix.is_empty() {
        return path;
    }

    if path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        return path;
    }

    if path.starts_with("/api/v1/") {
        return path[GATEWAY_MOUNT.len()..].to_string();
    }

    format!("{prefix}{path}")
}
