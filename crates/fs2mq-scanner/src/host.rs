//! Host identification

/// Reported when the hostname cannot be determined
pub const UNKNOWN_HOST: &str = "unknown-host";

/// Name of the machine performing the scan
///
/// Falls back to [`UNKNOWN_HOST`] when the OS reports an empty or
/// non-UTF-8 hostname.
pub fn host_name() -> String {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}
