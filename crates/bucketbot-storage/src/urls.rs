//! Shared public URL derivation for storage backends.
//!
//! Precedence: a custom public base URL, then the endpoint override as a
//! virtual-hosted bucket host, then the default AWS host.

/// Host part of an endpoint URL, without scheme, path or trailing slash.
pub fn endpoint_host(endpoint: &str) -> &str {
    let without_scheme = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(endpoint);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
}

/// Build the public URL of `key` in `bucket`.
pub fn object_url(
    bucket: &str,
    endpoint_url: Option<&str>,
    custom_endpoint_url: Option<&str>,
    key: &str,
) -> String {
    if let Some(custom) = custom_endpoint_url {
        return format!("{}/{}", custom.trim_end_matches('/'), key);
    }

    match endpoint_url {
        Some(endpoint) => format!("https://{}.{}/{}", bucket, endpoint_host(endpoint), key),
        None => format!("https://{}.s3.amazonaws.com/{}", bucket, key),
    }
}
