pub mod access_denied;
pub mod login;
pub mod logout;
pub mod register;

/// Only same-site paths are followed after login; `//host` and `/\host` are
/// protocol-relative in browsers.
pub fn local_return_url(url: &str) -> Option<&str> {
    let is_local = url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\");
    is_local.then_some(url)
}
