use crate::provider::DirectoryProvider;

/// Expands a leading `~` against the provider's home directory. Guessing home
/// from the user name is best effort only; if that fails too the path is kept.
pub(crate) fn resolve(path: &str, provider: &dyn DirectoryProvider) -> String {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return path.to_string();
    };
    let home = provider
        .home_dir()
        .filter(|home| !home.trim().is_empty())
        .or_else(|| provider.user_name().as_deref().map(home_from_user));
    match home {
        Some(home) if rest.is_empty() => home,
        Some(home) => join_path(&home, rest),
        None => path.to_string(),
    }
}

pub(crate) fn home_from_user(user: &str) -> String {
    if user == "root" {
        "/root".to_string()
    } else {
        format!("/home/{user}")
    }
}

pub(crate) fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

pub(crate) fn parent_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}
