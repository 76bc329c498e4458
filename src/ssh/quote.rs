// ABOUTME: POSIX shell quoting for command lines sent over SSH.
// ABOUTME: Every argument is single-quoted so names and paths are never re-interpreted.

/// Quote a single argument for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

/// Quote and join a full argument vector.
pub fn shell_join<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| shell_quote(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
