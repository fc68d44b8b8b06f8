//! Escaping for user data embedded in AppleScript string literals that are
//! in turn executed by a shell.

/// Escape `s` for embedding inside a double-quoted script literal.
///
/// Pass order matters: backslashes are doubled first so later passes can
/// add backslashes without them being doubled again. Apply exactly once.
pub fn sanitize(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('`', "\\`")
        .replace("$(", "\\$(")
        .replace("${", "\\${")
}
