//! Worktree branch prefixes: validation against git ref-name rules and
//! random adjective-noun generation.

use thiserror::Error;

const ADJECTIVES: &[&str] = &[
    "brave", "swift", "calm", "bold", "keen", "warm", "cool", "neat", "fair", "wise", "glad",
    "soft", "pure", "wild", "free", "true", "deep", "high", "rich", "slim", "rare", "fast", "safe",
    "firm", "mild", "dark", "pale", "loud", "sly", "dry",
];

const NOUNS: &[&str] = &[
    "fox", "elk", "owl", "lynx", "wolf", "bear", "hawk", "deer", "crow", "dove", "hare", "seal",
    "wren", "mink", "frog", "moth", "newt", "pike", "colt", "swan", "lark", "crab", "mole", "toad",
    "wasp", "goat", "lamb", "puma", "orca", "ibis",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("branch prefix cannot be empty")]
    Empty,
    #[error("branch prefix cannot contain spaces")]
    Whitespace,
    #[error("branch prefix contains forbidden characters (~, ^, :, \\, ?, *, [)")]
    Forbidden,
    #[error("branch prefix cannot contain double dots (..)")]
    DoubleDot,
    #[error("branch prefix cannot contain consecutive forward slashes (//)")]
    DoubleSlash,
    #[error("branch prefix cannot start or end with {0:?}")]
    Edge(char),
    #[error("branch prefix contains non-printable ASCII character {0:?}")]
    NonPrintable(char),
}

/// `adjective-noun`, e.g. `brave-fox`.
pub fn generate_branch_prefix() -> String {
    let adjective = ADJECTIVES[rand::random::<u32>() as usize % ADJECTIVES.len()];
    let noun = NOUNS[rand::random::<u32>() as usize % NOUNS.len()];
    format!("{adjective}-{noun}")
}

pub fn validate_branch_prefix(prefix: &str) -> Result<(), PrefixError> {
    if prefix.is_empty() {
        return Err(PrefixError::Empty);
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(PrefixError::Whitespace);
    }
    if prefix.contains(['~', '^', ':', '\\', '?', '*', '[']) {
        return Err(PrefixError::Forbidden);
    }
    if prefix.contains("..") {
        return Err(PrefixError::DoubleDot);
    }
    if prefix.contains("//") {
        return Err(PrefixError::DoubleSlash);
    }
    for edge in ['.', '-'] {
        if prefix.starts_with(edge) || prefix.ends_with(edge) {
            return Err(PrefixError::Edge(edge));
        }
    }
    if prefix.starts_with('/') {
        return Err(PrefixError::Edge('/'));
    }
    if let Some(c) = prefix.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(PrefixError::NonPrintable(c));
    }
    Ok(())
}
