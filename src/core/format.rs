use indicatif::DecimalBytes;
use std::path::{Path, PathBuf};

const TITLE_STRIP_CHARS: &[char] = &[
    ':', '|', '/', '*', '?', '<', '>', '\\', '&', '{', '}', '%', '$', '@', '`', '!', '™', '+',
    '\'',
];

/// Decimal size string such as `1.50 GB`.
pub fn format_size(bytes: u64) -> String {
    DecimalBytes(bytes).to_string()
}

/// Turn a store title into a directory name usable as a wine prefix.
pub fn prefix_dir_name(title: &str) -> String {
    title
        .chars()
        .filter(|c| !TITLE_STRIP_CHARS.contains(c))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

pub fn suggested_wine_prefix(root: &Path, title: &str) -> PathBuf {
    root.join(prefix_dir_name(title))
}

/// Paths typed or pasted by users sometimes arrive quoted.
pub fn strip_quotes(text: &str) -> String {
    text.replace('\'', "")
}

pub fn strip_path_quotes(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) if text.contains('\'') => PathBuf::from(strip_quotes(text)),
        _ => path.to_path_buf(),
    }
}
