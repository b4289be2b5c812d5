use std::path::PathBuf;

/// Normalize a string for filter comparison: lowercase + treat `_` and ` ` as equivalent.
/// This lets users filter by either a human-readable name (spaces) or the
/// snapshot ID shown in the terminal (underscores).
fn normalize_for_filter(s: &str) -> String {
    s.to_lowercase().replace('_', " ")
}

/// Case-insensitive substring match of a snapshot ID against a filter.
/// Strips `.png` suffix from pattern (user may copy from HTML review page).
pub fn matches_filter(id: &str, pattern: &str) -> bool {
    let pattern = pattern.strip_suffix(".png").unwrap_or(pattern);
    normalize_for_filter(id).contains(&normalize_for_filter(pattern))
}

/// A captured snapshot waiting to be compared with its reference.
#[derive(Debug, Clone)]
pub struct CompareJob {
    /// Snapshot ID: path relative to the captured directory, without `.png`.
    pub id: String,
    /// Captured PNG on disk.
    pub path: PathBuf,
}

impl CompareJob {
    pub fn matches_filter(&self, pattern: &str) -> bool {
        matches_filter(&self.id, pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> CompareJob {
        CompareJob {
            id: id.to_string(),
            path: PathBuf::from(format!("{id}.png")),
        }
    }

    #[test]
    fn filter_is_case_insensitive() {
        assert!(job("Forms/Login_Button@2x").matches_filter("login button"));
        assert!(job("Forms/Login_Button@2x").matches_filter("FORMS/"));
        assert!(!job("Forms/Login_Button@2x").matches_filter("signup"));
    }

    #[test]
    fn filter_ignores_png_suffix() {
        assert!(job("card/default").matches_filter("card/default.png"));
    }

    #[test]
    fn free_filter_treats_underscores_as_spaces() {
        assert!(matches_filter("nav/Top_Bar", "top bar.png"));
        assert!(matches_filter("nav/Top_Bar", "TOP_BAR"));
        assert!(!matches_filter("nav/Top_Bar", "bottom"));
    }
}
