/// Include/exclude glob filter over keys.
///
/// A key passes when the include list is empty or one of its patterns
/// matches, and none of the exclude patterns match. Patterns understand
/// `*` and `?`; anything else matches literally and case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Filter {
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: include.to_vec(),
            exclude: exclude.to_vec(),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| glob_match(p, key));
        included && !self.exclude.iter().any(|p| glob_match(p, key))
    }
}

/// Match `text` against a glob `pattern`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // Position of the last `*` seen and the text index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((star, star_ti)) = backtrack {
            pi = star + 1;
            ti = star_ti + 1;
            backtrack = Some((star, star_ti + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("env-*", "env-prod"));
        assert!(glob_match("env-*", "env-"));
        assert!(!glob_match("env-*", "region"));
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("zone?", "zone1"));
        assert!(!glob_match("zone?", "zone"));
        assert!(glob_match("*.io/*", "kubernetes.io/arch"));
        assert!(glob_match("a*b*c", "aXbYbZc"));
        assert!(!glob_match("a*b*c", "aXbYbZ"));
        assert!(glob_match("region", "region"));
        assert!(!glob_match("region", "Region"));
    }

    #[test]
    fn test_include_pattern_with_cleared_exclude() {
        let filter = Filter::new(&list(&["env-*"]), &[]);
        assert!(filter.matches("env-prod"));
        assert!(!filter.matches("region"));
    }

    #[test]
    fn test_default_selector_filter_rejects_everything() {
        let filter = Filter::new(&[], &list(&["*"]));
        assert!(!filter.matches("env-prod"));
        assert!(!filter.matches("region"));
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let filter = Filter::default();
        assert!(filter.matches("pods"));
        assert!(filter.matches("services"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = Filter::new(&list(&["*"]), &list(&["kubernetes.io/*"]));
        assert!(filter.matches("disktype"));
        assert!(!filter.matches("kubernetes.io/os"));
    }
}
