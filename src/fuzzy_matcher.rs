use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Score of a single candidate. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub score: i64,
}

/// Ranks catalog entries against a partially remembered id.
pub struct FzfMatcher {
    matcher: SkimMatcherV2,
}

impl FzfMatcher {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn fuzzy_match(&self, pattern: &str, text: &str) -> Option<MatchResult> {
        self.matcher
            .fuzzy_match(text, pattern)
            .map(|score| MatchResult { score })
    }

    /// Substring hit; always outranks a prefix or fuzzy hit.
    pub fn exact_match(&self, pattern: &str, text: &str) -> Option<MatchResult> {
        text.contains(pattern).then(|| MatchResult {
            score: 1000 + (pattern.len() * 10) as i64,
        })
    }

    pub fn prefix_match(&self, pattern: &str, text: &str) -> Option<MatchResult> {
        text.starts_with(pattern).then(|| MatchResult {
            score: 800 + (pattern.len() * 8) as i64,
        })
    }

    pub fn comprehensive_match(&self, pattern: &str, text: &str) -> Option<MatchResult> {
        if pattern.is_empty() {
            return Some(MatchResult { score: 0 });
        }
        self.exact_match(pattern, text)
            .or_else(|| self.prefix_match(pattern, text))
            .or_else(|| self.fuzzy_match(pattern, text))
    }

    /// Keep matching items, best score first; ties go to the shorter text.
    pub fn match_and_sort<T>(
        &self,
        pattern: &str,
        items: Vec<(T, String)>,
    ) -> Vec<(T, String, MatchResult)> {
        let mut results: Vec<(T, String, MatchResult)> = items
            .into_iter()
            .filter_map(|(item, text)| {
                self.comprehensive_match(pattern, &text)
                    .map(|m| (item, text, m))
            })
            .collect();

        results.sort_by(|a, b| {
            b.2.score
                .cmp(&a.2.score)
                .then_with(|| a.1.len().cmp(&b.1.len()))
        });
        results
    }
}

impl Default for FzfMatcher {
    fn default() -> Self {
        Self::new()
    }
}
