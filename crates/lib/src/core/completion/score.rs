use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Positive score for a match, 0 for none. An empty pattern matches
/// everything weakly.
pub(crate) struct FuzzyScorer {
    matcher: Matcher,
}

impl FuzzyScorer {
    pub(crate) fn new() -> Self {
        FuzzyScorer {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    pub(crate) fn score(&mut self, pattern: &str, candidate: &str) -> u32 {
        if pattern.is_empty() {
            return 1;
        }
        let mut pattern_buf = Vec::new();
        let mut candidate_buf = Vec::new();
        let needle = Utf32Str::new(pattern, &mut pattern_buf);
        let haystack = Utf32Str::new(candidate, &mut candidate_buf);
        self.matcher
            .fuzzy_match(haystack, needle)
            .map(|score| score as u32)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matches_beat_scattered_matches() {
        let mut scorer = FuzzyScorer::new();
        let tight = scorer.score("sel", "SELECT");
        let scattered = scorer.score("sel", "SEQUENCE_LABEL");
        assert!(tight > 0);
        assert!(scattered == 0 || tight > scattered);
    }

    #[test]
    fn no_match_scores_zero() {
        let mut scorer = FuzzyScorer::new();
        assert_eq!(scorer.score("xyz", "users"), 0);
    }

    #[test]
    fn empty_pattern_matches_weakly() {
        let mut scorer = FuzzyScorer::new();
        assert_eq!(scorer.score("", "anything"), 1);
    }
}
