//! Approximate subsequence matching of stop names.
//!
//! A candidate matches when every query character occurs in it in order,
//! with gaps allowed. Matches are scored so that contiguous runs, matches
//! near the start or at word starts, and short candidates rank higher.

/// Bonus for matching the first character of the candidate.
const FIRST_CHAR_BONUS: i64 = 10;

/// Bonus for matching right after a word separator.
const SEPARATOR_BONUS: i64 = 20;

/// Bonus for matching an uppercase letter that follows a lowercase one.
const CASE_BOUNDARY_BONUS: i64 = 20;

/// Base bonus for a match adjacent to the previous one.
/// Multiplied by the current run length, so long runs dominate.
const ADJACENT_BONUS: i64 = 5;

/// Penalty per unmatched character before the first match.
const LEADING_PENALTY: i64 = -5;

/// Cap on the total leading penalty.
const MAX_LEADING_PENALTY: i64 = -15;

/// A scored subsequence match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    /// Higher is better.
    pub score: i64,
    /// Character positions in the candidate matched by each query character.
    pub positions: Vec<usize>,
}

/// Query prepared for repeated scoring against many candidates.
#[derive(Debug, Clone)]
pub struct Pattern {
    chars: Vec<char>,
    case_sensitive: bool,
}

impl Pattern {
    pub fn new(query: &str, case_sensitive: bool) -> Self {
        let chars = query
            .chars()
            .map(|c| fold(c, case_sensitive))
            .collect();
        Self {
            chars,
            case_sensitive,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Score `candidate`, or `None` if the query is not a subsequence of it.
    ///
    /// Every occurrence of the first query character is tried as an anchor
    /// and the rest of the query is matched greedily from there; the best
    /// anchor wins, earliest on ties.
    pub fn score(&self, candidate: &str) -> Option<Scored> {
        let Some(&first) = self.chars.first() else {
            return None;
        };

        let original: Vec<char> = candidate.chars().collect();
        let folded: Vec<char> = original
            .iter()
            .map(|&c| fold(c, self.case_sensitive))
            .collect();

        if folded.len() < self.chars.len() {
            return None;
        }

        let mut best: Option<Scored> = None;

        for anchor in 0..folded.len() {
            if folded[anchor] != first {
                continue;
            }

            // If the query doesn't fit after this anchor, it won't fit
            // after any later one either.
            let Some(positions) = self.align_from(&folded, anchor) else {
                break;
            };

            let score = score_positions(&original, &positions, self.chars.len());
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(Scored { score, positions });
            }
        }

        best
    }

    fn align_from(&self, folded: &[char], anchor: usize) -> Option<Vec<usize>> {
        let mut positions = Vec::with_capacity(self.chars.len());
        positions.push(anchor);

        let mut next = anchor + 1;
        for &wanted in &self.chars[1..] {
            let offset = folded[next..].iter().position(|&c| c == wanted)?;
            positions.push(next + offset);
            next += offset + 1;
        }

        Some(positions)
    }
}

fn score_positions(candidate: &[char], positions: &[usize], query_len: usize) -> i64 {
    let mut score = 0;
    let mut run = 0;

    for (i, &pos) in positions.iter().enumerate() {
        if pos == 0 {
            score += FIRST_CHAR_BONUS;
        } else {
            let prev = candidate[pos - 1];
            if is_separator(prev) {
                score += SEPARATOR_BONUS;
            } else if prev.is_lowercase() && candidate[pos].is_uppercase() {
                score += CASE_BOUNDARY_BONUS;
            }
        }

        if i > 0 && pos == positions[i - 1] + 1 {
            run += 1;
            score += ADJACENT_BONUS * run;
        } else {
            run = 0;
        }
    }

    let leading = positions.first().copied().unwrap_or(0) as i64;
    score += (LEADING_PENALTY * leading).max(MAX_LEADING_PENALTY);

    let unmatched = candidate.len().saturating_sub(query_len) as i64;
    score - unmatched
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '/' | '.' | '(' | ')' | ',' | '_')
}

fn fold(c: char, case_sensitive: bool) -> char {
    if case_sensitive {
        c
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A string always matches itself.
        #[test]
        fn self_match(s in "[A-Za-zäöü ./-]{1,30}") {
            prop_assert!(Pattern::new(&s, true).score(&s).is_some());
            prop_assert!(Pattern::new(&s, false).score(&s).is_some());
        }

        /// Any subsequence of a candidate matches it.
        #[test]
        fn subsequence_matches(
            s in "[A-Za-z ]{1,30}",
            mask in proptest::collection::vec(any::<bool>(), 30),
        ) {
            let query: String = s
                .chars()
                .zip(mask.iter())
                .filter(|(_, keep)| **keep)
                .map(|(c, _)| c)
                .collect();
            prop_assume!(!query.is_empty());
            prop_assert!(Pattern::new(&query, true).score(&s).is_some());
        }

        /// Matched positions are strictly increasing and select the query.
        #[test]
        fn positions_spell_query(s in "[a-z]{1,20}", q in "[a-z]{1,4}") {
            if let Some(scored) = Pattern::new(&q, true).score(&s) {
                let chars: Vec<char> = s.chars().collect();
                let picked: String = scored.positions.iter().map(|&p| chars[p]).collect();
                prop_assert_eq!(picked, q);
                prop_assert!(scored.positions.windows(2).all(|w| w[0] < w[1]));
            }
        }

        /// Appending characters never improves a candidate's score.
        #[test]
        fn padding_lowers_score(s in "[a-z]{1,15}", pad in "[a-z]{1,10}") {
            let q = &s[..1];
            let base = Pattern::new(q, true).score(&s).unwrap().score;
            let padded = Pattern::new(q, true).score(&format!("{s}{pad}")).unwrap().score;
            prop_assert!(padded < base);
        }
    }
}
