//! Synonym substitution — seeds title variations by swapping known tokens
//! for randomly chosen alternatives before the LLM normalization pass.
//!
//! The dictionary is loaded once at startup and shared read-only. A missing
//! resource is non-fatal: substitution degrades to a no-op.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

/// Process-wide mapping from a token surface form to its interchangeable
/// alternatives. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct SynonymDict {
    map: HashMap<String, Vec<String>>,
}

impl SynonymDict {
    pub fn from_map(map: HashMap<String, Vec<String>>) -> Self {
        Self { map }
    }

    /// Loads the JSON dictionary resource (`{"word": ["alt1", "alt2"]}`).
    /// An absent or unreadable resource warns and falls back to an empty
    /// mapping instead of failing startup.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("synonym dictionary {} not loaded: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<HashMap<String, Vec<String>>>(&raw) {
            Ok(map) => Self { map },
            Err(e) => {
                warn!("synonym dictionary {} is not valid JSON: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Rewrites a tokenized title: every token present in the dictionary is
    /// replaced by one uniformly random alternative, everything else passes
    /// through. Tokens are re-joined with no separator.
    ///
    /// The output is a raw candidate only — it always goes through an LLM
    /// normalization call before being shown to anyone.
    pub fn substitute<R: Rng + ?Sized>(&self, tokens: &[String], rng: &mut R) -> String {
        tokens
            .iter()
            .map(|token| {
                self.map
                    .get(token)
                    .and_then(|alternatives| alternatives.choose(rng))
                    .unwrap_or(token)
                    .as_str()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn dict() -> SynonymDict {
        let mut map = HashMap::new();
        map.insert("組立".to_string(), vec!["アセンブリ".to_string(), "組み立て".to_string()]);
        SynonymDict::from_map(map)
    }

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let mut rng = SmallRng::seed_from_u64(1);
        let result = dict().substitute(&tokens(&["工場", "での", "検品"]), &mut rng);
        assert_eq!(result, "工場での検品");
    }

    #[test]
    fn test_known_token_is_replaced() {
        let mut rng = SmallRng::seed_from_u64(1);
        let result = dict().substitute(&tokens(&["組立"]), &mut rng);
        assert!(result == "アセンブリ" || result == "組み立て");
    }

    #[test]
    fn test_both_alternatives_appear_over_trials() {
        let d = dict();
        let input = tokens(&["組立"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(d.substitute(&input, &mut rng));
        }
        assert!(seen.contains("アセンブリ"));
        assert!(seen.contains("組み立て"));
    }

    #[test]
    fn test_empty_dict_is_noop() {
        let mut rng = SmallRng::seed_from_u64(1);
        let d = SynonymDict::default();
        assert!(d.is_empty());
        let result = d.substitute(&tokens(&["組立", "担当"]), &mut rng);
        assert_eq!(result, "組立担当");
    }

    #[test]
    fn test_missing_resource_falls_back_to_empty() {
        let d = SynonymDict::load(Path::new("/nonexistent/replacement_dict.json"));
        assert!(d.is_empty());
    }
}
