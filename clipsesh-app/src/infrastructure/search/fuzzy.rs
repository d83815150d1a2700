use strsim::normalized_levenshtein;

/// Highest score (0 is a perfect match) at which a field still counts as a hit.
pub const MATCH_THRESHOLD: f64 = 0.3;

/// Approximate-substring matching over a handful of text fields.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    query: String,
    threshold: f64,
}

impl FuzzyMatcher {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            threshold: MATCH_THRESHOLD,
        }
    }

    /// Score of one field against the query, in `[0, 1]`.
    pub fn score(&self, field: &str) -> f64 {
        let field = field.to_lowercase();
        if self.query.is_empty() {
            return 1.0;
        }
        if field.contains(&self.query) {
            return 0.0;
        }

        let chars: Vec<char> = field.chars().collect();
        let q = self.query.chars().count();
        let mut best = normalized_levenshtein(&self.query, &field);

        // Windows one shorter and one longer absorb a dropped or doubled letter.
        for width in [q.saturating_sub(1), q, q + 1] {
            if width == 0 || width > chars.len() {
                continue;
            }
            for window in chars.windows(width) {
                let candidate: String = window.iter().collect();
                let similarity = normalized_levenshtein(&self.query, &candidate);
                if similarity > best {
                    best = similarity;
                }
            }
        }

        1.0 - best
    }

    /// Best score across fields, or `None` when no field is close enough.
    pub fn best_score<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> Option<f64> {
        fields
            .into_iter()
            .map(|f| self.score(f))
            .filter(|s| *s <= self.threshold)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Keep matching items, best first. Equal scores keep their input order.
    pub fn rank<T, F>(&self, items: Vec<T>, fields: F) -> Vec<T>
    where
        F: Fn(&T) -> Vec<&str>,
    {
        let mut scored: Vec<(f64, T)> = items
            .into_iter()
            .filter_map(|item| {
                let score = self.best_score(fields(&item))?;
                Some((score, item))
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.into_iter().map(|(_, item)| item).collect()
    }
}
