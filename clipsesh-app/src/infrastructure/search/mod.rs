mod fuzzy;

pub use fuzzy::{FuzzyMatcher, MATCH_THRESHOLD};
