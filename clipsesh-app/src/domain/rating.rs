use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A clipteam verdict on a clip: a score from 1 to 4, or a veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingValue {
    One,
    Two,
    Three,
    Four,
    Deny,
}

impl RatingValue {
    /// Canonical display order; also the tie-break order for [`most_chosen`].
    pub const ORDER: [RatingValue; 5] = [
        RatingValue::One,
        RatingValue::Two,
        RatingValue::Three,
        RatingValue::Four,
        RatingValue::Deny,
    ];

    pub fn from_score(score: u64) -> Option<Self> {
        match score {
            1 => Some(RatingValue::One),
            2 => Some(RatingValue::Two),
            3 => Some(RatingValue::Three),
            4 => Some(RatingValue::Four),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingValue::One => "1",
            RatingValue::Two => "2",
            RatingValue::Three => "3",
            RatingValue::Four => "4",
            RatingValue::Deny => "deny",
        }
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, RatingValue::Deny)
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deny" | "denied" => Ok(RatingValue::Deny),
            other => other
                .parse::<u64>()
                .ok()
                .and_then(RatingValue::from_score)
                .ok_or_else(|| format!("invalid rating `{other}`")),
        }
    }
}

// Scores travel as JSON numbers, the veto as the string "deny".
impl Serialize for RatingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RatingValue::One => serializer.serialize_u8(1),
            RatingValue::Two => serializer.serialize_u8(2),
            RatingValue::Three => serializer.serialize_u8(3),
            RatingValue::Four => serializer.serialize_u8(4),
            RatingValue::Deny => serializer.serialize_str("deny"),
        }
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => RatingValue::from_score(n)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid rating `{n}`"))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingUser {
    pub user_id: uuid::Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingCount {
    pub rating: RatingValue,
    pub count: u32,
    pub users: Vec<RatingUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub clip_id: uuid::Uuid,
    pub rating_counts: Vec<RatingCount>,
}

impl RatingSummary {
    /// Group individual votes into per-category counts, canonical order, empty
    /// categories omitted.
    pub fn tally(
        clip_id: uuid::Uuid,
        votes: impl IntoIterator<Item = (RatingValue, RatingUser)>,
    ) -> Self {
        let mut buckets: Vec<(RatingValue, Vec<RatingUser>)> =
            RatingValue::ORDER.iter().map(|r| (*r, Vec::new())).collect();

        for (value, user) in votes {
            if let Some((_, users)) = buckets.iter_mut().find(|(r, _)| *r == value) {
                users.push(user);
            }
        }

        let rating_counts = buckets
            .into_iter()
            .filter(|(_, users)| !users.is_empty())
            .map(|(rating, users)| RatingCount {
                rating,
                count: users.len() as u32,
                users,
            })
            .collect();

        Self {
            clip_id,
            rating_counts,
        }
    }
}

/// True iff the clip collected at least `threshold` deny votes.
pub fn is_denied(counts: &[RatingCount], threshold: i32) -> bool {
    counts
        .iter()
        .any(|c| c.rating.is_deny() && i64::from(c.count) >= i64::from(threshold))
}

/// Category with the highest count; ties go to the first one encountered.
pub fn most_chosen(counts: &[RatingCount]) -> Option<RatingValue> {
    let mut best: Option<&RatingCount> = None;
    for entry in counts {
        match best {
            Some(current) if entry.count <= current.count => {}
            _ => best = Some(entry),
        }
    }
    best.map(|c| c.rating)
}

/// Body of `POST /ratings/:clipId`: either a score or a deny flag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingRequest {
    pub rating: Option<RatingValue>,
    pub deny: Option<bool>,
}

impl RatingRequest {
    pub fn value(&self) -> Option<RatingValue> {
        match (self.rating, self.deny) {
            (Some(value), _) => Some(value),
            (None, Some(true)) => Some(RatingValue::Deny),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(rating: RatingValue, count: u32) -> RatingCount {
        RatingCount {
            rating,
            count,
            users: Vec::new(),
        }
    }

    #[test]
    fn deny_threshold_is_inclusive() {
        let four = [count(RatingValue::Two, 7), count(RatingValue::Deny, 4)];
        let five = [count(RatingValue::Two, 7), count(RatingValue::Deny, 5)];
        assert!(!is_denied(&four, 5));
        assert!(is_denied(&five, 5));
    }

    #[test]
    fn only_deny_entries_count_against_threshold() {
        let counts = [count(RatingValue::One, 12)];
        assert!(!is_denied(&counts, 5));
        assert!(!is_denied(&[], 0));
    }

    #[test]
    fn most_chosen_breaks_ties_by_first_seen() {
        let counts = [
            count(RatingValue::One, 1),
            count(RatingValue::Three, 3),
            count(RatingValue::Four, 3),
        ];
        assert_eq!(most_chosen(&counts), Some(RatingValue::Three));
        assert_eq!(most_chosen(&[]), None);
    }

    #[test]
    fn tally_groups_in_canonical_order() {
        let clip = uuid::Uuid::new_v4();
        let user = |name: &str| RatingUser {
            user_id: uuid::Uuid::new_v4(),
            username: name.to_string(),
        };
        let summary = RatingSummary::tally(
            clip,
            vec![
                (RatingValue::Deny, user("a")),
                (RatingValue::Two, user("b")),
                (RatingValue::Deny, user("c")),
            ],
        );
        let ratings: Vec<_> = summary
            .rating_counts
            .iter()
            .map(|c| (c.rating, c.count))
            .collect();
        assert_eq!(ratings, vec![(RatingValue::Two, 1), (RatingValue::Deny, 2)]);
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let parsed: Vec<RatingValue> = serde_json::from_str(r#"[1, "4", "deny", "denied"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![RatingValue::One, RatingValue::Four, RatingValue::Deny, RatingValue::Deny]
        );
        assert!(serde_json::from_str::<RatingValue>("5").is_err());
        assert_eq!(serde_json::to_string(&RatingValue::Three).unwrap(), "3");
        assert_eq!(serde_json::to_string(&RatingValue::Deny).unwrap(), "\"deny\"");
    }

    #[test]
    fn request_prefers_explicit_score() {
        let deny = RatingRequest { rating: None, deny: Some(true) };
        let score = RatingRequest { rating: Some(RatingValue::Two), deny: Some(true) };
        assert_eq!(deny.value(), Some(RatingValue::Deny));
        assert_eq!(score.value(), Some(RatingValue::Two));
        assert_eq!(RatingRequest::default().value(), None);
    }
}
