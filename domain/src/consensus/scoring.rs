//! Position-weighted role scoring and domain ranking

use super::entities::RoleRecommendation;
use std::collections::BTreeMap;

/// Weight units per 1.0 of score; keeps sums exact so ties are real ties
const UNITS: u32 = 5;

/// Weight of the role at `index` in one evaluator's list, in fifths:
/// `max(0.2, 1.0 − 0.2·i)`
fn position_units(index: usize) -> u32 {
    UNITS.saturating_sub(index as u32).max(1)
}

/// Weight of the role at `index` in one evaluator's priority list
pub fn position_weight(index: usize) -> f64 {
    f64::from(position_units(index)) / f64::from(UNITS)
}

/// Score roles across evaluators.
///
/// Each list contributes [`position_weight`] per role; sums are divided by
/// `evaluator_count`. Output is sorted by score, highest first, with ties in
/// the order roles were first seen. Lists are expected to be de-duplicated.
pub fn score_roles<'a, I>(role_lists: I, evaluator_count: usize) -> Vec<RoleRecommendation>
where
    I: IntoIterator<Item = &'a [String]>,
{
    if evaluator_count == 0 {
        return Vec::new();
    }

    // First-seen order is the insertion order of this Vec
    let mut totals: Vec<(&'a str, u32)> = Vec::new();
    for roles in role_lists {
        for (index, role) in roles.iter().enumerate() {
            let units = position_units(index);
            match totals.iter_mut().find(|(r, _)| *r == role.as_str()) {
                Some((_, total)) => *total += units,
                None => totals.push((role.as_str(), units)),
            }
        }
    }

    // Stable sort keeps first-seen order among equal totals
    totals.sort_by(|(_, a), (_, b)| b.cmp(a));

    let denominator = f64::from(UNITS) * evaluator_count as f64;
    totals
        .into_iter()
        .map(|(role, units)| RoleRecommendation::new(role, f64::from(units) / denominator))
        .collect()
}

/// Rank domains by how many evaluators named them; ties alphabetical.
pub fn rank_domains<'a, I>(domain_lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
    for domains in domain_lists {
        for domain in domains {
            *counts.entry(domain.as_str()).or_default() += 1;
        }
    }

    // BTreeMap iterates alphabetically; the stable sort keeps that for ties
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
    ranked.into_iter().map(|(d, _)| d.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|l| l.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_position_weight() {
        assert_eq!(position_weight(0), 1.0);
        assert_eq!(position_weight(1), 0.8);
        assert_eq!(position_weight(3), 0.4);
        assert_eq!(position_weight(4), 0.2);
        assert_eq!(position_weight(10), 0.2);
    }

    #[test]
    fn test_position_weighted_scoring() {
        let raw = lists(&[&["R", "I", "T"], &["I", "R", "C"], &["R", "I", "A"]]);
        let scores = score_roles(raw.iter().map(Vec::as_slice), 3);

        assert_eq!(scores[0].role, "R");
        assert_eq!(scores[1].role, "I");
        assert!(scores[0].score >= scores[1].score);
        for low in &scores[2..] {
            assert!(scores[1].score > low.score);
        }
        assert!((scores[0].score - 2.8 / 3.0).abs() < 1e-9);
        assert!((scores[1].score - 2.6 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        // T, C, A all score 0.6/3: first seen is T, then C, then A
        let raw = lists(&[&["R", "I", "T"], &["I", "R", "C"], &["R", "I", "A"]]);
        let scores = score_roles(raw.iter().map(Vec::as_slice), 3);
        let tail: Vec<_> = scores[2..].iter().map(|r| r.role.as_str()).collect();
        assert_eq!(tail, vec!["T", "C", "A"]);
    }

    #[test]
    fn test_scores_bounded_and_non_increasing() {
        let raw = lists(&[&["a", "b", "c", "d", "e", "f", "g"], &["g", "a"]]);
        let scores = score_roles(raw.iter().map(Vec::as_slice), 2);
        for pair in scores.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(scores.iter().all(|r| (0.0..=1.0).contains(&r.score)));
    }

    #[test]
    fn test_normalized_by_evaluator_count() {
        // One of four evaluators named nothing; the denominator still counts it
        let raw = lists(&[&["x"], &["x"], &["x"], &[]]);
        let scores = score_roles(raw.iter().map(Vec::as_slice), 4);
        assert!((scores[0].score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_rank_domains() {
        let raw = lists(&[
            &["security", "api"],
            &["api", "database"],
            &["api", "security"],
            &["caching"],
        ]);
        let ranked = rank_domains(raw.iter().map(Vec::as_slice));
        assert_eq!(ranked, vec!["api", "security", "caching", "database"]);
    }
}
