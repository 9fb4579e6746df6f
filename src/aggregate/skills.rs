use std::collections::HashMap;

use serde::Serialize;

use crate::data::model::JobListing;

/// Separator between tags inside a `skills_tags` cell.
pub const SKILL_DELIMITER: &str = ", ";

/// Token a missing `skills_tags` cell contributes to the counts.
pub const MISSING_SKILLS_TOKEN: &str = "nan";

/// Placeholder tags dropped from the skill chart ("不拘" = unspecified).
pub const PLACEHOLDER_TAGS: [&str; 3] = ["NA", "nan", "不拘"];

/// How many of the most frequent tags the chart looks at before placeholders
/// are removed.
pub const SKILL_CHART_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

impl SkillCount {
    pub fn new(skill: impl Into<String>, count: usize) -> Self {
        Self {
            skill: skill.into(),
            count,
        }
    }
}

/// Split every listing's tags, flatten and count.
/// Sorted by descending count; ties keep first-seen order.
pub fn skill_frequencies<'a, I>(listings: I) -> Vec<SkillCount>
where
    I: IntoIterator<Item = &'a JobListing>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<SkillCount> = Vec::new();

    for listing in listings {
        let tags = listing.skills_tags.as_deref().unwrap_or(MISSING_SKILLS_TOKEN);
        for tag in tags.split(SKILL_DELIMITER) {
            match slots.get(tag) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    slots.insert(tag, counts.len());
                    counts.push(SkillCount::new(tag, 1));
                }
            }
        }
    }

    sort_by_count(&mut counts);
    counts
}

fn sort_by_count(counts: &mut [SkillCount]) {
    // sort_by is stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
}

/// The single most frequent tag, `None` when nothing was counted.
pub fn most_frequent(frequencies: &[SkillCount]) -> Option<&SkillCount> {
    frequencies.iter().fold(None, |best: Option<&SkillCount>, s| match best {
        Some(b) if b.count >= s.count => Some(b),
        _ => Some(s),
    })
}

/// Chart rows: the top [`SKILL_CHART_LEN`] tags by frequency with
/// placeholder tags removed afterwards. Order is descending count.
pub fn skill_chart(frequencies: &[SkillCount]) -> Vec<SkillCount> {
    let mut sorted = frequencies.to_vec();
    sort_by_count(&mut sorted);
    sorted
        .into_iter()
        .take(SKILL_CHART_LEN)
        .filter(|s| !PLACEHOLDER_TAGS.contains(&s.skill.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_tags(tags: Option<&str>) -> JobListing {
        JobListing {
            skills_tags: tags.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn test_chart_drops_placeholders_after_top_five() {
        let freqs = vec![
            SkillCount::new("Python", 5),
            SkillCount::new("SQL", 3),
            SkillCount::new("NA", 10),
            SkillCount::new("不拘", 7),
            SkillCount::new("Go", 1),
        ];
        assert_eq!(
            skill_chart(&freqs),
            vec![
                SkillCount::new("Python", 5),
                SkillCount::new("SQL", 3),
                SkillCount::new("Go", 1),
            ]
        );
    }

    #[test]
    fn test_chart_cuts_before_filtering() {
        let freqs: Vec<SkillCount> = ["nan", "A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, s)| SkillCount::new(*s, 10 - i))
            .collect();
        let chart: Vec<String> = skill_chart(&freqs).into_iter().map(|s| s.skill).collect();
        assert_eq!(chart, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_frequencies_split_and_tie_break() {
        let listings = vec![
            with_tags(Some("Go, SQL")),
            with_tags(Some("Python, SQL")),
            with_tags(None),
            with_tags(Some("Python")),
        ];
        let freqs = skill_frequencies(&listings);
        assert_eq!(
            freqs,
            vec![
                SkillCount::new("SQL", 2),
                SkillCount::new("Python", 2),
                SkillCount::new("Go", 1),
                SkillCount::new("nan", 1),
            ]
        );
        assert_eq!(most_frequent(&freqs).map(|s| s.skill.as_str()), Some("SQL"));
    }

    #[test]
    fn test_most_frequent_of_nothing() {
        assert!(most_frequent(&[]).is_none());
        assert!(skill_frequencies(std::iter::empty::<&JobListing>()).is_empty());
    }
}
