use ratatui::prelude::*;

use crate::config::source_color;
use crate::models::{Job, Partition};

/// Display projection of a job posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard<'a> {
    pub source: &'a str,
    pub badge_color: Color,
    pub company: &'a str,
    pub title: &'a str,
    pub link: &'a str,
    pub matched_chips: &'a [String],
    /// Only populated for the excluded partition.
    pub excluded_chips: &'a [String],
    pub conditions: Option<String>,
}

impl<'a> JobCard<'a> {
    pub fn new(job: &'a Job, partition: Partition) -> Self {
        let excluded_chips: &[String] = match partition {
            Partition::Excluded => &job.excluded_keywords,
            Partition::Matched => &[],
        };
        let conditions = (!job.conditions.is_empty()).then(|| job.conditions.join(" · "));
        Self {
            source: &job.source,
            badge_color: source_color(&job.source),
            company: &job.company,
            title: &job.title,
            link: &job.link,
            matched_chips: &job.matched_keywords,
            excluded_chips,
            conditions,
        }
    }

    /// Renders the card as terminal lines wrapped to `width` columns.
    pub fn lines(&self, width: usize, highlighted: bool) -> Vec<Line<'static>> {
        let width = width.max(10);
        let mut lines = Vec::new();

        let marker = if highlighted { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(
                format!(" {} ", self.source),
                Style::default().fg(Color::Black).bg(self.badge_color),
            ),
            Span::raw(" "),
            Span::styled(self.company.to_string(), Style::default().fg(Color::Gray)),
        ]));

        let title_style = if highlighted {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        for line in textwrap::wrap(self.title, width.saturating_sub(2)) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(line.into_owned(), title_style),
            ]));
        }

        if !self.matched_chips.is_empty() || !self.excluded_chips.is_empty() {
            let mut chips = vec![Span::raw("  ")];
            for kw in self.matched_chips {
                chips.push(Span::styled(format!("[{}]", kw), Style::default().fg(Color::Green)));
                chips.push(Span::raw(" "));
            }
            for kw in self.excluded_chips {
                chips.push(Span::styled(
                    format!("[{}]", kw),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ));
                chips.push(Span::raw(" "));
            }
            lines.push(Line::from(chips));
        }

        if let Some(conditions) = &self.conditions {
            for line in textwrap::wrap(conditions, width.saturating_sub(2)) {
                lines.push(Line::from(Span::styled(
                    format!("  {}", line),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }

        lines.push(Line::from(""));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::tests::jobs;

    fn excluded_job() -> Job {
        let mut job = jobs(1, "jumpit").remove(0);
        job.excluded_keywords = vec!["php".to_string()];
        job.conditions = vec!["정규직".to_string(), "경력 3년".to_string()];
        job
    }

    #[test]
    fn test_excluded_chips_only_in_excluded_partition() {
        let job = excluded_job();
        let card = JobCard::new(&job, Partition::Matched);
        assert!(card.excluded_chips.is_empty());

        let card = JobCard::new(&job, Partition::Excluded);
        assert_eq!(card.excluded_chips, ["php"]);
        assert_eq!(card.badge_color, Color::Cyan);
    }

    #[test]
    fn test_conditions_joined_with_middle_dot() {
        let job = excluded_job();
        let card = JobCard::new(&job, Partition::Matched);
        assert_eq!(card.conditions.as_deref(), Some("정규직 · 경력 3년"));

        let mut bare = job.clone();
        bare.conditions.clear();
        assert_eq!(JobCard::new(&bare, Partition::Matched).conditions, None);
    }

    #[test]
    fn test_lines_end_with_spacer() {
        let job = excluded_job();
        let lines = JobCard::new(&job, Partition::Excluded).lines(40, false);
        // badge row, title, chips, conditions, spacer
        assert_eq!(lines.len(), 5);
        assert_eq!(lines.last().unwrap().width(), 0);
    }
}
