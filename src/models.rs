use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub core_keywords: Vec<String>,
    pub auxiliary_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub source: String, // "saramin", "wanted", "linkedin", ...
    pub company: String,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub conditions: Vec<String>, // employment type, salary, career, ...
    #[allow(dead_code)]
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub excluded_keywords: Vec<String>, // only populated for excluded jobs
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub matched: Vec<Job>,
    pub excluded: Vec<Job>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_count: Option<usize>,
}

impl SearchResult {
    pub fn partition(&self, partition: Partition) -> &[Job] {
        match partition {
            Partition::Matched => &self.matched,
            Partition::Excluded => &self.excluded,
        }
    }

    /// Count reported by the service, which may exceed what was returned.
    pub fn reported_count(&self, partition: Partition) -> Option<usize> {
        match partition {
            Partition::Matched => self.matched_count,
            Partition::Excluded => self.excluded_count,
        }
    }

    /// Number of returned postings, with the service's total appended when
    /// the response was cut short: "200" or "200 of 350".
    pub fn count_label(&self, partition: Partition) -> String {
        let shown = self.partition(partition).len();
        match self.reported_count(partition) {
            Some(total) if total > shown => format!("{shown} of {total}"),
            _ => shown.to_string(),
        }
    }
}

/// The two halves of a search result as decided by the remote matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Matched,
    Excluded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_decodes_with_missing_optional_lists() {
        let raw = r#"{
            "source": "wanted",
            "company": "Acme",
            "title": "Backend Engineer",
            "link": "https://example.com/1"
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.source, "wanted");
        assert!(job.conditions.is_empty());
        assert!(job.excluded_keywords.is_empty());
    }

    #[test]
    fn test_count_label_uses_returned_length() {
        let raw = r#"{"matched": [], "excluded": [], "excluded_count": 7}"#;
        let result: SearchResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.count_label(Partition::Matched), "0");
        assert_eq!(result.count_label(Partition::Excluded), "0 of 7");
        assert!(result.partition(Partition::Matched).is_empty());
    }

    #[test]
    fn test_count_label_ignores_total_not_above_length() {
        let raw = r#"{
            "matched": [{"source": "wanted", "company": "Acme", "title": "Dev", "link": "l"}],
            "excluded": [],
            "matched_count": 1
        }"#;
        let result: SearchResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.count_label(Partition::Matched), "1");
        assert_eq!(result.reported_count(Partition::Excluded), None);
    }
}
