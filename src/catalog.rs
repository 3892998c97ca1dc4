use crate::models::Category;

/// The categories offered by the job service, fetched once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn first(&self) -> Option<&Category> {
        self.categories.first()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.id == id)
    }

    /// Category `step` places away from `id`, wrapping around.
    pub fn cycle_from(&self, id: &str, step: isize) -> Option<&Category> {
        let len = self.categories.len() as isize;
        if len == 0 {
            return None;
        }
        let current = self.position(id).map(|p| p as isize).unwrap_or(0);
        let next = (current + step).rem_euclid(len) as usize;
        self.categories.get(next)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_catalog() -> CategoryCatalog {
        CategoryCatalog::new(vec![
            Category {
                id: "backend".to_string(),
                name: "Backend Engineer".to_string(),
                core_keywords: vec!["java".into(), "spring".into(), "kotlin".into()],
                auxiliary_keywords: vec!["aws".into(), "docker".into()],
            },
            Category {
                id: "publisher".to_string(),
                name: "Web Publisher".to_string(),
                core_keywords: vec!["html".into(), "css".into()],
                auxiliary_keywords: vec!["figma".into(), "jquery".into(), "scss".into()],
            },
        ])
    }

    #[test]
    fn test_find_and_first() {
        let catalog = sample_catalog();
        assert_eq!(catalog.first().unwrap().id, "backend");
        assert_eq!(catalog.find("publisher").unwrap().name, "Web Publisher");
        assert!(catalog.find("designer").is_none());
    }

    #[test]
    fn test_cycle_wraps_in_both_directions() {
        let catalog = sample_catalog();
        assert_eq!(catalog.cycle_from("backend", 1).unwrap().id, "publisher");
        assert_eq!(catalog.cycle_from("publisher", 1).unwrap().id, "backend");
        assert_eq!(catalog.cycle_from("backend", -1).unwrap().id, "publisher");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = CategoryCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.first().is_none());
        assert!(catalog.cycle_from("backend", 1).is_none());
    }
}
