use std::collections::HashSet;

use crate::catalog::CategoryCatalog;
use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    Core,
    Aux,
}

/// What the user has chosen to filter by.
///
/// Keyword subsets are kept in selection order because the request sends them
/// verbatim. Changing the category resets both subsets to the full vocabulary,
/// which means "no keyword filtering".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    category: Option<Category>,
    locations: Vec<String>,
    core: Vec<String>,
    aux: Vec<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.id.as_str())
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn keywords(&self, kind: KeywordKind) -> &[String] {
        match kind {
            KeywordKind::Core => &self.core,
            KeywordKind::Aux => &self.aux,
        }
    }

    /// Full vocabulary of the selected category for `kind`.
    pub fn vocabulary(&self, kind: KeywordKind) -> &[String] {
        match (&self.category, kind) {
            (Some(c), KeywordKind::Core) => &c.core_keywords,
            (Some(c), KeywordKind::Aux) => &c.auxiliary_keywords,
            (None, _) => &[],
        }
    }

    pub fn is_keyword_selected(&self, kind: KeywordKind, keyword: &str) -> bool {
        self.keywords(kind).iter().any(|k| k == keyword)
    }

    pub fn is_location_selected(&self, region: &str) -> bool {
        self.locations.iter().any(|l| l == region)
    }

    /// Switches to the category `id`. Returns false and leaves the state
    /// untouched when the catalog has no such category.
    pub fn set_category(&mut self, catalog: &CategoryCatalog, id: &str) -> bool {
        let Some(category) = catalog.find(id) else {
            tracing::debug!(category = id, "ignoring unknown category");
            return false;
        };
        self.core = category.core_keywords.clone();
        self.aux = category.auxiliary_keywords.clone();
        self.category = Some(category.clone());
        true
    }

    pub fn toggle_keyword(&mut self, kind: KeywordKind, keyword: &str) {
        toggle(self.keywords_mut(kind), keyword);
    }

    /// Clears the subset when it already holds the full vocabulary, otherwise
    /// selects the full vocabulary.
    pub fn toggle_all_keywords(&mut self, kind: KeywordKind) {
        let next = if self.is_all_selected(kind) {
            Vec::new()
        } else {
            self.vocabulary(kind).to_vec()
        };
        *self.keywords_mut(kind) = next;
    }

    pub fn toggle_location(&mut self, region: &str) {
        toggle(&mut self.locations, region);
    }

    /// True when the subset of `kind` holds exactly the vocabulary, as sets.
    pub fn is_all_selected(&self, kind: KeywordKind) -> bool {
        self.category.is_some() && same_members(self.keywords(kind), self.vocabulary(kind))
    }

    /// True when both keyword groups are fully selected, i.e. the search
    /// should not restrict keywords at all.
    pub fn is_full_keyword_selection(&self) -> bool {
        self.is_all_selected(KeywordKind::Core) && self.is_all_selected(KeywordKind::Aux)
    }

    fn keywords_mut(&mut self, kind: KeywordKind) -> &mut Vec<String> {
        match kind {
            KeywordKind::Core => &mut self.core,
            KeywordKind::Aux => &mut self.aux,
        }
    }
}

fn toggle(list: &mut Vec<String>, item: &str) {
    if let Some(pos) = list.iter().position(|x| x == item) {
        list.remove(pos);
    } else {
        list.push(item.to_string());
    }
}

fn same_members(selected: &[String], vocabulary: &[String]) -> bool {
    let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let vocabulary: HashSet<&str> = vocabulary.iter().map(String::as_str).collect();
    selected == vocabulary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use pretty_assertions::assert_eq;

    fn selected(catalog: &CategoryCatalog, id: &str) -> SelectionState {
        let mut state = SelectionState::new();
        assert!(state.set_category(catalog, id));
        state
    }

    #[test]
    fn test_set_category_resets_to_full_vocabulary() {
        let catalog = sample_catalog();
        for category in catalog.categories() {
            let mut state = selected(&catalog, "backend");
            state.toggle_keyword(KeywordKind::Core, "java");
            state.toggle_all_keywords(KeywordKind::Aux);

            assert!(state.set_category(&catalog, &category.id));
            assert_eq!(state.keywords(KeywordKind::Core), category.core_keywords.as_slice());
            assert_eq!(state.keywords(KeywordKind::Aux), category.auxiliary_keywords.as_slice());
            assert!(state.is_full_keyword_selection());
        }
    }

    #[test]
    fn test_set_unknown_category_is_noop() {
        let catalog = sample_catalog();
        let mut state = selected(&catalog, "publisher");
        state.toggle_keyword(KeywordKind::Core, "css");
        let before = state.clone();

        assert!(!state.set_category(&catalog, "designer"));
        assert_eq!(state, before);
    }

    #[test]
    fn test_toggle_keyword_removes_then_appends() {
        let catalog = sample_catalog();
        let mut state = selected(&catalog, "backend");

        state.toggle_keyword(KeywordKind::Core, "java");
        assert_eq!(state.keywords(KeywordKind::Core), ["spring", "kotlin"]);
        assert!(!state.is_full_keyword_selection());

        state.toggle_keyword(KeywordKind::Core, "java");
        assert_eq!(state.keywords(KeywordKind::Core), ["spring", "kotlin", "java"]);
        assert!(state.is_full_keyword_selection());
    }

    #[test]
    fn test_removing_any_single_keyword_breaks_full_selection() {
        let catalog = sample_catalog();
        let base = selected(&catalog, "publisher");
        for kind in [KeywordKind::Core, KeywordKind::Aux] {
            for keyword in base.vocabulary(kind).to_vec() {
                let mut state = base.clone();
                state.toggle_keyword(kind, &keyword);
                assert!(!state.is_full_keyword_selection(), "{keyword}");
            }
        }
    }

    #[test]
    fn test_toggle_all_is_an_involution_from_full_and_empty() {
        let catalog = sample_catalog();
        let mut state = selected(&catalog, "backend");
        let full = state.keywords(KeywordKind::Aux).to_vec();

        state.toggle_all_keywords(KeywordKind::Aux);
        assert!(state.keywords(KeywordKind::Aux).is_empty());
        state.toggle_all_keywords(KeywordKind::Aux);
        assert_eq!(state.keywords(KeywordKind::Aux), full.as_slice());

        state.toggle_all_keywords(KeywordKind::Aux);
        let empty = state.keywords(KeywordKind::Aux).to_vec();
        state.toggle_all_keywords(KeywordKind::Aux);
        state.toggle_all_keywords(KeywordKind::Aux);
        assert_eq!(state.keywords(KeywordKind::Aux), empty.as_slice());
    }

    #[test]
    fn test_toggle_all_from_partial_selects_everything() {
        let catalog = sample_catalog();
        let mut state = selected(&catalog, "backend");
        state.toggle_keyword(KeywordKind::Core, "spring");

        state.toggle_all_keywords(KeywordKind::Core);
        assert_eq!(state.keywords(KeywordKind::Core), ["java", "spring", "kotlin"]);
    }

    #[test]
    fn test_full_selection_compares_members_not_sizes() {
        let catalog = sample_catalog();
        let mut state = selected(&catalog, "backend");
        // Same cardinality as the vocabulary, different contents.
        state.toggle_keyword(KeywordKind::Aux, "docker");
        state.toggle_keyword(KeywordKind::Aux, "python");
        assert_eq!(state.keywords(KeywordKind::Aux).len(), 2);
        assert!(!state.is_full_keyword_selection());
    }

    #[test]
    fn test_no_category_is_never_full() {
        let state = SelectionState::new();
        assert!(!state.is_full_keyword_selection());
        assert!(state.vocabulary(KeywordKind::Core).is_empty());
    }

    #[test]
    fn test_toggle_location_is_symmetric() {
        let mut state = SelectionState::new();
        state.toggle_location("서울");
        state.toggle_location("경기");
        assert_eq!(state.locations(), ["서울", "경기"]);
        state.toggle_location("서울");
        assert_eq!(state.locations(), ["경기"]);
        assert!(state.is_location_selected("경기"));
    }
}
