//! Viewport-adaptive pagination over an already fetched result set.
//!
//! Each result partition owns one [`PageIndexed`] and one [`ProgressiveReveal`]
//! window. The viewport mode only picks which of the two is consulted, so
//! switching modes never touches the result sequences or the other window.
//! Changing pages re-slices the fetched sequence; nothing is refetched.

use std::ops::Range;

use crate::models::{Job, Partition, SearchResult};
use crate::viewport::ViewMode;

/// A window over an ordered sequence of `len` items.
pub trait PaginationStrategy {
    /// Indices of the items currently on screen.
    fn visible_range(&self, len: usize) -> Range<usize>;

    /// Returns the window to its starting position.
    fn reset(&mut self);
}

/// Regular mode: fixed-size numbered pages, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndexed {
    page_size: usize,
    current_page: usize,
}

impl PageIndexed {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    pub fn go_to(&mut self, page: usize, len: usize) {
        self.current_page = page.clamp(1, self.total_pages(len));
    }

    pub fn next(&mut self, len: usize) {
        self.go_to(self.current_page + 1, len);
    }

    pub fn prev(&mut self, len: usize) {
        self.go_to(self.current_page.saturating_sub(1), len);
    }

    pub fn last(&mut self, len: usize) {
        self.go_to(self.total_pages(len), len);
    }

    /// Page selector for the current page: first page, gap marker, a window
    /// of current ± 2, gap marker, last page.
    pub fn selector(&self, len: usize) -> PageSelector {
        let total = self.total_pages(len);
        let current = self.current_page.min(total);
        let start = current.saturating_sub(2).max(1);
        let end = (current + 2).min(total);

        let mut items = Vec::new();
        if start > 1 {
            items.push(PageItem::Page(1));
            if start > 2 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.extend((start..=end).map(PageItem::Page));
        if end < total {
            if end + 1 < total {
                items.push(PageItem::Ellipsis);
            }
            items.push(PageItem::Page(total));
        }

        PageSelector {
            current,
            total,
            prev_enabled: current > 1,
            next_enabled: current < total,
            items,
        }
    }
}

impl PaginationStrategy for PageIndexed {
    fn visible_range(&self, len: usize) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    fn reset(&mut self) {
        self.current_page = 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelector {
    pub current: usize,
    pub total: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub items: Vec<PageItem>,
}

impl PageSelector {
    /// Page numbers shown, ignoring gap markers.
    #[cfg(test)]
    pub fn pages(&self) -> Vec<usize> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PageItem::Page(p) => Some(*p),
                PageItem::Ellipsis => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn has_ellipsis(&self) -> bool {
        self.items.contains(&PageItem::Ellipsis)
    }
}

/// Compact mode: a growing prefix revealed one page at a time by a trigger
/// placed after the last visible item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressiveReveal {
    page_size: usize,
    visible_count: usize,
    margin_rows: usize,
}

impl ProgressiveReveal {
    pub fn new(page_size: usize, margin_rows: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            visible_count: page_size,
            margin_rows,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// The trigger exists only while items remain hidden.
    pub fn has_trigger(&self, len: usize) -> bool {
        self.visible_count < len
    }

    /// Reveals one more page, clamped to `len`. Returns false when nothing
    /// was left to reveal.
    pub fn reveal_more(&mut self, len: usize) -> bool {
        if !self.has_trigger(len) {
            return false;
        }
        self.visible_count = (self.visible_count + self.page_size).min(len);
        true
    }

    /// Fires the trigger when its row comes within the look-ahead margin of
    /// the bottom of the visible region.
    pub fn on_scroll(&mut self, viewport_bottom_row: usize, trigger_row: usize, len: usize) -> bool {
        if trigger_row > viewport_bottom_row + self.margin_rows {
            return false;
        }
        self.reveal_more(len)
    }
}

impl PaginationStrategy for ProgressiveReveal {
    fn visible_range(&self, len: usize) -> Range<usize> {
        0..self.visible_count.min(len)
    }

    fn reset(&mut self) {
        self.visible_count = self.page_size;
    }
}

/// Both windows of one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPager {
    pub pages: PageIndexed,
    pub reveal: ProgressiveReveal,
}

impl PartitionPager {
    pub fn new(page_size: usize, margin_rows: usize) -> Self {
        Self {
            pages: PageIndexed::new(page_size),
            reveal: ProgressiveReveal::new(page_size, margin_rows),
        }
    }

    pub fn active(&self, mode: ViewMode) -> &dyn PaginationStrategy {
        match mode {
            ViewMode::Regular => &self.pages,
            ViewMode::Compact => &self.reveal,
        }
    }

    pub fn reset(&mut self) {
        self.pages.reset();
        self.reveal.reset();
    }
}

/// The installed result set plus an independent pager per partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPaginator {
    result: SearchResult,
    matched: PartitionPager,
    excluded: PartitionPager,
}

impl ResultPaginator {
    pub fn new(result: SearchResult, page_size: usize, margin_rows: usize) -> Self {
        Self {
            result,
            matched: PartitionPager::new(page_size, margin_rows),
            excluded: PartitionPager::new(page_size, margin_rows),
        }
    }

    /// Replaces the result set wholesale and resets every window.
    pub fn install(&mut self, result: SearchResult) {
        self.result = result;
        self.matched.reset();
        self.excluded.reset();
    }

    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    pub fn len(&self, partition: Partition) -> usize {
        self.result.partition(partition).len()
    }

    pub fn pager(&self, partition: Partition) -> &PartitionPager {
        match partition {
            Partition::Matched => &self.matched,
            Partition::Excluded => &self.excluded,
        }
    }

    pub fn pager_mut(&mut self, partition: Partition) -> &mut PartitionPager {
        match partition {
            Partition::Matched => &mut self.matched,
            Partition::Excluded => &mut self.excluded,
        }
    }

    /// Jobs of `partition` on screen under `mode`.
    pub fn visible(&self, partition: Partition, mode: ViewMode) -> &[Job] {
        let jobs = self.result.partition(partition);
        let range = self.pager(partition).active(mode).visible_range(jobs.len());
        &jobs[range]
    }

    /// Index of the first on-screen job within the full partition.
    pub fn visible_offset(&self, partition: Partition, mode: ViewMode) -> usize {
        let len = self.len(partition);
        self.pager(partition).active(mode).visible_range(len).start
    }

    pub fn next_page(&mut self, partition: Partition) {
        let len = self.len(partition);
        self.pager_mut(partition).pages.next(len);
    }

    pub fn prev_page(&mut self, partition: Partition) {
        let len = self.len(partition);
        self.pager_mut(partition).pages.prev(len);
    }

    pub fn first_page(&mut self, partition: Partition) {
        let len = self.len(partition);
        self.pager_mut(partition).pages.go_to(1, len);
    }

    pub fn last_page(&mut self, partition: Partition) {
        let len = self.len(partition);
        self.pager_mut(partition).pages.last(len);
    }

    pub fn selector(&self, partition: Partition) -> PageSelector {
        self.pager(partition).pages.selector(self.len(partition))
    }

    pub fn has_trigger(&self, partition: Partition) -> bool {
        self.pager(partition).reveal.has_trigger(self.len(partition))
    }

    pub fn on_scroll(&mut self, partition: Partition, viewport_bottom_row: usize, trigger_row: usize) -> bool {
        let len = self.len(partition);
        self.pager_mut(partition)
            .reveal
            .on_scroll(viewport_bottom_row, trigger_row, len)
    }
}
