use crate::api::types::BlogListResponse;

/// Where an appendable listing stands relative to the server's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current_page: u32,
    page_count: u32,
    total: u64,
    loaded: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        PageCursor {
            current_page: 1,
            page_count: 0,
            total: 0,
            loaded: 0,
        }
    }
}

impl PageCursor {
    /// Cursor after loading `page` and holding `loaded` items overall.
    pub fn from(response: &BlogListResponse, page: u32, loaded: usize) -> Self {
        PageCursor {
            current_page: page.max(1),
            page_count: response.pages,
            total: response.total,
            loaded,
        }
    }

    pub fn with_loaded(self, loaded: usize) -> Self {
        PageCursor { loaded, ..self }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.page_count
    }

    pub fn next_page(&self) -> Option<u32> {
        if self.has_more() {
            Some(self.current_page + 1)
        } else {
            None
        }
    }

    /// Items the server has that are not loaded yet.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.loaded as u64)
    }
}
