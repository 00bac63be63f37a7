//! `MenuLayout` / `MenuPage` — the build request the archive pipeline plans
//! against. Rendering the menus themselves is explicitly out of scope.

use serde::{Deserialize, Serialize};

use super::video_ref::VideoRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuPage {
    pub title: String,
    pub videos: Vec<VideoRef>,
}

/// Ordered sequence of pages; the i-th page defines DVD menu page `i + 1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuLayout {
    pub pages: Vec<MenuPage>,
}

impl MenuLayout {
    /// 1-based menu page index paired with its page, matching the `NN_`
    /// filesystem naming convention (§6.1).
    pub fn indexed_pages(&self) -> impl Iterator<Item = (usize, &MenuPage)> {
        self.pages.iter().enumerate().map(|(i, page)| (i + 1, page))
    }
}
