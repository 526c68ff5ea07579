//! Windowed presentation of result lists.
//!
//! Everything here is pure: given the item count and scroll geometry it
//! computes which indices to materialize and whether the browse list is close
//! enough to its end to ask the loader for more. Acting on that decision is
//! left to the caller (see `session`).

use std::ops::Range;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEM_HEIGHT: f64 = 200.0;
pub const DEFAULT_OVERSCAN: usize = 5;
pub const DEFAULT_LOAD_MORE_THRESHOLD: f64 = 1.5;

/// Which list is on screen. Only the browse list pages in more records;
/// search results are always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.scroll_height - self.scroll_top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualItem {
    pub index: usize,
    pub start: f64,
    pub size: f64,
}

/// Fixed-height virtualization with an overscan margin on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualWindow {
    item_height: f64,
    overscan: usize,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_HEIGHT, DEFAULT_OVERSCAN)
    }
}

impl VirtualWindow {
    pub fn new(item_height: f64, overscan: usize) -> Self {
        Self { item_height, overscan }
    }

    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Height of the whole list if every item were rendered.
    pub fn total_size(&self, count: usize) -> f64 {
        count as f64 * self.item_height
    }

    pub fn item_offset(&self, index: usize) -> f64 {
        index as f64 * self.item_height
    }

    /// Indices intersecting the viewport, widened by the overscan.
    pub fn visible_range(&self, count: usize, scroll_offset: f64, viewport_height: f64) -> Range<usize> {
        if count == 0 || self.item_height <= 0.0 || !self.item_height.is_finite() {
            return 0..0;
        }

        let top = scroll_offset.max(0.0);
        let bottom = top + viewport_height.max(0.0);

        let first = ((top / self.item_height).floor() as usize).min(count);
        let last = ((bottom / self.item_height).ceil() as usize).clamp(first, count);

        first.saturating_sub(self.overscan)..last.saturating_add(self.overscan).min(count)
    }

    pub fn virtual_items(&self, count: usize, scroll_offset: f64, viewport_height: f64) -> Vec<VirtualItem> {
        self.visible_range(count, scroll_offset, viewport_height)
            .map(|index| VirtualItem {
                index,
                start: self.item_offset(index),
                size: self.item_height,
            })
            .collect()
    }
}

/// Fires when the remaining scroll distance is within `threshold` viewports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadMoreTrigger {
    threshold: f64,
}

impl Default for LoadMoreTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_MORE_THRESHOLD)
    }
}

impl LoadMoreTrigger {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn should_load_more(&self, metrics: &ScrollMetrics) -> bool {
        metrics.remaining() <= metrics.client_height * self.threshold
    }
}

/// What the view should render for one scroll position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub mode: ListMode,
    pub range: Range<usize>,
    pub total_size: f64,
    pub load_more: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResultPresenter {
    window: VirtualWindow,
    trigger: LoadMoreTrigger,
}

impl ResultPresenter {
    pub fn new(window: VirtualWindow, trigger: LoadMoreTrigger) -> Self {
        Self { window, trigger }
    }

    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    /// Compute the frame for `count` items. `can_load_more` is the loader's
    /// `has_more`; it only matters in browse mode.
    pub fn frame(&self, mode: ListMode, count: usize, metrics: &ScrollMetrics, can_load_more: bool) -> Frame {
        let load_more = match mode {
            ListMode::Browse => can_load_more && self.trigger.should_load_more(metrics),
            ListMode::Search => false,
        };

        Frame {
            mode,
            range: self.window.visible_range(count, metrics.scroll_top, metrics.client_height),
            total_size: self.window.total_size(count),
            load_more,
        }
    }
}
