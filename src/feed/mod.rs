use serde::Serialize;
use std::num::NonZeroU32;

use crate::database::{Connection, Result};
use crate::schema::{FeedEntry, Post};
use crate::types::id::{GroupId, UserId};

/// One page of an ordered feed plus the metadata UI controls
/// need to render pagination links.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    pub number: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items: Vec<T>,
}

/// Resolved window into a feed: which page we settled on after
/// clamping, and the LIMIT/OFFSET to fetch it.
#[derive(Debug, PartialEq, Eq)]
pub struct PageBounds {
    pub number: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub limit: i64,
    pub offset: i64,
}

/// Fixed-size paginator shared by every feed view.
///
/// A page request that is not a number falls back to the first
/// page; a number outside the valid range clamps to the last
/// page. An empty feed still has one (empty) page.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: NonZeroU32,
}

impl Paginator {
    #[must_use]
    pub const fn new(page_size: NonZeroU32) -> Self {
        Self { page_size }
    }

    #[must_use]
    pub fn resolve(&self, total_items: i64, requested: Option<&str>) -> PageBounds {
        let size = u64::from(self.page_size.get());
        let total_items = u64::try_from(total_items).unwrap_or_default();
        let total_pages = (total_items.max(1)).div_ceil(size);

        let number = match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            None => 1,
            Some(n) if n < 1 => total_pages,
            Some(n) => u64::try_from(n).unwrap_or_default().min(total_pages),
        };

        #[allow(clippy::cast_possible_wrap)]
        PageBounds {
            number,
            total_pages,
            total_items,
            limit: size as i64,
            offset: ((number - 1) * size) as i64,
        }
    }
}

impl PageBounds {
    fn into_page(self, items: Vec<FeedEntry>) -> Page<FeedEntry> {
        Page {
            number: self.number,
            total_pages: self.total_pages,
            total_items: self.total_items,
            items,
        }
    }
}

/// All posts, newest first.
#[tracing::instrument(skip(conn))]
pub async fn global(
    conn: &mut Connection,
    paginator: Paginator,
    page: Option<&str>,
) -> Result<Page<FeedEntry>> {
    let total = Post::count_all(conn).await?;
    let bounds = paginator.resolve(total, page);
    let items = Post::page_all(conn, bounds.limit, bounds.offset).await?;
    Ok(bounds.into_page(items))
}

/// Posts placed in one group, newest first.
#[tracing::instrument(skip(conn))]
pub async fn group(
    conn: &mut Connection,
    paginator: Paginator,
    group_id: GroupId,
    page: Option<&str>,
) -> Result<Page<FeedEntry>> {
    let total = Post::count_in_group(conn, group_id).await?;
    let bounds = paginator.resolve(total, page);
    let items = Post::page_in_group(conn, group_id, bounds.limit, bounds.offset).await?;
    Ok(bounds.into_page(items))
}

/// Posts authored by one user, newest first.
#[tracing::instrument(skip(conn))]
pub async fn profile(
    conn: &mut Connection,
    paginator: Paginator,
    author_id: UserId,
    page: Option<&str>,
) -> Result<Page<FeedEntry>> {
    let total = Post::count_by_author(conn, author_id).await?;
    let bounds = paginator.resolve(total, page);
    let items = Post::page_by_author(conn, author_id, bounds.limit, bounds.offset).await?;
    Ok(bounds.into_page(items))
}

/// Posts authored by anyone the viewer follows, newest first.
#[tracing::instrument(skip(conn))]
pub async fn following(
    conn: &mut Connection,
    paginator: Paginator,
    user_id: UserId,
    page: Option<&str>,
) -> Result<Page<FeedEntry>> {
    let total = Post::count_followed_by(conn, user_id).await?;
    let bounds = paginator.resolve(total, page);
    let items = Post::page_followed_by(conn, user_id, bounds.limit, bounds.offset).await?;
    Ok(bounds.into_page(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginator(size: u32) -> Paginator {
        Paginator::new(NonZeroU32::new(size).unwrap())
    }

    #[test]
    fn thirteen_posts_split_across_two_pages() {
        let p = paginator(10);

        let first = p.resolve(13, Some("1"));
        assert_eq!(first.number, 1);
        assert_eq!(first.total_pages, 2);
        assert_eq!((first.limit, first.offset), (10, 0));

        let second = p.resolve(13, Some("2"));
        assert_eq!(second.number, 2);
        assert_eq!((second.limit, second.offset), (10, 10));
        // page 2 holds the remaining 3 items; LIMIT stays at the
        // page size and the database returns fewer rows
        assert_eq!(second.total_items, 13);
    }

    #[test]
    fn out_of_range_pages_clamp_to_last() {
        let p = paginator(10);
        assert_eq!(p.resolve(13, Some("9000")).number, 2);
        assert_eq!(p.resolve(13, Some("0")).number, 2);
        assert_eq!(p.resolve(13, Some("-4")).number, 2);
    }

    #[test]
    fn non_numeric_pages_fall_back_to_first() {
        let p = paginator(10);
        assert_eq!(p.resolve(13, Some("abc")).number, 1);
        assert_eq!(p.resolve(13, Some("")).number, 1);
        assert_eq!(p.resolve(13, None).number, 1);
    }

    #[test]
    fn empty_feed_still_has_one_page() {
        let p = paginator(10);
        let bounds = p.resolve(0, None);
        assert_eq!(bounds.number, 1);
        assert_eq!(bounds.total_pages, 1);
        assert_eq!(bounds.total_items, 0);
        assert_eq!(bounds.offset, 0);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let p = paginator(10);
        assert_eq!(p.resolve(20, Some("3")).number, 2);
        assert_eq!(p.resolve(20, Some("2")).total_pages, 2);
    }
}
