//! Pure derivation of what the dashboard shows: search filter, pagination,
//! the navigation window and the comment × post title join.

use std::collections::HashMap;

use crate::model::{Comment, Post};

pub const PAGE_SIZE: usize = 10;
/// Maximum number of numbered page buttons.
pub const PAGE_WINDOW: usize = 5;
pub const UNKNOWN_POST: &str = "Unknown post";

/// Keeps comments whose email, name or body contains the search term,
/// ignoring case. A blank term keeps everything. Order is preserved.
///
/// Only the blank check trims; surrounding spaces of a non-blank term are
/// part of the match.
pub fn filter_comments<'a>(comments: &'a [Comment], search: &str) -> Vec<&'a Comment> {
    if search.trim().is_empty() {
        return comments.iter().collect();
    }
    let needle = search.to_lowercase();
    comments
        .iter()
        .filter(|c| {
            c.email.to_lowercase().contains(&needle)
                || c.name.to_lowercase().contains(&needle)
                || c.body.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn total_pages(filtered_count: usize) -> usize {
    filtered_count.div_ceil(PAGE_SIZE)
}

/// Items `[(page-1)*PAGE_SIZE, page*PAGE_SIZE)`, clamped to the slice.
pub fn paginate<T>(items: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE).min(items.len());
    let end = start.saturating_add(PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Clamps `page` into `[1, total_pages]`; page 1 when there are no pages.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Page numbers to render as buttons around `current`.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages <= PAGE_WINDOW {
        return (1..=total_pages).collect();
    }
    let half = PAGE_WINDOW / 2;
    let start = if current <= half + 1 {
        1
    } else if current + half >= total_pages {
        total_pages - PAGE_WINDOW + 1
    } else {
        current - half
    };
    (start..start + PAGE_WINDOW).collect()
}

/// Post id -> title, built once per fetch.
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    titles: HashMap<u64, String>,
}

impl PostIndex {
    pub fn new(posts: &[Post]) -> Self {
        Self { titles: posts.iter().map(|p| (p.id, p.title.clone())).collect() }
    }

    pub fn title(&self, post_id: u64) -> &str {
        self.titles.get(&post_id).map(String::as_str).unwrap_or(UNKNOWN_POST)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub comment: Comment,
    pub post_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub rows: Vec<ViewRow>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub page_window: Vec<usize>,
}

impl ViewModel {
    /// Nothing matched; the empty state is shown instead of an empty page.
    pub fn is_empty(&self) -> bool {
        self.filtered_count == 0
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first row on this page within the filtered set.
    pub fn first_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * PAGE_SIZE + 1
        }
    }

    pub fn last_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * PAGE_SIZE + self.rows.len()
        }
    }
}

/// Derives the visible page from the merged comments. `page` is clamped into
/// the valid range before slicing.
pub fn derive(comments: &[Comment], posts: &PostIndex, search: &str, page: usize) -> ViewModel {
    let filtered = filter_comments(comments, search);
    let total_pages = total_pages(filtered.len());
    let page = clamp_page(page, total_pages);
    let rows = paginate(&filtered, page)
        .iter()
        .map(|c| ViewRow { comment: (*c).clone(), post_title: posts.title(c.post_id).to_string() })
        .collect();
    ViewModel {
        rows,
        page,
        total_pages,
        filtered_count: filtered.len(),
        total_count: comments.len(),
        page_window: page_window(page, total_pages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u64, email: &str, name: &str, body: &str) -> Comment {
        Comment { id, post_id: id % 3 + 1, name: name.into(), email: email.into(), body: body.into() }
    }

    fn many(n: u64) -> Vec<Comment> {
        (1..=n).map(|i| comment(i, &format!("user{i}@example.com"), &format!("name {i}"), "lorem ipsum")).collect()
    }

    fn ids(comments: &[&Comment]) -> Vec<u64> {
        comments.iter().map(|c| c.id).collect()
    }

    #[test]
    fn search_b_keeps_only_matching_comment() {
        let comments = vec![comment(1, "a@x.com", "A", "hi"), comment(2, "b@y.com", "B", "bye")];
        assert_eq!(ids(&filter_comments(&comments, "b")), vec![2]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let comments = vec![
            comment(1, "alice@x.com", "Alice", "hello"),
            comment(2, "bob@y.com", "Bob", "mentions ALICE"),
            comment(3, "carol@z.com", "Carol", "nothing"),
        ];
        let upper = ids(&filter_comments(&comments, "ALICE"));
        let lower = ids(&filter_comments(&comments, "alice"));
        assert_eq!(upper, lower);
        assert_eq!(upper, vec![1, 2]);
    }

    #[test]
    fn blank_search_keeps_everything_and_results_are_subsets() {
        let comments = many(25);
        let all = ids(&filter_comments(&comments, "   "));
        assert_eq!(all, (1..=25).collect::<Vec<_>>());
        for term in ["1", "user2", "IPSUM", "zzz", " name 1 "] {
            let subset = ids(&filter_comments(&comments, term));
            assert!(subset.iter().all(|id| all.contains(id)), "{term} produced ids outside the full set");
        }
    }

    #[test]
    fn surrounding_spaces_take_part_in_matching() {
        let comments = vec![comment(1, "b@y.com", "Bob", "hi"), comment(2, "c@z.com", "Carl", "bob says hi")];
        assert_eq!(ids(&filter_comments(&comments, "bob")), vec![1, 2]);
        assert_eq!(ids(&filter_comments(&comments, "bob ")), vec![2]);
        assert!(filter_comments(&comments, " bob ").is_empty());
    }

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
        assert_eq!(total_pages(500), 50);
    }

    #[test]
    fn pages_partition_the_filtered_set() {
        for n in [0u64, 1, 9, 10, 11, 37, 100] {
            let comments = many(n);
            let filtered = filter_comments(&comments, "");
            let pages = total_pages(filtered.len());
            let mut joined = Vec::new();
            for page in 1..=pages {
                let slice = paginate(&filtered, page);
                assert!(!slice.is_empty() && slice.len() <= PAGE_SIZE);
                joined.extend(slice.iter().map(|c| c.id));
            }
            assert_eq!(joined, ids(&filtered));
        }
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let comments = many(15);
        assert!(paginate(&comments, 3).is_empty());
        assert_eq!(paginate(&comments, 2).len(), 5);
    }

    #[test]
    fn window_shows_all_pages_when_few() {
        assert_eq!(page_window(1, 0), Vec::<usize>::new());
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(4, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn window_sticks_to_boundaries() {
        assert_eq!(page_window(1, 20), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 20), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(18, 20), vec![16, 17, 18, 19, 20]);
        assert_eq!(page_window(20, 20), vec![16, 17, 18, 19, 20]);
    }

    #[test]
    fn window_centers_on_current_page() {
        assert_eq!(page_window(4, 20), vec![2, 3, 4, 5, 6]);
        assert_eq!(page_window(10, 20), vec![8, 9, 10, 11, 12]);
        assert_eq!(page_window(17, 20), vec![15, 16, 17, 18, 19]);
        assert_eq!(page_window(4, 6), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn clamp_page_respects_bounds() {
        assert_eq!(clamp_page(0, 5), 1);
        assert_eq!(clamp_page(9, 5), 5);
        assert_eq!(clamp_page(3, 0), 1);
    }

    #[test]
    fn unknown_post_gets_placeholder() {
        let index = PostIndex::new(&[Post { id: 1, title: "first".into() }]);
        assert_eq!(index.title(1), "first");
        assert_eq!(index.title(42), UNKNOWN_POST);
        assert_eq!(PostIndex::default().title(1), UNKNOWN_POST);
    }

    #[test]
    fn derive_builds_summary() {
        let comments = many(23);
        let posts = PostIndex::new(&[Post { id: 1, title: "one".into() }, Post { id: 2, title: "two".into() }]);
        let view = derive(&comments, &posts, "", 3);
        assert_eq!(view.page, 3);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.rows.len(), 3);
        assert_eq!((view.first_index(), view.last_index()), (21, 23));
        assert!(view.has_prev() && !view.has_next());
        // id 21 -> post 1, id 22 -> post 2, id 23 -> post 3 (missing)
        let titles: Vec<_> = view.rows.iter().map(|r| r.post_title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two", UNKNOWN_POST]);
    }

    #[test]
    fn derive_empty_result_has_no_pages() {
        let comments = many(5);
        let view = derive(&comments, &PostIndex::default(), "no such text", 1);
        assert!(view.is_empty());
        assert_eq!(view.total_pages, 0);
        assert!(view.rows.is_empty());
        assert!(!view.has_prev() && !view.has_next());
        assert_eq!(view.total_count, 5);
    }
}
