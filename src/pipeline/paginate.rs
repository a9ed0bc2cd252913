pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Number of pages needed for `len` items; zero items means zero pages.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// `min(page, max(1, total))`, so a shrunken result set never leaves the
/// view on a page past the end.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.max(1).min(total_pages.max(1))
}

/// Slice `[(page-1)*size, page*size)` clamped to the bounds of `items`.
/// Pages are 1-indexed; page 0 is read as page 1.
pub fn page_window<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_five_items_in_pages_of_twelve() {
        let items: Vec<usize> = (1..=25).collect();
        assert_eq!(total_pages(items.len(), 12), 3);
        assert_eq!(page_window(&items, 1, 12), &items[0..12]);
        assert_eq!(page_window(&items, 2, 12), &items[12..24]);
        assert_eq!(page_window(&items, 3, 12), &[25]);
    }

    #[test]
    fn slicing_past_the_end_is_empty() {
        let items: Vec<usize> = (1..=5).collect();
        assert!(page_window(&items, 2, 12).is_empty());
        assert!(page_window(&items, usize::MAX, 12).is_empty());
        let empty: Vec<usize> = Vec::new();
        assert!(page_window(&empty, 1, 12).is_empty());
    }

    #[test]
    fn page_slices_cover_every_item() {
        for size in [1usize, 3, 12, 20] {
            for len in 0..50usize {
                let items: Vec<usize> = (0..len).collect();
                let pages = total_pages(len, size);
                assert_eq!(pages, (len + size - 1) / size);
                let covered: usize = (1..=pages)
                    .map(|p| page_window(&items, p, size).len())
                    .sum();
                assert_eq!(covered, len);
            }
        }
    }

    #[test]
    fn zero_items_means_zero_pages() {
        assert_eq!(total_pages(0, 12), 0);
    }

    #[test]
    fn clamp_keeps_page_in_range() {
        assert_eq!(clamp_page(3, 1), 1);
        assert_eq!(clamp_page(3, 0), 1);
        assert_eq!(clamp_page(2, 5), 2);
        assert_eq!(clamp_page(0, 5), 1);
    }
}
