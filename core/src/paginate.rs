use std::fmt;

/// Splits a slice into consecutive pages of `page_size` items; the last page
/// may be shorter. A page size of zero yields no pages. Clone to restart.
#[derive(Debug)]
pub struct Paginator<'a, T> {
    rest: &'a [T],
    page_size: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(items: &'a [T], page_size: usize) -> Self {
        Self { rest: items, page_size }
    }
}

impl<T> Clone for Paginator<'_, T> {
    fn clone(&self) -> Self {
        Self { rest: self.rest, page_size: self.page_size }
    }
}

impl<'a, T> Iterator for Paginator<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<&'a [T]> {
        if self.page_size == 0 || self.rest.is_empty() {
            return None;
        }
        let (page, rest) = self.rest.split_at(self.page_size.min(self.rest.len()));
        self.rest = rest;
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pages = if self.page_size == 0 { 0 } else { self.rest.len().div_ceil(self.page_size) };
        (pages, Some(pages))
    }
}

impl<T> ExactSizeIterator for Paginator<'_, T> {}

pub fn paginate<T>(items: &[T], page_size: usize) -> Paginator<'_, T> {
    Paginator::new(items, page_size)
}

/// Render a page as the concatenation of its items.
pub fn format_page<T: fmt::Display>(page: &[T]) -> String {
    page.iter().map(ToString::to_string).collect()
}
