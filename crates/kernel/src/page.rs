//! Pagination envelope shared by every listing operation.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Result<Self, DomainError> {
        if size == 0 {
            return Err(DomainError::validation("size", "must be at least 1"));
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
    pub is_first: bool,
    pub is_last: bool,
}

impl<T> Page<T> {
    /// Slice an already ordered result set down to the requested page.
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len();
        let content = items
            .into_iter()
            .skip(request.offset())
            .take(request.size())
            .collect();
        Self::from_parts(content, request, total_elements)
    }

    /// Build the envelope around one page fetched by a store that already
    /// knows the total count.
    pub fn from_parts(content: Vec<T>, request: PageRequest, total_elements: usize) -> Self {
        let total_pages = total_elements.div_ceil(request.size());
        Self {
            content,
            page_number: request.page(),
            page_size: request.size(),
            total_elements,
            total_pages,
            is_first: request.page() == 0,
            is_last: request.page().saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            is_first: self.is_first,
            is_last: self.is_last,
        }
    }

    /// Fallible variant of [`Page::map`]; stops at the first error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let content = self.content.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            content,
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            is_first: self.is_first,
            is_last: self.is_last,
        })
    }
}
