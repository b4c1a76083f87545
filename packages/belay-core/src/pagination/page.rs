use serde::Deserialize;

/// One page fetched from a paginated source.
pub trait Page {
    type Item;
    /// Value handed back verbatim to fetch the following page
    type Cursor: Clone + PartialEq + std::fmt::Debug;
    /// Per-page metadata, the aggregate keeps the last page's
    type Meta;

    /// `None` means this was the last page
    fn next_cursor(&self) -> Option<Self::Cursor>;

    fn into_parts(self) -> (Vec<Self::Item>, Self::Meta);
}

/// Absent and empty continuation keys both mean "no more pages".
pub fn normalize_key(key: Option<&[u8]>) -> Option<&[u8]> {
    key.filter(|key| !key.is_empty())
}

/// A page from a module query paginated by opaque `next_key` bytes
#[derive(Clone, Debug, PartialEq)]
pub struct KeyedPage<T, M = ()> {
    pub items: Vec<T>,
    pub next_key: Option<Vec<u8>>,
    pub meta: M,
}

impl<T, M> KeyedPage<T, M> {
    pub fn new(items: Vec<T>, next_key: Option<Vec<u8>>, meta: M) -> Self {
        Self {
            items,
            next_key,
            meta,
        }
    }
}

impl<T, M> Page for KeyedPage<T, M> {
    type Item = T;
    type Cursor = Vec<u8>;
    type Meta = M;

    fn next_cursor(&self) -> Option<Vec<u8>> {
        normalize_key(self.next_key.as_deref()).map(<[u8]>::to_vec)
    }

    fn into_parts(self) -> (Vec<T>, M) {
        (self.items, self.meta)
    }
}

/// A page from a contract list query, continued by the last id seen
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_start_after: Option<u64>,
}

impl<T> Page for CursorPage<T> {
    type Item = T;
    type Cursor = u64;
    type Meta = ();

    fn next_cursor(&self) -> Option<u64> {
        self.next_start_after
    }

    fn into_parts(self) -> (Vec<T>, ()) {
        (self.items, ())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CountedMeta {
    pub total_count: u64,
}

/// A page from a page-numbered source that reports its total size.
///
/// Pages are 1-based. Another page exists while the pages seen so far
/// cover less than `total_count` items, whatever this page actually held.
#[derive(Clone, Debug, PartialEq)]
pub struct CountedPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_count: u64,
}

impl<T> Page for CountedPage<T> {
    type Item = T;
    type Cursor = u32;
    type Meta = CountedMeta;

    fn next_cursor(&self) -> Option<u32> {
        if self.per_page == 0 {
            return None;
        }
        let covered = u64::from(self.page) * u64::from(self.per_page);
        (covered < self.total_count).then(|| self.page + 1)
    }

    fn into_parts(self) -> (Vec<T>, CountedMeta) {
        (
            self.items,
            CountedMeta {
                total_count: self.total_count,
            },
        )
    }
}

/// Everything collected by one run of the pager
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregate<T, M> {
    /// items of every page, in fetch order
    pub items: Vec<T>,
    /// metadata of the last page
    pub meta: M,
    /// number of pages fetched
    pub pages: u32,
}

impl<T, M> Aggregate<T, M> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_key_stops() {
        let page = KeyedPage::new(vec![1], Some(Vec::new()), ());
        assert_eq!(page.next_cursor(), None);

        let page = KeyedPage::new(vec![1], None, ());
        assert_eq!(page.next_cursor(), None);

        let page = KeyedPage::new(Vec::<u8>::new(), Some(b"k2".to_vec()), ());
        assert_eq!(page.next_cursor(), Some(b"k2".to_vec()));
    }

    #[test]
    fn counted_page_uses_total() {
        let page = |page| CountedPage {
            items: vec![0u8; 10],
            page,
            per_page: 50,
            total_count: 125,
        };
        assert_eq!(page(1).next_cursor(), Some(2));
        assert_eq!(page(2).next_cursor(), Some(3));
        assert_eq!(page(3).next_cursor(), None);

        let exact = CountedPage {
            items: vec![0u8; 50],
            page: 2,
            per_page: 50,
            total_count: 100,
        };
        assert_eq!(exact.next_cursor(), None);
    }

    #[test]
    fn counted_page_with_nothing_to_count() {
        let page = CountedPage::<u8> {
            items: Vec::new(),
            page: 1,
            per_page: 50,
            total_count: 0,
        };
        assert_eq!(page.next_cursor(), None);
        assert_eq!(page.into_parts().1.total_count, 0);
    }

    #[test]
    fn cursor_page_deserializes_null() {
        let page: CursorPage<u32> =
            serde_json::from_str(r#"{"items":[1,2],"next_start_after":null}"#).unwrap();
        assert_eq!(page.next_cursor(), None);
    }
}
