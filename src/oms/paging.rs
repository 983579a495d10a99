use super::{Query, Record};
use crate::error::Result;

/// Walks the pages of `query`, calling `fetch_page` with each page offset.
///
/// Stops on the first short (or empty) page, or once `max_pages` pages have
/// been read.
pub fn collect_pages<F>(query: &Query, mut fetch_page: F) -> Result<Vec<Record>>
where
    F: FnMut(usize) -> Result<Vec<Record>>,
{
    let mut records = Vec::new();
    for page in 0..query.max_pages {
        let rows = fetch_page(page * query.per_page)?;
        let short = rows.len() < query.per_page;
        records.extend(rows);
        if short {
            break;
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record;

    fn rows(n: usize) -> Vec<Record> {
        (0..n).map(|i| record! { "lumisection_number" => i as u32 }).collect()
    }

    #[test]
    fn test_stops_on_short_page() {
        let query = Query::new("lumisections").per_page(10).max_pages(100);
        let mut offsets = vec![];
        let out = collect_pages(&query, |offset| {
            offsets.push(offset);
            Ok(rows(if offset < 20 { 10 } else { 3 }))
        })
        .unwrap();

        assert_eq!(offsets, vec![0, 10, 20]);
        assert_eq!(out.len(), 23);
    }

    #[test]
    fn test_respects_max_pages() {
        let query = Query::new("lumisections").per_page(5).max_pages(3);
        let mut calls = 0;
        let out = collect_pages(&query, |_| {
            calls += 1;
            Ok(rows(5))
        })
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(out.len(), 15);
    }

    #[test]
    fn test_empty_first_page() {
        let query = Query::new("streams").per_page(100).max_pages(10);
        let out = collect_pages(&query, |_| Ok(vec![])).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_error_aborts() {
        let query = Query::new("streams").per_page(1).max_pages(10);
        let res = collect_pages(&query, |offset| {
            if offset == 2 {
                Err(Error::Decode("boom".into()))
            } else {
                Ok(rows(1))
            }
        });
        assert!(matches!(res, Err(Error::Decode(_))));
    }
}
