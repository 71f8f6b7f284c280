use core::cmp::Ordering;

use regex::RegexBuilder;
use serde_json::Value;

use super::super::{Document, Query, RepositoryError, Result as RepoResult, CREATED_AT, ID, UPDATED_AT};

pub fn find_mut<T, P>(v: &mut [T], predicate: P) -> RepoResult<&mut T>
where
    T: ::core::fmt::Debug,
    P: FnMut(&&mut T) -> bool,
{
    let mut res = v.iter_mut().filter(predicate).collect::<Vec<_>>();

    tracing::trace!("found - {:?}", res);

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

pub fn find_ref<T, P>(v: &[T], predicate: P) -> RepoResult<&T>
where
    T: ::core::fmt::Debug,
    P: FnMut(&&T) -> bool,
{
    let mut res = v.iter().filter(predicate).collect::<Vec<_>>();

    tracing::trace!("found - {:?}", res);

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

pub fn position<T, P>(v: &[T], mut predicate: P) -> RepoResult<usize>
where P: FnMut(&T) -> bool {
    let res = v
        .iter()
        .enumerate()
        .filter_map(|(i, t)| predicate(t).then(|| i))
        .collect::<Vec<_>>();

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res[0]),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

fn attr_value(doc: &Document, attr: &str) -> Value {
    match attr {
        ID => Value::String(doc.id.clone()),
        CREATED_AT => Value::String(super::super::format_date(&doc.created_at)),
        UPDATED_AT => Value::String(super::super::format_date(&doc.updated_at)),
        field => doc.data.get(field).cloned().unwrap_or(Value::Null),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn matches(doc: &Document, query: &Query) -> RepoResult<bool> {
    let res = match query {
        Query::Equal(attr, expected) => match attr_value(doc, attr) {
            Value::Array(items) => items.contains(expected),
            v => v == *expected,
        },
        Query::Search(attr, term) => {
            let rx = RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .map_err(|e| RepositoryError::Invalid(e.to_string()))?;

            match attr_value(doc, attr) {
                Value::String(s) => rx.is_match(&s),
                _ => false,
            }
        },
        _ => true,
    };

    Ok(res)
}

/// Evaluates `queries` against `docs` the way the remote service does:
/// filters, then ordering, then cursor, then limit. The returned total counts
/// every document passing the filters.
pub fn apply_queries(docs: &[Document], queries: &[Query]) -> RepoResult<(u64, Vec<Document>)> {
    let mut filtered = vec![];
    for doc in docs {
        let mut keep = true;
        for q in queries {
            if !matches(doc, q)? {
                keep = false;
                break;
            }
        }
        if keep {
            filtered.push(doc.clone());
        }
    }

    let orders = queries
        .iter()
        .filter_map(|q| match q {
            Query::OrderDesc(attr) => Some((attr.as_str(), true)),
            Query::OrderAsc(attr) => Some((attr.as_str(), false)),
            _ => None,
        })
        .collect::<Vec<_>>();

    filtered.sort_by(|a, b| {
        orders
            .iter()
            .map(|(attr, desc)| {
                let ord = compare_values(&attr_value(a, attr), &attr_value(b, attr));
                match desc {
                    true => ord.reverse(),
                    false => ord,
                }
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let total = filtered.len() as u64;

    let cursor = queries.iter().rev().find_map(|q| match q {
        Query::CursorAfter(id) => Some(id),
        _ => None,
    });
    let start = match cursor {
        Some(id) => match position(&filtered, |d| &d.id == id) {
            Ok(i) => i + 1,
            Err(RepositoryError::NotFound) =>
                return Err(RepositoryError::Invalid(format!(
                    "cursor document not found: {}",
                    id
                ))),
            Err(e) => return Err(e),
        },
        None => 0,
    };

    let limit = queries
        .iter()
        .rev()
        .find_map(|q| match q {
            Query::Limit(n) => Some(*n),
            _ => None,
        })
        .unwrap_or(super::super::DEFAULT_LIST_LIMIT);

    let page = filtered
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    Ok((total, page))
}

pub fn initials_avatar_url(endpoint: &str, project: &str, name: &str) -> String {
    format!(
        "{}/avatars/initials?name={}&project={}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(name),
        urlencoding::encode(project),
    )
}

pub fn preview_url(
    endpoint: &str,
    project: &str,
    bucket_id: &str,
    file_id: &str,
    options: &super::super::PreviewOptions,
) -> String {
    format!(
        "{}/storage/buckets/{}/files/{}/preview?width={}&height={}&gravity={}&quality={}&project={}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(bucket_id),
        urlencoding::encode(file_id),
        options.width,
        options.height,
        options.gravity.as_str(),
        options.quality,
        urlencoding::encode(project),
    )
}
