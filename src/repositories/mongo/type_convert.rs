use mongodb::bson::{doc, Bson, Document};

use super::converters::value_to_bson;
use super::super::{Query, Result as RepoResult, CREATED_AT, DEFAULT_LIST_LIMIT, ID, UPDATED_AT};

/// A list request translated to MongoDB terms.
#[derive(Debug, Clone)]
pub struct ListPlan {
    pub filter: Document,
    /// `(stored field, descending)` in priority order, `id` last.
    pub orders: Vec<(String, bool)>,
    pub limit: i64,
    pub cursor: Option<String>,
}

pub fn field_name(attr: &str) -> String {
    match attr {
        ID => "id".to_string(),
        CREATED_AT => "created_at".to_string(),
        UPDATED_AT => "updated_at".to_string(),
        field => format!("data.{}", field),
    }
}

impl ListPlan {
    pub fn new(queries: &[Query]) -> RepoResult<Self> {
        let mut conditions = vec![];
        let mut orders = vec![];
        let mut limit = DEFAULT_LIST_LIMIT;
        let mut cursor = None;

        for q in queries {
            match q {
                Query::Equal(attr, value) =>
                    conditions.push(doc! { field_name(attr): value_to_bson(value)? }),
                Query::Search(attr, term) => conditions.push(doc! {
                    field_name(attr): {
                        "$regex": regex::escape(term),
                        "$options": "i",
                    }
                }),
                Query::OrderDesc(attr) => orders.push((field_name(attr), true)),
                Query::OrderAsc(attr) => orders.push((field_name(attr), false)),
                Query::Limit(n) => limit = *n,
                Query::CursorAfter(id) => cursor = Some(id.clone()),
            }
        }

        if !orders.iter().any(|(f, _)| f == "id") {
            let desc = orders.first().map(|(_, d)| *d).unwrap_or(false);
            orders.push(("id".to_string(), desc));
        }

        let filter = match conditions.len() {
            0 => doc! {},
            1 => conditions.remove(0),
            _ => doc! { "$and": conditions },
        };

        Ok(Self {
            filter,
            orders,
            limit: limit as i64,
            cursor,
        })
    }

    pub fn sort(&self) -> Document {
        let mut sort = doc! {};
        for (field, desc) in &self.orders {
            sort.insert(field.clone(), if *desc { -1 } else { 1 });
        }
        sort
    }

    /// Keyset condition selecting what sorts strictly after the cursor
    /// document, whose sort values are `anchor`.
    pub fn after(&self, anchor: &[Bson]) -> Document {
        let branches = (0..self.orders.len())
            .map(|k| {
                let mut branch = doc! {};
                for (i, (field, _)) in self.orders.iter().enumerate().take(k) {
                    branch.insert(field.clone(), anchor[i].clone());
                }

                let (field, desc) = &self.orders[k];
                let op = if *desc { "$lt" } else { "$gt" };
                branch.insert(field.clone(), doc! { op: anchor[k].clone() });

                Bson::Document(branch)
            })
            .collect::<Vec<_>>();

        doc! { "$or": branches }
    }
}

/// Reads a dotted field path out of a stored document.
pub fn lookup(stored: &Document, path: &str) -> Bson {
    let mut parts = path.split('.');
    let mut current = match parts.next().and_then(|p| stored.get(p)) {
        Some(b) => b.clone(),
        None => return Bson::Null,
    };

    for p in parts {
        current = match current {
            Bson::Document(d) => d.get(p).cloned().unwrap_or(Bson::Null),
            _ => return Bson::Null,
        };
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_translates_queries() {
        let plan = ListPlan::new(&[
            Query::search("caption", "a.b"),
            Query::order_desc(UPDATED_AT),
            Query::limit(10),
            Query::cursor_after("p9"),
        ])
        .unwrap();

        assert_eq!(
            plan.filter,
            doc! { "data.caption": { "$regex": "a\\.b", "$options": "i" } }
        );
        assert_eq!(plan.sort(), doc! { "updated_at": -1, "id": -1 });
        assert_eq!(plan.limit, 10);
        assert_eq!(plan.cursor.as_deref(), Some("p9"));
    }

    #[test]
    fn keyset_condition() {
        let plan = ListPlan::new(&[Query::order_desc(UPDATED_AT)]).unwrap();
        let after = plan.after(&[Bson::String("t".to_string()), Bson::String("p".to_string())]);

        assert_eq!(after, doc! {
            "$or": [
                { "updated_at": { "$lt": "t" } },
                { "updated_at": "t", "id": { "$lt": "p" } },
            ]
        });
    }

    #[test]
    fn lookup_dotted_path() {
        let stored = doc! { "id": "x", "data": { "caption": "hi" } };

        assert_eq!(lookup(&stored, "data.caption"), Bson::String("hi".to_string()));
        assert_eq!(lookup(&stored, "data.missing"), Bson::Null);
        assert_eq!(lookup(&stored, "id"), Bson::String("x".to_string()));
    }
}
