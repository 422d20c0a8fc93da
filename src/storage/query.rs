//! 查詢條件與更新表達式的建構器
//!
//! 建構器只負責組出資料庫原生的文件，不做任何語意檢查；
//! 需要資料庫的全部彈性時仍可直接傳入 `bson::Document`。

use crate::storage::identifier::DocumentId;
use bson::{Bson, Document};
use mongodb::options::FindOptions;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// 只含 `$` 開頭鍵的子文件視為運算子文件
fn is_operator_document(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
}

/// 查詢條件建構器，空條件匹配全部文件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    doc: Document,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依識別碼查詢
    pub fn id(id: DocumentId) -> Self {
        Self { doc: id.filter() }
    }

    /// 欄位相等
    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.doc.insert(field, value.into());
        self
    }

    pub fn ne(self, field: &str, value: impl Into<Bson>) -> Self {
        self.with_operator(field, "$ne", value.into())
    }

    pub fn gt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.with_operator(field, "$gt", value.into())
    }

    pub fn gte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.with_operator(field, "$gte", value.into())
    }

    pub fn lt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.with_operator(field, "$lt", value.into())
    }

    pub fn lte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.with_operator(field, "$lte", value.into())
    }

    /// 欄位值屬於給定集合
    pub fn in_values<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.with_operator(field, "$in", Bson::Array(values))
    }

    pub fn exists(self, field: &str, exists: bool) -> Self {
        self.with_operator(field, "$exists", Bson::Boolean(exists))
    }

    /// 以 `$and` 組合多個條件
    pub fn and<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        let clauses: Vec<Bson> = filters
            .into_iter()
            .map(|f| Bson::Document(f.doc))
            .collect();
        self.doc.insert("$and", clauses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    // 同一欄位上的多個運算子合併為一個子文件，例如 {$gte, $lt}
    fn with_operator(mut self, field: &str, op: &str, value: Bson) -> Self {
        let merge = matches!(
            self.doc.get(field),
            Some(Bson::Document(inner)) if is_operator_document(inner)
        );

        if merge {
            if let Ok(inner) = self.doc.get_document_mut(field) {
                inner.insert(op, value);
            }
        } else {
            let mut inner = Document::new();
            inner.insert(op, value);
            self.doc.insert(field, inner);
        }
        self
    }
}

impl From<Filter> for Document {
    fn from(filter: Filter) -> Self {
        filter.doc
    }
}

impl From<DocumentId> for Filter {
    fn from(id: DocumentId) -> Self {
        Filter::id(id)
    }
}

/// 更新表達式建構器，依運算子分組
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    doc: Document,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(self, field: &str, value: impl Into<Bson>) -> Self {
        self.with_operator("$set", field, value.into())
    }

    pub fn inc(self, field: &str, amount: impl Into<Bson>) -> Self {
        self.with_operator("$inc", field, amount.into())
    }

    pub fn unset(self, field: &str) -> Self {
        self.with_operator("$unset", field, Bson::String(String::new()))
    }

    pub fn push(self, field: &str, value: impl Into<Bson>) -> Self {
        self.with_operator("$push", field, value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    fn with_operator(mut self, op: &str, field: &str, value: Bson) -> Self {
        if let Ok(group) = self.doc.get_document_mut(op) {
            group.insert(field, value);
        } else {
            let mut group = Document::new();
            group.insert(field, value);
            self.doc.insert(op, group);
        }
        self
    }
}

impl From<Update> for Document {
    fn from(update: Update) -> Self {
        update.doc
    }
}

/// 查詢選項，原樣傳給資料庫
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    /// 追加一個排序欄位，保留先前欄位的優先順序
    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort
            .get_or_insert_with(Document::new)
            .insert(field, order.as_i32());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
}

impl From<QueryOptions> for FindOptions {
    fn from(options: QueryOptions) -> Self {
        let mut find = FindOptions::default();
        find.projection = options.projection;
        find.sort = options.sort;
        find.limit = options.limit;
        find.skip = options.skip;
        find
    }
}
