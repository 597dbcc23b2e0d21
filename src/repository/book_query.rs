//! Conditional book query builder.
//!
//! Filters become an ordered list of clauses. Rendering numbers the
//! placeholders by position in that list and binding walks the same list, so
//! clause N always consumes bound value N.

use sqlx::PgConnection;

use crate::{
    error::AppResult,
    models::book::{Book, BookQueryConditions, SortColumn, SortOrder},
};

const SELECT_BOOK: &str =
    "SELECT book_id, category, title, press, publish_year, author, price, stock FROM book";

/// Value bound to one clause placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i32),
    Float(f64),
}

/// Comparison a clause performs against its bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    /// Case-sensitive substring, rendered as `LIKE`
    Contains,
    AtLeast,
    AtMost,
}

impl Operator {
    fn render(&self, column: &str, placeholder: usize) -> String {
        match self {
            Operator::Equals => format!("{} = ${}", column, placeholder),
            Operator::Contains => format!("{} LIKE ${}", column, placeholder),
            Operator::AtLeast => format!("{} >= ${}", column, placeholder),
            Operator::AtMost => format!("{} <= ${}", column, placeholder),
        }
    }
}

/// One `column operator $n` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: &'static str,
    pub operator: Operator,
    pub value: BindValue,
}

/// Parameterized book query built from [`BookQueryConditions`]
#[derive(Debug, Clone)]
pub struct BookQuery {
    clauses: Vec<Clause>,
    sort_by: SortColumn,
    sort_order: SortOrder,
}

impl BookQuery {
    pub fn new(conditions: &BookQueryConditions) -> Self {
        let mut query = Self {
            clauses: Vec::new(),
            sort_by: conditions.sort_by,
            sort_order: conditions.sort_order,
        };

        if let Some(ref category) = conditions.category {
            query.push("category", Operator::Equals, BindValue::Text(category.clone()));
        }
        if let Some(ref title) = conditions.title {
            query.push("title", Operator::Contains, contains_pattern(title));
        }
        if let Some(ref press) = conditions.press {
            query.push("press", Operator::Contains, contains_pattern(press));
        }
        if let Some(year) = conditions.min_publish_year {
            query.push("publish_year", Operator::AtLeast, BindValue::Int(year));
        }
        if let Some(year) = conditions.max_publish_year {
            query.push("publish_year", Operator::AtMost, BindValue::Int(year));
        }
        if let Some(ref author) = conditions.author {
            query.push("author", Operator::Contains, contains_pattern(author));
        }
        if let Some(price) = conditions.min_price {
            query.push("price", Operator::AtLeast, BindValue::Float(price));
        }
        if let Some(price) = conditions.max_price {
            query.push("price", Operator::AtMost, BindValue::Float(price));
        }

        query
    }

    fn push(&mut self, column: &'static str, operator: Operator, value: BindValue) {
        self.clauses.push(Clause {
            column,
            operator,
            value,
        });
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Render the full statement with `$1..$n` placeholders
    pub fn sql(&self) -> String {
        let mut sql = format!("{} WHERE TRUE", SELECT_BOOK);

        for (idx, clause) in self.clauses.iter().enumerate() {
            sql.push_str(" AND ");
            sql.push_str(&clause.operator.render(clause.column, idx + 1));
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(self.sort_by.column());
        sql.push(' ');
        sql.push_str(self.sort_order.as_sql());
        if self.sort_by != SortColumn::BookId {
            sql.push_str(", book_id ASC");
        }

        sql
    }

    /// Run the query, binding values in clause order
    pub async fn fetch_all(&self, conn: &mut PgConnection) -> AppResult<Vec<Book>> {
        let sql = self.sql();
        let mut query = sqlx::query_as::<_, Book>(&sql);

        for clause in &self.clauses {
            query = match &clause.value {
                BindValue::Text(v) => query.bind(v.as_str()),
                BindValue::Int(v) => query.bind(*v),
                BindValue::Float(v) => query.bind(*v),
            };
        }

        Ok(query.fetch_all(&mut *conn).await?)
    }
}

/// Escape `LIKE` metacharacters so the needle matches literally
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_pattern(needle: &str) -> BindValue {
    BindValue::Text(format!("%{}%", escape_like(needle)))
}
