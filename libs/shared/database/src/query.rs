//! Composable filter predicates with positional bind parameters.
//!
//! Both the doctor directory and the appointment ledger build their list
//! queries from independently optional filters. `QueryBuilder` appends only
//! the fragments whose filter was supplied, in declaration order, and keeps
//! every user-supplied value out of the SQL text as a `?` bind.

use rusqlite::ToSql;

pub struct QueryBuilder {
    sql: String,
    params: Vec<Box<dyn ToSql>>,
}

impl QueryBuilder {
    /// Start from a base statement. The base should end in a predicate that
    /// subsequent fragments can extend with `AND`, e.g. `... WHERE 1=1`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            sql: base.into(),
            params: Vec::new(),
        }
    }

    /// Append an `AND`-joined fragment binding a single value.
    pub fn push(&mut self, fragment: &str, value: impl ToSql + 'static) {
        self.sql.push_str(" AND ");
        self.sql.push_str(fragment);
        self.params.push(Box::new(value));
    }

    /// Append an `AND`-joined fragment binding several values. The fragment
    /// must contain exactly one `?` per value.
    pub fn push_clause(&mut self, fragment: &str, values: Vec<Box<dyn ToSql>>) {
        self.sql.push_str(" AND ");
        self.sql.push_str(fragment);
        self.params.extend(values);
    }

    /// Append a set-membership fragment, one placeholder per element.
    /// Empty sets impose no constraint: the fragment is suppressed rather
    /// than emitting an invalid `IN ()`.
    pub fn push_in<T>(&mut self, column: &str, values: &[T])
    where
        T: ToSql + Clone + 'static,
    {
        if values.is_empty() {
            return;
        }
        let placeholders = vec!["?"; values.len()].join(",");
        self.sql.push_str(" AND ");
        self.sql.push_str(column);
        self.sql.push_str(" IN (");
        self.sql.push_str(&placeholders);
        self.sql.push(')');
        for value in values {
            self.params.push(Box::new(value.clone()));
        }
    }

    /// Append raw trailing SQL (ORDER BY, GROUP BY). Never pass user input.
    pub fn append(&mut self, sql: &str) {
        self.sql.push(' ');
        self.sql.push_str(sql);
    }

    pub fn build(self) -> (String, Vec<Box<dyn ToSql>>) {
        (self.sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{params_from_iter, Connection};

    #[test]
    fn base_alone_when_no_filters_supplied() {
        let qb = QueryBuilder::new("SELECT * FROM appointments WHERE 1=1");
        let (sql, params) = qb.build();
        assert_eq!(sql, "SELECT * FROM appointments WHERE 1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn fragments_preserve_declaration_order() {
        let mut qb = QueryBuilder::new("SELECT * FROM t WHERE 1=1");
        qb.push("a = ?", "x".to_string());
        qb.push_in("b", &["y".to_string(), "z".to_string()]);
        qb.push("c = ?", 3i64);
        let (sql, params) = qb.build();
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE 1=1 AND a = ? AND b IN (?,?) AND c = ?"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn empty_set_suppresses_in_clause() {
        let mut qb = QueryBuilder::new("SELECT * FROM t WHERE 1=1");
        qb.push_in::<String>("b", &[]);
        let (sql, params) = qb.build();
        assert_eq!(sql, "SELECT * FROM t WHERE 1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn multi_value_clause_binds_each_value() {
        let mut qb = QueryBuilder::new("SELECT * FROM t WHERE 1=1");
        qb.push_clause(
            "(x LIKE ? OR y LIKE ?)",
            vec![Box::new("%a%".to_string()), Box::new("%a%".to_string())],
        );
        let (sql, params) = qb.build();
        assert_eq!(sql, "SELECT * FROM t WHERE 1=1 AND (x LIKE ? OR y LIKE ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn built_query_executes_with_bound_values() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE people (name TEXT, age INTEGER);
             INSERT INTO people VALUES ('ann', 30), ('bob', 40), ('cat', 50);",
        )
        .unwrap();

        let mut qb = QueryBuilder::new("SELECT name FROM people WHERE 1=1");
        qb.push("age > ?", 35i64);
        qb.push_in("name", &["bob".to_string(), "dan".to_string()]);
        qb.append("ORDER BY name ASC");
        let (sql, params) = qb.build();

        let mut stmt = conn.prepare(&sql).unwrap();
        let names: Vec<String> = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(names, vec!["bob".to_string()]);
    }

    #[test]
    fn bound_values_are_not_interpolated() {
        // A hostile value stays a bind parameter; it never alters the SQL.
        let mut qb = QueryBuilder::new("SELECT name FROM people WHERE 1=1");
        qb.push("name = ?", "'; DROP TABLE people; --".to_string());
        let (sql, _) = qb.build();
        assert_eq!(sql, "SELECT name FROM people WHERE 1=1 AND name = ?");
    }
}
