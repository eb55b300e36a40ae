//! Archive query plans
//!
//! Reads against the archive are built as a small predicate list over the
//! `runs` measurement and rendered to the engine's surface syntax only at
//! the edge. Every value is rendered as an escaped string literal, so ids
//! and other caller-supplied text can never change the query structure.
//!
//! ```text
//! from(bucketID: "...")
//!   |> range(start: -<lookback>d)
//!   |> filter(fn: (r) => r._measurement == "runs" and <tag predicates>)
//!   |> pivot(rowKey: ["_time"], columnKey: ["_field"], valueColumn: "_value")
//!   |> group()
//!   |> filter(fn: (r) => <field predicates>)
//!   |> sort(columns: [...])
//!   |> limit(n: ...)
//! ```

use std::fmt::Write;

use strand_core::Id;

use crate::schema::RUNS_MEASUREMENT;

/// One comparison in a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Tag equals value; evaluated before pivoting
    TagEq {
        /// Tag key
        column: String,
        /// Expected value
        value: String,
    },
    /// Field equals value; evaluated after pivoting
    FieldEq {
        /// Field key
        column: String,
        /// Expected value
        value: String,
    },
    /// Field sorts strictly after value; evaluated after pivoting
    FieldGt {
        /// Field key
        column: String,
        /// Exclusive lower bound
        value: String,
    },
}

impl Predicate {
    fn is_tag(&self) -> bool {
        matches!(self, Predicate::TagEq { .. })
    }

    fn render(&self) -> String {
        let (column, op, value) = match self {
            Predicate::TagEq { column, value } | Predicate::FieldEq { column, value } => {
                (column, "==", value)
            }
            Predicate::FieldGt { column, value } => (column, ">", value),
        };
        format!("r[{}] {} {}", quote(column), op, quote(value))
    }
}

/// Query over archived runs in one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveQuery {
    bucket_id: Id,
    lookback_days: u32,
    predicates: Vec<Predicate>,
    sort_by: Option<String>,
    limit: Option<usize>,
}

impl ArchiveQuery {
    /// All archived runs in `bucket_id` within the lookback window
    pub fn runs(bucket_id: Id, lookback_days: u32) -> Self {
        ArchiveQuery {
            bucket_id,
            lookback_days,
            predicates: Vec::new(),
            sort_by: None,
            limit: None,
        }
    }

    /// Keep rows whose tag `column` equals `value`
    pub fn tag_eq(mut self, column: &str, value: impl ToString) -> Self {
        self.predicates.push(Predicate::TagEq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Keep rows whose field `column` equals `value`
    pub fn field_eq(mut self, column: &str, value: impl ToString) -> Self {
        self.predicates.push(Predicate::FieldEq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Keep rows whose field `column` sorts after `value`
    pub fn field_gt(mut self, column: &str, value: impl ToString) -> Self {
        self.predicates.push(Predicate::FieldGt {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Order rows ascending by `column`
    pub fn sort_by(mut self, column: &str) -> Self {
        self.sort_by = Some(column.to_string());
        self
    }

    /// Return at most `n` rows
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Bucket the plan reads
    pub fn bucket_id(&self) -> Id {
        self.bucket_id
    }

    /// Predicates in insertion order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Row limit, if any
    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Render to the engine's surface syntax
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "from(bucketID: {})", quote(&self.bucket_id.to_string()));
        let _ = writeln!(out, "  |> range(start: -{}d)", self.lookback_days);

        let mut tag_filter = vec![format!("r._measurement == {}", quote(RUNS_MEASUREMENT))];
        tag_filter.extend(self.predicates.iter().filter(|p| p.is_tag()).map(Predicate::render));
        let _ = writeln!(out, "  |> filter(fn: (r) => {})", tag_filter.join(" and "));

        out.push_str(
            "  |> pivot(rowKey: [\"_time\"], columnKey: [\"_field\"], valueColumn: \"_value\")\n",
        );
        out.push_str("  |> group()\n");

        let field_filter: Vec<String> = self
            .predicates
            .iter()
            .filter(|p| !p.is_tag())
            .map(Predicate::render)
            .collect();
        if !field_filter.is_empty() {
            let _ = writeln!(out, "  |> filter(fn: (r) => {})", field_filter.join(" and "));
        }
        if let Some(column) = &self.sort_by {
            let _ = writeln!(out, "  |> sort(columns: [{}])", quote(column));
        }
        if let Some(n) = self.limit {
            let _ = writeln!(out, "  |> limit(n: {})", n);
        }
        out
    }
}

/// Render `s` as a double-quoted string literal
///
/// Backslash, double quote and the `${` interpolation opener are escaped.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
