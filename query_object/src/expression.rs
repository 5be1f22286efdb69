//! Expression nodes
//!
//! Immutable select-list items and table references. Every node renders
//! itself through [`ToSql`] and never touches a connection.

use crate::escape::escape_id;
use crate::nameable::{resolve, Nameable};
use serde::{Deserialize, Serialize};

/// Render a node to SQL text.
pub trait ToSql {
    fn to_sql(&self) -> String;
}

fn with_alias(body: String, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("{} as {}", body, escape_id(alias)),
        None => body,
    }
}

fn default_invoke() -> bool {
    true
}

/// A plain column, optionally aliased.
///
/// Raw columns are rendered verbatim, which is how prebuilt snippets such as
/// `` `created_at`/1000 `` travel through the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub raw: bool,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            raw: false,
        }
    }

    /// A column whose text is inserted without escaping
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            name: text.into(),
            alias: None,
            raw: true,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl ToSql for Column {
    fn to_sql(&self) -> String {
        let body = if self.raw {
            self.name.clone()
        } else {
            escape_id(&self.name)
        };
        with_alias(body, self.alias.as_deref())
    }
}

/// A function call over zero or more argument nodes, e.g. `sum(`a`)`.
///
/// A node that does not invoke renders its function text verbatim, for
/// preformatted fragments like `UNIX_TIMESTAMP()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnExpression {
    pub function: String,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default = "default_invoke")]
    pub invoke: bool,
}

impl ColumnExpression {
    pub fn new(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            function: function.into(),
            args,
            alias: None,
            invoke: true,
        }
    }

    /// A preformatted fragment rendered without parentheses
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            function: text.into(),
            args: Vec::new(),
            alias: None,
            invoke: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl ToSql for ColumnExpression {
    fn to_sql(&self) -> String {
        let body = if self.invoke {
            let args = self
                .args
                .iter()
                .map(ToSql::to_sql)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({})", self.function, args)
        } else {
            self.function.clone()
        };
        with_alias(body, self.alias.as_deref())
    }
}

/// A table-qualified column: `` `issue`.`id` ``
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedColumn {
    pub table: String,
    pub column: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ScopedColumn {
    pub fn new(table: &(impl Nameable + ?Sized), column: impl Into<String>) -> Self {
        Self {
            table: resolve(table),
            column: column.into(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

fn scoped(table: &str, column: &str) -> String {
    if column == "*" {
        format!("{}.*", escape_id(table))
    } else {
        format!("{}.{}", escape_id(table), escape_id(column))
    }
}

impl ToSql for ScopedColumn {
    fn to_sql(&self) -> String {
        with_alias(scoped(&self.table, &self.column), self.alias.as_deref())
    }
}

/// A function over table-qualified columns: `` count(`issue`.`id`) ``
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedColumnExpression {
    pub function: String,
    pub table: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ScopedColumnExpression {
    pub fn new<I, S>(function: impl Into<String>, table: &(impl Nameable + ?Sized), columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.into(),
            table: resolve(table),
            columns: columns.into_iter().map(Into::into).collect(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl ToSql for ScopedColumnExpression {
    fn to_sql(&self) -> String {
        let args = self
            .columns
            .iter()
            .map(|column| scoped(&self.table, column))
            .collect::<Vec<_>>()
            .join(", ");
        with_alias(
            format!("{}({})", self.function, args),
            self.alias.as_deref(),
        )
    }
}

/// Wildcard over zero or more tables.
///
/// Renders `*` for zero or one table; two or more tables need qualification
/// and render `` `a`.*, `b`.* ``.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllColumns {
    #[serde(default)]
    pub tables: Vec<String>,
}

impl AllColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of<I, T>(tables: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Nameable,
    {
        Self {
            tables: tables.into_iter().map(|t| resolve(&t)).collect(),
        }
    }
}

impl ToSql for AllColumns {
    fn to_sql(&self) -> String {
        if self.tables.len() <= 1 {
            return "*".to_string();
        }
        self.tables
            .iter()
            .map(|table| format!("{}.*", escape_id(table)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A FROM-list entry: `` `issue` `` or `` `issue` `i` ``
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &(impl Nameable + ?Sized)) -> Self {
        Self {
            name: resolve(table),
            alias: None,
        }
    }

    pub fn aliased(table: &(impl Nameable + ?Sized), alias: impl Into<String>) -> Self {
        Self {
            name: resolve(table),
            alias: Some(alias.into()),
        }
    }

    /// Name used to qualify columns of this table: the alias when present
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl ToSql for TableRef {
    fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", escape_id(&self.name), escape_id(alias)),
            None => escape_id(&self.name),
        }
    }
}

impl Nameable for TableRef {
    fn table_name(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed(self.name.as_str())
    }
}

/// Any select-list node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Column(Column),
    Function(ColumnExpression),
    Scoped(ScopedColumn),
    ScopedFunction(ScopedColumnExpression),
    All(AllColumns),
}

impl Expr {
    /// Attach an alias; wildcards have nothing to alias and are returned as is.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Expr::Column(c) => Expr::Column(c.alias(alias)),
            Expr::Function(f) => Expr::Function(f.alias(alias)),
            Expr::Scoped(s) => Expr::Scoped(s.alias(alias)),
            Expr::ScopedFunction(s) => Expr::ScopedFunction(s.alias(alias)),
            all @ Expr::All(_) => all,
        }
    }
}

impl ToSql for Expr {
    fn to_sql(&self) -> String {
        match self {
            Expr::Column(c) => c.to_sql(),
            Expr::Function(f) => f.to_sql(),
            Expr::Scoped(s) => s.to_sql(),
            Expr::ScopedFunction(s) => s.to_sql(),
            Expr::All(a) => a.to_sql(),
        }
    }
}

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Expr::Column(c)
    }
}

impl From<ColumnExpression> for Expr {
    fn from(f: ColumnExpression) -> Self {
        Expr::Function(f)
    }
}

impl From<ScopedColumn> for Expr {
    fn from(s: ScopedColumn) -> Self {
        Expr::Scoped(s)
    }
}

impl From<ScopedColumnExpression> for Expr {
    fn from(s: ScopedColumnExpression) -> Self {
        Expr::ScopedFunction(s)
    }
}

impl From<AllColumns> for Expr {
    fn from(a: AllColumns) -> Self {
        Expr::All(a)
    }
}

// Bare names become escaped columns; `*` stays raw so `count(*)` renders.
impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        if name == "*" {
            Expr::Column(Column::raw(name))
        } else {
            Expr::Column(Column::new(name))
        }
    }
}

impl From<String> for Expr {
    fn from(name: String) -> Self {
        Expr::from(name.as_str())
    }
}

impl From<&String> for Expr {
    fn from(name: &String) -> Self {
        Expr::from(name.as_str())
    }
}

macro_rules! numeric_expr {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(n: $t) -> Self {
                    Expr::Column(Column::raw(n.to_string()))
                }
            }
        )*
    };
}

numeric_expr!(i32, i64, u32, u64, usize, f64);
