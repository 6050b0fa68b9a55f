//! Observed samples and their variables.
//!
//! A [`Sample`] is an ordered, non-empty sequence of records over a fixed
//! schema. It is stored column-wise: each named variable owns one [`Column`],
//! either categorical (label codes into an ordered level set) or numeric.
//! Individual values may be missing.
//!
//! Samples are immutable. Resampling produces new samples through
//! [`Sample::select_rows`] and [`Sample::replace_column`].
//!
//! # Record form
//!
//! Externally supplied data arrives as a [`Dataset`]: a schema plus records
//! keyed by variable name. This is also the JSON shape read and written by the
//! command-line tool:
//!
//! ```json
//! {
//!   "variables": [{ "name": "color", "kind": "categorical" }],
//!   "records": [{ "color": "red" }, { "color": "white" }]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{InferenceError, Result};

/// Type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    #[display("categorical")]
    Categorical,
    #[display("numeric")]
    Numeric,
}

/// A named variable declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub kind: VariableKind,
}

impl VariableSpec {
    #[must_use]
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Categorical,
        }
    }

    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Numeric,
        }
    }
}

/// A single value of a record.
///
/// Serialized untagged: a JSON number, string, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Category(String),
    Missing,
}

/// One record: values keyed by variable name. Absent keys are missing values.
pub type Record = BTreeMap<String, Value>;

/// Schema and records as supplied from outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub variables: Vec<VariableSpec>,
    pub records: Vec<Record>,
}

/// Values of one variable across all records of a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Label codes indexing into `levels`. Levels are kept in first-appearance
    /// order and survive resampling even when no record carries them.
    Categorical {
        levels: Vec<String>,
        codes: Vec<Option<usize>>,
    },
    Numeric(Vec<Option<f64>>),
}

impl Column {
    /// Builds a categorical column without missing values.
    ///
    /// ```
    /// # use infersim_core::Column;
    /// let column = Column::categorical(["yes", "no", "yes"]);
    /// assert_eq!(column.levels(), Some(&["yes".to_owned(), "no".to_owned()][..]));
    /// ```
    #[must_use]
    pub fn categorical<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = LevelBuilder::default();
        let codes = labels
            .into_iter()
            .map(|label| Some(builder.code_of(label.as_ref())))
            .collect();
        Self::Categorical {
            levels: builder.levels,
            codes,
        }
    }

    /// Builds a numeric column without missing values.
    #[must_use]
    pub fn numeric<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::Numeric(values.into_iter().map(Some).collect())
    }

    #[must_use]
    pub fn kind(&self) -> VariableKind {
        match self {
            Self::Categorical { .. } => VariableKind::Categorical,
            Self::Numeric(_) => VariableKind::Numeric,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Categorical { codes, .. } => codes.len(),
            Self::Numeric(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Level set of a categorical column; `None` for numeric columns.
    #[must_use]
    pub fn levels(&self) -> Option<&[String]> {
        match self {
            Self::Categorical { levels, .. } => Some(levels),
            Self::Numeric(_) => None,
        }
    }

    /// Value at `row` in record form.
    #[must_use]
    pub fn value(&self, row: usize) -> Value {
        match self {
            Self::Categorical { levels, codes } => codes[row]
                .map_or(Value::Missing, |code| Value::Category(levels[code].clone())),
            Self::Numeric(values) => values[row].map_or(Value::Missing, Value::Number),
        }
    }

    /// A column holding the values at `rows`, in that order.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        match self {
            Self::Categorical { levels, codes } => Self::Categorical {
                levels: levels.clone(),
                codes: rows.iter().map(|&row| codes[row]).collect(),
            },
            Self::Numeric(values) => Self::Numeric(rows.iter().map(|&row| values[row]).collect()),
        }
    }
}

#[derive(Debug, Default)]
struct LevelBuilder {
    levels: Vec<String>,
}

impl LevelBuilder {
    fn code_of(&mut self, label: &str) -> usize {
        if let Some(code) = self.levels.iter().position(|level| level == label) {
            return code;
        }
        self.levels.push(label.to_owned());
        self.levels.len() - 1
    }
}

/// A named column of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub column: Column,
}

/// An immutable, non-empty sample of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    variables: Vec<Variable>,
    len: usize,
}

impl Sample {
    /// Builds a sample from externally supplied records.
    ///
    /// Every record must carry values of the declared kind; a key absent from a
    /// record is a missing value, and keys not declared in `schema` are rejected.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::InsufficientData`] if `records` is empty
    /// - [`InferenceError::InvalidParameter`] for an empty schema, duplicate
    ///   variable names, undeclared keys or values of the wrong kind
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::collections::BTreeMap;
    /// # use infersim_core::{Sample, Value, VariableSpec};
    /// let schema = [VariableSpec::categorical("smokes"), VariableSpec::numeric("age")];
    /// let records = [
    ///     BTreeMap::from([("smokes".to_owned(), Value::Category("no".into())), ("age".to_owned(), Value::Number(31.0))]),
    ///     BTreeMap::from([("smokes".to_owned(), Value::Category("yes".into()))]),
    /// ];
    /// let sample = Sample::from_records(&schema, &records)?;
    /// assert_eq!(sample.len(), 2);
    /// assert_eq!(sample.numeric("age")?, &[Some(31.0), None]);
    /// # Ok::<(), infersim_core::InferenceError>(())
    /// ```
    pub fn from_records(schema: &[VariableSpec], records: &[Record]) -> Result<Self> {
        if records.is_empty() {
            return Err(InferenceError::insufficient("sample has no records"));
        }
        if schema.is_empty() {
            return Err(InferenceError::invalid("schema declares no variables"));
        }

        for (i, record) in records.iter().enumerate() {
            if let Some(key) = record
                .keys()
                .find(|key| !schema.iter().any(|spec| &spec.name == *key))
            {
                return Err(InferenceError::invalid(format!(
                    "record #{i} has undeclared variable '{key}'"
                )));
            }
        }

        let columns = schema
            .iter()
            .map(|spec| -> Result<(String, Column)> {
                let values = records.iter().map(|record| record.get(&spec.name));
                let column = match spec.kind {
                    VariableKind::Categorical => categorical_column(&spec.name, values)?,
                    VariableKind::Numeric => numeric_column(&spec.name, values)?,
                };
                Ok((spec.name.clone(), column))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_columns(columns)
    }

    /// Builds a sample from a [`Dataset`].
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Self::from_records(&dataset.variables, &dataset.records)
    }

    /// Builds a sample from named columns.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::InvalidParameter`] if there are no columns, names
    ///   repeat, columns differ in length, or a categorical code does not
    ///   name one of its column's levels
    /// - [`InferenceError::InsufficientData`] if the columns are empty
    pub fn from_columns<I, N>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Column)>,
        N: Into<String>,
    {
        let variables = columns
            .into_iter()
            .map(|(name, column)| Variable {
                name: name.into(),
                column,
            })
            .collect::<Vec<_>>();

        let Some(first) = variables.first() else {
            return Err(InferenceError::invalid("sample has no variables"));
        };
        let len = first.column.len();
        if len == 0 {
            return Err(InferenceError::insufficient("sample has no records"));
        }
        for (i, variable) in variables.iter().enumerate() {
            if variables[..i].iter().any(|v| v.name == variable.name) {
                return Err(InferenceError::invalid(format!(
                    "variable '{}' is declared more than once",
                    variable.name
                )));
            }
            if variable.column.len() != len {
                return Err(InferenceError::invalid(format!(
                    "variable '{}' has {} values, expected {len}",
                    variable.name,
                    variable.column.len()
                )));
            }
            if let Column::Categorical { levels, codes } = &variable.column
                && let Some(code) = codes.iter().flatten().find(|&&c| c >= levels.len())
            {
                return Err(InferenceError::invalid(format!(
                    "variable '{}' has level code {code} but only {} level(s)",
                    variable.name,
                    levels.len()
                )));
            }
        }

        Ok(Self { variables, len })
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a sample holds at least one record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Position of the variable called `name`.
    pub fn variable_index(&self, name: &str) -> Result<usize> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| InferenceError::invalid(format!("unknown variable '{name}'")))
    }

    /// Column of the variable called `name`.
    pub fn column(&self, name: &str) -> Result<&Column> {
        let index = self.variable_index(name)?;
        Ok(&self.variables[index].column)
    }

    /// Values of a numeric variable.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numeric(values) => Ok(values),
            Column::Categorical { .. } => Err(InferenceError::invalid(format!(
                "variable '{name}' is categorical, expected numeric"
            ))),
        }
    }

    /// Level set and codes of a categorical variable.
    pub fn categorical(&self, name: &str) -> Result<(&[String], &[Option<usize>])> {
        match self.column(name)? {
            Column::Categorical { levels, codes } => Ok((levels, codes)),
            Column::Numeric(_) => Err(InferenceError::invalid(format!(
                "variable '{name}' is numeric, expected categorical"
            ))),
        }
    }

    /// A new sample made of the records at `rows` (repeats allowed), in that order.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is empty or any row is out of bounds.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        assert!(!rows.is_empty(), "a sample must keep at least one record");
        let variables = self
            .variables
            .iter()
            .map(|v| Variable {
                name: v.name.clone(),
                column: v.column.select_rows(rows),
            })
            .collect();
        Self {
            variables,
            len: rows.len(),
        }
    }

    /// A new sample with the column at `index` replaced.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or `column` has a different length.
    #[must_use]
    pub fn replace_column(&self, index: usize, column: Column) -> Self {
        assert_eq!(column.len(), self.len, "replacement column length mismatch");
        let mut variables = self.variables.clone();
        variables[index].column = column;
        Self {
            variables,
            len: self.len,
        }
    }

    /// Partitions the records by the levels of a categorical variable.
    ///
    /// # Errors
    ///
    /// - [`InferenceError::InvalidParameter`] if the variable is unknown or numeric
    /// - [`InferenceError::InsufficientData`] if fewer than two levels occur
    pub fn group_by(&self, grouping: &str) -> Result<GroupedSample<'_>> {
        let (levels, codes) = self.categorical(grouping)?;
        let mut rows = vec![vec![]; levels.len()];
        for (row, code) in codes.iter().enumerate() {
            if let Some(code) = code {
                rows[*code].push(row);
            }
        }
        let observed = rows.iter().filter(|r| !r.is_empty()).count();
        if observed < 2 {
            return Err(InferenceError::insufficient(format!(
                "grouping variable '{grouping}' has {observed} observed level(s), at least 2 required"
            )));
        }
        Ok(GroupedSample {
            grouping: grouping.to_owned(),
            levels,
            rows,
        })
    }

    /// Converts the sample back into record form.
    #[must_use]
    pub fn to_dataset(&self) -> Dataset {
        let variables = self
            .variables
            .iter()
            .map(|v| VariableSpec {
                name: v.name.clone(),
                kind: v.column.kind(),
            })
            .collect();
        let records = (0..self.len)
            .map(|row| {
                self.variables
                    .iter()
                    .map(|v| (v.name.clone(), v.column.value(row)))
                    .collect()
            })
            .collect();
        Dataset { variables, records }
    }
}

/// A sample partitioned by a categorical grouping variable.
///
/// Records whose grouping value is missing belong to no group.
#[derive(Debug, Clone)]
pub struct GroupedSample<'a> {
    grouping: String,
    levels: &'a [String],
    rows: Vec<Vec<usize>>,
}

impl GroupedSample<'_> {
    /// Observed levels of the grouping variable with their record indices, in
    /// level order. Levels no record carries are skipped.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.levels
            .iter()
            .zip(&self.rows)
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(level, rows)| (level.as_str(), rows.as_slice()))
    }

    /// Record indices of the group `level`.
    pub fn rows_of(&self, level: &str) -> Result<&[usize]> {
        let code = self
            .levels
            .iter()
            .position(|l| l == level)
            .ok_or_else(|| {
                InferenceError::invalid(format!(
                    "level '{level}' does not occur in grouping variable '{}'",
                    self.grouping
                ))
            })?;
        Ok(&self.rows[code])
    }

    /// Record indices of the two groups named by `order`, first group first.
    ///
    /// # Errors
    ///
    /// [`InferenceError::InvalidParameter`] if the two names coincide or either
    /// names a level absent from the grouping variable.
    pub fn pair(&self, order: &[String; 2]) -> Result<[&[usize]; 2]> {
        if order[0] == order[1] {
            return Err(InferenceError::invalid(format!(
                "order must name two different levels, got '{}' twice",
                order[0]
            )));
        }
        Ok([self.rows_of(&order[0])?, self.rows_of(&order[1])?])
    }
}

fn categorical_column<'v, I>(name: &str, values: I) -> Result<Column>
where
    I: Iterator<Item = Option<&'v Value>>,
{
    let mut builder = LevelBuilder::default();
    let codes = values
        .enumerate()
        .map(|(row, value)| match value {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::Category(label)) => Ok(Some(builder.code_of(label))),
            Some(Value::Number(n)) => Err(InferenceError::invalid(format!(
                "record #{row}: categorical variable '{name}' has numeric value {n}"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Column::Categorical {
        levels: builder.levels,
        codes,
    })
}

fn numeric_column<'v, I>(name: &str, values: I) -> Result<Column>
where
    I: Iterator<Item = Option<&'v Value>>,
{
    let values = values
        .enumerate()
        .map(|(row, value)| match value {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::Number(n)) if n.is_finite() => Ok(Some(*n)),
            Some(Value::Number(n)) => Err(InferenceError::invalid(format!(
                "record #{row}: numeric variable '{name}' has non-finite value {n}"
            ))),
            Some(Value::Category(label)) => Err(InferenceError::invalid(format!(
                "record #{row}: numeric variable '{name}' has label '{label}'"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Column::Numeric(values))
}
