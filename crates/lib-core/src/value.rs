use smol_str::SmolStr;

/// A scalar cell value surfaced by value enumeration.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    #[default]
    Null,
}

impl ScalarValue {
    /// The value as it appears inside an already-open string literal.
    pub fn raw_text(&self) -> String {
        match self {
            ScalarValue::Int(v) => v.to_string(),
            ScalarValue::Float(v) => v.to_string(),
            ScalarValue::Text(v) => v.clone(),
            ScalarValue::Bool(v) => v.to_string(),
            ScalarValue::Null => String::new(),
        }
    }

    /// The value rendered as a standalone SQL literal. Text is single-quoted
    /// with embedded quotes doubled.
    pub fn to_sql_literal(&self) -> String {
        match self {
            ScalarValue::Int(v) => v.to_string(),
            ScalarValue::Float(v) => v.to_string(),
            ScalarValue::Text(v) => format!("'{}'", v.replace('\'', "''")),
            ScalarValue::Bool(v) => if *v { "TRUE" } else { "FALSE" }.to_string(),
            ScalarValue::Null => "NULL".to_string(),
        }
    }
}

/// One enumerated value proposal, optionally labelled from a dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueHint {
    pub value: ScalarValue,
    pub label: Option<SmolStr>,
}

impl ValueHint {
    pub fn plain(value: ScalarValue) -> Self {
        ValueHint { value, label: None }
    }

    pub fn labelled(value: ScalarValue, label: impl Into<SmolStr>) -> Self {
        ValueHint {
            value,
            label: Some(label.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_literals_escape_quotes() {
        let v = ScalarValue::Text("it's".into());
        assert_eq!(v.to_sql_literal(), "'it''s'");
        assert_eq!(v.raw_text(), "it's");
    }

    #[test]
    fn null_and_bool_literals() {
        assert_eq!(ScalarValue::Null.to_sql_literal(), "NULL");
        assert_eq!(ScalarValue::Bool(true).to_sql_literal(), "TRUE");
    }
}
