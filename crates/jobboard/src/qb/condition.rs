//! WHERE clause fragments.

use std::fmt;

/// Boolean keyword that joins a condition to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
}

impl fmt::Display for Joiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Joiner::And => "AND",
            Joiner::Or => "OR",
        })
    }
}

/// Right-hand side of a condition.
///
/// Values themselves live in the builder's bindings; a condition only records the
/// placeholder names it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionValue {
    /// One bound placeholder.
    Scalar(String),
    /// One placeholder per list element (IN / NOT IN / BETWEEN).
    List(Vec<String>),
    /// Literal `NULL`, never bound.
    Null,
}

/// One WHERE fragment: `joiner field operator value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub joiner: Joiner,
    pub field: String,
    pub operator: String,
    pub value: ConditionValue,
}

const OPERATORS: &[&str] = &[
    "=",
    "!=",
    "<>",
    "<",
    "<=",
    ">",
    ">=",
    "LIKE",
    "NOT LIKE",
    "ILIKE",
    "NOT ILIKE",
    "IN",
    "NOT IN",
    "IS",
    "IS NOT",
    "BETWEEN",
    "NOT BETWEEN",
];

/// Upper-case keywords and collapse inner whitespace (`not  like` → `NOT LIKE`).
pub(crate) fn normalize_operator(op: &str) -> String {
    op.split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn is_known_operator(op: &str) -> bool {
    OPERATORS.contains(&op)
}

impl Condition {
    fn is_between(&self) -> bool {
        matches!(self.operator.as_str(), "BETWEEN" | "NOT BETWEEN")
    }

    /// Shape errors: operators that need a list, or NULL, given something else.
    pub(crate) fn check(&self) -> Result<(), String> {
        if !is_known_operator(&self.operator) {
            return Err(format!("unsupported operator '{}'", self.operator));
        }
        match (&self.value, self.operator.as_str()) {
            (ConditionValue::List(items), _) if self.is_between() && items.len() != 2 => Err(
                format!("{} on '{}' needs exactly two values", self.operator, self.field),
            ),
            (ConditionValue::List(items), _) if items.is_empty() => Err(format!(
                "{} on '{}' needs at least one value",
                self.operator, self.field
            )),
            (ConditionValue::List(_), "IN" | "NOT IN" | "BETWEEN" | "NOT BETWEEN") => Ok(()),
            (ConditionValue::List(_), op) => {
                Err(format!("operator '{op}' does not take a list of values"))
            }
            (ConditionValue::Scalar(_), op @ ("IN" | "NOT IN" | "BETWEEN" | "NOT BETWEEN")) => {
                Err(format!("operator '{op}' on '{}' needs a list of values", self.field))
            }
            (ConditionValue::Scalar(_), op @ ("IS" | "IS NOT")) => {
                Err(format!("operator '{op}' on '{}' only accepts NULL", self.field))
            }
            (ConditionValue::Scalar(_), _) | (ConditionValue::Null, _) => Ok(()),
        }
    }

    /// Append `field operator value` to `out`.
    pub(crate) fn render(&self, out: &mut String) {
        out.push_str(&self.field);
        out.push(' ');
        out.push_str(&self.operator);
        out.push(' ');
        match &self.value {
            ConditionValue::Null => out.push_str("NULL"),
            ConditionValue::Scalar(name) => {
                out.push(':');
                out.push_str(name);
            }
            ConditionValue::List(names) if self.is_between() => {
                let mut first = true;
                for name in names {
                    if !first {
                        out.push_str(" AND ");
                    }
                    first = false;
                    out.push(':');
                    out.push_str(name);
                }
            }
            ConditionValue::List(names) => {
                out.push('(');
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push(':');
                    out.push_str(name);
                }
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(operator: &str, value: ConditionValue) -> Condition {
        Condition {
            joiner: Joiner::And,
            field: "salary".into(),
            operator: normalize_operator(operator),
            value,
        }
    }

    fn rendered(c: &Condition) -> String {
        let mut out = String::new();
        c.render(&mut out);
        out
    }

    #[test]
    fn normalizes_operator_keywords() {
        assert_eq!(normalize_operator(" not   like "), "NOT LIKE");
        assert_eq!(normalize_operator(">="), ">=");
    }

    #[test]
    fn renders_each_value_shape() {
        assert_eq!(
            rendered(&cond(">", ConditionValue::Scalar("salary".into()))),
            "salary > :salary"
        );
        assert_eq!(
            rendered(&cond(
                "in",
                ConditionValue::List(vec!["salary_0".into(), "salary_1".into()])
            )),
            "salary IN (:salary_0, :salary_1)"
        );
        assert_eq!(
            rendered(&cond(
                "between",
                ConditionValue::List(vec!["salary_0".into(), "salary_1".into()])
            )),
            "salary BETWEEN :salary_0 AND :salary_1"
        );
        assert_eq!(rendered(&cond("is not", ConditionValue::Null)), "salary IS NOT NULL");
    }

    #[test]
    fn rejects_mismatched_shapes() {
        assert!(cond("IN", ConditionValue::Scalar("x".into())).check().is_err());
        assert!(cond("=", ConditionValue::List(vec!["x_0".into()])).check().is_err());
        assert!(cond("IN", ConditionValue::List(vec![])).check().is_err());
        assert!(cond("BETWEEN", ConditionValue::List(vec!["a".into()])).check().is_err());
        assert!(cond("IS", ConditionValue::Scalar("x".into())).check().is_err());
        assert!(cond("===", ConditionValue::Scalar("x".into())).check().is_err());
        assert!(cond("=", ConditionValue::Null).check().is_ok());
    }
}
