//! Recoverable translation failures
//!
//! A failed translation step yields [`Diagnostics`], a non-empty list of
//! [`TranslateError`]s. Composite constructs concatenate the diagnostics of
//! every failing child, so nothing is dropped on the way up.

/// Prefix of every diagnostic comment written into host output
pub const COMMENT_PREFIX: &str = "py2cs:";

/// Outcome of one translation step
pub type Translation<T> = std::result::Result<T, Diagnostics>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("Unknown name: {0}")]
    UnknownName(String),

    #[error("Unsupported literal: {0}")]
    UnsupportedLiteral(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Unsupported assignment: expected 1 target, found {0}")]
    AssignmentArity(usize),

    #[error("Unsupported assignment target: {0}")]
    AssignmentTarget(String),

    #[error("Unsupported with statement: expected 1 context manager, found {0}")]
    WithArity(usize),

    #[error("Unsupported with target: {0}")]
    WithTarget(String),

    #[error("Unsupported for target: {0}")]
    ForTarget(String),

    #[error("Unsupported else clause on {0} loop")]
    LoopElse(String),

    #[error("Unsupported raise cause")]
    RaiseCause,

    #[error("Member access on untyped target: .{0}")]
    UntypedTarget(String),

    #[error("Member access on primitive {ty}: .{member}")]
    PrimitiveTarget { ty: String, member: String },

    #[error("Unknown member {member} on {class}")]
    UnknownMember { class: String, member: String },

    #[error("Unsupported dictionary entry: slice step has no host equivalent")]
    DictStep,

    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(String),

    #[error("Expected a statement sequence, found {0}")]
    ExpectedSuite(String),

    #[error("No Python body for {0}")]
    MissingBody(String),
}

/// Non-empty list of recoverable errors
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics(Vec<TranslateError>);

impl Diagnostics {
    pub fn single(error: TranslateError) -> Self {
        Self(vec![error])
    }

    /// Append another failure's diagnostics
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn errors(&self) -> &[TranslateError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comment lines for host trivia, one per error
    pub fn into_comments(self) -> Vec<String> {
        self.0.iter().map(comment).collect()
    }
}

pub fn comment(error: &TranslateError) -> String {
    format!("{} {}", COMMENT_PREFIX, error)
}

impl From<TranslateError> for Diagnostics {
    fn from(error: TranslateError) -> Self {
        Self::single(error)
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Combine two independent steps, concatenating diagnostics when both fail
pub fn join<A, B>(a: Translation<A>, b: Translation<B>) -> Translation<(A, B)> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(mut e), Err(other)) => {
            e.extend(other);
            Err(e)
        }
    }
}

/// Collect a sequence of steps, keeping every failure's diagnostics
pub fn collect<T>(items: impl IntoIterator<Item = Translation<T>>) -> Translation<Vec<T>> {
    let mut values = Vec::new();
    let mut failed: Option<Diagnostics> = None;
    for item in items {
        match item {
            Ok(value) => values.push(value),
            Err(e) => match failed.as_mut() {
                Some(existing) => existing.extend(e),
                None => failed = Some(e),
            },
        }
    }
    match failed {
        Some(e) => Err(e),
        None => Ok(values),
    }
}

/// Run an optional step
pub fn optional<T, U>(value: Option<T>, f: impl FnOnce(T) -> Translation<U>) -> Translation<Option<U>> {
    value.map(f).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(name: &str) -> Translation<i32> {
        Err(TranslateError::UnknownName(name.to_string()).into())
    }

    #[test]
    fn test_join_concatenates() {
        let both = join(unknown("a"), unknown("b")).unwrap_err();
        assert_eq!(
            both.errors(),
            &[
                TranslateError::UnknownName("a".to_string()),
                TranslateError::UnknownName("b".to_string())
            ]
        );

        assert_eq!(join(Ok::<_, Diagnostics>(1), Ok::<_, Diagnostics>(2)).unwrap(), (1, 2));
        assert_eq!(join(Ok::<_, Diagnostics>(1), unknown("b")).unwrap_err().len(), 1);
    }

    #[test]
    fn test_collect_keeps_order_and_all_errors() {
        let ok = collect(vec![Ok(1), Ok(2), Ok(3)]).unwrap();
        assert_eq!(ok, vec![1, 2, 3]);

        let err = collect(vec![Ok(1), unknown("x"), Ok(3), unknown("y")]).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(
            err.into_comments(),
            vec!["py2cs: Unknown name: x".to_string(), "py2cs: Unknown name: y".to_string()]
        );
    }
}
