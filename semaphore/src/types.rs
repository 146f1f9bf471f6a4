use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::bail;
use crate::error::{ErrorKind, LockError, LockResult};

/// Identifier of a pipeline run.
///
/// Every lock row is owned by exactly one run. Runs hand their id around as text, so
/// parsing rejects anything that is not a base-10 integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(i64);

impl RunId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for RunId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(id) => Ok(Self(id)),
            Err(err) => bail!(
                ErrorKind::InvalidRunId,
                "Run id is not an integer",
                format!("`{s}` cannot be used as a run id"),
                source: err
            ),
        }
    }
}

/// A row of the lock registry: `run_id` intends to use (or uses) `lock_path`.
///
/// `lock_status` is written as `false` and never updated; presence of the row is what
/// marks the path as held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    pub run_id: RunId,
    pub lock_path: String,
    pub lock_status: bool,
    pub created_at: DateTime<Utc>,
}

impl LockRecord {
    /// Builds the record registered when `run_id` queues for `lock_path`.
    pub fn queued(run_id: RunId, lock_path: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            lock_path: lock_path.into(),
            lock_status: false,
            created_at,
        }
    }
}

/// A set of lock paths together with the SQL literal list naming them.
///
/// The literal is what ends up inside `lock_path IN (...)`. It is either rendered from the
/// paths (`'a', 'b'`) or parsed from text another run produced, in which case the text is
/// kept as given so the statement matches what that run issued.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckPath {
    paths: Vec<String>,
    literal: String,
}

impl CheckPath {
    /// The check path naming no paths. Renders as `""`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Renders `paths` as single-quoted literals joined with `", "`.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        let literal = paths
            .iter()
            .map(|path| quote_path(path))
            .collect::<Vec<_>>()
            .join(", ");

        Self { paths, literal }
    }

    /// Parses a pre-formatted list such as `'/tmp/lock1','/tmp/lock2'`.
    ///
    /// Only single-quoted literals separated by commas (and optional whitespace) are
    /// accepted. Blank input yields the empty check path.
    pub fn parse(literal: &str) -> LockResult<Self> {
        if literal.trim().is_empty() {
            return Ok(Self::empty());
        }

        let paths = parse_literal_list(literal)?;

        Ok(Self {
            paths,
            literal: literal.to_string(),
        })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Returns the text placed inside `IN (...)`.
    pub fn as_sql_list(&self) -> &str {
        &self.literal
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

impl fmt::Display for CheckPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl FromStr for CheckPath {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn quote_path(path: &str) -> String {
    format!("'{}'", path.replace('\'', "''"))
}

fn parse_literal_list(literal: &str) -> LockResult<Vec<String>> {
    let mut paths = Vec::new();
    let mut chars = literal.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        if chars.next() != Some('\'') {
            bail!(
                ErrorKind::InvalidCheckPath,
                "Check path is not a list of quoted literals",
                format!("expected `'` in `{literal}`")
            );
        }

        let mut path = String::new();
        loop {
            match chars.next() {
                Some('\'') if chars.next_if_eq(&'\'').is_some() => path.push('\''),
                Some('\'') => break,
                Some(c) => path.push(c),
                None => bail!(
                    ErrorKind::InvalidCheckPath,
                    "Check path is not a list of quoted literals",
                    format!("unterminated literal in `{literal}`")
                ),
            }
        }
        paths.push(path);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.next() {
            None => return Ok(paths),
            Some(',') => continue,
            Some(c) => bail!(
                ErrorKind::InvalidCheckPath,
                "Check path is not a list of quoted literals",
                format!("unexpected `{c}` after literal in `{literal}`")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_parses_integers_only() {
        assert_eq!(" 101 ".parse::<RunId>().unwrap(), RunId::new(101));
        assert_eq!(RunId::new(-3).to_string(), "-3");

        let err = "run-101".parse::<RunId>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRunId);
        assert_eq!(err.detail(), Some("`run-101` cannot be used as a run id"));
    }

    #[test]
    fn check_path_renders_quoted_comma_joined_list() {
        assert_eq!(CheckPath::from_paths(["a", "b"]).to_string(), "'a', 'b'");
        assert_eq!(CheckPath::from_paths(["a"]).to_string(), "'a'");
        assert_eq!(CheckPath::from_paths(Vec::<String>::new()).to_string(), "");
        assert!(CheckPath::from_paths(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn check_path_doubles_embedded_quotes() {
        let check_path = CheckPath::from_paths(["/data/it's"]);

        assert_eq!(check_path.as_sql_list(), "'/data/it''s'");
        assert_eq!(check_path.paths(), ["/data/it's".to_string()]);
    }

    #[test]
    fn parsed_check_path_keeps_literal_verbatim() {
        let check_path = CheckPath::parse("'/tmp/lock1','/tmp/lock2'").unwrap();

        assert_eq!(check_path.as_sql_list(), "'/tmp/lock1','/tmp/lock2'");
        assert_eq!(check_path.paths(), ["/tmp/lock1", "/tmp/lock2"]);
        assert!(check_path.contains("/tmp/lock2"));
    }

    #[test]
    fn parsing_a_rendered_check_path_yields_the_same_paths() {
        let rendered = CheckPath::from_paths(["x", "it's"]);
        let parsed = CheckPath::parse(rendered.as_sql_list()).unwrap();

        assert_eq!(parsed, rendered);
    }

    #[test]
    fn blank_literal_is_the_empty_check_path() {
        assert_eq!(CheckPath::parse("  ").unwrap(), CheckPath::empty());
    }

    #[test]
    fn parsing_rejects_anything_but_quoted_literals() {
        for literal in [
            "/tmp/lock1",
            "'/tmp/lock1",
            "'a',",
            "'a' 'b'",
            "'a') OR (1=1",
            "'a'; DROP TABLE x; --",
        ] {
            let err = CheckPath::parse(literal).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCheckPath, "{literal}");
        }
    }
}
