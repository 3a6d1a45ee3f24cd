//! Parse results.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::Value;

/// Structured result of a successful parse.
///
/// Flags and options are keyed by their caller-supplied ids. Option values
/// and positionals are already converted to their declared types, with
/// defaults installed where nothing was supplied.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
///
/// let spec = Spec::program("tool", "1.0")
///     .with_option(OptionSpec::flag("verbose", 1).with_abbreviation('v'))
///     .with_option(OptionSpec::with_payload("level", 2, "n", Primitive::UNum).with_default(1u64))
///     .with_positional(PositionalSpec::new("file", Primitive::Any));
/// let config = validate(&spec).unwrap();
///
/// let parsed = parse(&config, &["-v", "notes.txt"]).unwrap().into_parsed().unwrap();
/// assert!(parsed.flag(1));
/// assert_eq!(parsed.option(2).unwrap().unum().unwrap(), 1);
/// assert_eq!(parsed.positional(0).unwrap().str().unwrap(), "notes.txt");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Parsed {
    pub(crate) flags: BTreeSet<u64>,
    pub(crate) options: BTreeMap<u64, Vec<Value>>,
    pub(crate) positionals: Vec<Value>,
    pub(crate) endpoint: Option<u64>,
    pub(crate) groups: Vec<u64>,
}

impl Parsed {
    /// Whether the flag with the given id was supplied.
    pub fn flag(&self, id: u64) -> bool {
        self.flags.contains(&id)
    }

    pub fn flags(&self) -> &BTreeSet<u64> {
        &self.flags
    }

    /// All values of an option (supplied or default), empty if absent.
    pub fn options(&self, id: u64) -> &[Value] {
        self.options.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// First value of an option.
    pub fn option(&self, id: u64) -> Option<&Value> {
        self.options(id).first()
    }

    pub fn option_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.options.keys().copied()
    }

    pub fn positionals(&self) -> &[Value] {
        &self.positionals
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positionals.get(index)
    }

    /// Id of the selected explicit endpoint, `None` for implicit endpoints.
    pub fn endpoint(&self) -> Option<u64> {
        self.endpoint
    }

    /// Ids of the selected groups, one per nesting level.
    pub fn group_path(&self) -> &[u64] {
        &self.groups
    }

    /// Id of the innermost selected group.
    pub fn group(&self) -> Option<u64> {
        self.groups.last().copied()
    }
}

/// Which special entry requested output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintKind {
    Help,
    Version,
    /// Both were triggered; version text comes first.
    VersionAndHelp,
}

/// Request to display text instead of running the program.
///
/// Not an error: callers print `text` and exit successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintRequested {
    pub kind: PrintKind,
    pub text: String,
}

/// Result of a parse that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Parsed(Parsed),
    Print(PrintRequested),
}

impl Outcome {
    pub fn into_parsed(self) -> Option<Parsed> {
        match self {
            Outcome::Parsed(parsed) => Some(parsed),
            Outcome::Print(_) => None,
        }
    }

    pub fn into_print(self) -> Option<PrintRequested> {
        match self {
            Outcome::Print(print) => Some(print),
            Outcome::Parsed(_) => None,
        }
    }
}
