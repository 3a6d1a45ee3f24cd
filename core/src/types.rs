//! Specification tree type definitions.
//!
//! These types describe a program (or interactive menu) declaratively:
//! options, nested groups, positional endpoints, information blocks and the
//! reference ids linking them. They are plain data with fluent constructors
//! and can round-trip through JSON/YAML with [`serde`]; constraint callbacks
//! are code-only and skipped by serialization.
//!
//! A specification is checked and indexed by [`validate`](crate::validate)
//! before it can be used for parsing.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{Parsed, Type, Value};

/// Normal and reduced description text.
///
/// Deserializes from either a plain string or `{ text, reduced }`.
///
/// # Examples
///
/// ```
/// use argspec_core::Description;
///
/// let desc = Description::new("Copy files between locations").with_reduced("Copy files");
/// assert_eq!(desc.get(false), "Copy files between locations");
/// assert_eq!(desc.get(true), "Copy files");
/// assert_eq!(Description::new("Only text").get(true), "Only text");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DescriptionRepr")]
pub struct Description {
    /// Full description.
    pub text: String,
    /// Shorter variant for reduced help, falls back to `text`.
    pub reduced: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptionRepr {
    Plain(String),
    Full {
        #[serde(default)]
        text: String,
        #[serde(default)]
        reduced: Option<String>,
    },
}

impl From<DescriptionRepr> for Description {
    fn from(repr: DescriptionRepr) -> Self {
        match repr {
            DescriptionRepr::Plain(text) => Self {
                text,
                reduced: None,
            },
            DescriptionRepr::Full { text, reduced } => Self { text, reduced },
        }
    }
}

impl Description {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            reduced: None,
        }
    }

    pub fn with_reduced(mut self, reduced: &str) -> Self {
        self.reduced = Some(reduced.to_string());
        self
    }

    /// Returns the text for the requested rendering mode.
    pub fn get(&self, reduced: bool) -> &str {
        match (&self.reduced, reduced) {
            (Some(short), true) => short,
            _ => &self.text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.reduced.as_deref().is_none_or(str::is_empty)
    }
}

type ConstraintFn = dyn Fn(&Parsed) -> Result<(), String>;

/// Semantic check executed after structural parsing succeeded.
///
/// Returning `Err(message)` aborts parsing with
/// [`ParseError::Constraint`](crate::ParseError::Constraint).
///
/// # Examples
///
/// ```
/// use argspec_core::{Constraint, Parsed};
///
/// let at_most_two = Constraint::new(|parsed: &Parsed| {
///     if parsed.positionals().len() > 2 {
///         return Err("At most two files can be compared.".to_string());
///     }
///     Ok(())
/// });
/// assert!(at_most_two.check(&Parsed::default()).is_ok());
/// ```
#[derive(Clone)]
pub struct Constraint(Rc<ConstraintFn>);

impl Constraint {
    pub fn new(check: impl Fn(&Parsed) -> Result<(), String> + 'static) -> Self {
        Self(Rc::new(check))
    }

    pub fn check(&self, parsed: &Parsed) -> Result<(), String> {
        (self.0)(parsed)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constraint(..)")
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Schema for a positional argument.
///
/// # Examples
///
/// ```
/// use argspec_core::{PositionalSpec, Primitive, Value};
///
/// let level = PositionalSpec::new("level", Primitive::UNum).with_default(3u64);
/// assert_eq!(level.default, Some(Value::UNum(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionalSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Type,
    #[serde(default)]
    pub description: Description,
    /// Value used when the argument is omitted or passed empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl PositionalSpec {
    pub fn new(name: &str, ty: impl Into<Type>) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.into(),
            description: Description::default(),
            default: None,
        }
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description.text = text.to_string();
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// One admissible shape of positional arguments for a node.
///
/// `minimum` defaults to the number of positionals. `maximum` defaults to
/// `max(minimum, positionals)`; an explicit `Some(0)` means unbounded, with
/// the last positional absorbing the overflow.
///
/// # Examples
///
/// ```
/// use argspec_core::{EndpointSpec, PositionalSpec, Primitive};
///
/// let copy = EndpointSpec::new(11)
///     .with_positional(PositionalSpec::new("src", Primitive::Any))
///     .with_positional(PositionalSpec::new("dst", Primitive::Any))
///     .with_minimum(2);
/// assert_eq!(copy.positionals.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub id: u64,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub positionals: Vec<PositionalSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<usize>,
    #[serde(skip)]
    pub constraints: Vec<Constraint>,
}

impl EndpointSpec {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description.text = text.to_string();
        self
    }

    pub fn with_positional(mut self, positional: PositionalSpec) -> Self {
        self.positionals.push(positional);
        self
    }

    pub fn with_minimum(mut self, minimum: usize) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the maximum; `0` means unbounded.
    pub fn with_maximum(mut self, maximum: usize) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Payload accepted by a non-flag option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSpec {
    /// Placeholder shown in help (`--name=<payload>`).
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Type,
    /// Installed when the option is not supplied at all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<Value>,
}

/// Schema for an option or flag.
///
/// Options without a payload are flags. Ids are caller-supplied and must be
/// unique across the whole specification.
///
/// # Examples
///
/// ```
/// use argspec_core::{OptionSpec, Primitive};
///
/// let verbose = OptionSpec::flag("verbose", 1).with_abbreviation('v');
/// assert!(verbose.is_flag());
///
/// let jobs = OptionSpec::with_payload("jobs", 2, "count", Primitive::UNum)
///     .with_default(4u64)
///     .with_description("Number of parallel jobs");
/// assert!(!jobs.is_flag());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<usize>,
    /// `Some(0)` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<usize>,
    #[serde(default)]
    pub hidden: bool,
    /// Reference ids shared with the groups allowed to use this option.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub links: BTreeSet<u64>,
    #[serde(default)]
    pub description: Description,
    #[serde(skip)]
    pub constraints: Vec<Constraint>,
}

impl OptionSpec {
    /// Creates a flag (no payload).
    pub fn flag(name: &str, id: u64) -> Self {
        Self {
            name: name.to_string(),
            id,
            ..Default::default()
        }
    }

    /// Creates an option carrying a typed payload.
    pub fn with_payload(name: &str, id: u64, payload: &str, ty: impl Into<Type>) -> Self {
        Self {
            name: name.to_string(),
            id,
            payload: Some(PayloadSpec {
                name: payload.to_string(),
                ty: ty.into(),
                defaults: Vec::new(),
            }),
            ..Default::default()
        }
    }

    pub fn is_flag(&self) -> bool {
        self.payload.is_none()
    }

    pub fn with_abbreviation(mut self, abbreviation: char) -> Self {
        self.abbreviation = Some(abbreviation);
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description.text = text.to_string();
        self
    }

    pub fn with_reduced(mut self, text: &str) -> Self {
        self.description.reduced = Some(text.to_string());
        self
    }

    /// Appends a default value. Has no effect on flags.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        if let Some(payload) = self.payload.as_mut() {
            payload.defaults.push(value.into());
        }
        self
    }

    /// Requires at least `minimum` occurrences.
    pub fn require(mut self, minimum: usize) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets both occurrence limits; a maximum of `0` means unbounded.
    pub fn require_range(mut self, minimum: usize, maximum: usize) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_link(mut self, reference: u64) -> Self {
        self.links.insert(reference);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Free-form help block, shown for the groups it is linked to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InformationSpec {
    pub name: String,
    pub text: Description,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub links: BTreeSet<u64>,
}

impl InformationSpec {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: Description::new(text),
            links: BTreeSet::new(),
        }
    }

    pub fn with_link(mut self, reference: u64) -> Self {
        self.links.insert(reference);
        self
    }
}

/// Help or version entry.
///
/// In program mode it is typed as `--name`/`-a`, in menu mode as the bare
/// word or character at a group selection position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<char>,
    #[serde(default)]
    pub description: Description,
    /// Triggering through the abbreviation renders reduced help.
    #[serde(default)]
    pub reducible: bool,
}

impl SpecialEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_abbreviation(mut self, abbreviation: char) -> Self {
        self.abbreviation = Some(abbreviation);
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description.text = text.to_string();
        self
    }

    pub fn reducible(mut self) -> Self {
        self.reducible = true;
        self
    }
}

/// Body shared by the root and every group.
///
/// Either `groups` or endpoints/positionals, never both. Positionals
/// declared directly form one implicit endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentsSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSpec>,
    /// Word used for the group selection in messages (default `mode`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<EndpointSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positionals: Vec<PositionalSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<usize>,
    #[serde(skip)]
    pub constraints: Vec<Constraint>,
}

/// Schema for a group (sub-command level).
///
/// # Examples
///
/// ```
/// use argspec_core::{EndpointSpec, GroupSpec, OptionSpec};
///
/// let remote = GroupSpec::new("remote", 10)
///     .with_group(GroupSpec::new("add", 11))
///     .with_group(GroupSpec::new("remove", 12).with_abbreviation('r'));
/// assert_eq!(remote.arguments.groups.len(), 2);
///
/// let copy = GroupSpec::new("copy", 20)
///     .with_option(OptionSpec::flag("force", 21))
///     .with_endpoint(EndpointSpec::new(1));
/// assert_eq!(copy.options.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<char>,
    #[serde(default)]
    pub description: Description,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(flatten)]
    pub arguments: ArgumentsSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub information: Vec<InformationSpec>,
    #[serde(default)]
    pub hidden: bool,
    /// Reference ids of options/information this group uses.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub links: BTreeSet<u64>,
}

impl GroupSpec {
    pub fn new(name: &str, id: u64) -> Self {
        Self {
            name: name.to_string(),
            id,
            ..Default::default()
        }
    }

    pub fn with_abbreviation(mut self, abbreviation: char) -> Self {
        self.abbreviation = Some(abbreviation);
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description.text = text.to_string();
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.arguments.groups.push(group);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.arguments.label = Some(label.to_string());
        self
    }

    pub fn with_endpoint(mut self, endpoint: EndpointSpec) -> Self {
        self.arguments.endpoints.push(endpoint);
        self
    }

    pub fn with_positional(mut self, positional: PositionalSpec) -> Self {
        self.arguments.positionals.push(positional);
        self
    }

    /// Requirement counts for directly declared positionals; `0` maximum
    /// means unbounded.
    pub fn with_requirement(mut self, minimum: usize, maximum: Option<usize>) -> Self {
        self.arguments.minimum = Some(minimum);
        self.arguments.maximum = maximum;
        self
    }

    pub fn with_information(mut self, information: InformationSpec) -> Self {
        self.information.push(information);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.arguments.constraints.push(constraint);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_link(mut self, reference: u64) -> Self {
        self.links.insert(reference);
        self
    }
}

/// Complete specification of a program or menu.
///
/// This is the root of the tree handed to [`validate`](crate::validate).
/// A program context requires a program name; a menu context forbids one.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
///
/// let spec = Spec::program("mytool", "1.2.0")
///     .with_description("Does things")
///     .with_help(SpecialEntry::new("help").with_abbreviation('h'))
///     .with_option(OptionSpec::flag("verbose", 1).with_abbreviation('v'))
///     .with_positional(PositionalSpec::new("input", Primitive::Any));
///
/// assert_eq!(spec.program, "mytool");
/// assert!(!spec.menu);
/// assert!(validate(&spec).is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub menu: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(flatten)]
    pub arguments: ArgumentsSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub information: Vec<InformationSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<SpecialEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_entry: Option<SpecialEntry>,
}

impl Spec {
    /// Creates a program specification.
    pub fn program(program: &str, version: &str) -> Self {
        Self {
            program: program.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    /// Creates an interactive menu specification (no program name).
    pub fn menu() -> Self {
        Self {
            menu: true,
            ..Default::default()
        }
    }

    /// Loads a specification from JSON text.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Loads a specification from YAML text.
    pub fn from_yaml(raw: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description.text = text.to_string();
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.arguments.groups.push(group);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.arguments.label = Some(label.to_string());
        self
    }

    pub fn with_endpoint(mut self, endpoint: EndpointSpec) -> Self {
        self.arguments.endpoints.push(endpoint);
        self
    }

    pub fn with_positional(mut self, positional: PositionalSpec) -> Self {
        self.arguments.positionals.push(positional);
        self
    }

    /// Requirement counts for directly declared positionals; `0` maximum
    /// means unbounded.
    pub fn with_requirement(mut self, minimum: usize, maximum: Option<usize>) -> Self {
        self.arguments.minimum = Some(minimum);
        self.arguments.maximum = maximum;
        self
    }

    pub fn with_information(mut self, information: InformationSpec) -> Self {
        self.information.push(information);
        self
    }

    pub fn with_help(mut self, entry: SpecialEntry) -> Self {
        self.help = Some(entry);
        self
    }

    pub fn with_version_entry(mut self, entry: SpecialEntry) -> Self {
        self.version_entry = Some(entry);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.arguments.constraints.push(constraint);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Primitive;

    #[test]
    fn test_option_defaults_ignored_for_flags() {
        let flag = OptionSpec::flag("verbose", 1).with_default(3u64);
        assert!(flag.payload.is_none());

        let option = OptionSpec::with_payload("level", 2, "n", Primitive::UNum).with_default(3u64);
        assert_eq!(option.payload.unwrap().defaults, vec![Value::UNum(3)]);
    }

    #[test]
    fn test_description_from_plain_string() {
        let desc: Description = serde_json::from_str(r#""Plain text""#).unwrap();
        assert_eq!(desc, Description::new("Plain text"));

        let desc: Description =
            serde_json::from_str(r#"{"text": "Long", "reduced": "Short"}"#).unwrap();
        assert_eq!(desc.get(true), "Short");
    }

    #[test]
    fn test_description_is_empty() {
        assert!(Description::default().is_empty());
        assert!(!Description::new("Long").is_empty());
        assert!(!Description::new("").with_reduced("Short").is_empty());
        assert!(Description::new("").with_reduced("").is_empty());
    }

    #[test]
    fn test_spec_from_yaml() {
        let yaml = r#"
program: tool
version: "0.3"
help:
  name: help
  abbreviation: h
options:
  - name: verbose
    id: 1
    abbreviation: v
  - name: level
    id: 2
    payload:
      name: n
      type: uint
      defaults: [2]
groups:
  - name: copy
    id: 10
    endpoints:
      - id: 1
        positionals:
          - name: src
          - name: dst
"#;
        let spec = Spec::from_yaml(yaml).unwrap();
        assert_eq!(spec.program, "tool");
        assert_eq!(spec.options.len(), 2);
        assert_eq!(spec.options[1].payload.as_ref().unwrap().ty, Type::from(Primitive::UNum));
        assert_eq!(spec.arguments.groups[0].arguments.endpoints[0].positionals.len(), 2);
        assert_eq!(spec.help.unwrap().abbreviation, Some('h'));
    }

    #[test]
    fn test_constraint_identity_equality() {
        let a = Constraint::new(|_| Ok(()));
        let b = a.clone();
        let c = Constraint::new(|_| Ok(()));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
