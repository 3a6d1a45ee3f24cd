//! Error types for validation, parsing and value access.
//!
//! Every variant renders a complete sentence, so callers can print the
//! message directly followed by a help hint.

use thiserror::Error;

/// The specification is internally inconsistent.
///
/// Raised by [`validate`](crate::validate) only; the first violation found
/// aborts validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A program context without a program name.
    #[error("Configuration must have a program name.")]
    MissingProgramName,
    /// A menu context with a program name.
    #[error("Menu cannot have a program name.")]
    MenuWithProgramName,
    /// Entity name shorter than two characters.
    #[error("{kind} name [{name}] must at least be two characters long.")]
    NameTooShort { kind: &'static str, name: String },
    /// Entity name starting with the option prefix.
    #[error("{kind} name [{name}] must not start with a hyphen.")]
    NameWithHyphen { kind: &'static str, name: String },
    /// Entity name that would be split apart while scanning tokens.
    #[error("{kind} name [{name}] must not contain '=' or whitespace.")]
    InvalidNameCharacter { kind: &'static str, name: String },
    /// Abbreviation that cannot be typed unambiguously.
    #[error("{kind} abbreviation [{abbreviation}] is not a valid character.")]
    InvalidAbbreviation {
        kind: &'static str,
        abbreviation: char,
    },
    /// A version entry without a version string.
    #[error("Version entry requires a non-empty version string.")]
    MissingVersion,
    /// Help and version entries share a name or abbreviation.
    #[error("Help entry and version entry cannot both use [{0}].")]
    SpecialEntriesClash(String),
    /// An option (program mode) or group (menu mode) shadows a special entry.
    #[error("{kind} [{name}] clashes with the {entry} entry.")]
    ClashesWithSpecialEntry {
        kind: &'static str,
        name: String,
        entry: &'static str,
    },
    #[error("Option with name [{0}] already exists.")]
    DuplicateOptionName(String),
    #[error("Option abbreviation [{0}] already exists.")]
    DuplicateOptionAbbreviation(char),
    #[error("Option id [{0}] is used more than once.")]
    DuplicateOptionId(u64),
    #[error("Group with name [{0}] already exists for given groups-set.")]
    DuplicateGroupName(String),
    #[error("Abbreviation [{abbreviation}] for group with name [{name}] already exists.")]
    DuplicateGroupAbbreviation { name: String, abbreviation: char },
    #[error("Group id [{0}] is used more than once in one groups-set.")]
    DuplicateGroupId(u64),
    #[error("Endpoint id [{id}] is used more than once by {owner}.")]
    DuplicateEndpointId { owner: String, id: u64 },
    /// Sub-groups and positionals/endpoints on the same node.
    #[error("{0} cannot have positional arguments and sub-groups.")]
    GroupsAndPositionals(String),
    /// Explicit endpoints combined with direct positionals or requirements.
    #[error("{0} cannot combine explicit endpoints with direct positionals or requirements.")]
    EndpointsAndPositionals(String),
    #[error("Enum of {0} must not be empty.")]
    EmptyEnum(String),
    #[error("Enum of {0} must have unique, non-empty entry names and unique ids.")]
    InvalidEnumEntries(String),
    #[error("Positional argument [{index}] of {owner} must not have an empty name.")]
    EmptyPositionalName { owner: String, index: usize },
    #[error("Maximum of {0} must not be less than its minimum.")]
    MaximumBelowMinimum(String),
    #[error("Maximum of {0} must not be less than its number of positional arguments.")]
    MaximumBelowPositionals(String),
    #[error("Requirements of {0} need at least one positional argument.")]
    RequirementWithoutPositionals(String),
    /// A defaulted positional precedes a required one.
    #[error("Positional [{name}] of {owner} has a default value but is followed by required positionals.")]
    DefaultGap { owner: String, name: String },
    /// Two endpoints of one node accept the same positional count.
    #[error("Effective requirement counts of the endpoints of {0} must not overlap.")]
    OverlappingEndpoints(String),
    #[error("Flag [{0}] cannot declare requirements.")]
    FlagWithRequirements(String),
    #[error("Default values for option [{0}] must not violate its own requirements.")]
    DefaultCountOutOfRange(String),
    #[error("Default value of {who} is expected to be {expected}.")]
    InvalidDefault { who: String, expected: &'static str },
    #[error("Information name and text of {0} must not be empty.")]
    EmptyInformation(String),
    /// A reference id with nothing on the other side to link to.
    #[error("Reference [{id}] of {who} has no counterpart to link to.")]
    DanglingReference { who: String, id: u64 },
    #[error("Group [{group}] cannot use option [{option}] from another group.")]
    ForeignOption { group: String, option: String },
    #[error("Group [{group}] cannot use information [{information}] from another group.")]
    ForeignInformation { group: String, information: String },
}

/// The supplied tokens violate the validated specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown optional argument [{0}] encountered.")]
    UnknownOption(String),
    #[error("Unknown optional argument-abbreviation [{0}] encountered.")]
    UnknownAbbreviation(char),
    #[error("Value [{payload}] missing for optional argument [{option}].")]
    MissingPayload { payload: String, option: String },
    #[error("Value [{0}] not used by optional arguments.")]
    UnusedPayload(String),
    #[error("Unknown {label} [{token}] encountered.")]
    UnknownGroup { label: String, token: String },
    /// Group selection stopped before reaching a node with endpoints.
    #[error("{0} missing.")]
    GroupMissing(String),
    /// `context` is empty or reads ` for <label> [<group>]`.
    #[error("Unrecognized argument [{token}] encountered{context}.")]
    UnrecognizedArgument { token: String, context: String },
    #[error("Argument [{name}] is missing{context}.")]
    ArgumentMissing { name: String, context: String },
    #[error("Invalid {expected} for argument [{name}] encountered.")]
    InvalidValue { expected: &'static str, name: String },
    #[error("Argument [{option}] not meant for {label} [{group}].")]
    OptionNotForGroup {
        option: String,
        label: String,
        group: String,
    },
    #[error("Argument [{0}] is missing.")]
    OptionMissing(String),
    #[error("Argument [{option}] can at most be specified {maximum} times.")]
    TooManyOccurrences { option: String, maximum: usize },
    /// Message returned by a constraint callback.
    #[error("{0}")]
    Constraint(String),
}

/// A [`Value`](crate::Value) was accessed as the wrong kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value is not {expected}.")]
pub struct TypeMismatch {
    pub expected: &'static str,
}

impl TypeMismatch {
    pub(crate) fn new(expected: &'static str) -> Self {
        Self { expected }
    }
}

/// Umbrella error for callers that load, validate and parse in one go.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    /// Specification file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Specification file is not valid YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
