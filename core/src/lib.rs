//! Declarative command-line argument specifications.
//!
//! This crate turns a tree-shaped description of a command line into a
//! parser:
//!
//! - [`Spec`]: root of a specification (program or menu), holding global
//!   options, groups or positional arguments, and information blocks.
//! - [`GroupSpec`]: a selectable sub-command with its own options, nested
//!   groups or positional endpoints.
//! - [`OptionSpec`]: a flag or an option carrying a typed payload.
//! - [`EndpointSpec`] / [`PositionalSpec`]: positional argument lists,
//!   disambiguated by how many positionals were supplied.
//!
//! [`validate`] checks a specification once and produces a
//! [`ValidatedConfig`]; [`Parser`] (or [`parse`] / [`parse_args`]) turns
//! tokens into a [`Parsed`] result or a request to print help or version
//! text. Help pages are rendered by a [`Formatter`], [`TextFormatter`] by
//! default.
//!
//! # Example
//!
//! ```
//! use argspec_core::*;
//!
//! let spec = Spec::program("notes", "0.3")
//!     .with_help(SpecialEntry::new("help").with_abbreviation('h'))
//!     .with_option(OptionSpec::flag("verbose", 1).with_abbreviation('v'))
//!     .with_group(
//!         GroupSpec::new("add", 10)
//!             .with_option(OptionSpec::with_payload("tag", 2, "name", Primitive::Any).require_range(0, 0))
//!             .with_positional(PositionalSpec::new("text", Primitive::Any)),
//!     )
//!     .with_group(GroupSpec::new("list", 11));
//!
//! let config = validate(&spec).unwrap();
//! let parsed = parse(&config, &["-v", "add", "--tag=work", "--tag", "home", "call bob"])
//!     .unwrap()
//!     .into_parsed()
//!     .unwrap();
//!
//! assert!(parsed.flag(1));
//! assert_eq!(parsed.group(), Some(10));
//! assert_eq!(parsed.options(2).len(), 2);
//! assert_eq!(parsed.positional(0).unwrap().str().unwrap(), "call bob");
//! ```

mod error;
mod help;
mod links;
mod parsed;
mod parser;
mod tree;
mod types;
mod validate;
mod value;

pub use error::{ConfigError, Error, ParseError, Result, TypeMismatch};
pub use help::{
    DEFAULT_LINE_WIDTH, DESCRIPTION_COLUMN, Formatter, TextFormatter, help_hint, program_name,
};
pub use parsed::{Outcome, Parsed, PrintKind, PrintRequested};
pub use parser::{Parser, parse, parse_args};
pub use tree::{NodeId, ValidEndpoint, ValidInformation, ValidNode, ValidOption, ValidatedConfig};
pub use types::*;
pub use validate::validate;
pub use value::{EnumEntry, Primitive, Type, Value};
