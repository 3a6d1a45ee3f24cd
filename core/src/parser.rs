//! Runtime token parser.
//!
//! Parsing is a single forward scan followed by verification. Problems found
//! during the scan are deferred so that a help or version request anywhere
//! on the line still wins; only the first deferred problem is reported.
//!
//! # Examples
//!
//! ```
//! use argspec_core::*;
//!
//! let spec = Spec::program("tool", "1.0")
//!     .with_help(SpecialEntry::new("help").with_abbreviation('h'))
//!     .with_option(OptionSpec::with_payload("name", 2, "s", Primitive::Any).require(1));
//! let config = validate(&spec).unwrap();
//!
//! // Help wins over the missing payload of --name.
//! let outcome = Parser::new(&config).parse(&["-h", "--name"]).unwrap();
//! assert!(matches!(outcome, Outcome::Print(_)));
//!
//! let error = parse(&config, &["--name"]).unwrap_err();
//! assert_eq!(error.to_string(), "Value [s] missing for optional argument [name].");
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::error::ParseError;
use crate::help::{self, capitalize, Formatter, TextFormatter, DEFAULT_LINE_WIDTH};
use crate::parsed::{Outcome, Parsed, PrintKind, PrintRequested};
use crate::tree::{NodeId, ValidEndpoint, ValidatedConfig};
use crate::{Primitive, Type, Value};

static TEXT_FORMATTER: TextFormatter = TextFormatter;

/// Parses tokens against a [`ValidatedConfig`].
///
/// Holds only settings; every call to [`parse`](Parser::parse) starts from
/// a clean state.
pub struct Parser<'c, 'a> {
    config: &'c ValidatedConfig<'a>,
    formatter: &'c dyn Formatter,
    width: usize,
    program: String,
}

impl<'c, 'a> Parser<'c, 'a> {
    pub fn new(config: &'c ValidatedConfig<'a>) -> Self {
        Self {
            config,
            formatter: &TEXT_FORMATTER,
            width: DEFAULT_LINE_WIDTH,
            program: if config.is_menu() {
                String::new()
            } else {
                config.spec.program.clone()
            },
        }
    }

    /// Line width used when rendering help text.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_formatter(mut self, formatter: &'c dyn Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Derives the displayed program name from an invocation path.
    ///
    /// Ignored in menu mode.
    pub fn with_program_path(mut self, path: &str) -> Self {
        if !self.config.is_menu() {
            self.program = help::program_name(path, &self.config.spec.program);
        }
        self
    }

    /// Name shown in usage lines, version text and the help hint.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Hint pointing at the help entry, for printing after an error.
    pub fn help_hint(&self) -> String {
        help::help_hint(&self.program, self.config)
    }

    /// Parses tokens (program path excluded).
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Outcome, ParseError> {
        let mut scan = Scan::new(self.config);
        let mut iter = tokens.iter().map(|token| token.as_ref());
        while let Some(token) = iter.next() {
            scan.token(token, &mut iter);
        }
        self.finish(scan)
    }

    fn finish(&self, scan: Scan<'_, 'a>) -> Result<Outcome, ParseError> {
        let config = self.config;

        if scan.help.is_some() || scan.version {
            let mut text = String::new();
            if scan.version {
                text = self.formatter.render_version(config, &self.program);
            }
            if let Some(reduced) = scan.help {
                if !text.is_empty() {
                    text.push_str("\n\n");
                }
                text.push_str(&self.formatter.render_help(
                    config,
                    &self.program,
                    scan.node,
                    reduced,
                    self.width,
                ));
            }
            let kind = match (scan.version, scan.help.is_some()) {
                (true, true) => PrintKind::VersionAndHelp,
                (true, false) => PrintKind::Version,
                _ => PrintKind::Help,
            };
            debug!(?kind, node = scan.node.index(), "Print requested");
            return Ok(Outcome::Print(PrintRequested { kind, text }));
        }

        if let Some(error) = scan.unknown_group {
            return Err(error);
        }
        if let Some(error) = scan.deferred {
            return Err(error);
        }

        let leaf = config.node(scan.node);
        let group_missing = || ParseError::GroupMissing(capitalize(&leaf.label));
        if leaf.is_incomplete() {
            return Err(group_missing());
        }
        let endpoint = select_endpoint(&leaf.endpoints, scan.positionals.len())
            .ok_or_else(group_missing)?;
        debug!(
            endpoint = ?endpoint.id,
            positionals = scan.positionals.len(),
            "Selected endpoint"
        );

        let mut parsed = Parsed {
            flags: scan.flags,
            groups: scan.groups,
            endpoint: endpoint.id,
            ..Parsed::default()
        };
        let context = self.context(scan.node);
        parsed.positionals = verify_positionals(endpoint, &scan.positionals, &context)?;
        parsed.options = self.verify_options(scan.node, &parsed.flags, scan.options)?;

        self.check_constraints(scan.node, endpoint, &parsed)?;
        debug!(
            flags = parsed.flags.len(),
            options = parsed.options.len(),
            positionals = parsed.positionals.len(),
            group = ?parsed.group(),
            "Parsed arguments"
        );
        Ok(Outcome::Parsed(parsed))
    }

    /// ` for <label> [<group>]` below the root, empty at the root.
    fn context(&self, node: NodeId) -> String {
        let entry = self.config.node(node);
        match (entry.parent, entry.name()) {
            (Some(parent), Some(name)) => {
                format!(" for {} [{name}]", self.config.node(parent).label)
            }
            _ => String::new(),
        }
    }

    fn verify_options(
        &self,
        leaf: NodeId,
        flags: &BTreeSet<u64>,
        mut raw: BTreeMap<usize, Vec<String>>,
    ) -> Result<BTreeMap<u64, Vec<Value>>, ParseError> {
        let config = self.config;
        let mut options = BTreeMap::new();

        for (index, option) in config.options.iter().enumerate() {
            let spec = option.spec;
            let supplied = if option.payload {
                raw.contains_key(&index)
            } else {
                flags.contains(&spec.id)
            };

            if !config.is_usable(option, leaf) {
                if supplied {
                    let node = config.node(leaf);
                    let label = node
                        .parent
                        .map(|parent| config.node(parent).label.clone())
                        .unwrap_or_default();
                    return Err(ParseError::OptionNotForGroup {
                        option: spec.name.clone(),
                        label,
                        group: node.name().unwrap_or_default().to_string(),
                    });
                }
                continue;
            }
            let Some(payload) = &spec.payload else {
                continue;
            };

            let values = raw.remove(&index).unwrap_or_default();
            if values.is_empty() && !option.defaults.is_empty() {
                options.insert(spec.id, option.defaults.clone());
                continue;
            }
            if values.len() < option.minimum_effective {
                return Err(ParseError::OptionMissing(spec.name.clone()));
            }
            if let Some(maximum) = option.maximum.filter(|&max| values.len() > max) {
                return Err(ParseError::TooManyOccurrences {
                    option: spec.name.clone(),
                    maximum,
                });
            }
            if values.is_empty() {
                continue;
            }

            let converted = values
                .iter()
                .map(|value| convert(value, &payload.ty, &spec.name))
                .collect::<Result<Vec<_>, _>>()?;
            options.insert(spec.id, converted);
        }
        Ok(options)
    }

    fn check_constraints(
        &self,
        leaf: NodeId,
        endpoint: &ValidEndpoint<'_>,
        parsed: &Parsed,
    ) -> Result<(), ParseError> {
        let config = self.config;
        let nodes = config
            .lineage(leaf)
            .into_iter()
            .flat_map(|node| config.node(node).arguments.constraints.iter());
        let options = config
            .options
            .iter()
            .filter(|option| {
                parsed.flag(option.spec.id) || parsed.options.contains_key(&option.spec.id)
            })
            .flat_map(|option| option.spec.constraints.iter());

        for constraint in nodes.chain(endpoint.constraints).chain(options) {
            constraint.check(parsed).map_err(ParseError::Constraint)?;
        }
        Ok(())
    }
}

/// Parses tokens (program path excluded) with default settings.
pub fn parse<S: AsRef<str>>(
    config: &ValidatedConfig<'_>,
    tokens: &[S],
) -> Result<Outcome, ParseError> {
    Parser::new(config).parse(tokens)
}

/// Parses a full argument vector.
///
/// In program mode the first element is the invocation path and only names
/// the program; menus consume every element.
pub fn parse_args<S: AsRef<str>>(
    config: &ValidatedConfig<'_>,
    args: &[S],
) -> Result<Outcome, ParseError> {
    match args.split_first() {
        Some((path, tokens)) if !config.is_menu() => Parser::new(config)
            .with_program_path(path.as_ref())
            .parse(tokens),
        _ => Parser::new(config).parse(args),
    }
}

/// Mutable scan state for a single parse.
struct Scan<'c, 'a> {
    config: &'c ValidatedConfig<'a>,
    node: NodeId,
    groups: Vec<u64>,
    flags: BTreeSet<u64>,
    /// Raw payloads keyed by option index.
    options: BTreeMap<usize, Vec<String>>,
    positionals: Vec<String>,
    deferred: Option<ParseError>,
    unknown_group: Option<ParseError>,
    /// `Some(reduced)` once help was requested.
    help: Option<bool>,
    version: bool,
    locked: bool,
    selecting: bool,
    special_allowed: bool,
}

impl<'c, 'a> Scan<'c, 'a> {
    fn new(config: &'c ValidatedConfig<'a>) -> Self {
        Self {
            config,
            node: NodeId::ROOT,
            groups: Vec::new(),
            flags: BTreeSet::new(),
            options: BTreeMap::new(),
            positionals: Vec::new(),
            deferred: None,
            unknown_group: None,
            help: None,
            version: false,
            locked: false,
            selecting: true,
            special_allowed: true,
        }
    }

    fn defer(&mut self, error: ParseError) {
        if self.deferred.is_none() {
            trace!(%error, "Deferred error");
            self.deferred = Some(error);
        }
    }

    fn request_help(&mut self, via_abbreviation: bool) {
        let reducible = self.config.help.is_some_and(|entry| entry.reducible);
        let reduced = via_abbreviation && reducible;
        // A full-name request keeps the full page.
        self.help = Some(self.help.map_or(reduced, |current| current && reduced));
    }

    fn token<'t>(&mut self, token: &'t str, rest: &mut impl Iterator<Item = &'t str>) {
        trace!(token, node = self.node.index(), "Scanning token");
        let config = self.config;
        let incomplete = config.node(self.node).is_incomplete();

        if config.is_menu() && (self.special_allowed || incomplete) && self.menu_special(token) {
            return;
        }
        self.special_allowed = false;

        if !self.locked && token.len() > 1 && token.starts_with('-') {
            if token == "--" {
                self.locked = true;
                return;
            }
            let (name, payload) = match token[1..].find('=') {
                Some(at) => (&token[..at + 1], Some(&token[at + 2..])),
                None => (token, None),
            };
            let full = token.len() > 2 && token.as_bytes()[1] == b'-';
            let hyphens = if full { 2 } else { 1 };
            self.optional(&name[hyphens.min(name.len())..], payload, full, rest);
            return;
        }

        if self.selecting && incomplete {
            let node = config.node(self.node);
            let mut chars = token.chars();
            let child = node.child(token).or_else(|| match (chars.next(), chars.next()) {
                (Some(c), None) => node.child_by_abbreviation(c),
                _ => None,
            });
            if let Some(child) = child {
                let group = config.node(child);
                debug!(group = group.name(), depth = group.depth, "Selected group");
                if let Some(spec) = group.group {
                    self.groups.push(spec.id);
                }
                self.node = child;
                self.special_allowed = true;
                return;
            }

            self.unknown_group = Some(ParseError::UnknownGroup {
                label: node.label.clone(),
                token: token.to_string(),
            });
            self.selecting = false;
        }
        self.positionals.push(token.to_string());
    }

    /// Help or version typed as a bare word or single character.
    fn menu_special(&mut self, token: &str) -> bool {
        let mut chars = token.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
        let matches = |name: &str, abbreviation: Option<char>| match single {
            Some(c) => abbreviation == Some(c),
            None => token == name,
        };

        if let Some(entry) = self.config.help {
            if matches(&entry.name, entry.abbreviation) {
                self.request_help(single.is_some());
                return true;
            }
        }
        if let Some(entry) = self.config.version {
            if matches(&entry.name, entry.abbreviation) {
                self.version = true;
                return true;
            }
        }
        false
    }

    fn optional<'t>(
        &mut self,
        name: &str,
        payload: Option<&'t str>,
        full: bool,
        rest: &mut impl Iterator<Item = &'t str>,
    ) {
        let config = self.config;
        let program_mode = !config.is_menu();
        let mut payload_used = false;

        if full {
            if program_mode && config.help.is_some_and(|entry| entry.name == name) {
                self.request_help(false);
            } else if program_mode && config.version.is_some_and(|entry| entry.name == name) {
                self.version = true;
            } else {
                match config.option_names.get(name) {
                    Some(&index) => self.take(index, payload, &mut payload_used, rest),
                    None => self.defer(ParseError::UnknownOption(name.to_string())),
                }
            }
        } else {
            for c in name.chars() {
                if program_mode && config.help.is_some_and(|entry| entry.abbreviation == Some(c)) {
                    self.request_help(true);
                } else if program_mode
                    && config.version.is_some_and(|entry| entry.abbreviation == Some(c))
                {
                    self.version = true;
                } else {
                    match config.option_abbreviations.get(&c) {
                        Some(&index) => self.take(index, payload, &mut payload_used, rest),
                        None => self.defer(ParseError::UnknownAbbreviation(c)),
                    }
                }
            }
        }

        if let Some(payload) = payload.filter(|_| !payload_used) {
            self.defer(ParseError::UnusedPayload(payload.to_string()));
        }
    }

    fn take<'t>(
        &mut self,
        index: usize,
        payload: Option<&'t str>,
        payload_used: &mut bool,
        rest: &mut impl Iterator<Item = &'t str>,
    ) {
        let spec = self.config.options[index].spec;
        let Some(declared) = &spec.payload else {
            self.flags.insert(spec.id);
            return;
        };

        let value = if *payload_used {
            None
        } else {
            payload.or_else(|| rest.next())
        };
        let Some(value) = value else {
            self.defer(ParseError::MissingPayload {
                payload: declared.name.clone(),
                option: spec.name.clone(),
            });
            return;
        };
        *payload_used = true;
        self.options.entry(index).or_default().push(value.to_string());
    }
}

/// First endpoint whose maximum admits `count`, else the last one.
fn select_endpoint<'e, 'a>(
    endpoints: &'e [ValidEndpoint<'a>],
    count: usize,
) -> Option<&'e ValidEndpoint<'a>> {
    endpoints
        .iter()
        .find(|endpoint| endpoint.maximum.is_none_or(|max| count <= max))
        .or_else(|| endpoints.last())
}

fn verify_positionals(
    endpoint: &ValidEndpoint<'_>,
    raw: &[String],
    context: &str,
) -> Result<Vec<Value>, ParseError> {
    let declared = endpoint.positionals;
    let mut values = Vec::with_capacity(raw.len().max(declared.len()));

    for (i, token) in raw.iter().enumerate() {
        if declared.is_empty() || endpoint.maximum.is_some_and(|max| i >= max) {
            return Err(ParseError::UnrecognizedArgument {
                token: token.clone(),
                context: context.to_string(),
            });
        }
        let index = i.min(declared.len() - 1);
        let value = match &endpoint.defaults[index] {
            Some(default) if token.is_empty() => default.clone(),
            _ => convert(token, &declared[index].ty, &declared[index].name)?,
        };
        values.push(value);
    }

    for default in endpoint.defaults.iter().skip(values.len()) {
        let Some(default) = default else { break };
        values.push(default.clone());
    }

    if values.len() < endpoint.minimum_actual {
        let index = values.len().min(declared.len().saturating_sub(1));
        return Err(ParseError::ArgumentMissing {
            name: declared
                .get(index)
                .map(|positional| positional.name.clone())
                .unwrap_or_default(),
            context: context.to_string(),
        });
    }
    Ok(values)
}

/// Converts a raw token to the declared type.
pub(crate) fn convert(raw: &str, ty: &Type, name: &str) -> Result<Value, ParseError> {
    let invalid = |expected| ParseError::InvalidValue {
        expected,
        name: name.to_string(),
    };

    match ty {
        Type::Enum(_) => ty
            .find_entry(raw)
            .map(|entry| Value::Enum(entry.id))
            .ok_or_else(|| invalid("enum")),
        Type::Primitive(Primitive::Any) => Ok(Value::Str(raw.to_string())),
        Type::Primitive(Primitive::UNum) => parse_unsigned(raw)
            .map(Value::UNum)
            .ok_or_else(|| invalid("unsigned integer")),
        Type::Primitive(Primitive::INum) => parse_signed(raw)
            .map(Value::from)
            .ok_or_else(|| invalid("signed integer")),
        Type::Primitive(Primitive::Real) => raw
            .parse::<f64>()
            .ok()
            .filter(|real| real.is_finite())
            .map(Value::Real)
            .ok_or_else(|| invalid("real")),
        Type::Primitive(Primitive::Boolean) => {
            if raw.eq_ignore_ascii_case("true") || raw == "1" {
                Ok(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
                Ok(Value::Bool(false))
            } else {
                Err(invalid("boolean"))
            }
        }
    }
}

fn split_radix(raw: &str) -> (&str, u32) {
    let bytes = raw.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        let radix = match bytes[1].to_ascii_lowercase() {
            b'x' => 16,
            b'o' => 8,
            b'b' => 2,
            _ => return (raw, 10),
        };
        return (&raw[2..], radix);
    }
    (raw, 10)
}

fn parse_unsigned(raw: &str) -> Option<u64> {
    let (digits, radix) = split_radix(raw);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

fn parse_signed(raw: &str) -> Option<i64> {
    let (negative, magnitude) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let magnitude = i128::from(parse_unsigned(magnitude)?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        validate, Constraint, EndpointSpec, EnumEntry, GroupSpec, OptionSpec, PositionalSpec,
        Spec, SpecialEntry,
    };

    fn parsed(config: &ValidatedConfig<'_>, tokens: &[&str]) -> Parsed {
        parse(config, tokens).unwrap().into_parsed().unwrap()
    }

    #[test]
    fn test_convert_integers() {
        let unum = Type::from(Primitive::UNum);
        assert_eq!(convert("42", &unum, "n").unwrap(), Value::UNum(42));
        assert_eq!(convert("0x1f", &unum, "n").unwrap(), Value::UNum(31));
        assert_eq!(convert("0b101", &unum, "n").unwrap(), Value::UNum(5));
        assert_eq!(convert("0o17", &unum, "n").unwrap(), Value::UNum(15));
        assert!(convert("-1", &unum, "n").is_err());
        assert!(convert("12abc", &unum, "n").is_err());

        let inum = Type::from(Primitive::INum);
        assert_eq!(convert("-0x10", &inum, "n").unwrap(), Value::INum(-16));
        assert_eq!(convert("-9223372036854775808", &inum, "n").unwrap(), Value::INum(i64::MIN));
        assert!(convert("9223372036854775808", &inum, "n").is_err());
    }

    #[test]
    fn test_convert_reals() {
        let real = Type::from(Primitive::Real);
        assert_eq!(convert("2.5", &real, "r").unwrap(), Value::Real(2.5));
        assert_eq!(convert("-1e3", &real, "r").unwrap(), Value::Real(-1000.0));
        for raw in ["nan", "NaN", "inf", "-infinity", "1e400"] {
            assert_eq!(
                convert(raw, &real, "r").unwrap_err().to_string(),
                "Invalid real for argument [r] encountered."
            );
        }
    }

    #[test]
    fn test_convert_booleans_and_enums() {
        let boolean = Type::from(Primitive::Boolean);
        assert_eq!(convert("TRUE", &boolean, "b").unwrap(), Value::Bool(true));
        assert_eq!(convert("0", &boolean, "b").unwrap(), Value::Bool(false));
        assert_eq!(
            convert("yes", &boolean, "b").unwrap_err().to_string(),
            "Invalid boolean for argument [b] encountered."
        );

        let mode = Type::Enum(vec![EnumEntry::new(4, "fast"), EnumEntry::new(9, "slow")]);
        assert_eq!(convert("slow", &mode, "mode").unwrap(), Value::Enum(9));
        assert!(convert("Slow", &mode, "mode").is_err());
    }

    #[test]
    fn test_option_token_forms() {
        let spec = Spec::program("tool", "1.0")
            .with_option(OptionSpec::flag("all", 1).with_abbreviation('a'))
            .with_option(OptionSpec::flag("long", 2).with_abbreviation('l'))
            .with_option(
                OptionSpec::with_payload("level", 3, "n", Primitive::UNum)
                    .with_abbreviation('n')
                    .require_range(0, 0),
            );
        let config = validate(&spec).unwrap();

        let result = parsed(&config, &["-al", "--level=2", "-n", "3", "-ln=4"]);
        assert!(result.flag(1));
        assert!(result.flag(2));
        assert_eq!(
            result.options(3),
            &[Value::UNum(2), Value::UNum(3), Value::UNum(4)]
        );
    }

    #[test]
    fn test_scan_errors_are_deferred() {
        let spec = Spec::program("tool", "1.0")
            .with_option(OptionSpec::flag("all", 1).with_abbreviation('a'));
        let config = validate(&spec).unwrap();

        assert_eq!(
            parse(&config, &["--nope", "-x"]).unwrap_err(),
            ParseError::UnknownOption("nope".into())
        );
        assert_eq!(
            parse(&config, &["-ax"]).unwrap_err(),
            ParseError::UnknownAbbreviation('x')
        );
        assert_eq!(
            parse(&config, &["--all=yes"]).unwrap_err(),
            ParseError::UnusedPayload("yes".into())
        );
    }

    #[test]
    fn test_positional_lock_and_single_hyphen() {
        let spec = Spec::program("tool", "1.0")
            .with_option(OptionSpec::flag("all", 1))
            .with_positional(PositionalSpec::new("files", Primitive::Any))
            .with_requirement(0, Some(0));
        let config = validate(&spec).unwrap();

        let result = parsed(&config, &["-", "--", "--all"]);
        assert!(!result.flag(1));
        assert_eq!(
            result.positionals(),
            &[Value::from("-"), Value::from("--all")]
        );
    }

    #[test]
    fn test_positional_defaults() {
        let spec = Spec::program("tool", "1.0")
            .with_positional(PositionalSpec::new("input", Primitive::Any))
            .with_positional(PositionalSpec::new("count", Primitive::UNum).with_default(8u64));
        let config = validate(&spec).unwrap();

        assert_eq!(
            parsed(&config, &["in"]).positionals(),
            &[Value::from("in"), Value::UNum(8)]
        );
        assert_eq!(
            parsed(&config, &["in", ""]).positionals(),
            &[Value::from("in"), Value::UNum(8)]
        );
        assert_eq!(
            parse(&config, &[] as &[&str]).unwrap_err(),
            ParseError::ArgumentMissing {
                name: "input".into(),
                context: String::new(),
            }
        );
        assert_eq!(
            parse(&config, &["a", "1", "b"]).unwrap_err(),
            ParseError::UnrecognizedArgument {
                token: "b".into(),
                context: String::new(),
            }
        );
    }

    #[test]
    fn test_group_errors_carry_labels() {
        let spec = Spec::program("tool", "1.0")
            .with_label("command")
            .with_group(GroupSpec::new("init", 1))
            .with_group(
                GroupSpec::new("copy", 2)
                    .with_abbreviation('c')
                    .with_positional(PositionalSpec::new("src", Primitive::Any)),
            );
        let config = validate(&spec).unwrap();

        assert_eq!(
            parse(&config, &["nope"]).unwrap_err(),
            ParseError::UnknownGroup {
                label: "command".into(),
                token: "nope".into(),
            }
        );
        assert_eq!(
            parse(&config, &[] as &[&str]).unwrap_err(),
            ParseError::GroupMissing("Command".into())
        );
        assert_eq!(
            parse(&config, &["init", "x"]).unwrap_err().to_string(),
            "Unrecognized argument [x] encountered for command [init]."
        );
        assert_eq!(
            parse(&config, &["c"]).unwrap_err().to_string(),
            "Argument [src] is missing for command [copy]."
        );
        assert_eq!(parsed(&config, &["c", "a"]).group_path(), &[2]);
    }

    #[test]
    fn test_menu_special_entries() {
        let spec = Spec::menu()
            .with_version("3.1")
            .with_help(SpecialEntry::new("help").with_abbreviation('?').reducible())
            .with_version_entry(SpecialEntry::new("version"))
            .with_group(
                GroupSpec::new("open", 1)
                    .with_positional(PositionalSpec::new("paths", Primitive::Any))
                    .with_requirement(1, Some(0)),
            );
        let config = validate(&spec).unwrap();

        let print = parse(&config, &["open", "?"]).unwrap().into_print().unwrap();
        assert_eq!(print.kind, PrintKind::Help);

        let print = parse(&config, &["version"]).unwrap().into_print().unwrap();
        assert_eq!(print.kind, PrintKind::Version);
        assert_eq!(print.text, "Version [3.1]");

        // Once positionals started the words are ordinary values.
        let result = parsed(&config, &["open", "notes", "help"]);
        assert_eq!(result.positional(1), Some(&Value::from("help")));
    }

    #[test]
    fn test_constraints_run_in_order() {
        let spec = Spec::program("tool", "1.0")
            .with_constraint(Constraint::new(|parsed| {
                if parsed.flag(1) && parsed.flag(2) {
                    Err("Options [a] and [b] are exclusive.".into())
                } else {
                    Ok(())
                }
            }))
            .with_option(OptionSpec::flag("aa", 1).with_abbreviation('a'))
            .with_option(
                OptionSpec::flag("bb", 2)
                    .with_abbreviation('b')
                    .with_constraint(Constraint::new(|_| Err("b is deprecated.".into()))),
            );
        let config = validate(&spec).unwrap();

        assert_eq!(
            parse(&config, &["-ab"]).unwrap_err(),
            ParseError::Constraint("Options [a] and [b] are exclusive.".into())
        );
        assert_eq!(
            parse(&config, &["-b"]).unwrap_err(),
            ParseError::Constraint("b is deprecated.".into())
        );
        assert!(parse(&config, &["-a"]).is_ok());
    }

    #[test]
    fn test_endpoint_selection_falls_back_to_last() {
        let spec = Spec::program("tool", "1.0").with_group(
            GroupSpec::new("pick", 1)
                .with_endpoint(EndpointSpec::new(5))
                .with_endpoint(
                    EndpointSpec::new(6)
                        .with_positional(PositionalSpec::new("a", Primitive::Any))
                        .with_positional(PositionalSpec::new("b", Primitive::Any)),
                ),
        );
        let config = validate(&spec).unwrap();

        assert_eq!(parsed(&config, &["pick"]).endpoint(), Some(5));
        assert_eq!(
            parse(&config, &["pick", "1", "2", "3"]).unwrap_err().to_string(),
            "Unrecognized argument [3] encountered for mode [pick]."
        );
    }

    #[test]
    fn test_parse_args_strips_program_path() {
        let spec = Spec::program("tool", "1.0")
            .with_version_entry(SpecialEntry::new("version").with_abbreviation('V'));
        let config = validate(&spec).unwrap();

        let print = parse_args(&config, &["/usr/local/bin/tool-dev", "-V"])
            .unwrap()
            .into_print()
            .unwrap();
        assert_eq!(print.text, "tool-dev Version [1.0]");
    }
}
