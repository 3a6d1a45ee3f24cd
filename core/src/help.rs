//! Help and version text rendering.
//!
//! [`TextFormatter`] lays out a plain-text help page: a usage line, the
//! program and group descriptions, the selectable groups or positional
//! arguments, required and optional arguments, and information blocks.
//! Descriptions wrap at the configured width and continue in a fixed
//! description column.

use crate::tree::{NodeId, ValidEndpoint, ValidOption, ValidatedConfig};
use crate::{Type, Value};

/// Default line width of rendered help.
pub const DEFAULT_LINE_WIDTH: usize = 100;

/// Column at which descriptions start.
pub const DESCRIPTION_COLUMN: usize = 32;

/// Renders help and version text for a validated specification.
pub trait Formatter {
    /// Help page for `node`, `reduced` preferring short descriptions.
    fn render_help(
        &self,
        config: &ValidatedConfig<'_>,
        program: &str,
        node: NodeId,
        reduced: bool,
        width: usize,
    ) -> String;

    fn render_version(&self, config: &ValidatedConfig<'_>, program: &str) -> String;
}

/// Default plain-text formatter.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
///
/// let spec = Spec::program("tool", "1.0")
///     .with_description("Copies things.")
///     .with_option(OptionSpec::flag("force", 1).with_abbreviation('f').with_description("Overwrite."));
/// let config = validate(&spec).unwrap();
///
/// let help = TextFormatter.render_help(&config, "tool", NodeId::ROOT, false, 80);
/// assert!(help.starts_with("Usage: tool [options...]"));
/// assert!(help.contains("  -f, --force"));
/// assert_eq!(TextFormatter.render_version(&config, "tool"), "tool Version [1.0]");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn render_help(
        &self,
        config: &ValidatedConfig<'_>,
        program: &str,
        node: NodeId,
        reduced: bool,
        width: usize,
    ) -> String {
        let mut page = HelpPage {
            config,
            node,
            reduced,
            out: Writer::new(width),
        };
        page.usage(program);
        page.descriptions();
        page.groups_or_positionals();
        page.options(true);
        page.options(false);
        page.information();
        page.out.buffer
    }

    fn render_version(&self, config: &ValidatedConfig<'_>, program: &str) -> String {
        if program.is_empty() {
            format!("Version [{}]", config.spec.version)
        } else {
            format!("{program} Version [{}]", config.spec.version)
        }
    }
}

/// Hint printed after a parse error, empty without a help entry.
pub fn help_hint(program: &str, config: &ValidatedConfig<'_>) -> String {
    match config.help {
        None => String::new(),
        Some(entry) if config.is_menu() => format!("Try '{}' for more information.", entry.name),
        Some(entry) => format!("Try '{program} --{}' for more information.", entry.name),
    }
}

/// Program name from an invocation path, `fallback` if the path has none.
///
/// ```
/// use argspec_core::program_name;
///
/// assert_eq!(program_name("/usr/bin/tool", "x"), "tool");
/// assert_eq!(program_name(r"C:\bin\tool.exe", "x"), "tool.exe");
/// assert_eq!(program_name("bin/", "x"), "x");
/// ```
pub fn program_name(path: &str, fallback: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or_default();
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Word-wrapping text buffer.
///
/// Indentation is held back in `pending` until content follows it, so no
/// line ends in whitespace.
struct Writer {
    buffer: String,
    position: usize,
    pending: usize,
    width: usize,
}

impl Writer {
    fn new(width: usize) -> Self {
        Self {
            buffer: String::new(),
            position: 0,
            pending: 0,
            width,
        }
    }

    fn new_line(&mut self, empty_line: bool) {
        self.pending = 0;
        if self.buffer.is_empty() {
            return;
        }
        if !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        if empty_line {
            self.buffer.push('\n');
        }
        self.position = 0;
    }

    fn break_line(&mut self, indent: usize) {
        self.buffer.push('\n');
        self.position = indent;
        self.pending = indent;
    }

    fn push(&mut self, text: &str) {
        self.buffer.extend(std::iter::repeat_n(' ', self.pending));
        self.pending = 0;
        self.buffer.push_str(text);
        self.position += text.chars().count();
    }

    /// Appends an unbreakable token, wrapping before it if needed.
    fn token(&mut self, token: &str) {
        if self.position > 0 && self.position + token.chars().count() > self.width {
            self.break_line(0);
        }
        self.push(token);
    }

    fn spaced_token(&mut self, token: &str) {
        if self.position > 0 {
            if self.position + 1 + token.chars().count() > self.width {
                self.break_line(0);
            } else {
                self.pending += 1;
                self.position += 1;
            }
        }
        self.token(token);
    }

    /// Appends wrapped text starting at column `offset`; wrapped lines are
    /// indented by an extra `hanging` columns. Blank text writes nothing.
    fn text(&mut self, text: &str, offset: usize, hanging: usize) {
        if text.trim().is_empty() {
            return;
        }

        let mut indent = 0;
        if offset > 0 {
            if self.position >= offset {
                self.break_line(0);
            }
            self.pending += offset - self.position;
            self.position = offset;
            indent = offset + hanging;
        }

        let mut white = String::new();
        let mut word = String::new();
        for c in text.chars().map(Some).chain(std::iter::once(None)) {
            if let Some(c) = c.filter(|c| !c.is_whitespace()) {
                word.push(c);
                continue;
            }

            if !word.is_empty() {
                let needed = self.position + white.chars().count() + word.chars().count();
                if (self.position > indent || !white.is_empty()) && needed > self.width {
                    self.break_line(indent);
                } else {
                    self.pending += white.chars().count();
                    self.position += white.chars().count();
                }
                self.push(&word);
                white.clear();
                word.clear();
            }

            match c {
                None => break,
                Some('\n') => {
                    white.clear();
                    self.break_line(indent);
                }
                Some(c) => white.push(c),
            }
        }
    }
}

struct HelpPage<'r, 'a> {
    config: &'r ValidatedConfig<'a>,
    node: NodeId,
    reduced: bool,
    out: Writer,
}

impl HelpPage<'_, '_> {
    fn usage(&mut self, program: &str) {
        let config = self.config;
        let node = config.node(self.node);

        let mut prefix = Vec::new();
        for id in config.lineage(self.node) {
            if let Some(name) = config.node(id).name() {
                prefix.push(name.to_string());
            }
        }
        if node.is_incomplete() {
            prefix.push(format!("[{}]", node.label));
        }

        let mut optional = false;
        for option in visible_options(config, self.node) {
            if option.minimum_actual == 0 {
                optional = true;
            } else if let Some(payload) = &option.spec.payload {
                prefix.push(format!("--{}=<{}>", option.spec.name, payload.name));
            }
        }
        if optional {
            prefix.push("[options...]".to_string());
        }

        let mut lines: Vec<Vec<String>> = Vec::new();
        if node.is_incomplete() {
            if node.nested_positionals {
                lines.push(vec!["[params...]".to_string()]);
            }
        } else {
            lines.extend(node.endpoints.iter().map(usage_positionals));
        }
        if lines.is_empty() {
            lines.push(Vec::new());
        }

        for positionals in lines {
            self.out.new_line(false);
            if config.is_menu() {
                self.out.token("Input>");
            } else {
                self.out.token("Usage:");
                self.out.spaced_token(program);
            }
            for token in prefix.iter().chain(&positionals) {
                self.out.spaced_token(token);
            }
        }
    }

    fn descriptions(&mut self) {
        let config = self.config;
        let program = config.spec.description.get(self.reduced);
        if !program.is_empty() {
            self.out.new_line(true);
            self.out.text(program, 4, 0);
        }

        for id in config.lineage(self.node) {
            let node = config.node(id);
            let (Some(group), Some(parent)) = (node.group, node.parent) else {
                continue;
            };
            let description = group.description.get(self.reduced);
            if description.is_empty() {
                continue;
            }
            self.out.new_line(true);
            let label = capitalize(&config.node(parent).label);
            self.out.text(&format!("{label}: {}", group.name), 0, 0);
            self.out.text(description, 4, 0);
        }
    }

    fn groups_or_positionals(&mut self) {
        let config = self.config;
        let node = config.node(self.node);

        if node.is_incomplete() {
            self.out.new_line(true);
            self.out
                .text(&format!("Options for [{}]:", node.label), 0, 0);
            for &child in node.by_name.values() {
                let Some(group) = config.node(child).group.filter(|group| !group.hidden) else {
                    continue;
                };
                self.out.new_line(false);
                let left = match group.abbreviation {
                    Some(c) => format!("  {}, {c}", group.name),
                    None => format!("  {}", group.name),
                };
                self.out.text(&left, 0, 0);
                self.out
                    .text(group.description.get(self.reduced), DESCRIPTION_COLUMN, 1);
            }
            return;
        }

        let header = match (node.parent, node.name()) {
            (Some(parent), Some(name)) => format!(
                "Positional Arguments for {} [{name}]:",
                config.node(parent).label
            ),
            _ => "Positional Arguments:".to_string(),
        };
        for endpoint in node.endpoints.iter().filter(|e| !e.positionals.is_empty()) {
            self.out.new_line(true);
            self.out.text(&header, 0, 0);
            if let Some(description) = endpoint.description.filter(|d| !d.is_empty()) {
                self.out.text(description.get(self.reduced), 4, 0);
            }
            self.endpoint(endpoint);
        }
    }

    fn endpoint(&mut self, endpoint: &ValidEndpoint<'_>) {
        let count = endpoint.positionals.len();
        for (i, positional) in endpoint.positionals.iter().enumerate() {
            self.out.new_line(false);
            self.out.text(
                &format!("  {}{}", positional.name, type_tag(&positional.ty)),
                0,
                0,
            );

            let mut description = positional.description.get(self.reduced).to_string();
            let repeats = endpoint.maximum.is_none_or(|max| i + 1 < max);
            if i + 1 == count && repeats {
                let maximum = endpoint.maximum.map_or(0, |max| max - i);
                description.push_str(&limits(endpoint.minimum_actual.saturating_sub(i), maximum));
            }
            self.out.text(&description, DESCRIPTION_COLUMN, 1);

            self.enum_entries(&positional.ty);
            if let Some(default) = &endpoint.defaults[i] {
                self.defaults(std::slice::from_ref(default), &positional.ty);
            }
        }
    }

    fn options(&mut self, required: bool) {
        let config = self.config;
        let node = config.node(self.node);
        let options: Vec<_> = visible_options(config, self.node)
            .filter(|option| (option.minimum_actual > 0) == required)
            .collect();
        if options.is_empty() {
            return;
        }

        self.out.new_line(true);
        self.out.text(
            if required {
                "Required arguments:"
            } else {
                "Optional arguments:"
            },
            0,
            0,
        );

        for option in options {
            let spec = option.spec;
            self.out.new_line(false);

            let mut left = String::from("  ");
            if let Some(c) = spec.abbreviation {
                left.push_str(&format!("-{c}, "));
            }
            left.push_str(&format!("--{}", spec.name));
            if let Some(payload) = &spec.payload {
                left.push_str(&format!("=<{}>{}", payload.name, type_tag(&payload.ty)));
            }
            self.out.text(&left, 0, 0);

            let mut description = spec.description.get(self.reduced).to_string();
            // Options reserved for some of the groups still to be selected.
            let below = !option
                .users
                .iter()
                .any(|&user| config.check_parent(user, self.node));
            if below && node.is_incomplete() {
                let users: Vec<&str> = node
                    .by_name
                    .iter()
                    .filter(|(_, child)| option.users.iter().any(|&u| config.check_parent(**child, u)))
                    .map(|(name, _)| *name)
                    .collect();
                description.push_str(&format!(" (Used for: {})", users.join("|")));
            }
            if option.minimum_actual != 1 || option.maximum != Some(1) {
                let maximum = option.maximum.filter(|&max| max > 1).unwrap_or(0);
                description.push_str(&limits(option.minimum_actual, maximum));
            }
            self.out.text(&description, DESCRIPTION_COLUMN, 1);

            if let Some(payload) = &spec.payload {
                self.enum_entries(&payload.ty);
                if !option.defaults.is_empty() {
                    self.defaults(&option.defaults, &payload.ty);
                }
            }
        }
    }

    fn information(&mut self) {
        let config = self.config;
        for &index in &config.node(self.node).information {
            let information = config.information[index].spec;
            self.out.new_line(true);
            self.out.text(&information.name, 0, 0);
            self.out
                .text(information.text.get(self.reduced), DESCRIPTION_COLUMN, 0);
        }
    }

    fn enum_entries(&mut self, ty: &Type) {
        let Type::Enum(entries) = ty else {
            return;
        };
        for entry in entries {
            self.out.new_line(false);
            self.out.text(
                &format!("- [{}]: {}", entry.name, entry.description.get(self.reduced)),
                DESCRIPTION_COLUMN,
                0,
            );
        }
    }

    fn defaults(&mut self, values: &[Value], ty: &Type) {
        let rendered: Vec<String> = values
            .iter()
            .map(|value| match (value, ty) {
                (Value::Enum(id), Type::Enum(entries)) => entries
                    .iter()
                    .find(|entry| entry.id == *id)
                    .map_or_else(|| value.to_string(), |entry| entry.name.clone()),
                _ => value.to_string(),
            })
            .map(|value| format!("[{value}]"))
            .collect();
        self.out.new_line(false);
        self.out.text(
            &format!("Defaults to: ({})", rendered.join(", ")),
            DESCRIPTION_COLUMN,
            0,
        );
    }
}

/// Usable, non-hidden options in name order.
fn visible_options<'r, 'a>(
    config: &'r ValidatedConfig<'a>,
    node: NodeId,
) -> impl Iterator<Item = &'r ValidOption<'a>> {
    config
        .option_names
        .values()
        .map(|&index| &config.options[index])
        .filter(move |option| !option.hidden && config.is_usable(option, node))
}

fn usage_positionals(endpoint: &ValidEndpoint<'_>) -> Vec<String> {
    let count = endpoint.positionals.len();
    endpoint
        .positionals
        .iter()
        .enumerate()
        .map(|(i, positional)| {
            let mut token = positional.name.clone();
            if i + 1 == count && endpoint.maximum.is_none_or(|max| i + 1 < max) {
                token.push_str("...");
            }
            if i >= endpoint.minimum_actual {
                token = format!("[{token}]");
            }
            token
        })
        .collect()
}

fn type_tag(ty: &Type) -> String {
    match ty.tag() {
        "any" => String::new(),
        tag => format!(" [{tag}]"),
    }
}

/// ` [2x]`, ` [1 <= _ <= 3]`, ` [>= 1]`, ` [<= 3]` or empty; 0 means none.
fn limits(minimum: usize, maximum: usize) -> String {
    match (minimum, maximum) {
        (0, 0) => String::new(),
        (min, max) if min > 0 && max > 0 && min == max => format!(" [{min}x]"),
        (min, max) if min > 0 && max > 0 => format!(" [{min} <= _ <= {max}]"),
        (min, 0) => format!(" [>= {min}]"),
        (_, max) => format!(" [<= {max}]"),
    }
}
