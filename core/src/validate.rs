//! Specification validation ("burn" pass).
//!
//! Walks a [`Spec`] once and produces the [`ValidatedConfig`] arena:
//! naming and uniqueness rules, lookup maps, endpoint limits and their
//! disambiguation, option limits and defaults, and finally the reference
//! graph (see [`links`](crate::links)). The first violation aborts with a
//! [`ConfigError`]; no partial tree is ever returned.
//!
//! # Examples
//!
//! ```
//! use argspec_core::*;
//!
//! let spec = Spec::program("git", "2.0")
//!     .with_group(GroupSpec::new("commit", 1))
//!     .with_group(GroupSpec::new("push", 2));
//! assert!(validate(&spec).is_ok());
//!
//! // Two options sharing an id
//! let bad = Spec::program("git", "2.0")
//!     .with_option(OptionSpec::flag("verbose", 7))
//!     .with_option(OptionSpec::flag("quiet", 7));
//! assert_eq!(validate(&bad).unwrap_err(), ConfigError::DuplicateOptionId(7));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::help::capitalize;
use crate::tree::{NodeId, ValidEndpoint, ValidInformation, ValidNode, ValidOption, ValidatedConfig};
use crate::{
    ArgumentsSpec, Constraint, Description, GroupSpec, InformationSpec, OptionSpec,
    PositionalSpec, Primitive, Spec, SpecialEntry, Type, Value,
};

const DEFAULT_LABEL: &str = "mode";

/// Validates a specification and builds its runtime tree.
///
/// Deterministic and side-effect free: validating the same [`Spec`] twice
/// yields equal trees.
pub fn validate(spec: &Spec) -> Result<ValidatedConfig<'_>, ConfigError> {
    if spec.menu && !spec.program.is_empty() {
        return Err(ConfigError::MenuWithProgramName);
    }
    if !spec.menu && spec.program.is_empty() {
        return Err(ConfigError::MissingProgramName);
    }

    let mut builder = Builder::new(spec);
    builder.validate_special_entries()?;

    for option in &spec.options {
        builder.add_option(option, NodeId::ROOT)?;
    }
    for information in &spec.information {
        builder.add_information(information, NodeId::ROOT, "arguments")?;
    }
    builder.add_arguments(&spec.arguments, NodeId::ROOT, "arguments")?;

    let mut config = builder.finish();
    crate::links::resolve(&mut config)?;

    debug!(
        program = %spec.program,
        menu = spec.menu,
        nodes = config.nodes.len(),
        options = config.options.len(),
        information = config.information.len(),
        "Validated specification"
    );
    Ok(config)
}

struct Builder<'a> {
    spec: &'a Spec,
    nodes: Vec<ValidNode<'a>>,
    options: Vec<ValidOption<'a>>,
    option_names: BTreeMap<&'a str, usize>,
    option_abbreviations: BTreeMap<char, usize>,
    option_ids: HashSet<u64>,
    information: Vec<ValidInformation<'a>>,
}

impl<'a> Builder<'a> {
    fn new(spec: &'a Spec) -> Self {
        let root = new_node(None, &spec.arguments, None, 0);
        Self {
            spec,
            nodes: vec![root],
            options: Vec::new(),
            option_names: BTreeMap::new(),
            option_abbreviations: BTreeMap::new(),
            option_ids: HashSet::new(),
            information: Vec::new(),
        }
    }

    fn finish(self) -> ValidatedConfig<'a> {
        ValidatedConfig {
            spec: self.spec,
            nodes: self.nodes,
            options: self.options,
            option_names: self.option_names,
            option_abbreviations: self.option_abbreviations,
            information: self.information,
            help: self.spec.help.as_ref(),
            version: self.spec.version_entry.as_ref(),
        }
    }

    fn validate_special_entries(&self) -> Result<(), ConfigError> {
        if let Some(help) = &self.spec.help {
            validate_name("Help entry", &help.name)?;
            validate_abbreviation("Help entry", help.abbreviation)?;
        }
        if let Some(version) = &self.spec.version_entry {
            validate_name("Version entry", &version.name)?;
            validate_abbreviation("Version entry", version.abbreviation)?;
            if self.spec.version.is_empty() {
                return Err(ConfigError::MissingVersion);
            }
        }

        if let (Some(help), Some(version)) = (&self.spec.help, &self.spec.version_entry) {
            if help.name == version.name {
                return Err(ConfigError::SpecialEntriesClash(help.name.clone()));
            }
            if let (Some(a), Some(b)) = (help.abbreviation, version.abbreviation) {
                if a == b {
                    return Err(ConfigError::SpecialEntriesClash(a.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Rejects names/abbreviations shadowing the help or version entry.
    fn check_special_clash(
        &self,
        kind: &'static str,
        name: &str,
        abbreviation: Option<char>,
    ) -> Result<(), ConfigError> {
        let entries: [(Option<&SpecialEntry>, &'static str); 2] = [
            (self.spec.help.as_ref(), "help"),
            (self.spec.version_entry.as_ref(), "version"),
        ];
        for (entry, label) in entries {
            let Some(entry) = entry else { continue };
            let abbreviation_clash = abbreviation.is_some() && abbreviation == entry.abbreviation;
            if entry.name == name || abbreviation_clash {
                return Err(ConfigError::ClashesWithSpecialEntry {
                    kind,
                    name: name.to_string(),
                    entry: label,
                });
            }
        }
        Ok(())
    }

    fn add_option(&mut self, option: &'a OptionSpec, owner: NodeId) -> Result<(), ConfigError> {
        validate_name("Option", &option.name)?;
        validate_abbreviation("Option", option.abbreviation)?;

        if self.option_names.contains_key(option.name.as_str()) {
            return Err(ConfigError::DuplicateOptionName(option.name.clone()));
        }
        if let Some(abbreviation) = option.abbreviation {
            if self.option_abbreviations.contains_key(&abbreviation) {
                return Err(ConfigError::DuplicateOptionAbbreviation(abbreviation));
            }
        }
        if !self.option_ids.insert(option.id) {
            return Err(ConfigError::DuplicateOptionId(option.id));
        }
        if !self.spec.menu {
            self.check_special_clash("Option", &option.name, option.abbreviation)?;
        }

        let who = format!("option [{}]", option.name);
        let (minimum_actual, maximum, defaults) = match &option.payload {
            None => {
                if option.minimum.is_some() || option.maximum.is_some() {
                    return Err(ConfigError::FlagWithRequirements(option.name.clone()));
                }
                (0, Some(1), Vec::new())
            }
            Some(payload) => {
                validate_type(&payload.ty, &who)?;

                let minimum = option.minimum.unwrap_or(0);
                let maximum = match option.maximum {
                    Some(0) => None,
                    Some(maximum) if maximum < minimum => {
                        return Err(ConfigError::MaximumBelowMinimum(who));
                    }
                    Some(maximum) => Some(maximum),
                    None => Some(minimum.max(1)),
                };

                if !payload.defaults.is_empty() {
                    let count = payload.defaults.len();
                    if count < minimum || maximum.is_some_and(|max| count > max) {
                        return Err(ConfigError::DefaultCountOutOfRange(option.name.clone()));
                    }
                }
                let defaults = payload
                    .defaults
                    .iter()
                    .map(|value| resolve_default(&payload.ty, value, &who))
                    .collect::<Result<Vec<_>, _>>()?;
                (minimum, maximum, defaults)
            }
        };

        let index = self.options.len();
        self.option_names.insert(option.name.as_str(), index);
        if let Some(abbreviation) = option.abbreviation {
            self.option_abbreviations.insert(abbreviation, index);
        }
        self.options.push(ValidOption {
            spec: option,
            owner,
            users: BTreeSet::new(),
            minimum_actual,
            minimum_effective: if defaults.is_empty() { minimum_actual } else { 0 },
            maximum,
            payload: option.payload.is_some(),
            hidden: option.hidden,
            defaults,
        });
        Ok(())
    }

    fn add_information(
        &mut self,
        information: &'a InformationSpec,
        owner: NodeId,
        who: &str,
    ) -> Result<(), ConfigError> {
        if information.name.is_empty() || information.text.text.is_empty() {
            return Err(ConfigError::EmptyInformation(format!(
                "information [{}] of {who}",
                information.name
            )));
        }
        self.information.push(ValidInformation {
            spec: information,
            owner,
            users: BTreeSet::new(),
        });
        Ok(())
    }

    fn add_group(&mut self, group: &'a GroupSpec, parent: NodeId) -> Result<NodeId, ConfigError> {
        validate_name("Group", &group.name)?;
        validate_abbreviation("Group", group.abbreviation)?;

        let siblings = &self.nodes[parent.0];
        if siblings.by_name.contains_key(group.name.as_str()) {
            return Err(ConfigError::DuplicateGroupName(group.name.clone()));
        }
        if let Some(abbreviation) = group.abbreviation {
            if siblings.by_abbreviation.contains_key(&abbreviation) {
                return Err(ConfigError::DuplicateGroupAbbreviation {
                    name: group.name.clone(),
                    abbreviation,
                });
            }
        }
        if self.spec.menu {
            self.check_special_clash("Group", &group.name, group.abbreviation)?;
        }

        let id = NodeId(self.nodes.len());
        let depth = siblings.depth + 1;
        let mut node = new_node(Some(group), &group.arguments, Some(parent), depth);
        node.links = group.links.clone();
        self.nodes.push(node);

        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(id);
        parent_node.by_name.insert(group.name.as_str(), id);
        if let Some(abbreviation) = group.abbreviation {
            parent_node.by_abbreviation.insert(abbreviation, id);
        }

        let who = format!("group [{}]", group.name);
        for option in &group.options {
            self.add_option(option, id)?;
        }
        for information in &group.information {
            self.add_information(information, id, &who)?;
        }
        self.add_arguments(&group.arguments, id, &who)?;
        Ok(id)
    }

    fn add_arguments(
        &mut self,
        arguments: &'a ArgumentsSpec,
        node: NodeId,
        who: &str,
    ) -> Result<(), ConfigError> {
        let has_positionals = !arguments.endpoints.is_empty()
            || !arguments.positionals.is_empty()
            || arguments.minimum.is_some()
            || arguments.maximum.is_some();

        if !arguments.groups.is_empty() {
            if has_positionals {
                return Err(ConfigError::GroupsAndPositionals(capitalize(who)));
            }

            let mut ids = HashSet::new();
            let mut nested = false;
            for group in &arguments.groups {
                if !ids.insert(group.id) {
                    return Err(ConfigError::DuplicateGroupId(group.id));
                }
                let child = self.add_group(group, node)?;
                nested |= self.nodes[child.0].nested_positionals;
            }
            self.nodes[node.0].nested_positionals = nested;
            return Ok(());
        }

        let mut endpoints = if arguments.endpoints.is_empty() {
            let implicit = build_endpoint(
                None,
                None,
                &arguments.positionals,
                arguments.minimum,
                arguments.maximum,
                &[],
                who,
            )?;
            vec![implicit]
        } else {
            if !arguments.positionals.is_empty()
                || arguments.minimum.is_some()
                || arguments.maximum.is_some()
            {
                return Err(ConfigError::EndpointsAndPositionals(capitalize(who)));
            }

            let mut ids = HashSet::new();
            let mut endpoints = Vec::with_capacity(arguments.endpoints.len());
            for endpoint in &arguments.endpoints {
                if !ids.insert(endpoint.id) {
                    return Err(ConfigError::DuplicateEndpointId {
                        owner: who.to_string(),
                        id: endpoint.id,
                    });
                }
                endpoints.push(build_endpoint(
                    Some(endpoint.id),
                    Some(&endpoint.description),
                    &endpoint.positionals,
                    endpoint.minimum,
                    endpoint.maximum,
                    &endpoint.constraints,
                    &format!("endpoint [{}] of {who}", endpoint.id),
                )?);
            }
            endpoints
        };

        endpoints.sort_by_key(|endpoint| endpoint.minimum_effective);
        for pair in endpoints.windows(2) {
            let separated = pair[0]
                .maximum
                .is_some_and(|max| max < pair[1].minimum_effective);
            if !separated {
                return Err(ConfigError::OverlappingEndpoints(who.to_string()));
            }
        }

        for endpoint in &endpoints {
            trace!(
                owner = who,
                endpoint = ?endpoint.id,
                minimum_actual = endpoint.minimum_actual,
                minimum_effective = endpoint.minimum_effective,
                maximum = ?endpoint.maximum,
                "Endpoint limits"
            );
        }

        let entry = &mut self.nodes[node.0];
        entry.nested_positionals = endpoints.iter().any(|e| !e.positionals.is_empty());
        entry.endpoints = endpoints;
        Ok(())
    }
}

fn new_node<'a>(
    group: Option<&'a GroupSpec>,
    arguments: &'a ArgumentsSpec,
    parent: Option<NodeId>,
    depth: usize,
) -> ValidNode<'a> {
    ValidNode {
        group,
        arguments,
        parent,
        depth,
        label: arguments
            .label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(DEFAULT_LABEL)
            .to_lowercase(),
        children: Vec::new(),
        by_name: BTreeMap::new(),
        by_abbreviation: BTreeMap::new(),
        endpoints: Vec::new(),
        links: BTreeSet::new(),
        options: Vec::new(),
        information: Vec::new(),
        nested_positionals: false,
    }
}

fn build_endpoint<'a>(
    id: Option<u64>,
    description: Option<&'a Description>,
    positionals: &'a [PositionalSpec],
    minimum: Option<usize>,
    maximum: Option<usize>,
    constraints: &'a [Constraint],
    who: &str,
) -> Result<ValidEndpoint<'a>, ConfigError> {
    let count = positionals.len();
    if count == 0 && (minimum.unwrap_or(0) > 0 || maximum.is_some()) {
        return Err(ConfigError::RequirementWithoutPositionals(who.to_string()));
    }

    let mut defaults = Vec::with_capacity(count);
    for (index, positional) in positionals.iter().enumerate() {
        if positional.name.is_empty() {
            return Err(ConfigError::EmptyPositionalName {
                owner: who.to_string(),
                index,
            });
        }
        let positional_who = format!("positional [{}] of {who}", positional.name);
        validate_type(&positional.ty, &positional_who)?;
        let default = positional
            .default
            .as_ref()
            .map(|value| resolve_default(&positional.ty, value, &positional_who))
            .transpose()?;
        defaults.push(default);
    }

    let minimum_actual = minimum.unwrap_or(count);
    let maximum = match maximum {
        Some(0) => None,
        Some(maximum) if maximum < count => {
            return Err(ConfigError::MaximumBelowPositionals(who.to_string()));
        }
        Some(maximum) if maximum < minimum_actual => {
            return Err(ConfigError::MaximumBelowMinimum(who.to_string()));
        }
        Some(maximum) => Some(maximum),
        None => Some(minimum_actual.max(count)),
    };

    // Trailing defaults inside the required range lower the effective minimum.
    let mut minimum_effective = minimum_actual;
    while minimum_effective > 0
        && minimum_effective <= count
        && defaults[minimum_effective - 1].is_some()
    {
        minimum_effective -= 1;
    }
    if let Some(index) = defaults
        .iter()
        .take(minimum_effective)
        .position(Option::is_some)
    {
        return Err(ConfigError::DefaultGap {
            owner: who.to_string(),
            name: positionals[index].name.clone(),
        });
    }

    Ok(ValidEndpoint {
        id,
        description,
        positionals,
        defaults,
        constraints,
        minimum_actual,
        minimum_effective,
        maximum,
    })
}

fn validate_name(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.chars().count() < 2 {
        return Err(ConfigError::NameTooShort {
            kind,
            name: name.to_string(),
        });
    }
    if name.starts_with('-') {
        return Err(ConfigError::NameWithHyphen {
            kind,
            name: name.to_string(),
        });
    }
    if name.chars().any(|c| c == '=' || c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::InvalidNameCharacter {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn validate_abbreviation(kind: &'static str, abbreviation: Option<char>) -> Result<(), ConfigError> {
    match abbreviation {
        Some(c) if c == '-' || c == '=' || c.is_whitespace() || c.is_control() => {
            Err(ConfigError::InvalidAbbreviation {
                kind,
                abbreviation: c,
            })
        }
        _ => Ok(()),
    }
}

fn validate_type(ty: &Type, who: &str) -> Result<(), ConfigError> {
    let Type::Enum(entries) = ty else {
        return Ok(());
    };
    if entries.is_empty() {
        return Err(ConfigError::EmptyEnum(who.to_string()));
    }

    let mut names = HashSet::new();
    let mut ids = HashSet::new();
    for entry in entries {
        if entry.name.is_empty() || !names.insert(entry.name.as_str()) || !ids.insert(entry.id) {
            return Err(ConfigError::InvalidEnumEntries(who.to_string()));
        }
    }
    Ok(())
}

/// Type-checks a declared default, resolving enum names to their ids.
fn resolve_default(ty: &Type, value: &Value, who: &str) -> Result<Value, ConfigError> {
    let invalid = |expected| ConfigError::InvalidDefault {
        who: who.to_string(),
        expected,
    };

    match ty {
        Type::Enum(_) => value
            .str()
            .ok()
            .and_then(|name| ty.find_entry(name))
            .map(|entry| Value::Enum(entry.id))
            .ok_or_else(|| invalid("a valid enum entry name")),
        Type::Primitive(Primitive::Boolean) => value
            .boolean()
            .map(Value::Bool)
            .map_err(|_| invalid("a boolean")),
        Type::Primitive(Primitive::Real) => value
            .real()
            .map(Value::Real)
            .map_err(|_| invalid("a real")),
        Type::Primitive(Primitive::INum) => value
            .inum()
            .map(Value::from)
            .map_err(|_| invalid("a signed integer")),
        Type::Primitive(Primitive::UNum) => value
            .unum()
            .map(Value::UNum)
            .map_err(|_| invalid("an unsigned integer")),
        Type::Primitive(Primitive::Any) => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EndpointSpec, EnumEntry};

    fn program() -> Spec {
        Spec::program("tool", "1.0")
    }

    #[test]
    fn test_validate_rejects_context_mismatch() {
        assert_eq!(
            validate(&Spec::default()).unwrap_err(),
            ConfigError::MissingProgramName
        );

        let mut menu = Spec::menu();
        menu.program = "tool".into();
        assert_eq!(validate(&menu).unwrap_err(), ConfigError::MenuWithProgramName);
    }

    #[test]
    fn test_validate_rejects_short_and_hyphenated_names() {
        let spec = program().with_option(OptionSpec::flag("v", 1));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::NameTooShort { kind: "Option", .. }
        ));

        let spec = program().with_group(GroupSpec::new("-copy", 1));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::NameWithHyphen { kind: "Group", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_unscannable_names() {
        for name in ["a=b", "a b", "tab\there"] {
            let spec = program().with_option(OptionSpec::flag(name, 1));
            assert_eq!(
                validate(&spec).unwrap_err(),
                ConfigError::InvalidNameCharacter {
                    kind: "Option",
                    name: name.to_string(),
                }
            );
        }

        let spec = program().with_group(GroupSpec::new("new file", 1));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::InvalidNameCharacter { kind: "Group", .. }
        ));

        let spec = program().with_help(SpecialEntry::new("help me"));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::InvalidNameCharacter { kind: "Help entry", .. }
        ));
    }

    #[test]
    fn test_option_lookup_by_name_and_abbreviation() {
        let spec = program()
            .with_option(OptionSpec::flag("verbose", 1).with_abbreviation('v'))
            .with_group(
                GroupSpec::new("build", 10)
                    .with_option(OptionSpec::flag("release", 2).with_abbreviation('r')),
            );
        let config = validate(&spec).unwrap();

        let release = config.option_by_abbreviation('r').unwrap();
        assert_eq!(release.spec.id, 2);
        assert_eq!(config.option_by_name("release"), Some(release));
        assert_eq!(config.option_by_abbreviation('v').map(|o| o.spec.id), Some(1));
        assert_eq!(config.option_by_abbreviation('x'), None);
    }

    #[test]
    fn test_validate_special_entries() {
        let spec = program()
            .with_help(SpecialEntry::new("help").with_abbreviation('h'))
            .with_version_entry(SpecialEntry::new("version").with_abbreviation('h'));
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::SpecialEntriesClash("h".into())
        );

        let spec = Spec::program("tool", "").with_version_entry(SpecialEntry::new("version"));
        assert_eq!(validate(&spec).unwrap_err(), ConfigError::MissingVersion);

        let spec = program()
            .with_help(SpecialEntry::new("help"))
            .with_option(OptionSpec::flag("help", 1));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::ClashesWithSpecialEntry { entry: "help", .. }
        ));
    }

    #[test]
    fn test_menu_groups_clash_with_special_entries() {
        let spec = Spec::menu()
            .with_help(SpecialEntry::new("help").with_abbreviation('h'))
            .with_group(GroupSpec::new("hello", 1).with_abbreviation('h'));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::ClashesWithSpecialEntry { kind: "Group", .. }
        ));

        // Options may reuse the names in menu mode.
        let spec = Spec::menu()
            .with_help(SpecialEntry::new("help"))
            .with_option(OptionSpec::flag("help", 1));
        assert!(validate(&spec).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_group_entries() {
        let spec = program()
            .with_group(GroupSpec::new("copy", 1).with_abbreviation('c'))
            .with_group(GroupSpec::new("clone", 2).with_abbreviation('c'));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::DuplicateGroupAbbreviation { abbreviation: 'c', .. }
        ));

        let spec = program()
            .with_group(GroupSpec::new("copy", 1))
            .with_group(GroupSpec::new("move", 1));
        assert_eq!(validate(&spec).unwrap_err(), ConfigError::DuplicateGroupId(1));

        // Same names in different branches are fine.
        let spec = program()
            .with_group(GroupSpec::new("remote", 1).with_group(GroupSpec::new("add", 3)))
            .with_group(GroupSpec::new("branch", 2).with_group(GroupSpec::new("add", 3)));
        assert!(validate(&spec).is_ok());
    }

    #[test]
    fn test_groups_and_positionals_are_exclusive() {
        let spec = program()
            .with_group(GroupSpec::new("copy", 1))
            .with_positional(PositionalSpec::new("file", Primitive::Any));
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::GroupsAndPositionals("Arguments".into())
        );

        let spec = program()
            .with_endpoint(EndpointSpec::new(1))
            .with_positional(PositionalSpec::new("file", Primitive::Any));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::EndpointsAndPositionals(_)
        ));
    }

    #[test]
    fn test_endpoint_limits() {
        let spec = program()
            .with_positional(PositionalSpec::new("input", Primitive::Any))
            .with_positional(PositionalSpec::new("output", Primitive::Any).with_default("out"));
        let config = validate(&spec).unwrap();
        let endpoint = &config.root().endpoints[0];
        assert_eq!(endpoint.id, None);
        assert_eq!(endpoint.minimum_actual, 2);
        assert_eq!(endpoint.minimum_effective, 1);
        assert_eq!(endpoint.maximum, Some(2));

        let spec = program()
            .with_positional(PositionalSpec::new("files", Primitive::Any))
            .with_requirement(1, Some(0));
        let config = validate(&spec).unwrap();
        assert_eq!(config.root().endpoints[0].maximum, None);
    }

    #[test]
    fn test_endpoint_rejects_bad_maximum() {
        let spec = program()
            .with_positional(PositionalSpec::new("a", Primitive::Any))
            .with_positional(PositionalSpec::new("b", Primitive::Any))
            .with_requirement(0, Some(1));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::MaximumBelowPositionals(_)
        ));

        let spec = program().with_endpoint(EndpointSpec::new(1).with_maximum(0));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::RequirementWithoutPositionals(_)
        ));
    }

    #[test]
    fn test_default_gap_rejected() {
        let spec = program()
            .with_positional(PositionalSpec::new("first", Primitive::Any).with_default("x"))
            .with_positional(PositionalSpec::new("second", Primitive::Any));
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::DefaultGap {
                owner: "arguments".into(),
                name: "first".into(),
            }
        );
    }

    #[test]
    fn test_overlapping_endpoints_rejected() {
        let spec = program().with_group(
            GroupSpec::new("copy", 1)
                .with_endpoint(
                    EndpointSpec::new(1).with_positional(PositionalSpec::new("a", Primitive::Any)),
                )
                .with_endpoint(
                    EndpointSpec::new(2)
                        .with_positional(PositionalSpec::new("a", Primitive::Any))
                        .with_positional(PositionalSpec::new("b", Primitive::Any).with_default("b")),
                ),
        );
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::OverlappingEndpoints("group [copy]".into())
        );
    }

    #[test]
    fn test_option_limits_and_defaults() {
        let spec = program().with_option(OptionSpec::flag("force", 1).require(1));
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::FlagWithRequirements("force".into())
        );

        let spec = program().with_option(
            OptionSpec::with_payload("tag", 1, "t", Primitive::Any)
                .require_range(0, 1)
                .with_default("a")
                .with_default("b"),
        );
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::DefaultCountOutOfRange("tag".into())
        );

        let spec = program().with_option(
            OptionSpec::with_payload("count", 1, "n", Primitive::UNum).with_default(-1i64),
        );
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::InvalidDefault { expected: "an unsigned integer", .. }
        ));

        let spec = program().with_option(
            OptionSpec::with_payload("include", 1, "path", Primitive::Any).require_range(1, 0),
        );
        let config = validate(&spec).unwrap();
        let option = config.option_by_name("include").unwrap();
        assert_eq!(option.minimum_actual, 1);
        assert_eq!(option.minimum_effective, 1);
        assert_eq!(option.maximum, None);
    }

    #[test]
    fn test_enum_types_validated() {
        let spec = program().with_option(OptionSpec::with_payload(
            "mode",
            1,
            "m",
            Type::Enum(Vec::new()),
        ));
        assert!(matches!(validate(&spec).unwrap_err(), ConfigError::EmptyEnum(_)));

        let spec = program().with_option(OptionSpec::with_payload(
            "mode",
            1,
            "m",
            Type::Enum(vec![EnumEntry::new(1, "fast"), EnumEntry::new(1, "slow")]),
        ));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::InvalidEnumEntries(_)
        ));
    }

    #[test]
    fn test_group_labels_lowercased() {
        let spec = program()
            .with_label("Command")
            .with_group(GroupSpec::new("copy", 1));
        let config = validate(&spec).unwrap();
        assert_eq!(config.root().label, "command");
        let copy = config.find_path(&["copy"]).unwrap();
        assert_eq!(config.node(copy).label, "mode");
        assert_eq!(config.node(copy).depth, 1);
    }
}
