//! Reference resolution between groups, options and information.
//!
//! Options and information without links belong to their owner and its
//! descendants. Declaring links instead hands them to every group sharing
//! one of the ids, as long as each such group sits at or below the owner.
//! Resolution runs in two passes: collect every id, then resolve.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::error::ConfigError;
use crate::tree::{NodeId, ValidatedConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Linked {
    Option,
    Information,
    Group(NodeId),
}

/// Fills `users` of options and information plus the per-node lists.
pub(crate) fn resolve(config: &mut ValidatedConfig<'_>) -> Result<(), ConfigError> {
    let registry = collect(config);

    let mut option_users = Vec::with_capacity(config.options.len());
    for option in &config.options {
        let who = format!("option [{}]", option.spec.name);
        let users = resolve_users(&registry, option.owner, &option.spec.links, &who)?;
        for &group in &users {
            if !config.check_parent(option.owner, group) {
                return Err(ConfigError::ForeignOption {
                    group: group_name(config, group),
                    option: option.spec.name.clone(),
                });
            }
        }
        option_users.push(users);
    }

    let mut information_users = Vec::with_capacity(config.information.len());
    for information in &config.information {
        let who = format!("information [{}]", information.spec.name);
        let users = resolve_users(
            &registry,
            information.owner,
            &information.spec.links,
            &who,
        )?;
        for &group in &users {
            if !config.check_parent(information.owner, group) {
                return Err(ConfigError::ForeignInformation {
                    group: group_name(config, group),
                    information: information.spec.name.clone(),
                });
            }
        }
        information_users.push(users);
    }

    // A group reference must be shared with an option or information block.
    for (id, node) in config.nodes() {
        for reference in &node.links {
            let shared = registry
                .get(reference)
                .is_some_and(|linked| linked.iter().any(|l| !matches!(l, Linked::Group(_))));
            if !shared {
                return Err(ConfigError::DanglingReference {
                    who: format!("group [{}]", group_name(config, id)),
                    id: *reference,
                });
            }
        }
    }

    for (option, users) in config.options.iter_mut().zip(option_users) {
        option.users = users;
    }
    for (information, users) in config.information.iter_mut().zip(information_users) {
        information.users = users;
    }

    for index in 0..config.nodes.len() {
        let node = NodeId(index);
        let options = (0..config.options.len())
            .filter(|&i| config.is_usable(&config.options[i], node))
            .collect();
        let information = (0..config.information.len())
            .filter(|&i| {
                config.information[i]
                    .users
                    .iter()
                    .any(|&user| config.check_parent(user, node))
            })
            .collect();

        let entry = &mut config.nodes[index];
        entry.options = options;
        entry.information = information;
        trace!(
            node = index,
            options = entry.options.len(),
            information = entry.information.len(),
            "Resolved node references"
        );
    }
    Ok(())
}

fn collect(config: &ValidatedConfig<'_>) -> BTreeMap<u64, Vec<Linked>> {
    let mut registry: BTreeMap<u64, Vec<Linked>> = BTreeMap::new();
    for option in &config.options {
        for &id in &option.spec.links {
            registry.entry(id).or_default().push(Linked::Option);
        }
    }
    for information in &config.information {
        for &id in &information.spec.links {
            registry.entry(id).or_default().push(Linked::Information);
        }
    }
    for (node, entry) in config.nodes() {
        for &id in &entry.links {
            registry.entry(id).or_default().push(Linked::Group(node));
        }
    }
    registry
}

fn resolve_users(
    registry: &BTreeMap<u64, Vec<Linked>>,
    owner: NodeId,
    links: &BTreeSet<u64>,
    who: &str,
) -> Result<BTreeSet<NodeId>, ConfigError> {
    if links.is_empty() {
        return Ok(BTreeSet::from([owner]));
    }

    let mut users = BTreeSet::new();
    for &id in links {
        let groups: Vec<NodeId> = registry
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|linked| match linked {
                Linked::Group(node) => Some(*node),
                Linked::Option | Linked::Information => None,
            })
            .collect();
        if groups.is_empty() {
            return Err(ConfigError::DanglingReference {
                who: who.to_string(),
                id,
            });
        }
        users.extend(groups);
    }
    trace!(who, users = ?users, "Linked to groups");
    Ok(users)
}

fn group_name(config: &ValidatedConfig<'_>, node: NodeId) -> String {
    config.node(node).name().unwrap_or("arguments").to_string()
}

#[cfg(test)]
mod tests {
    use crate::{validate, ConfigError, GroupSpec, InformationSpec, NodeId, OptionSpec, Spec};

    fn git() -> Spec {
        Spec::program("git", "2.0")
            .with_option(OptionSpec::flag("verbose", 1))
            .with_option(OptionSpec::flag("force", 2).with_link(100))
            .with_group(GroupSpec::new("push", 10).with_link(100))
            .with_group(GroupSpec::new("pull", 11))
    }

    #[test]
    fn test_unlinked_option_used_by_owner() {
        let spec = git();
        let config = validate(&spec).unwrap();
        let verbose = config.option_by_name("verbose").unwrap();
        assert_eq!(verbose.users.iter().copied().collect::<Vec<_>>(), vec![NodeId::ROOT]);
        assert!(!verbose.is_restricted());
    }

    #[test]
    fn test_linked_option_restricted_to_groups() {
        let spec = git();
        let config = validate(&spec).unwrap();
        let force = config.option_by_name("force").unwrap();
        let push = config.find_path(&["push"]).unwrap();
        let pull = config.find_path(&["pull"]).unwrap();

        assert!(force.is_restricted());
        assert!(config.is_usable(force, push));
        assert!(!config.is_usable(force, pull));
        // Still usable while no group has been selected yet.
        assert!(config.is_usable(force, NodeId::ROOT));
        assert!(config.node(pull).options.iter().all(|&i| config.options[i].spec.name != "force"));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let spec = Spec::program("git", "2.0").with_option(OptionSpec::flag("force", 2).with_link(7));
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::DanglingReference {
                who: "option [force]".into(),
                id: 7,
            }
        );

        let spec = Spec::program("git", "2.0").with_group(GroupSpec::new("push", 1).with_link(8));
        assert!(matches!(
            validate(&spec).unwrap_err(),
            ConfigError::DanglingReference { id: 8, .. }
        ));
    }

    #[test]
    fn test_foreign_option_rejected() {
        let spec = Spec::program("git", "2.0")
            .with_group(GroupSpec::new("push", 10).with_option(OptionSpec::flag("force", 2).with_link(5)))
            .with_group(GroupSpec::new("pull", 11).with_link(5));
        assert_eq!(
            validate(&spec).unwrap_err(),
            ConfigError::ForeignOption {
                group: "pull".into(),
                option: "force".into(),
            }
        );
    }

    #[test]
    fn test_information_visible_below_users() {
        let spec = Spec::program("git", "2.0")
            .with_information(InformationSpec::new("Remotes", "About remotes.").with_link(3))
            .with_group(
                GroupSpec::new("remote", 10)
                    .with_link(3)
                    .with_group(GroupSpec::new("add", 12)),
            )
            .with_group(GroupSpec::new("pull", 11));
        let config = validate(&spec).unwrap();
        let add = config.find_path(&["remote", "add"]).unwrap();
        let pull = config.find_path(&["pull"]).unwrap();
        assert_eq!(config.node(add).information, vec![0]);
        assert!(config.node(pull).information.is_empty());
        assert!(config.root().information.is_empty());
    }
}
