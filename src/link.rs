//! Linking pass: turns the names left behind by ingestion into table indices.
//!
//! Links are resolved in dependency order. Any name that does not resolve
//! means the document references something that was never ingested, which
//! aborts the run.

use crate::registry::Registry;
use crate::types::*;

pub(crate) fn link_registry(registry: &mut Registry) -> Result<(), FatalError> {
    link_requires(registry)?;
    link_parents(registry)?;
    link_subtypes(registry)?;
    link_members(registry)?;
    link_commands(registry)?;
    link_aliases(registry)?;
    link_clauses(registry)?;
    tracing::info!("linked {} types and {} commands", registry.types.len(), registry.commands.len());
    Ok(())
}

fn resolve<I: EntityId, T>(
    link: &mut Link<I>,
    table: &Table<I, T>,
    referrer: &str,
) -> Result<(), FatalError> {
    let target = table.lookup(&link.name, referrer)?;
    tracing::trace!("{} -> {} '{}'", referrer, I::KIND, link.name);
    link.resolve(target);
    Ok(())
}

/// Applies `f` to every type with a copy of the tables it may link against.
fn for_each_type<F>(registry: &mut Registry, mut f: F) -> Result<(), FatalError>
where
    F: FnMut(&mut Type, &Registry) -> Result<(), FatalError>,
{
    let ids: Vec<TypeId> = registry.types.ids().collect();
    for id in ids {
        let mut ty = registry.types[id].clone();
        f(&mut ty, registry)?;
        registry.types[id] = ty;
    }
    Ok(())
}

//--------------------------------------------------------------------------------------------------
/// `requires`, `bitvalues`, and enum-category types to their values block.
fn link_requires(registry: &mut Registry) -> Result<(), FatalError> {
    for_each_type(registry, |ty, registry| {
        let name = ty.name.clone();
        if let Some(requires) = ty.requires.as_mut() {
            resolve(requires, &registry.types, &name)?;
        }
        if let Some(bitvalues) = ty.bitvalues.as_mut() {
            resolve(bitvalues, &registry.types, &name)?;
        }
        if ty.category == TypeCategory::Enum && ty.alias.is_none() {
            // an empty FlagBits type has no <enums> block
            ty.enumeration = registry.enums.find(&name);
        }
        Ok(())
    })
}

fn link_parents(registry: &mut Registry) -> Result<(), FatalError> {
    for_each_type(registry, |ty, registry| {
        let name = ty.name.clone();
        for parent in ty.parents.iter_mut() {
            resolve(parent, &registry.types, &name)?;
        }
        Ok(())
    })
}

fn link_subtypes(registry: &mut Registry) -> Result<(), FatalError> {
    for_each_type(registry, |ty, registry| {
        let name = ty.name.clone();
        if let Some(subtype) = ty.subtype.as_mut() {
            resolve(subtype, &registry.types, &name)?;
        }
        Ok(())
    })
}

/// Member types, selectors, sibling lengths, struct extensions and funcpointer prototypes.
fn link_members(registry: &mut Registry) -> Result<(), FatalError> {
    for_each_type(registry, |ty, registry| {
        let name = ty.name.clone();
        link_member_list(&mut ty.members, &name, registry)?;
        for extends in ty.struct_extends.iter_mut() {
            resolve(extends, &registry.types, &name)?;
        }
        if let Some(proto) = ty.proto.as_mut() {
            resolve(&mut proto.return_type, &registry.types, &name)?;
            link_member_list(&mut proto.params, &name, registry)?;
        }
        Ok(())
    })
}

fn link_commands(registry: &mut Registry) -> Result<(), FatalError> {
    let ids: Vec<CommandId> = registry.commands.ids().collect();
    for id in ids {
        let mut command = registry.commands[id].clone();
        if let Some(return_type) = command.return_type.as_mut() {
            resolve(return_type, &registry.types, &command.name)?;
        }
        link_member_list(&mut command.params, &command.name, registry)?;
        registry.commands[id] = command;
    }
    Ok(())
}

fn link_member_list(
    members: &mut [Member],
    owner: &str,
    registry: &Registry,
) -> Result<(), FatalError> {
    let names: Vec<String> = members.iter().map(|m| m.name.clone()).collect();
    let sibling = |link: &mut Link<usize>, referrer: &str| -> Result<(), FatalError> {
        let index = names
            .iter()
            .position(|n| *n == link.name)
            .ok_or_else(|| FatalError::UnresolvedReference {
                kind: EntityKind::Parameter,
                name: link.name.clone(),
                referrer: format!("{}::{}", owner, referrer),
            })?;
        link.resolve(index);
        Ok(())
    };

    for member in members.iter_mut() {
        let referrer = format!("{}::{}", owner, member.name);
        resolve(&mut member.ty, &registry.types, &referrer)?;
        if let Some(selector) = member.selector.as_mut() {
            sibling(selector, &member.name)?;
        }

        for hint in member.len.iter_mut() {
            match hint {
                LengthHint::Sibling(link) => {
                    if names.contains(&link.name) {
                        sibling(link, &member.name)?;
                    } else if is_api_constant(registry, &link.name) {
                        *hint = LengthHint::Constant(link.name.clone());
                    } else {
                        return Err(FatalError::UnresolvedReference {
                            kind: EntityKind::Parameter,
                            name: link.name.clone(),
                            referrer,
                        });
                    }
                }
                LengthHint::SiblingField { sibling: link, .. } => sibling(link, &member.name)?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn is_api_constant(registry: &Registry, name: &str) -> bool {
    registry
        .constants()
        .map(|c| c.fields.contains_key(name))
        .unwrap_or(false)
}

//--------------------------------------------------------------------------------------------------
/// Aliases go last; every chain is walked once so a cycle surfaces here.
fn link_aliases(registry: &mut Registry) -> Result<(), FatalError> {
    for_each_type(registry, |ty, registry| {
        let name = ty.name.clone();
        if let Some(alias) = ty.alias.as_mut() {
            resolve(alias, &registry.types, &name)?;
        }
        Ok(())
    })?;

    let ids: Vec<CommandId> = registry.commands.ids().collect();
    for id in ids.iter().cloned() {
        let mut alias = registry.commands[id].alias.clone();
        if let Some(alias) = alias.as_mut() {
            resolve(alias, &registry.commands, &registry.commands[id].name)?;
        }
        registry.commands[id].alias = alias;
    }

    for id in registry.types.ids() {
        registry.resolve_type_alias(id)?;
    }
    for id in ids {
        registry.resolve_command_alias(id)?;
    }
    Ok(())
}

/// Type and command lists of feature/extension clauses, and extension platforms.
fn link_clauses(registry: &mut Registry) -> Result<(), FatalError> {
    let ids: Vec<FeatureId> = registry.features.ids().collect();
    for id in ids {
        let mut requires = std::mem::take(&mut registry.features[id].requires);
        let name = registry.features[id].name.clone();
        for require in requires.iter_mut() {
            link_require(require, &name, registry)?;
        }
        registry.features[id].requires = requires;
    }

    let ids: Vec<ExtensionId> = registry.extensions.ids().collect();
    for id in ids {
        let mut requires = std::mem::take(&mut registry.extensions[id].requires);
        let name = registry.extensions[id].name.clone();
        for require in requires.iter_mut() {
            link_require(require, &name, registry)?;
        }

        let mut platform = registry.extensions[id].platform.clone();
        if let Some(platform) = platform.as_mut() {
            resolve(platform, &registry.platforms, &name)?;
        }

        let extension = &mut registry.extensions[id];
        extension.requires = requires;
        extension.platform = platform;
    }
    Ok(())
}

fn link_require(require: &mut Require, owner: &str, registry: &Registry) -> Result<(), FatalError> {
    for ty in require.types.iter_mut() {
        resolve(ty, &registry.types, owner)?;
    }
    for command in require.commands.iter_mut() {
        resolve(command, &registry.commands, owner)?;
    }
    Ok(())
}

//--------------------------------------------------------------------------------------------------
/// Formats refer to `VkFormat` fields, some of which only exist once
/// extensions have been patched in.
pub(crate) fn link_formats(registry: &mut Registry) -> Result<(), FatalError> {
    if registry.formats.is_empty() {
        return Ok(());
    }
    let vk_format = registry.enums.lookup("VkFormat", "formats")?;
    let fields = &registry.enums[vk_format].fields;
    let dropped = &registry.dropped_fields;
    let filtered = |name: &str| !fields.contains_key(name) && dropped.contains(name);

    registry.formats.retain(|format| {
        if filtered(&format.field.name) {
            tracing::debug!("dropping format '{}': not part of the API", format.field.name);
            return false;
        }
        true
    });
    for (_, format) in registry.formats.iter_mut() {
        format.planes.retain(|plane| !filtered(&plane.compatible.name));
    }

    let resolve_field = |link: &mut Link<FieldRef>, referrer: &str| -> Result<(), FatalError> {
        let index = fields
            .get_index_of(&link.name)
            .ok_or_else(|| FatalError::UnresolvedReference {
                kind: EntityKind::EnumField,
                name: link.name.clone(),
                referrer: String::from(referrer),
            })?;
        link.resolve(FieldRef {
            enum_id: vk_format,
            index,
        });
        Ok(())
    };

    let mut formats = std::mem::take(&mut registry.formats);
    for (_, format) in formats.iter_mut() {
        let name = format.field.name.clone();
        resolve_field(&mut format.field, &name)?;
        for plane in format.planes.iter_mut() {
            resolve_field(&mut plane.compatible, &name)?;
        }
    }
    registry.formats = formats;
    Ok(())
}
