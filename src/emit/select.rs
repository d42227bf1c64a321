use std::collections::HashSet;

use crate::registry::Registry;
use crate::types::*;

/// What the platform allow-list keeps out of the output.
///
/// An item is excluded when every clause requiring it belongs to an extension
/// for a platform that is not allowed. Items also required by a feature or by
/// an allowed extension stay in.
#[derive(Debug, Default)]
pub struct Selection {
    extensions: HashSet<ExtensionId>,
    types: HashSet<TypeId>,
    commands: HashSet<CommandId>,
    fields: HashSet<FieldRef>,
}

#[derive(Default)]
struct Required {
    types: HashSet<TypeId>,
    commands: HashSet<CommandId>,
    fields: HashSet<FieldRef>,
}

impl Required {
    fn add(&mut self, requires: &[Require]) {
        for require in requires {
            self.types.extend(require.types.iter().filter_map(|t| t.target()));
            self.commands
                .extend(require.commands.iter().filter_map(|c| c.target()));
            self.fields.extend(require.enums.iter().cloned());
        }
    }
}

impl Selection {
    pub fn new(registry: &Registry, platforms: &[String]) -> Self {
        let mut kept = Required::default();
        let mut dropped = Required::default();
        let mut selection = Selection::default();

        for (_, feature) in registry.features.iter() {
            kept.add(&feature.requires);
        }
        for (id, extension) in registry.extensions.iter() {
            if registry.extension_allowed(id, platforms) {
                kept.add(&extension.requires);
            } else {
                tracing::debug!("leaving out '{}': platform not allowed", extension.name);
                selection.extensions.insert(id);
                dropped.add(&extension.requires);
            }
        }

        selection.types = &dropped.types - &kept.types;
        selection.commands = &dropped.commands - &kept.commands;
        selection.fields = &dropped.fields - &kept.fields;
        selection
    }

    pub fn extension(&self, id: ExtensionId) -> bool {
        !self.extensions.contains(&id)
    }

    pub fn ty(&self, id: TypeId) -> bool {
        !self.types.contains(&id)
    }

    pub fn command(&self, id: CommandId) -> bool {
        !self.commands.contains(&id)
    }

    pub fn field(&self, field: FieldRef) -> bool {
        !self.fields.contains(&field)
    }
}
