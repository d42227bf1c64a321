use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::dom::Document;
use crate::types::*;
use crate::{link, parse, patch};

/// Name of the pseudo-enum holding free-standing constants.
pub const API_CONSTANTS: &str = "API Constants";

/// Upper bound on alias and parent chain lengths; anything longer is a cycle.
const MAX_CHAIN: usize = 64;

/// The linked and patched registry. Every pass of the pipeline works on this
/// one context; once `load` returns it is only read.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Registry {
    /// API the registry was filtered for, e.g. "vulkan".
    pub api: String,

    pub types: Table<TypeId, Type>,
    pub enums: Table<EnumId, Enum>,
    pub commands: Table<CommandId, Command>,
    pub features: Table<FeatureId, Feature>,
    pub extensions: Table<ExtensionId, Extension>,
    pub formats: Table<FormatId, Format>,
    pub platforms: Table<PlatformId, Platform>,
    pub tags: Table<TagId, Tag>,

    pub(crate) api_constants: Option<EnumId>,

    /// Enum fields whose only definitions were filtered out for `api`.
    #[cfg_attr(feature = "serialize", serde(skip))]
    pub(crate) dropped_fields: HashSet<String>,

    #[cfg_attr(feature = "serialize", serde(skip))]
    pub(crate) document: Document,
}

/// Parses the Vulkan XML file and returns the registry filtered for `api`.
pub fn parse_file(path: &Path, api: &str) -> Result<Registry, FatalError> {
    Registry::load(Document::parse_file(path)?, api)
}

/// Parses the Vulkan XML file from stream and returns the registry filtered for `api`.
pub fn parse_stream<T: Read>(stream: T, api: &str) -> Result<Registry, FatalError> {
    Registry::load(Document::parse_stream(stream)?, api)
}

impl Registry {
    pub(crate) fn empty(api: &str) -> Self {
        Registry {
            api: String::from(api),
            types: Table::default(),
            enums: Table::default(),
            commands: Table::default(),
            features: Table::default(),
            extensions: Table::default(),
            formats: Table::default(),
            platforms: Table::default(),
            tags: Table::default(),
            api_constants: None,
            dropped_fields: HashSet::new(),
            document: Document::default(),
        }
    }

    /// Runs ingestion, linking and enum patching over `document`.
    pub fn load(document: Document, api: &str) -> Result<Registry, FatalError> {
        let mut registry = parse::parse_registry(document, api)?;
        tracing::info!(
            types = registry.types.len(),
            enums = registry.enums.len(),
            commands = registry.commands.len(),
            features = registry.features.len(),
            extensions = registry.extensions.len(),
            "ingested registry for '{}'",
            api
        );

        link::link_registry(&mut registry)?;
        patch::patch_registry(&mut registry)?;
        link::link_formats(&mut registry)?;
        tracing::info!(formats = registry.formats.len(), "registry linked and patched");
        Ok(registry)
    }

    /// The element tree the registry was built from.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The "API Constants" pseudo-enum, synthesized when the document has none.
    pub(crate) fn api_constants_id(&mut self) -> Result<EnumId, FatalError> {
        if let Some(id) = self.api_constants {
            return Ok(id);
        }
        let id = match self.enums.find(API_CONSTANTS) {
            Some(id) => id,
            None => {
                tracing::debug!("no '{}' block, synthesizing one", API_CONSTANTS);
                let constants = Enum::new(String::from(API_CONSTANTS), EnumKind::Constants, None);
                self.enums.insert(String::from(API_CONSTANTS), constants)?
            }
        };
        self.api_constants = Some(id);
        Ok(id)
    }

    /// The constants block, if one exists.
    pub fn constants(&self) -> Option<&Enum> {
        self.api_constants
            .or_else(|| self.enums.find(API_CONSTANTS))
            .map(|id| &self.enums[id])
    }

    //----------------------------------------------------------------------------------------------
    pub fn type_by_name(&self, name: &str) -> Option<&Type> {
        self.types.by_name(name)
    }

    pub fn command_by_name(&self, name: &str) -> Option<&Command> {
        self.commands.by_name(name)
    }

    pub fn enum_by_name(&self, name: &str) -> Option<&Enum> {
        self.enums.by_name(name)
    }

    pub fn field(&self, field: FieldRef) -> Option<&EnumField> {
        self.enums.get(field.enum_id).and_then(|e| e.field(field.index))
    }

    /// Finds an enum field by name in any enum.
    pub fn find_field(&self, name: &str) -> Option<FieldRef> {
        self.enums.iter().find_map(|(enum_id, e)| {
            e.fields
                .get_index_of(name)
                .map(|index| FieldRef { enum_id, index })
        })
    }

    pub fn types_of(&self, category: TypeCategory) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types.iter().filter(move |(_, t)| t.category == category)
    }

    /// Features in ascending version order.
    pub fn features_by_version(&self) -> Vec<FeatureId> {
        let mut ids: Vec<FeatureId> = self.features.ids().collect();
        ids.sort_by_key(|id| self.features[*id].version);
        ids
    }

    //----------------------------------------------------------------------------------------------
    /// Follows the alias chain of a type to the record carrying its definition.
    pub fn resolve_type_alias(&self, id: TypeId) -> Result<TypeId, FatalError> {
        let mut current = id;
        for _ in 0..MAX_CHAIN {
            match self.types[current].alias.as_ref() {
                None => return Ok(current),
                Some(alias) => {
                    current = alias
                        .target()
                        .ok_or_else(|| FatalError::UnresolvedReference {
                            kind: EntityKind::Type,
                            name: alias.name.clone(),
                            referrer: self.types[current].name.clone(),
                        })?;
                }
            }
        }
        Err(FatalError::AliasCycle {
            kind: EntityKind::Type,
            name: self.types[id].name.clone(),
        })
    }

    pub fn resolve_command_alias(&self, id: CommandId) -> Result<CommandId, FatalError> {
        let mut current = id;
        for _ in 0..MAX_CHAIN {
            match self.commands[current].alias.as_ref() {
                None => return Ok(current),
                Some(alias) => {
                    current = alias
                        .target()
                        .ok_or_else(|| FatalError::UnresolvedReference {
                            kind: EntityKind::Command,
                            name: alias.name.clone(),
                            referrer: self.commands[current].name.clone(),
                        })?;
                }
            }
        }
        Err(FatalError::AliasCycle {
            kind: EntityKind::Command,
            name: self.commands[id].name.clone(),
        })
    }

    /// Follows an enum field's alias chain within its enum.
    pub fn resolve_field_alias(&self, field: FieldRef) -> Result<FieldRef, FatalError> {
        let e = &self.enums[field.enum_id];
        let mut index = field.index;
        for _ in 0..MAX_CHAIN {
            let current = e.field(index).ok_or_else(|| FatalError::UnresolvedReference {
                kind: EntityKind::EnumField,
                name: format!("#{}", index),
                referrer: e.name.clone(),
            })?;
            match &current.value {
                EnumValue::Alias(alias) => {
                    index = alias
                        .target()
                        .ok_or_else(|| FatalError::UnresolvedReference {
                            kind: EntityKind::EnumField,
                            name: alias.name.clone(),
                            referrer: current.name.clone(),
                        })?;
                }
                _ => {
                    return Ok(FieldRef {
                        enum_id: field.enum_id,
                        index,
                    })
                }
            }
        }
        Err(FatalError::AliasCycle {
            kind: EntityKind::EnumField,
            name: e
                .field(field.index)
                .map(|f| f.name.clone())
                .unwrap_or_default(),
        })
    }

    /// The chain of handle owners starting at `id` itself, each step
    /// read through the alias chain. Cycles are fatal.
    pub fn handle_ancestry(&self, id: TypeId) -> Result<Vec<TypeId>, FatalError> {
        let mut chain = Vec::new();
        let mut current = Some(self.resolve_type_alias(id)?);
        while let Some(ty) = current {
            if chain.contains(&ty) || chain.len() >= MAX_CHAIN {
                return Err(FatalError::AliasCycle {
                    kind: EntityKind::Type,
                    name: self.types[id].name.clone(),
                });
            }
            chain.push(ty);
            current = match self.types[ty].parent().and_then(|p| p.target()) {
                Some(parent) => Some(self.resolve_type_alias(parent)?),
                None => None,
            };
        }
        Ok(chain)
    }

    /// Whether the extension may be emitted for the given platform allow-list.
    pub fn extension_allowed(&self, id: ExtensionId, platforms: &[String]) -> bool {
        match self.extensions[id].platform.as_ref() {
            None => true,
            Some(platform) => platforms.iter().any(|p| *p == platform.name),
        }
    }
}
