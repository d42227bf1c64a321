//! Merges the `<enum>` items of feature and extension clauses into their enums.

use crate::parse::enum_literal;
use crate::registry::Registry;
use crate::types::*;

/// Base of all offset-derived enum values.
pub const EXT_BASE: i64 = 1_000_000_000;
/// Range of values reserved for each extension.
pub const EXT_BLOCK_SIZE: i64 = 1000;

/// Value of an enum item given as an offset into extension `extnumber`'s block.
pub fn extension_enum_value(extnumber: i64, offset: i64, negative: bool) -> i64 {
    let value = EXT_BASE + (extnumber - 1) * EXT_BLOCK_SIZE + offset;
    if negative {
        -value
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy)]
enum Owner {
    Feature(FeatureId),
    Extension(ExtensionId),
}

impl Owner {
    fn origin(self) -> Origin {
        match self {
            Owner::Feature(id) => Origin::Feature(id),
            Owner::Extension(id) => Origin::Extension(id),
        }
    }
}

/// A bare `<enum name="..."/>` that may name a field added later on.
struct PendingReference {
    owner: Owner,
    require: usize,
    name: String,
    xpath: String,
}

//--------------------------------------------------------------------------------------------------
pub(crate) fn patch_registry(registry: &mut Registry) -> Result<(), FatalError> {
    let mut pending = Vec::new();
    let mut inserted = 0;

    for id in registry.features_by_version() {
        inserted += patch_owner(registry, Owner::Feature(id), &mut pending)?;
    }
    let extensions: Vec<ExtensionId> = registry.extensions.ids().collect();
    for id in extensions {
        inserted += patch_owner(registry, Owner::Extension(id), &mut pending)?;
    }

    resolve_references(registry, pending)?;
    link_enum_aliases(registry)?;
    tracing::info!("patched {} enum fields into {} enums", inserted, registry.enums.len());
    Ok(())
}

fn patch_owner(
    registry: &mut Registry,
    owner: Owner,
    pending: &mut Vec<PendingReference>,
) -> Result<usize, FatalError> {
    let (mut requires, number) = match owner {
        Owner::Feature(id) => (std::mem::take(&mut registry.features[id].requires), None),
        Owner::Extension(id) => {
            let extension = &mut registry.extensions[id];
            (std::mem::take(&mut extension.requires), Some(extension.number))
        }
    };

    let mut inserted = 0;
    let mut result = Ok(());
    'clauses: for (index, require) in requires.iter_mut().enumerate() {
        for contribution in std::mem::take(&mut require.contributions) {
            match patch_contribution(registry, &contribution, owner.origin(), number) {
                Ok(Patched::Inserted(field)) => {
                    inserted += 1;
                    require.enums.push(field);
                }
                Ok(Patched::Discarded(field)) => require.enums.push(field),
                Ok(Patched::Deferred) => pending.push(PendingReference {
                    owner,
                    require: index,
                    name: contribution.name,
                    xpath: contribution.xpath,
                }),
                Err(e) => {
                    result = Err(e);
                    break 'clauses;
                }
            }
        }
    }

    match owner {
        Owner::Feature(id) => registry.features[id].requires = requires,
        Owner::Extension(id) => registry.extensions[id].requires = requires,
    }
    result.map(|_| inserted)
}

enum Patched {
    Inserted(FieldRef),
    /// Already present on the target enum.
    Discarded(FieldRef),
    Deferred,
}

fn patch_contribution(
    registry: &mut Registry,
    contribution: &EnumContribution,
    origin: Origin,
    extnumber: Option<i64>,
) -> Result<Patched, FatalError> {
    let target = match contribution.extends.as_ref() {
        Some(extends) => registry.enums.lookup(extends, &contribution.name)?,
        None if contribution.kind == ContributionKind::Reference => return Ok(Patched::Deferred),
        None => registry.api_constants_id()?,
    };

    let e = &registry.enums[target];
    if let Some(index) = e.fields.get_index_of(&contribution.name) {
        tracing::debug!("discarding duplicate '{}' on '{}'", contribution.name, e.name);
        return Ok(Patched::Discarded(FieldRef {
            enum_id: target,
            index,
        }));
    }

    let value = match &contribution.kind {
        ContributionKind::Bitpos(bitpos) => EnumValue::Bitpos(*bitpos),
        ContributionKind::Offset {
            offset,
            extnumber: explicit,
            negative,
        } => {
            let number = explicit.or(extnumber).ok_or_else(|| {
                FatalError::MissingExtensionNumber {
                    name: contribution.name.clone(),
                }
            })?;
            EnumValue::Literal(Literal::Int(extension_enum_value(number, *offset, *negative)))
        }
        ContributionKind::Value(text) => enum_literal(text, e.kind, &contribution.xpath)?,
        ContributionKind::Alias(alias) => EnumValue::Alias(Link::new(alias.clone())),
        ContributionKind::Reference => {
            return Err(FatalError::UnvaluedEnumField {
                xpath: contribution.xpath.clone(),
                name: contribution.name.clone(),
            })
        }
    };

    let field = EnumField {
        name: contribution.name.clone(),
        value,
        type_suffix: contribution.type_suffix.clone(),
        origin,
        protect: contribution.protect.clone(),
        deprecated: contribution.deprecated.clone(),
        comment: contribution.comment.clone(),
        node: contribution.node,
    };
    let (index, _) = registry.enums[target]
        .fields
        .insert_full(field.name.clone(), field);
    Ok(Patched::Inserted(FieldRef {
        enum_id: target,
        index,
    }))
}

fn resolve_references(
    registry: &mut Registry,
    pending: Vec<PendingReference>,
) -> Result<(), FatalError> {
    for reference in pending {
        let field = registry
            .find_field(&reference.name)
            .ok_or_else(|| FatalError::UnvaluedEnumField {
                xpath: reference.xpath.clone(),
                name: reference.name.clone(),
            })?;
        let requires = match reference.owner {
            Owner::Feature(id) => &mut registry.features[id].requires,
            Owner::Extension(id) => &mut registry.extensions[id].requires,
        };
        requires[reference.require].enums.push(field);
    }
    Ok(())
}

//--------------------------------------------------------------------------------------------------
/// Resolves every enum field alias, base and contributed alike, once all
/// contributions are in place.
fn link_enum_aliases(registry: &mut Registry) -> Result<(), FatalError> {
    let mut aliases = Vec::new();
    for (enum_id, e) in registry.enums.iter_mut() {
        let targets: Vec<(usize, Option<usize>, String, String)> = e
            .fields
            .values()
            .enumerate()
            .filter_map(|(index, field)| match &field.value {
                EnumValue::Alias(link) if !link.is_resolved() => Some((
                    index,
                    e.fields.get_index_of(&link.name),
                    link.name.clone(),
                    field.name.clone(),
                )),
                _ => None,
            })
            .collect();

        for (index, target, target_name, name) in targets {
            let target = target.ok_or_else(|| FatalError::UnresolvedReference {
                kind: EntityKind::EnumField,
                name: target_name,
                referrer: name,
            })?;
            if let Some((_, field)) = e.fields.get_index_mut(index) {
                if let EnumValue::Alias(link) = &mut field.value {
                    link.resolve(target);
                }
            }
            aliases.push(FieldRef { enum_id, index });
        }
    }

    for field in aliases {
        registry.resolve_field_alias(field)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::parse_stream;

    fn field_value(registry: &Registry, e: &str, name: &str) -> EnumValue {
        registry.enum_by_name(e).unwrap().fields[name].value.clone()
    }

    #[test]
    fn offset_formula() {
        assert_eq!(extension_enum_value(157, 5, false), 1_000_156_005);
        assert_eq!(extension_enum_value(157, 5, true), -1_000_156_005);
        assert_eq!(extension_enum_value(1, 0, false), 1_000_000_000);
    }

    const REGISTRY: &str = r#"<registry>
        <types>
            <type name="VkResult" category="enum"/>
        </types>
        <enums name="API Constants">
            <enum type="uint32_t" value="256" name="VK_MAX_NAME"/>
        </enums>
        <enums name="VkResult" type="enum">
            <enum value="0" name="VK_SUCCESS"/>
        </enums>
        <feature api="vulkan" name="VK_VERSION_1_1" number="1.1">
            <require>
                <enum extends="VkResult" extnumber="70" offset="0" dir="-" name="VK_ERROR_OUT_OF_POOL_MEMORY"/>
                <enum name="VK_MAX_NAME"/>
            </require>
        </feature>
        <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
            <require>
                <enum name="VK_MAX_NAME"/>
            </require>
        </feature>
        <extensions>
            <extension name="VK_KHR_a" number="157" supported="vulkan">
                <require>
                    <enum value="1" name="VK_KHR_A_SPEC_VERSION"/>
                    <enum value="&quot;VK_KHR_a&quot;" name="VK_KHR_A_EXTENSION_NAME"/>
                    <enum offset="5" extends="VkResult" name="VK_RESULT_A"/>
                    <enum offset="6" extends="VkResult" dir="-" name="VK_ERROR_A"/>
                    <enum extends="VkResult" name="VK_RESULT_B_ALIAS" alias="VK_RESULT_B"/>
                    <enum name="VK_RESULT_B"/>
                </require>
            </extension>
            <extension name="VK_KHR_b" number="2" supported="vulkan">
                <require>
                    <enum offset="0" extends="VkResult" name="VK_RESULT_B"/>
                    <enum offset="1" extends="VkResult" extnumber="70" dir="-" name="VK_ERROR_OUT_OF_POOL_MEMORY"/>
                </require>
            </extension>
        </extensions>
    </registry>"#;

    #[test]
    fn contributions_land_in_their_enums() {
        let registry = parse_stream(REGISTRY.as_bytes(), "vulkan").unwrap();

        assert_eq!(
            field_value(&registry, "VkResult", "VK_RESULT_A"),
            EnumValue::Literal(Literal::Int(1_000_156_005))
        );
        assert_eq!(
            field_value(&registry, "VkResult", "VK_ERROR_A"),
            EnumValue::Literal(Literal::Int(-1_000_156_006))
        );
        assert_eq!(
            field_value(&registry, "VkResult", "VK_ERROR_OUT_OF_POOL_MEMORY"),
            EnumValue::Literal(Literal::Int(-1_000_069_000))
        );
        assert_eq!(
            field_value(&registry, "API Constants", "VK_KHR_A_EXTENSION_NAME"),
            EnumValue::Literal(Literal::Text(String::from("\"VK_KHR_a\"")))
        );
    }

    #[test]
    fn alias_to_later_extension_resolves() {
        let registry = parse_stream(REGISTRY.as_bytes(), "vulkan").unwrap();
        let result = registry.enums.find("VkResult").unwrap();
        let alias = registry.enums[result]
            .fields
            .get_index_of("VK_RESULT_B_ALIAS")
            .unwrap();
        let resolved = registry
            .resolve_field_alias(FieldRef {
                enum_id: result,
                index: alias,
            })
            .unwrap();
        assert_eq!(
            registry.field(resolved).unwrap().name,
            "VK_RESULT_B"
        );

        // the bare reference in VK_KHR_a named a field only VK_KHR_b defines
        let a = registry.extensions.by_name("VK_KHR_a").unwrap();
        assert!(a.requires[0]
            .enums
            .iter()
            .any(|f| registry.field(*f).unwrap().name == "VK_RESULT_B"));
    }

    #[test]
    fn duplicate_contribution_is_discarded() {
        let mut registry = parse_stream(REGISTRY.as_bytes(), "vulkan").unwrap();
        let result = registry.enums.find("VkResult").unwrap();
        let before = registry.enums[result].fields.len();

        let contribution = EnumContribution {
            name: String::from("VK_RESULT_A"),
            extends: Some(String::from("VkResult")),
            kind: ContributionKind::Offset {
                offset: 5,
                extnumber: None,
                negative: false,
            },
            type_suffix: None,
            protect: None,
            deprecated: None,
            comment: None,
            xpath: String::from("/registry"),
            node: registry.document().root(),
        };
        let ext = registry.extensions.find("VK_KHR_a").unwrap();
        for _ in 0..2 {
            match patch_contribution(&mut registry, &contribution, Origin::Extension(ext), Some(157))
                .unwrap()
            {
                Patched::Discarded(_) => {}
                _ => panic!("expected the contribution to be discarded"),
            }
        }
        assert_eq!(registry.enums[result].fields.len(), before);
    }

    #[test]
    fn extends_without_value_is_fatal() {
        let xml = r#"<registry>
            <enums name="VkResult" type="enum"><enum value="0" name="VK_SUCCESS"/></enums>
            <extensions>
                <extension name="VK_KHR_a" number="1" supported="vulkan">
                    <require><enum extends="VkResult" name="VK_RESULT_NOTHING"/></require>
                </extension>
            </extensions>
        </registry>"#;
        match parse_stream(xml.as_bytes(), "vulkan") {
            Err(FatalError::UnvaluedEnumField { name, .. }) => assert_eq!(name, "VK_RESULT_NOTHING"),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn dangling_enum_alias_is_fatal() {
        let xml = r#"<registry>
            <enums name="VkResult" type="enum">
                <enum value="0" name="VK_SUCCESS"/>
                <enum name="VK_SUCCESS_KHR" alias="VK_SUCCESS_NOPE"/>
            </enums>
        </registry>"#;
        match parse_stream(xml.as_bytes(), "vulkan") {
            Err(FatalError::UnresolvedReference { kind, name, .. }) => {
                assert_eq!(kind, EntityKind::EnumField);
                assert_eq!(name, "VK_SUCCESS_NOPE");
            }
            other => panic!("{:?}", other),
        }
    }
}
