//! Serializable views over the registry, one per output file.

use std::collections::HashSet;

use super::Generator;
use crate::c_parser::{self, CLiteral};
use crate::classify::{classify, Dispatch};
use crate::naming::*;
use crate::registry::API_CONSTANTS;
use crate::types::*;

/// Identifiers of the target language that cannot name a field.
const KEYWORDS: &[&str] = &[
    "asm", "auto_cast", "bit_set", "break", "case", "cast", "context", "continue", "defer",
    "distinct", "do", "dynamic", "else", "enum", "fallthrough", "for", "foreign", "if", "import",
    "in", "map", "matrix", "not_in", "or_else", "or_return", "package", "proc", "return",
    "struct", "switch", "transmute", "typeid", "union", "using", "when", "where",
];

fn field_ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        String::from(name)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct Constant {
    name: String,
    value: String,
    comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ConstantsFile {
    constants: Vec<Constant>,
}

#[derive(Debug, Serialize)]
pub(super) struct EnumView {
    name: String,
    backing: String,
    fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub(super) struct FieldView {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
pub(super) struct EnumsFile {
    enums: Vec<EnumView>,
    flag_constants: Vec<Constant>,
}

#[derive(Debug, Serialize)]
pub(super) struct Basetype {
    name: String,
    target: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct Handle {
    name: String,
    dispatchable: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct Bitmask {
    name: String,
    flag: Option<String>,
    backing: String,
}

#[derive(Debug, Serialize)]
pub(super) struct Param {
    name: String,
    ty: String,
}

#[derive(Debug, Serialize)]
pub(super) struct FuncPointer {
    name: String,
    params: Vec<Param>,
    ret: String,
}

#[derive(Debug, Serialize)]
pub(super) struct MemberView {
    name: String,
    ty: String,
    comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct StructView {
    name: String,
    is_union: bool,
    members: Vec<MemberView>,
    comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct Alias {
    name: String,
    target: String,
}

#[derive(Debug, Default, Serialize)]
pub(super) struct TypesFile {
    basetypes: Vec<Basetype>,
    handles: Vec<Handle>,
    bitmasks: Vec<Bitmask>,
    funcpointers: Vec<FuncPointer>,
    structs: Vec<StructView>,
    aliases: Vec<Alias>,
}

#[derive(Debug, Serialize)]
pub(super) struct Procedure {
    name: String,
    alias: Option<String>,
    params: Vec<Param>,
    ret: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ProceduresFile {
    procedures: Vec<Procedure>,
}

#[derive(Debug, Serialize)]
pub(super) struct LoaderEntry {
    field: String,
    proc_type: String,
    symbol: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoaderTable {
    name: String,
    dispatch: String,
    entries: Vec<LoaderEntry>,
}

#[derive(Debug, Serialize)]
pub(super) struct LoaderFile {
    tables: Vec<LoaderTable>,
}

#[derive(Debug, Serialize)]
pub(super) struct FormatView {
    name: String,
    class: String,
    block_size: u8,
    texels_per_block: u8,
    block_extent: String,
    packed: u8,
    compressed: String,
    chroma: String,
    component_count: usize,
    plane_count: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct FormatsFile {
    formats: Vec<FormatView>,
}

//--------------------------------------------------------------------------------------------------
impl<'r> Generator<'r> {
    fn type_name(&self, raw: &str) -> String {
        canonical_type_name(raw, &self.config.syntax)
    }

    fn proc_type_name(&self, command: &str) -> String {
        let syntax = &self.config.syntax;
        format!("{}{}", syntax.proc_replacement, command_name(command, syntax))
    }

    fn field_name(&self, e: &Enum, field: &str) -> String {
        enum_field_name(
            &e.name,
            field,
            e.kind == EnumKind::Bitmask,
            &self.tags,
            &self.config.syntax,
        )
    }

    fn constant_value(&self, field: &EnumField) -> String {
        let syntax = &self.config.syntax;
        match &field.value {
            EnumValue::Literal(Literal::Int(v)) => v.to_string(),
            EnumValue::Literal(Literal::Text(text)) => match c_parser::parse_literal(text) {
                Some(CLiteral::Integer { value, .. }) => value.to_string(),
                Some(CLiteral::Complement { operand, wide }) => {
                    format!("~{}({})", if wide { "u64" } else { "u32" }, operand)
                }
                Some(CLiteral::Float(f)) => format!("{:?}", f),
                Some(CLiteral::Str(s)) => format!("\"{}\"", s),
                None => text.clone(),
            },
            EnumValue::Bitpos(bit) => format!("1 << {}", bit),
            EnumValue::Alias(alias) => constant_name(&alias.name, syntax),
        }
    }

    /// Target type of a typedef or return value, whose pointers are only
    /// known from the C declarator.
    fn declared_type(
        &self,
        raw: &str,
        declarator: &Declarator,
        allow_void: bool,
    ) -> Result<String, FatalError> {
        let levels = vec![Indirection::Pointer; usize::from(declarator.pointers)];
        map_type_name(raw, &levels, allow_void, &self.config.syntax)
    }

    /// Name a declaration refers to, read through type aliases.
    fn target_name<'a>(&'a self, link: &'a Link<TypeId>) -> Result<&'a str, FatalError> {
        match link.target() {
            Some(id) => {
                let id = self.registry.resolve_type_alias(id)?;
                Ok(self.registry.types[id].name.as_str())
            }
            None => Ok(link.name.as_str()),
        }
    }

    fn params(&self, params: &[Member]) -> Result<Vec<Param>, FatalError> {
        params
            .iter()
            .map(|p| {
                Ok(Param {
                    name: field_ident(&p.name),
                    ty: decorate(
                        &p.name,
                        self.target_name(&p.ty)?,
                        &p.declarator,
                        &p.len,
                        false,
                        &self.config.syntax,
                    )?,
                })
            })
            .collect()
    }

    //----------------------------------------------------------------------------------------------
    pub(super) fn constants_file(&self) -> Result<ConstantsFile, FatalError> {
        let registry = self.registry;
        let syntax = &self.config.syntax;
        let mut constants = Vec::new();

        for (id, ty) in registry.types_of(TypeCategory::Define) {
            if !self.selection.ty(id) {
                continue;
            }
            if let Some((name, value)) = ty.define.as_deref().and_then(c_parser::parse_define) {
                constants.push(Constant {
                    name: constant_name(&name, syntax),
                    value: value.value().to_string(),
                    comment: None,
                });
            }
        }

        if let Some(enum_id) = registry.enums.find(API_CONSTANTS) {
            for (index, field) in registry.enums[enum_id].fields.values().enumerate() {
                if !self.selection.field(FieldRef { enum_id, index }) {
                    continue;
                }
                constants.push(Constant {
                    name: constant_name(&field.name, syntax),
                    value: self.constant_value(field),
                    comment: field.comment.clone(),
                });
            }
        }

        Ok(ConstantsFile { constants })
    }

    //----------------------------------------------------------------------------------------------
    pub(super) fn enums_file(&self) -> Result<EnumsFile, FatalError> {
        let registry = self.registry;
        let mut enums = Vec::new();
        let mut flag_constants = Vec::new();

        for (enum_id, e) in registry.enums.iter() {
            if e.kind == EnumKind::Constants {
                continue;
            }
            if let Some(ty) = registry.types.find(&e.name) {
                if !self.selection.ty(ty) {
                    continue;
                }
            }

            let mut view = EnumView {
                name: self.type_name(&e.name),
                backing: String::from(match (e.kind, e.bitwidth) {
                    (EnumKind::Bitmask, Some(64)) => "Flags64",
                    (EnumKind::Bitmask, _) => "Flags",
                    _ => "i32",
                }),
                fields: Vec::new(),
            };
            let flags = self.flags_type(e);
            let mut seen = HashSet::new();

            for (index, field) in e.fields.values().enumerate() {
                let field_ref = FieldRef { enum_id, index };
                if !self.selection.field(field_ref) {
                    continue;
                }
                let name = self.field_name(e, &field.name);
                if !seen.insert(name.clone()) {
                    tracing::debug!("'{}' collapses onto an existing name in '{}'", field.name, e.name);
                    continue;
                }

                let resolved = registry.resolve_field_alias(field_ref)?;
                let target = &e.fields[resolved.index];
                match (&field.value, &target.value, e.kind) {
                    (EnumValue::Alias(_), EnumValue::Bitpos(_), _)
                    | (EnumValue::Alias(_), _, EnumKind::Enum) => view.fields.push(FieldView {
                        name,
                        value: self.field_name(e, &target.name),
                    }),
                    (_, EnumValue::Bitpos(bit), _) => view.fields.push(FieldView {
                        name,
                        value: bit.to_string(),
                    }),
                    (_, EnumValue::Literal(Literal::Int(v)), EnumKind::Enum) => {
                        view.fields.push(FieldView {
                            name,
                            value: v.to_string(),
                        })
                    }
                    (_, EnumValue::Literal(Literal::Int(v)), _) => flag_constants.push(Constant {
                        name: format!("{}_{}", flags, name),
                        value: self.flag_set(e, enum_id, &flags, *v),
                        comment: None,
                    }),
                    (_, value, _) => {
                        tracing::warn!("cannot express {:?} of '{}'", value, field.name);
                    }
                }
            }
            enums.push(view);
        }

        Ok(EnumsFile {
            enums,
            flag_constants,
        })
    }

    /// Name of the bitmask type whose bits `e` holds.
    fn flags_type(&self, e: &Enum) -> String {
        self.registry
            .types_of(TypeCategory::Bitmask)
            .find(|(_, t)| t.bitvalues.as_ref().map(|b| b.name == e.name).unwrap_or(false))
            .map(|(_, t)| self.type_name(&t.name))
            .unwrap_or_else(|| self.type_name(&e.name.replace("FlagBits", "Flags")))
    }

    /// A multi-bit value written as a set of the enum's bits, when every bit has a name.
    fn flag_set(&self, e: &Enum, enum_id: EnumId, flags: &str, value: i64) -> String {
        let bits = value as u64;
        let mut names = Vec::new();
        for bit in 0..64 {
            if bits & (1u64 << bit) == 0 {
                continue;
            }
            let named = e.fields.values().enumerate().find(|(index, f)| {
                f.value == EnumValue::Bitpos(bit)
                    && self.selection.field(FieldRef {
                        enum_id,
                        index: *index,
                    })
            });
            match named {
                Some((_, f)) => names.push(format!(".{}", self.field_name(e, &f.name))),
                None => {
                    let width = if e.bitwidth == Some(64) { "u64" } else { "u32" };
                    return format!("transmute({}){}({:#x})", flags, width, bits);
                }
            }
        }
        format!("{}{{{}}}", flags, names.join(", "))
    }

    //----------------------------------------------------------------------------------------------
    pub(super) fn types_file(&self) -> Result<TypesFile, FatalError> {
        let registry = self.registry;
        let mut file = TypesFile::default();

        for (id, ty) in registry.types.iter() {
            if !self.selection.ty(id) {
                continue;
            }
            let name = self.type_name(&ty.name);

            if let Some(alias) = ty.alias.as_ref() {
                match ty.category {
                    TypeCategory::Include | TypeCategory::Define | TypeCategory::External => {}
                    _ => file.aliases.push(Alias {
                        name,
                        target: self.type_name(&alias.name),
                    }),
                }
                continue;
            }

            match ty.category {
                TypeCategory::Basetype => file.basetypes.push(Basetype {
                    name,
                    target: match ty.subtype.as_ref() {
                        Some(subtype) => Some(self.declared_type(
                            self.target_name(subtype)?,
                            &ty.subtype_declarator,
                            false,
                        )?),
                        None => None,
                    },
                }),
                TypeCategory::Handle => file.handles.push(Handle {
                    name,
                    dispatchable: ty.handle_kind == Some(HandleKind::Dispatch),
                }),
                TypeCategory::Bitmask => file.bitmasks.push(Bitmask {
                    name,
                    flag: ty
                        .bitvalues
                        .as_ref()
                        .and_then(|b| b.target())
                        .filter(|b| registry.types[*b].enumeration.is_some())
                        .map(|b| self.type_name(&registry.types[b].name)),
                    backing: ty
                        .subtype
                        .as_ref()
                        .map(|s| self.type_name(&s.name))
                        .unwrap_or_else(|| String::from("Flags")),
                }),
                TypeCategory::FuncPointer => {
                    if let Some(proto) = ty.proto.as_ref() {
                        file.funcpointers.push(FuncPointer {
                            name,
                            params: self.params(&proto.params)?,
                            ret: self.declared_type(
                                self.target_name(&proto.return_type)?,
                                &proto.return_declarator,
                                true,
                            )?,
                        });
                    }
                }
                TypeCategory::Struct | TypeCategory::Union => file.structs.push(StructView {
                    name,
                    is_union: ty.category == TypeCategory::Union,
                    members: self.members(&ty.members)?,
                    comment: ty.comment.clone(),
                }),
                TypeCategory::Enum
                | TypeCategory::Include
                | TypeCategory::Define
                | TypeCategory::External => {}
            }
        }

        Ok(file)
    }

    /// Struct members; runs of C bitfields share one field of their base type.
    fn members(&self, members: &[Member]) -> Result<Vec<MemberView>, FatalError> {
        let syntax = &self.config.syntax;
        let mut views = Vec::new();
        let mut i = 0;
        while i < members.len() {
            let member = &members[i];
            let ty = decorate(
                &member.name,
                self.target_name(&member.ty)?,
                &member.declarator,
                &member.len,
                false,
                syntax,
            )?;

            if member.declarator.bitfield.is_none() {
                views.push(MemberView {
                    name: field_ident(&member.name),
                    ty,
                    comment: member.comment.clone(),
                });
                i += 1;
                continue;
            }

            let mut names = Vec::new();
            let mut widths = Vec::new();
            let mut total = 0u32;
            while let Some(width) = members.get(i).and_then(|m| m.declarator.bitfield) {
                if total + u32::from(width) > 32 {
                    break;
                }
                total += u32::from(width);
                names.push(members[i].name.as_str());
                widths.push(format!("{}:{}", members[i].name, width));
                i += 1;
            }
            if names.is_empty() {
                // a single field wider than its storage; keep it as written
                names.push(member.name.as_str());
                i += 1;
            }
            views.push(MemberView {
                name: field_ident(&names.join("_")),
                ty,
                comment: Some(format!("bitfield {}", widths.join(", "))),
            });
        }
        Ok(views)
    }

    //----------------------------------------------------------------------------------------------
    pub(super) fn procedures_file(&self) -> Result<ProceduresFile, FatalError> {
        let mut procedures = Vec::new();
        for (id, command) in self.registry.commands.iter() {
            if !self.selection.command(id) {
                continue;
            }
            let name = self.proc_type_name(&command.name);
            if let Some(alias) = command.alias.as_ref() {
                procedures.push(Procedure {
                    name,
                    alias: Some(self.proc_type_name(&alias.name)),
                    params: Vec::new(),
                    ret: String::new(),
                });
                continue;
            }

            let ret = match command.return_type.as_ref() {
                Some(ret) => {
                    self.declared_type(self.target_name(ret)?, &command.return_declarator, true)?
                }
                None => String::new(),
            };
            procedures.push(Procedure {
                name,
                alias: None,
                params: self.params(&command.params)?,
                ret,
            });
        }
        Ok(ProceduresFile { procedures })
    }

    pub(super) fn loader_file(&self) -> Result<LoaderFile, FatalError> {
        let mut tables: Vec<LoaderTable> = [
            ("Global", Dispatch::Global),
            ("Instance", Dispatch::Instance),
            ("Device", Dispatch::Device),
        ]
        .iter()
        .map(|(name, dispatch)| LoaderTable {
            name: String::from(*name),
            dispatch: dispatch.to_string(),
            entries: Vec::new(),
        })
        .collect();

        for (id, command) in self.registry.commands.iter() {
            if !self.selection.command(id) {
                continue;
            }
            let table = match classify(self.registry, id)? {
                Dispatch::Global => &mut tables[0],
                Dispatch::Instance => &mut tables[1],
                Dispatch::Device => &mut tables[2],
            };
            table.entries.push(LoaderEntry {
                field: command_name(&command.name, &self.config.syntax),
                proc_type: self.proc_type_name(&command.name),
                symbol: command.name.clone(),
            });
        }
        Ok(LoaderFile { tables })
    }

    pub(super) fn formats_file(&self) -> Result<FormatsFile, FatalError> {
        let registry = self.registry;
        let mut formats = Vec::new();
        for (_, format) in registry.formats.iter() {
            let field = match format.field.target() {
                Some(field) => field,
                None => continue,
            };
            if !self.selection.field(field) {
                continue;
            }
            let e = &registry.enums[field.enum_id];
            formats.push(FormatView {
                name: self.field_name(e, &format.field.name),
                class: format.class.clone(),
                block_size: format.block_size,
                texels_per_block: format.texels_per_block,
                block_extent: format
                    .block_extent
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                packed: format.packed.unwrap_or(0),
                compressed: format.compressed.clone().unwrap_or_default(),
                chroma: format.chroma.clone().unwrap_or_default(),
                component_count: format.components.len(),
                plane_count: format.planes.len(),
            });
        }
        Ok(FormatsFile { formats })
    }
}
