//! Ingestion: one walk over the element tree per entity table.
//!
//! Every record produced here carries its cross-references as bare names;
//! nothing is resolved until the linking pass runs over the finished tables.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::c_parser;
use crate::dom::{Document, NodeId};
use crate::registry::{Registry, API_CONSTANTS};
use crate::types::*;
use crate::util::*;

//--------------------------------------------------------------------------------------------------
pub(crate) struct ParseCtx<'d> {
    doc: &'d Document,
    api: &'d str,
    /// Enum fields defined only in elements the API filter rejected.
    dropped_fields: RefCell<HashSet<String>>,
}

impl<'d> ParseCtx<'d> {
    /// Whether an entity tagged with `api` survives filtering.
    fn admits(&self, api: &[String]) -> bool {
        api_matches(api, self.api)
    }

    /// Remembers every enum field defined at or below a rejected element.
    fn drop_fields(&self, node: NodeId) {
        let mut dropped = self.dropped_fields.borrow_mut();
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            let defines = ["value", "bitpos", "offset", "alias"]
                .iter()
                .any(|key| self.doc.attr(id, key).is_some());
            if self.doc.name(id) == "enum" && defines {
                if let Some(name) = self.doc.attr(id, "name") {
                    dropped.insert(String::from(name));
                }
            }
            pending.extend(self.doc.children(id));
        }
    }

    fn element(&self, id: NodeId) -> Element<'d> {
        Element::new(self.doc, id)
    }

    fn name_of(&self, node: NodeId, name: Option<String>) -> Result<String, FatalError> {
        match name {
            Some(name) => Ok(name),
            None => self
                .doc
                .child(node, "name")
                .map(|n| String::from(self.doc.text(n).trim()))
                .ok_or_else(|| FatalError::MissingElement {
                    xpath: self.doc.xpath(node),
                    name: String::from("name"),
                }),
        }
    }

    fn comment_child(&self, node: NodeId) -> Option<String> {
        self.doc
            .child(node, "comment")
            .map(|c| String::from(self.doc.text(c).trim()))
    }
}

//--------------------------------------------------------------------------------------------------
macro_rules! unwrap_attribute (
    ($ctx:expr, $node:expr, $attribute:ident) => {
        let $attribute = match $attribute {
            Some(val) => val,
            None => {
                return Err(FatalError::MissingAttribute {
                    xpath: $ctx.doc.xpath($node),
                    name: String::from(stringify!($attribute)),
                });
            }
        };
    };
);

macro_rules! match_attributes {
    ($ctx:expr, $node:expr, $value:ident, $($p:pat => $e:expr),+ $(,)?) => {
        for (key, $value) in &$ctx.doc.node($node).attributes {
            match key.as_str() {
                $(
                    $p => $e,
                )+
                _ => tracing::trace!(
                    xpath = %$ctx.doc.xpath($node),
                    "ignoring attribute '{}'",
                    key
                ),
            }
        }
    };
}

macro_rules! filtered {
    ($ctx:expr, $kind:expr, $name:expr) => {
        tracing::debug!("dropping {} '{}': not part of '{}'", $kind, $name, $ctx.api);
    };
}

//--------------------------------------------------------------------------------------------------
/// Builds the entity tables from `document`, keeping only what applies to `api`.
pub(crate) fn parse_registry(document: Document, api: &str) -> Result<Registry, FatalError> {
    let mut registry = Registry::empty(api);
    {
        let ctx = ParseCtx {
            doc: &document,
            api,
            dropped_fields: RefCell::default(),
        };
        let doc = ctx.doc;
        let root = doc.root();

        for section in doc.children_named(root, "platforms") {
            parse_platforms(&ctx, section, &mut registry)?;
        }
        for section in doc.children_named(root, "tags") {
            parse_tags(&ctx, section, &mut registry)?;
        }
        for section in doc.children_named(root, "types") {
            parse_types(&ctx, section, &mut registry)?;
        }
        for section in doc.children_named(root, "enums") {
            parse_enums(&ctx, section, &mut registry)?;
        }
        registry.api_constants_id()?;
        for section in doc.children_named(root, "commands") {
            parse_commands(&ctx, section, &mut registry)?;
        }
        for node in doc.children_named(root, "feature") {
            if let Some(feature) = parse_feature(&ctx, node)? {
                registry.features.insert(feature.name.clone(), feature)?;
            }
        }
        for section in doc.children_named(root, "extensions") {
            for node in doc.children_named(section, "extension") {
                if let Some(extension) = parse_extension(&ctx, node)? {
                    registry.extensions.insert(extension.name.clone(), extension)?;
                }
            }
        }
        for section in doc.children_named(root, "formats") {
            for node in doc.children_named(section, "format") {
                let format = parse_format(&ctx, node)?;
                registry.formats.insert(format.field.name.clone(), format)?;
            }
        }
        registry.dropped_fields = ctx.dropped_fields.into_inner();
    }
    registry.document = document;
    Ok(registry)
}

//--------------------------------------------------------------------------------------------------
fn parse_platforms(
    ctx: &ParseCtx,
    section: NodeId,
    registry: &mut Registry,
) -> Result<(), FatalError> {
    for node in ctx.doc.children_named(section, "platform") {
        let e = ctx.element(node);
        let platform = Platform {
            name: String::from(e.required("name")?),
            protect: String::from(e.required("protect")?),
            comment: e.owned_attr("comment"),
        };
        registry.platforms.insert(platform.name.clone(), platform)?;
    }
    Ok(())
}

fn parse_tags(ctx: &ParseCtx, section: NodeId, registry: &mut Registry) -> Result<(), FatalError> {
    for node in ctx.doc.children_named(section, "tag") {
        let e = ctx.element(node);
        let tag = Tag {
            name: String::from(e.required("name")?),
            author: String::from(e.required("author")?),
            contact: String::from(e.required("contact")?),
        };
        registry.tags.insert(tag.name.clone(), tag)?;
    }
    Ok(())
}

//--------------------------------------------------------------------------------------------------
fn parse_types(ctx: &ParseCtx, section: NodeId, registry: &mut Registry) -> Result<(), FatalError> {
    for node in ctx.doc.children_named(section, "type") {
        if let Some(ty) = parse_type(ctx, node)? {
            registry.types.insert(ty.name.clone(), ty)?;
        }
    }
    Ok(())
}

fn parse_type(ctx: &ParseCtx, node: NodeId) -> Result<Option<Type>, FatalError> {
    let mut api = Vec::new();
    let mut alias = None;
    let mut requires = None;
    let mut name = None;
    let mut category = None;
    let mut parent = Vec::new();
    let mut returnedonly = false;
    let mut structextends = Vec::new();
    let mut allowduplicate = false;
    let mut objtypeenum = None;
    let mut bitvalues = None;
    let mut comment = None;

    match_attributes! {ctx, node, value,
        "api" => api = split_list(value),
        "alias" => alias = Some(value.clone()),
        "requires" => requires = Some(value.clone()),
        "name" => name = Some(value.clone()),
        "category" => category = Some(value.clone()),
        "parent" => parent = split_list(value),
        "returnedonly" => returnedonly = value == "true",
        "structextends" => structextends = split_list(value),
        "allowduplicate" => allowduplicate = value == "true",
        "objtypeenum" => objtypeenum = Some(value.clone()),
        "bitvalues" => bitvalues = Some(value.clone()),
        "comment" => comment = Some(value.clone()),
    }

    let name = ctx.name_of(node, name)?;
    if !ctx.admits(&api) {
        filtered!(ctx, EntityKind::Type, name);
        return Ok(None);
    }

    let category = TypeCategory::from_attribute(category.as_deref()).ok_or_else(|| {
        FatalError::SchemaViolation {
            xpath: ctx.doc.xpath(node),
            desc: format!("unknown type category {:?}", category),
        }
    })?;

    let mut ty = Type::new(name, category, node);
    ty.api = api;
    ty.comment = comment;
    ty.requires = requires.map(Link::new);

    if let Some(alias) = alias {
        ty.alias = Some(Link::new(alias));
        return Ok(Some(ty));
    }

    let child_type = ctx
        .doc
        .child(node, "type")
        .map(|t| String::from(ctx.doc.text(t).trim()));

    match category {
        TypeCategory::Define => {
            ty.define = Some(String::from(
                ctx.doc.text_without(node, &["comment"]).trim(),
            ));
        }
        TypeCategory::Basetype => {
            ty.subtype = child_type.map(Link::new);
            if ty.subtype.is_some() {
                let text = ctx.doc.text_without(node, &["comment"]);
                let text = text.trim().trim_start_matches("typedef");
                if let Some(decl) = c_parser::parse_declaration(text) {
                    ty.subtype_declarator = decl.declarator;
                }
            }
        }
        TypeCategory::Bitmask => {
            ty.subtype = child_type.map(Link::new);
            // older registries name the FlagBits type through `requires`
            let bitvalues = match bitvalues {
                Some(bitvalues) => Some(bitvalues),
                None => ty.requires.take().map(|l| l.name),
            };
            ty.bitvalues = bitvalues.map(Link::new);
        }
        TypeCategory::Handle => {
            ty.handle_kind = match child_type.as_deref() {
                Some("VK_DEFINE_HANDLE") => Some(HandleKind::Dispatch),
                Some("VK_DEFINE_NON_DISPATCHABLE_HANDLE") => Some(HandleKind::NoDispatch),
                other => {
                    return Err(FatalError::SchemaViolation {
                        xpath: ctx.doc.xpath(node),
                        desc: format!("unknown handle definition {:?}", other),
                    })
                }
            };
            ty.parents = parent.into_iter().map(Link::new).collect();
            ty.objtypeenum = objtypeenum;
        }
        TypeCategory::FuncPointer => {
            ty.proto = Some(parse_funcpointer_proto(ctx, node)?);
        }
        TypeCategory::Struct | TypeCategory::Union => {
            for member in ctx.doc.children_named(node, "member") {
                if let Some(member) = parse_member(ctx, member)? {
                    ty.members.push(member);
                }
            }
            ty.struct_extends = structextends.into_iter().map(Link::new).collect();
            ty.returned_only = returnedonly;
            ty.allow_duplicate = allowduplicate;
        }
        TypeCategory::External | TypeCategory::Include | TypeCategory::Enum => {}
    }

    Ok(Some(ty))
}

fn parse_funcpointer_proto(ctx: &ParseCtx, node: NodeId) -> Result<FuncProto, FatalError> {
    if let Some(proto) = ctx.doc.child(node, "proto") {
        let (return_type, return_declarator, _) = parse_proto(ctx, proto)?;
        let mut params = Vec::new();
        for param in ctx.doc.children_named(node, "param") {
            if let Some(param) = parse_member(ctx, param)? {
                params.push(param);
            }
        }
        return Ok(FuncProto {
            return_type: Link::new(return_type),
            return_declarator,
            params,
        });
    }

    let text = ctx.doc.text_without(node, &["comment"]);
    let parsed =
        c_parser::parse_funcpointer(&text).ok_or_else(|| FatalError::SchemaViolation {
            xpath: ctx.doc.xpath(node),
            desc: format!("cannot parse function pointer '{}'", text.trim()),
        })?;

    Ok(FuncProto {
        return_type: Link::new(parsed.return_type),
        return_declarator: parsed.return_declarator,
        params: parsed
            .params
            .into_iter()
            .map(|p| {
                let mut member = Member::new(p.name, p.type_name);
                member.declarator = p.declarator;
                member
            })
            .collect(),
    })
}

/// `<proto>` of a command or funcpointer: return type, its shape and the name.
fn parse_proto(ctx: &ParseCtx, proto: NodeId) -> Result<(String, Declarator, String), FatalError> {
    let text = ctx.doc.text_without(proto, &["comment"]);
    let decl = c_parser::parse_declaration(&text).ok_or_else(|| FatalError::SchemaViolation {
        xpath: ctx.doc.xpath(proto),
        desc: format!("cannot parse prototype '{}'", text.trim()),
    })?;
    Ok((decl.type_name, decl.declarator, decl.name))
}

/// A struct/union `<member>`, or a command/funcpointer `<param>`.
fn parse_member(ctx: &ParseCtx, node: NodeId) -> Result<Option<Member>, FatalError> {
    let mut api = Vec::new();
    let mut len = None;
    let mut altlen = None;
    let mut optional = Vec::new();
    let mut externsync = None;
    let mut noautovalidity = false;
    let mut selector = None;
    let mut selection = Vec::new();
    let mut values = Vec::new();

    match_attributes! {ctx, node, value,
        "api" => api = split_list(value),
        "len" => len = Some(value.clone()),
        "altlen" => altlen = Some(value.clone()),
        "optional" => optional = split_list(value).into_iter().map(|o| o == "true").collect(),
        "externsync" => externsync = Some(value.clone()),
        "noautovalidity" => noautovalidity = value == "true",
        "selector" => selector = Some(value.clone()),
        "selection" => selection = split_list(value),
        "values" => values = split_list(value),
    }

    let text = ctx.doc.text_without(node, &["comment"]);
    let decl = c_parser::parse_declaration(&text).ok_or_else(|| FatalError::SchemaViolation {
        xpath: ctx.doc.xpath(node),
        desc: format!("cannot parse declaration '{}'", text.trim()),
    })?;

    if !ctx.admits(&api) {
        filtered!(ctx, EntityKind::Parameter, decl.name);
        return Ok(None);
    }

    let mut member = Member::new(decl.name, decl.type_name);
    member.declarator = decl.declarator;
    member.len = parse_lengths(len.as_deref(), altlen.as_deref());
    member.altlen = altlen;
    member.optional = optional;
    member.externsync = externsync;
    member.noautovalidity = noautovalidity;
    member.selector = selector.map(Link::new);
    member.selection = selection;
    member.values = values;
    member.api = api;
    member.comment = ctx.comment_child(node);
    Ok(Some(member))
}

/// Splits a `len` attribute into one hint per indirection level. Commas inside
/// latexmath brackets do not separate levels.
pub(crate) fn parse_lengths(len: Option<&str>, altlen: Option<&str>) -> Vec<LengthHint> {
    let len = match len {
        Some(len) => len,
        None => return Vec::new(),
    };

    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in len.char_indices() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&len[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&len[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|part| {
            if part == "null-terminated" {
                LengthHint::NullTerminated
            } else if let Some(latex) = part.strip_prefix("latexmath:") {
                LengthHint::Latexmath {
                    latex: String::from(latex),
                    c_expr: altlen.map(String::from),
                }
            } else if let Some((sibling, field)) = part.split_once("->") {
                LengthHint::SiblingField {
                    sibling: Link::new(sibling.trim()),
                    field: String::from(field.trim()),
                }
            } else if let Ok(n) = part.parse::<u32>() {
                LengthHint::Literal(n)
            } else if is_identifier(part) {
                LengthHint::Sibling(Link::new(part))
            } else {
                LengthHint::Expression(String::from(part))
            }
        })
        .collect()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

//--------------------------------------------------------------------------------------------------
fn parse_enums(ctx: &ParseCtx, node: NodeId, registry: &mut Registry) -> Result<(), FatalError> {
    let mut name = None;
    let mut kind = None;
    let mut bitwidth = None;
    let mut comment = None;

    match_attributes! {ctx, node, value,
        "name" => name = Some(value.clone()),
        "type" => kind = Some(value.clone()),
        "bitwidth" => bitwidth = Some(value.clone()),
        "comment" => comment = Some(value.clone()),
    }

    unwrap_attribute!(ctx, node, name);
    let kind = match kind.as_deref() {
        None | Some("constants") => EnumKind::Constants,
        Some("enum") => EnumKind::Enum,
        Some("bitmask") => EnumKind::Bitmask,
        Some(other) => {
            return Err(FatalError::SchemaViolation {
                xpath: ctx.doc.xpath(node),
                desc: format!("unknown enums type '{}'", other),
            })
        }
    };

    let mut e = Enum::new(name, kind, Some(node));
    e.comment = comment;
    e.bitwidth = match bitwidth {
        None => None,
        Some(text) => Some(text.parse().map_err(|_| FatalError::MalformedLiteral {
            xpath: xpath_attribute(&ctx.doc.xpath(node), "bitwidth"),
            text,
        })?),
    };

    for child in ctx.doc.children_named(node, "enum") {
        if let Some(field) = parse_enum_field(ctx, child, kind)? {
            if e.fields.contains_key(&field.name) {
                return Err(FatalError::DuplicateEntity {
                    kind: EntityKind::EnumField,
                    name: field.name,
                });
            }
            e.fields.insert(field.name.clone(), field);
        }
    }

    let is_constants = e.name == API_CONSTANTS;
    let id = registry.enums.insert(e.name.clone(), e)?;
    if is_constants {
        registry.api_constants = Some(id);
    }
    Ok(())
}

fn parse_enum_field(
    ctx: &ParseCtx,
    node: NodeId,
    kind: EnumKind,
) -> Result<Option<EnumField>, FatalError> {
    let mut name = None;
    let mut value = None;
    let mut bitpos = None;
    let mut alias = None;
    let mut type_suffix = None;
    let mut api = Vec::new();
    let mut comment = None;
    let mut deprecated = None;
    let mut protect = None;

    match_attributes! {ctx, node, v,
        "name" => name = Some(v.clone()),
        "value" => value = Some(v.clone()),
        "bitpos" => bitpos = Some(v.clone()),
        "alias" => alias = Some(v.clone()),
        "type" => type_suffix = Some(v.clone()),
        "api" => api = split_list(v),
        "comment" => comment = Some(v.clone()),
        "deprecated" => deprecated = Some(v.clone()),
        "protect" => protect = Some(v.clone()),
    }

    unwrap_attribute!(ctx, node, name);
    if !ctx.admits(&api) {
        filtered!(ctx, EntityKind::EnumField, name);
        ctx.drop_fields(node);
        return Ok(None);
    }

    let xpath = ctx.doc.xpath(node);
    let value = if let Some(bitpos) = bitpos {
        EnumValue::Bitpos(parse_bitpos(&bitpos, &xpath)?)
    } else if let Some(value) = value {
        enum_literal(&value, kind, &xpath)?
    } else if let Some(alias) = alias {
        EnumValue::Alias(Link::new(alias))
    } else {
        return Err(FatalError::UnvaluedEnumField { xpath, name });
    };

    Ok(Some(EnumField {
        name,
        value,
        type_suffix,
        origin: Origin::Core,
        protect,
        deprecated,
        comment,
        node,
    }))
}

pub(crate) fn parse_bitpos(text: &str, xpath: &str) -> Result<u32, FatalError> {
    text.trim()
        .parse()
        .map_err(|_| FatalError::MalformedLiteral {
            xpath: xpath_attribute(xpath, "bitpos"),
            text: String::from(text),
        })
}

/// An integer where one parses; verbatim text is only tolerated for constants.
pub(crate) fn enum_literal(text: &str, kind: EnumKind, xpath: &str) -> Result<EnumValue, FatalError> {
    let text = unescape_quotes(text);
    if let Some(v) = parse_integer(&text) {
        return Ok(EnumValue::Literal(Literal::Int(v)));
    }
    match kind {
        EnumKind::Constants => Ok(EnumValue::Literal(Literal::Text(text))),
        EnumKind::Enum | EnumKind::Bitmask => Err(FatalError::MalformedLiteral {
            xpath: xpath_attribute(xpath, "value"),
            text,
        }),
    }
}

//--------------------------------------------------------------------------------------------------
fn parse_commands(
    ctx: &ParseCtx,
    section: NodeId,
    registry: &mut Registry,
) -> Result<(), FatalError> {
    for node in ctx.doc.children_named(section, "command") {
        if let Some(command) = parse_command(ctx, node)? {
            registry.commands.insert(command.name.clone(), command)?;
        }
    }
    Ok(())
}

fn parse_command(ctx: &ParseCtx, node: NodeId) -> Result<Option<Command>, FatalError> {
    let mut name = None;
    let mut alias = None;
    let mut api = Vec::new();
    let mut successcodes = Vec::new();
    let mut errorcodes = Vec::new();
    let mut queues = Vec::new();
    let mut renderpass = None;
    let mut cmdbufferlevel = Vec::new();
    let mut comment = None;

    match_attributes! {ctx, node, value,
        "name" => name = Some(value.clone()),
        "alias" => alias = Some(value.clone()),
        "api" => api = split_list(value),
        "successcodes" => successcodes = split_list(value),
        "errorcodes" => errorcodes = split_list(value),
        "queues" => queues = split_list(value),
        "renderpass" => renderpass = Some(value.clone()),
        "cmdbufferlevel" => cmdbufferlevel = split_list(value),
        "comment" => comment = Some(value.clone()),
    }

    let mut command = Command {
        name: String::new(),
        alias: alias.map(Link::new),
        api,
        return_type: None,
        return_declarator: Declarator::default(),
        params: Vec::new(),
        successcodes,
        errorcodes,
        queues: CommandQueue::empty(),
        renderpass,
        cmdbufferlevel,
        comment,
        node,
    };

    for queue in &queues {
        match CommandQueue::from_name(queue) {
            Some(flag) => command.queues |= flag,
            None => tracing::debug!(xpath = %ctx.doc.xpath(node), "unknown queue '{}'", queue),
        }
    }

    if command.alias.is_some() {
        unwrap_attribute!(ctx, node, name);
        command.name = name;
    } else {
        let proto = ctx
            .doc
            .child(node, "proto")
            .ok_or_else(|| FatalError::MissingElement {
                xpath: ctx.doc.xpath(node),
                name: String::from("proto"),
            })?;
        let (return_type, return_declarator, proto_name) = parse_proto(ctx, proto)?;
        command.name = proto_name;
        command.return_type = Some(Link::new(return_type));
        command.return_declarator = return_declarator;
    }

    if !ctx.admits(&command.api) {
        filtered!(ctx, EntityKind::Command, command.name);
        return Ok(None);
    }

    for param in ctx.doc.children_named(node, "param") {
        if let Some(param) = parse_member(ctx, param)? {
            command.params.push(param);
        }
    }

    Ok(Some(command))
}

//--------------------------------------------------------------------------------------------------
fn parse_version(text: &str, xpath: &str) -> Result<Version, FatalError> {
    let malformed = || FatalError::MalformedLiteral {
        xpath: xpath_attribute(xpath, "number"),
        text: String::from(text),
    };
    let (major, minor) = text.split_once('.').ok_or_else(malformed)?;
    Ok(Version {
        major: major.trim().parse().map_err(|_| malformed())?,
        minor: minor.trim().parse().map_err(|_| malformed())?,
    })
}

fn parse_feature(ctx: &ParseCtx, node: NodeId) -> Result<Option<Feature>, FatalError> {
    let mut api = Vec::new();
    let mut name = None;
    let mut number = None;
    let mut depends = None;
    let mut comment = None;

    match_attributes! {ctx, node, value,
        "api" => api = split_list(value),
        "name" => name = Some(value.clone()),
        "number" => number = Some(value.clone()),
        "depends" => depends = Some(value.clone()),
        "comment" => comment = Some(value.clone()),
    }

    unwrap_attribute!(ctx, node, name);
    unwrap_attribute!(ctx, node, number);
    if !ctx.admits(&api) {
        filtered!(ctx, EntityKind::Feature, name);
        ctx.drop_fields(node);
        return Ok(None);
    }

    let version = parse_version(&number, &ctx.doc.xpath(node))?;
    let (requires, removes) = parse_clauses(ctx, node)?;
    Ok(Some(Feature {
        name,
        api,
        version,
        depends,
        requires,
        removes,
        comment,
        node,
    }))
}

fn parse_extension(ctx: &ParseCtx, node: NodeId) -> Result<Option<Extension>, FatalError> {
    let mut name = None;
    let mut number = None;
    let mut ext_type = None;
    let mut platform = None;
    let mut author = None;
    let mut contact = None;
    let mut supported = None;
    let mut depends = None;
    let mut requires = None;
    let mut promotedto = None;
    let mut deprecatedby = None;
    let mut obsoletedby = None;
    let mut provisional = false;
    let mut specialuse = Vec::new();
    let mut comment = None;

    match_attributes! {ctx, node, value,
        "name" => name = Some(value.clone()),
        "number" => number = Some(value.clone()),
        "type" => ext_type = Some(value.clone()),
        "platform" => platform = Some(value.clone()),
        "author" => author = Some(value.clone()),
        "contact" => contact = Some(value.clone()),
        "supported" => supported = Some(split_supported(value)),
        "depends" => depends = Some(value.clone()),
        "requires" => requires = Some(value.clone()),
        "promotedto" => promotedto = Some(value.clone()),
        "deprecatedby" => deprecatedby = Some(value.clone()),
        "obsoletedby" => obsoletedby = Some(value.clone()),
        "provisional" => provisional = value == "true",
        "specialuse" => specialuse = split_list(value),
        "sortorder" => {},
        "comment" => comment = Some(value.clone()),
    }

    unwrap_attribute!(ctx, node, name);
    unwrap_attribute!(ctx, node, supported);
    if !supported.iter().any(|s| s == ctx.api) {
        filtered!(ctx, EntityKind::Extension, name);
        ctx.drop_fields(node);
        return Ok(None);
    }

    let e = ctx.element(node);
    unwrap_attribute!(ctx, node, number);
    let number = parse_integer(&number).ok_or_else(|| FatalError::MalformedLiteral {
        xpath: xpath_attribute(&e.xpath(), "number"),
        text: number.clone(),
    })?;
    let sortorder = e.integer("sortorder")?;

    let ext_type = match ext_type.as_deref() {
        None => None,
        Some("instance") => Some(ExtensionType::Instance),
        Some("device") => Some(ExtensionType::Device),
        Some(other) => {
            return Err(FatalError::SchemaViolation {
                xpath: e.xpath(),
                desc: format!("unknown extension type '{}'", other),
            })
        }
    };

    let (requires_clauses, removes) = parse_clauses(ctx, node)?;
    Ok(Some(Extension {
        name,
        number,
        ext_type,
        platform: platform.map(Link::new),
        author,
        contact,
        supported,
        // older registries list dependencies as a plain comma list
        depends: depends.or_else(|| requires.map(|r| split_list(&r).join("+"))),
        promotedto,
        deprecatedby,
        obsoletedby,
        provisional,
        specialuse,
        sortorder,
        requires: requires_clauses,
        removes,
        comment,
        node,
    }))
}

/// `supported` lists have used both `,` and `|` as separators.
fn split_supported(text: &str) -> Vec<String> {
    text.split(|c| c == ',' || c == '|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_clauses(ctx: &ParseCtx, node: NodeId) -> Result<(Vec<Require>, Vec<Remove>), FatalError> {
    let mut requires = Vec::new();
    let mut removes = Vec::new();
    for child in ctx.doc.children(node) {
        match ctx.doc.name(child) {
            "require" => {
                if let Some(require) = parse_require(ctx, child)? {
                    requires.push(require);
                }
            }
            "remove" => {
                if let Some(remove) = parse_remove(ctx, child) {
                    removes.push(remove);
                }
            }
            _ => {}
        }
    }
    Ok((requires, removes))
}

fn parse_require(ctx: &ParseCtx, node: NodeId) -> Result<Option<Require>, FatalError> {
    let mut api = Vec::new();
    let mut depends = None;
    let mut comment = None;
    let mut extension = None;
    let mut feature = None;

    match_attributes! {ctx, node, value,
        "api" => api = split_list(value),
        "depends" => depends = Some(value.clone()),
        "comment" => comment = Some(value.clone()),
        "extension" => extension = Some(value.clone()),
        "feature" => feature = Some(value.clone()),
    }

    if !ctx.admits(&api) {
        tracing::debug!(xpath = %ctx.doc.xpath(node), "dropping require block");
        ctx.drop_fields(node);
        return Ok(None);
    }

    let mut require = Require {
        api,
        depends: depends.or_else(|| match (feature, extension) {
            (Some(f), Some(e)) => Some(format!("{}+{}", f, e)),
            (f, e) => f.or(e),
        }),
        comment,
        ..Default::default()
    };

    for child in ctx.doc.children(node) {
        let e = ctx.element(child);
        match ctx.doc.name(child) {
            "type" => require.types.push(Link::new(e.required("name")?)),
            "command" => require.commands.push(Link::new(e.required("name")?)),
            "enum" => {
                if let Some(contribution) = parse_contribution(ctx, child)? {
                    require.contributions.push(contribution);
                }
            }
            _ => {}
        }
    }

    Ok(Some(require))
}

fn parse_remove(ctx: &ParseCtx, node: NodeId) -> Option<Remove> {
    let e = ctx.element(node);
    let api = e.list("api");
    if !ctx.admits(&api) {
        return None;
    }

    let mut remove = Remove {
        api,
        comment: e.owned_attr("comment"),
        ..Default::default()
    };
    for child in ctx.doc.children(node) {
        let name = match ctx.doc.attr(child, "name") {
            Some(name) => String::from(name),
            None => continue,
        };
        match ctx.doc.name(child) {
            "type" => remove.types.push(name),
            "command" => remove.commands.push(name),
            "enum" => remove.enums.push(name),
            _ => {}
        }
    }
    Some(remove)
}

fn parse_contribution(
    ctx: &ParseCtx,
    node: NodeId,
) -> Result<Option<EnumContribution>, FatalError> {
    let mut name = None;
    let mut extends = None;
    let mut bitpos = None;
    let mut offset = None;
    let mut extnumber = None;
    let mut dir = None;
    let mut value = None;
    let mut alias = None;
    let mut type_suffix = None;
    let mut api = Vec::new();
    let mut protect = None;
    let mut deprecated = None;
    let mut comment = None;

    match_attributes! {ctx, node, v,
        "name" => name = Some(v.clone()),
        "extends" => extends = Some(v.clone()),
        "bitpos" => bitpos = Some(v.clone()),
        "offset" => offset = Some(v.clone()),
        "extnumber" => extnumber = Some(v.clone()),
        "dir" => dir = Some(v.clone()),
        "value" => value = Some(v.clone()),
        "alias" => alias = Some(v.clone()),
        "type" => type_suffix = Some(v.clone()),
        "api" => api = split_list(v),
        "protect" => protect = Some(v.clone()),
        "deprecated" => deprecated = Some(v.clone()),
        "comment" => comment = Some(v.clone()),
    }

    unwrap_attribute!(ctx, node, name);
    if !ctx.admits(&api) {
        filtered!(ctx, EntityKind::EnumField, name);
        ctx.drop_fields(node);
        return Ok(None);
    }

    let e = ctx.element(node);
    let xpath = e.xpath();
    let kind = if let Some(bitpos) = bitpos {
        ContributionKind::Bitpos(parse_bitpos(&bitpos, &xpath)?)
    } else if offset.is_some() {
        let offset = e.integer("offset")?.unwrap_or_default();
        let extnumber = match extnumber {
            Some(_) => e.integer("extnumber")?,
            None => None,
        };
        ContributionKind::Offset {
            offset,
            extnumber,
            negative: dir.is_some(),
        }
    } else if let Some(value) = value {
        ContributionKind::Value(unescape_quotes(&value))
    } else if let Some(alias) = alias {
        ContributionKind::Alias(alias)
    } else {
        ContributionKind::Reference
    };

    Ok(Some(EnumContribution {
        name,
        extends,
        kind,
        type_suffix,
        protect,
        deprecated,
        comment,
        xpath,
        node,
    }))
}

//--------------------------------------------------------------------------------------------------
fn parse_format(ctx: &ParseCtx, node: NodeId) -> Result<Format, FatalError> {
    let e = ctx.element(node);
    let small = |element: &Element, key: &str| -> Result<Option<u8>, FatalError> {
        match element.integer(key)? {
            None => Ok(None),
            Some(v) if (0..=i64::from(u8::MAX)).contains(&v) => Ok(Some(v as u8)),
            Some(v) => Err(FatalError::MalformedLiteral {
                xpath: xpath_attribute(&element.xpath(), key),
                text: v.to_string(),
            }),
        }
    };
    let required_small = |element: &Element, key: &str| -> Result<u8, FatalError> {
        small(element, key)?.ok_or_else(|| FatalError::MissingAttribute {
            xpath: element.xpath(),
            name: String::from(key),
        })
    };

    let block_extent = match e.attr("blockExtent") {
        None => [1, 1, 1],
        Some(text) => {
            let dims: Vec<u32> = split_list(text)
                .iter()
                .map(|d| d.parse())
                .collect::<Result<_, _>>()
                .map_err(|_| FatalError::MalformedLiteral {
                    xpath: xpath_attribute(&e.xpath(), "blockExtent"),
                    text: String::from(text),
                })?;
            match dims.as_slice() {
                [w, h, d] => [*w, *h, *d],
                _ => {
                    return Err(FatalError::MalformedLiteral {
                        xpath: xpath_attribute(&e.xpath(), "blockExtent"),
                        text: String::from(text),
                    })
                }
            }
        }
    };

    let mut format = Format {
        field: Link::new(e.required("name")?),
        class: String::from(e.required("class")?),
        block_size: required_small(&e, "blockSize")?,
        texels_per_block: required_small(&e, "texelsPerBlock")?,
        block_extent,
        packed: small(&e, "packed")?,
        compressed: e.owned_attr("compressed"),
        chroma: e.owned_attr("chroma"),
        components: Vec::new(),
        planes: Vec::new(),
        spirv_image_formats: Vec::new(),
        node,
    };

    for child in ctx.doc.children(node) {
        let c = ctx.element(child);
        match ctx.doc.name(child) {
            "component" => format.components.push(FormatComponent {
                name: String::from(c.required("name")?),
                bits: match c.required("bits")? {
                    "compressed" => ComponentBits::Compressed,
                    _ => ComponentBits::Bits(required_small(&c, "bits")?),
                },
                numeric_format: String::from(c.required("numericFormat")?),
                plane_index: small(&c, "planeIndex")?,
            }),
            "plane" => format.planes.push(FormatPlane {
                index: required_small(&c, "index")?,
                width_divisor: required_small(&c, "widthDivisor")?,
                height_divisor: required_small(&c, "heightDivisor")?,
                compatible: Link::new(c.required("compatible")?),
            }),
            "spirvimageformat" => format
                .spirv_image_formats
                .push(String::from(c.required("name")?)),
            _ => {}
        }
    }

    Ok(format)
}
