//! Maps C names and declarators onto the target syntax.
//!
//! The registry only encodes pointer depth in the C text and, by convention,
//! in the variable name (`pData`, `ppData`). Decoration follows the variable
//! name: a run of lowercase `p` in front of an uppercase letter counts the
//! indirection levels, and a length hint turns the outermost level into a
//! multi-pointer.

use heck::ToShoutySnakeCase;

use crate::config::Syntax;
use crate::types::{ArrayLength, Declarator, FatalError, LengthHint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirection {
    Pointer,
    MultiPointer,
}

/// Indirection levels of a variable, outermost first.
pub fn infer_indirection(
    var: &str,
    raw_type: &str,
    lengths: &[LengthHint],
    syntax: &Syntax,
) -> Vec<Indirection> {
    let plain = var.starts_with(|c: char| c.is_ascii_uppercase())
        || syntax.plain_values.iter().any(|p| p == var);

    let mut count = if plain {
        0
    } else {
        let run = var.chars().take_while(|c| *c == 'p').count();
        match var[run..].chars().next() {
            Some(c) if run > 0 && c.is_ascii_uppercase() => run,
            _ => 0,
        }
    };
    if raw_type == "void" && count == 0 {
        count = 1;
    }

    let mut levels = vec![Indirection::Pointer; count];
    match (levels.first_mut(), lengths.first()) {
        (Some(outer), Some(hint)) if *hint != LengthHint::NullTerminated => {
            *outer = Indirection::MultiPointer;
        }
        _ => {}
    }
    levels
}

fn render_levels(levels: &[Indirection], syntax: &Syntax) -> String {
    levels
        .iter()
        .map(|level| match level {
            Indirection::Pointer => syntax.pointer.as_str(),
            Indirection::MultiPointer => syntax.multi_pointer.as_str(),
        })
        .collect()
}

fn scalar(raw: &str, syntax: &Syntax) -> Option<String> {
    Some(String::from(match raw {
        "int8_t" => "i8",
        "uint8_t" => "u8",
        "int16_t" => "i16",
        "uint16_t" => "u16",
        "int32_t" | "int" => "i32",
        "uint32_t" => "u32",
        "int64_t" => "i64",
        "uint64_t" => "u64",
        "size_t" => "int",
        "float" => "f32",
        "double" => "f64",
        "VkBool32" => return Some(syntax.boolean.clone()),
        _ => return None,
    }))
}

/// `VkFoo` -> `Foo`, `PFN_vkFoo` -> `ProcFoo`; anything else is kept.
pub fn canonical_type_name(raw: &str, syntax: &Syntax) -> String {
    if let Some(rest) = raw.strip_prefix(syntax.proc_prefix.as_str()) {
        return format!("{}{}", syntax.proc_replacement, rest);
    }
    match raw.strip_prefix(syntax.type_prefix.as_str()) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => String::from(rest),
        _ => String::from(raw),
    }
}

/// `VK_UUID_SIZE` -> `UUID_SIZE`.
pub fn constant_name(raw: &str, syntax: &Syntax) -> String {
    match raw.strip_prefix(syntax.constant_prefix.as_str()) {
        Some(rest) if !rest.is_empty() => String::from(rest),
        _ => String::from(raw),
    }
}

/// `vkCreateInstance` -> `CreateInstance`.
pub fn command_name(raw: &str, syntax: &Syntax) -> String {
    match raw.strip_prefix(syntax.command_prefix.as_str()) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => String::from(rest),
        _ => String::from(raw),
    }
}

/// Mapped type name with its indirection applied.
///
/// `void` turns the innermost level into the opaque pointer and `char` turns a
/// singular innermost level into a C string. A `void` without indirection is
/// only accepted where `allow_void` is set, and maps to an empty string.
pub fn map_type_name(
    raw: &str,
    indirection: &[Indirection],
    allow_void: bool,
    syntax: &Syntax,
) -> Result<String, FatalError> {
    match raw {
        "void" => match indirection.split_last() {
            Some((_, outer)) => Ok(format!(
                "{}{}",
                render_levels(outer, syntax),
                syntax.opaque_pointer
            )),
            None if allow_void => Ok(String::new()),
            None => Err(FatalError::BareVoid {
                name: String::from(raw),
            }),
        },
        "char" => match indirection.split_last() {
            Some((Indirection::Pointer, outer)) => Ok(format!(
                "{}{}",
                render_levels(outer, syntax),
                syntax.c_string
            )),
            _ => Ok(format!("{}{}", render_levels(indirection, syntax), syntax.byte)),
        },
        _ => {
            let name = scalar(raw, syntax).unwrap_or_else(|| canonical_type_name(raw, syntax));
            Ok(format!("{}{}", render_levels(indirection, syntax), name))
        }
    }
}

/// Full target type of a member or parameter: fixed array dimensions, then
/// the inferred indirection, then the mapped type name.
pub fn decorate(
    var: &str,
    raw_type: &str,
    declarator: &Declarator,
    lengths: &[LengthHint],
    allow_void: bool,
    syntax: &Syntax,
) -> Result<String, FatalError> {
    let levels = infer_indirection(var, raw_type, lengths, syntax);
    if levels.len() != usize::from(declarator.pointers) {
        tracing::warn!(
            "'{}' is declared with {} pointer(s) but its name implies {}",
            var,
            declarator.pointers,
            levels.len()
        );
    }

    let mut result = String::new();
    for dim in &declarator.array {
        result.push('[');
        match dim {
            ArrayLength::Static(n) => result.push_str(&n.to_string()),
            ArrayLength::Constant(c) => result.push_str(&constant_name(c, syntax)),
        }
        result.push(']');
    }
    let mapped = map_type_name(raw_type, &levels, allow_void, syntax).map_err(|e| match e {
        FatalError::BareVoid { .. } => FatalError::BareVoid {
            name: String::from(var),
        },
        e => e,
    })?;
    result.push_str(&mapped);
    Ok(result)
}

//--------------------------------------------------------------------------------------------------
/// The vendor tag an enum or field name ends with, longest match first.
fn vendor_tag<'a>(name: &str, tags: &[&'a str]) -> Option<&'a str> {
    tags.iter()
        .filter(|t| name.ends_with(*t))
        .max_by_key(|t| t.len())
        .cloned()
}

/// SHOUTY prefix shared by the fields of an enum, `VkCullModeFlagBits` -> `VK_CULL_MODE_`.
pub fn enum_prefix(enum_name: &str, tags: &[&str]) -> String {
    let mut base = enum_name;
    if let Some(tag) = vendor_tag(base, tags) {
        base = &base[..base.len() - tag.len()];
    }

    let mut numbered = "";
    if let Some(pos) = base.rfind("FlagBits") {
        numbered = &base[pos + "FlagBits".len()..];
        base = &base[..pos];
    }

    let mut prefix = base.to_shouty_snake_case();
    if !numbered.is_empty() {
        prefix.push('_');
        prefix.push_str(numbered);
    }
    prefix.push('_');
    prefix
}

/// Field name inside its enum: enum prefix, vendor tag of the enum and, for
/// bitmasks, the `_BIT` marker are removed. A result starting with a digit
/// keeps the last segment of the prefix, `VK_SAMPLE_COUNT_1_BIT` -> `COUNT_1`.
pub fn enum_field_name(
    enum_name: &str,
    field_name: &str,
    is_bitmask: bool,
    tags: &[&str],
    syntax: &Syntax,
) -> String {
    let mut name = field_name;
    if let Some(tag) = vendor_tag(enum_name, tags) {
        if let Some(stripped) = name.strip_suffix(tag) {
            if let Some(stripped) = stripped.strip_suffix('_') {
                name = stripped;
            }
        }
    }
    if is_bitmask {
        if let Some(stripped) = name.strip_suffix("_BIT") {
            name = stripped;
        }
    }

    let prefix = enum_prefix(enum_name, tags);
    match name.strip_prefix(prefix.as_str()) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => {
            let trimmed = prefix.trim_end_matches('_');
            let last = trimmed.rsplit('_').next().unwrap_or(trimmed);
            format!("{}_{}", last, rest)
        }
        Some(rest) if !rest.is_empty() => String::from(rest),
        _ => constant_name(name, syntax),
    }
}
