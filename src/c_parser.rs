use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, hex_digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, not, opt, peek, recognize, value},
    error::ParseError,
    multi::{many0, many0_count, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};
use std::str::FromStr;

use crate::types::{ArrayLength, Declarator};

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
pub fn ws<'a, F: 'a, O, E: ParseError<&'a str>>(
    inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(peek(alt((alphanumeric1, tag("_"))))))
}

fn decimal(input: &str) -> IResult<&str, u64> {
    map_res(recognize(pair(one_of("123456789"), digit0)), u64::from_str)(input)
}

fn hexadecimal(input: &str) -> IResult<&str, u64> {
    map_res(
        preceded(alt((tag("0x"), tag("0X"))), hex_digit1),
        |out: &str| u64::from_str_radix(out, 16),
    )(input)
}

fn integer_suffix(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(one_of("uU"), alt((tag("ll"), tag("LL"))))),
        recognize(pair(one_of("uU"), opt(one_of("lL")))),
        recognize(pair(alt((tag("ll"), tag("LL"))), opt(one_of("uU")))),
        recognize(pair(one_of("lL"), opt(one_of("uU")))),
    ))(input)
}

fn integer_constant(input: &str) -> IResult<&str, (u64, Option<&str>)> {
    pair(
        alt((decimal, hexadecimal, value(0, char('0')))),
        opt(integer_suffix),
    )(input)
}

//--------------------------------------------------------------------------------------------------
/// `type name` pair of a member or parameter with its declarator shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CDeclaration {
    pub type_name: String,
    pub name: String,
    pub declarator: Declarator,
}

fn array_dimension(input: &str) -> IResult<&str, ArrayLength> {
    delimited(
        ws(char('[')),
        alt((
            map_res(digit1, |d: &str| u32::from_str(d).map(ArrayLength::Static)),
            map(identifier, |id: &str| ArrayLength::Constant(String::from(id))),
        )),
        ws(char(']')),
    )(input)
}

/// Leading qualifiers, type name and the `*`/`const` run that follows it.
fn type_part(input: &str) -> IResult<&str, (String, Declarator)> {
    let (input, (is_const, is_struct, type_name, modifiers)) = tuple((
        opt(ws(keyword("const"))),
        opt(ws(keyword("struct"))),
        ws(identifier),
        many0(ws(alt((
            value(true, char('*')),
            value(false, keyword("const")),
        )))),
    ))(input)?;

    let declarator = Declarator {
        is_const: is_const.is_some(),
        is_struct: is_struct.is_some(),
        pointers: modifiers.iter().filter(|star| **star).count() as u8,
        array: Vec::new(),
        bitfield: None,
    };
    Ok((input, (String::from(type_name), declarator)))
}

fn declaration(input: &str) -> IResult<&str, CDeclaration> {
    let (input, ((type_name, mut declarator), name, array, bitfield)) = tuple((
        type_part,
        ws(identifier),
        many0(array_dimension),
        opt(preceded(ws(char(':')), ws(map_res(digit1, u8::from_str)))),
    ))(input)?;

    declarator.array = array;
    declarator.bitfield = bitfield;
    Ok((
        input,
        CDeclaration {
            type_name,
            name: String::from(name),
            declarator,
        },
    ))
}

/// Parses the C text of a `<member>` or `<param>` element, e.g.
/// `const char* const* ppEnabledLayerNames` or `float matrix[3][4]`.
pub fn parse_declaration(text: &str) -> Option<CDeclaration> {
    all_consuming(terminated(declaration, opt(ws(char(';')))))(text)
        .finish()
        .ok()
        .map(|(_, d)| d)
}

//--------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFuncPointer {
    pub name: String,
    pub return_type: String,
    pub return_declarator: Declarator,
    pub params: Vec<CDeclaration>,
}

fn func_params(input: &str) -> IResult<&str, Vec<CDeclaration>> {
    alt((
        value(Vec::new(), void_params),
        separated_list1(ws(char(',')), declaration),
    ))(input)
}

fn void_params(input: &str) -> IResult<&str, &str> {
    terminated(ws(keyword("void")), peek(char(')')))(input)
}

/// Parses a classic funcpointer typedef:
/// `typedef void* (VKAPI_PTR *PFN_vkAllocationFunction)(void* pUserData, size_t size);`
pub fn parse_funcpointer(text: &str) -> Option<CFuncPointer> {
    let result: IResult<&str, _> = all_consuming(tuple((
        ws(keyword("typedef")),
        type_part,
        ws(char('(')),
        opt(ws(tag("VKAPI_PTR"))),
        ws(char('*')),
        ws(identifier),
        ws(char(')')),
        delimited(ws(char('(')), func_params, ws(char(')'))),
        opt(ws(char(';'))),
    )))(text);

    result
        .finish()
        .ok()
        .map(|(_, (_, (return_type, return_declarator), _, _, _, name, _, params, _))| CFuncPointer {
            name: String::from(name),
            return_type,
            return_declarator,
            params,
        })
}

//--------------------------------------------------------------------------------------------------
/// A C literal as found in API constant values.
#[derive(Debug, Clone, PartialEq)]
pub enum CLiteral {
    Integer { value: u64, wide: bool },
    /// `(~0U)`, `(~0ULL)` and friends.
    Complement { operand: u64, wide: bool },
    Float(f64),
    Str(String),
}

fn is_wide(suffix: Option<&str>) -> bool {
    suffix.map(|s| s.to_ascii_lowercase().contains("ll")).unwrap_or(false)
}

fn float_literal(input: &str) -> IResult<&str, f64> {
    map_res(
        terminated(recognize(tuple((digit1, char('.'), digit0))), opt(one_of("fF"))),
        f64::from_str,
    )(input)
}

fn c_literal(input: &str) -> IResult<&str, CLiteral> {
    alt((
        map(delimited(char('"'), opt(is_not("\"")), char('"')), |s: Option<&str>| {
            CLiteral::Str(String::from(s.unwrap_or("")))
        }),
        map(
            delimited(ws(char('(')), preceded(ws(char('~')), integer_constant), ws(char(')'))),
            |(operand, suffix)| CLiteral::Complement {
                operand,
                wide: is_wide(suffix),
            },
        ),
        map(float_literal, CLiteral::Float),
        map(integer_constant, |(value, suffix)| CLiteral::Integer {
            value,
            wide: is_wide(suffix),
        }),
    ))(input)
}

pub fn parse_literal(text: &str) -> Option<CLiteral> {
    all_consuming(ws(c_literal))(text).finish().ok().map(|(_, l)| l)
}

//--------------------------------------------------------------------------------------------------
/// Value of a `#define` the emitters know how to carry over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineValue {
    Integer(u64),
    /// `VK_MAKE_API_VERSION(variant, major, minor, patch)`
    ApiVersion {
        variant: u32,
        major: u32,
        minor: u32,
        patch: u32,
    },
}

impl DefineValue {
    pub fn value(self) -> u64 {
        match self {
            DefineValue::Integer(v) => v,
            DefineValue::ApiVersion {
                variant,
                major,
                minor,
                patch,
            } => {
                (u64::from(variant) << 29)
                    | (u64::from(major) << 22)
                    | (u64::from(minor) << 12)
                    | u64::from(patch)
            }
        }
    }
}

fn small_integer(input: &str) -> IResult<&str, u32> {
    map_res(ws(digit1), u32::from_str)(input)
}

fn define_value(input: &str) -> IResult<&str, DefineValue> {
    alt((
        map(
            preceded(
                ws(tag("VK_MAKE_API_VERSION")),
                delimited(
                    ws(char('(')),
                    tuple((
                        terminated(small_integer, char(',')),
                        terminated(small_integer, char(',')),
                        terminated(small_integer, char(',')),
                        small_integer,
                    )),
                    ws(char(')')),
                ),
            ),
            |(variant, major, minor, patch)| DefineValue::ApiVersion {
                variant,
                major,
                minor,
                patch,
            },
        ),
        map(ws(integer_constant), |(v, _)| DefineValue::Integer(v)),
    ))(input)
}

/// Recognizes `#define NAME value` bodies whose value is a plain integer or an
/// API version. Line comments preceding the directive are skipped.
pub fn parse_define(text: &str) -> Option<(String, DefineValue)> {
    let body = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.starts_with("//") && !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let result: IResult<&str, _> = all_consuming(preceded(
        ws(tag("#define")),
        pair(ws(identifier), define_value),
    ))(body.as_str());

    result
        .finish()
        .ok()
        .map(|(_, (name, value))| (String::from(name), value))
}
