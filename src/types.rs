use std::fmt;

use crate::dom::NodeId;
use indexmap::IndexMap;

/// Errors from which the generator cannot recover.
///
/// Every cross-reference in the registry is assumed to be closed once linking
/// finishes, so a dangling name anywhere aborts the whole run instead of being
/// patched over with a placeholder.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FatalError {
    #[error("document root is not a <registry> element")]
    MissingRegistryElement,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] xml::reader::Error),

    #[error("missing attribute '{name}' at {xpath}")]
    MissingAttribute { xpath: String, name: String },

    #[error("missing element '{name}' at {xpath}")]
    MissingElement { xpath: String, name: String },

    #[error("malformed literal '{text}' at {xpath}")]
    MalformedLiteral { xpath: String, text: String },

    #[error("schema violation at {xpath}: {desc}")]
    SchemaViolation { xpath: String, desc: String },

    #[error("{kind} '{name}' referenced by '{referrer}' does not exist")]
    UnresolvedReference {
        kind: EntityKind,
        name: String,
        referrer: String,
    },

    #[error("alias chain of {kind} '{name}' does not terminate")]
    AliasCycle { kind: EntityKind, name: String },

    #[error("duplicate {kind} '{name}'")]
    DuplicateEntity { kind: EntityKind, name: String },

    #[error("enum '{name}' at {xpath} has neither value, bitpos, offset nor alias")]
    UnvaluedEnumField { xpath: String, name: String },

    #[error("enum '{name}' uses an offset but no extension number is known")]
    MissingExtensionNumber { name: String },

    #[error("'{name}' is declared with a bare void type")]
    BareVoid { name: String },

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Entity tables, used to report which table a lookup failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EntityKind {
    Type,
    Enum,
    EnumField,
    Command,
    Parameter,
    Feature,
    Extension,
    Format,
    Platform,
    Tag,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Type => "type",
            EntityKind::Enum => "enum",
            EntityKind::EnumField => "enum field",
            EntityKind::Command => "command",
            EntityKind::Parameter => "parameter",
            EntityKind::Feature => "feature",
            EntityKind::Extension => "extension",
            EntityKind::Format => "format",
            EntityKind::Platform => "platform",
            EntityKind::Tag => "tag",
        })
    }
}

//--------------------------------------------------------------------------------------------------
/// Stable position of an entity within its table.
pub trait EntityId: Copy + Eq + fmt::Debug {
    const KIND: EntityKind;
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $id:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
        pub struct $id(usize);

        impl EntityId for $id {
            const KIND: EntityKind = EntityKind::$kind;

            fn from_index(index: usize) -> Self {
                $id(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    };
}

entity_id!(TypeId => Type);
entity_id!(EnumId => Enum);
entity_id!(CommandId => Command);
entity_id!(FeatureId => Feature);
entity_id!(ExtensionId => Extension);
entity_id!(FormatId => Format);
entity_id!(PlatformId => Platform);
entity_id!(TagId => Tag);

/// Position of a single field inside an enum's field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FieldRef {
    pub enum_id: EnumId,
    pub index: usize,
}

/// A name-based cross-reference.
///
/// Created during ingestion with only `name` set; the linking pass fills in
/// the target. Reading `target()` before linking yields `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Link<I> {
    pub name: String,
    target: Option<I>,
}

impl<I: Copy> Link<I> {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Link {
            name: name.into(),
            target: None,
        }
    }

    pub fn target(&self) -> Option<I> {
        self.target
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn resolve(&mut self, target: I) {
        self.target = Some(target);
    }
}

//--------------------------------------------------------------------------------------------------
/// Insertion-ordered table of named entities, addressed by a typed index.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Table<I, T> {
    entries: IndexMap<String, T>,
    #[cfg_attr(feature = "serialize", serde(skip))]
    _id: std::marker::PhantomData<I>,
}

impl<I, T> Default for Table<I, T> {
    fn default() -> Self {
        Table {
            entries: IndexMap::new(),
            _id: std::marker::PhantomData,
        }
    }
}

impl<I: EntityId, T> Table<I, T> {
    pub(crate) fn insert(&mut self, name: String, value: T) -> Result<I, FatalError> {
        if self.entries.contains_key(&name) {
            return Err(FatalError::DuplicateEntity {
                kind: I::KIND,
                name,
            });
        }
        let (index, _) = self.entries.insert_full(name, value);
        Ok(I::from_index(index))
    }

    pub fn find(&self, name: &str) -> Option<I> {
        self.entries.get_index_of(name).map(I::from_index)
    }

    /// Looks `name` up, reporting schema drift on behalf of `referrer`.
    pub fn lookup(&self, name: &str, referrer: &str) -> Result<I, FatalError> {
        self.find(name)
            .ok_or_else(|| FatalError::UnresolvedReference {
                kind: I::KIND,
                name: String::from(name),
                referrer: String::from(referrer),
            })
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get_index(id.index()).map(|(_, v)| v)
    }

    /// Keeps the entries `keep` accepts, in order. Ids handed out before are invalidated.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.entries.retain(|_, v| keep(v));
    }

    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn ids(&self) -> impl Iterator<Item = I> {
        (0..self.entries.len()).map(I::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .values()
            .enumerate()
            .map(|(i, v)| (I::from_index(i), v))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.entries
            .values_mut()
            .enumerate()
            .map(|(i, v)| (I::from_index(i), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<I: EntityId, T> std::ops::Index<I> for Table<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.entries[id.index()]
    }
}

impl<I: EntityId, T> std::ops::IndexMut<I> for Table<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.entries[id.index()]
    }
}

//--------------------------------------------------------------------------------------------------
/// Value of the `category` attribute on a `<type>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum TypeCategory {
    /// No `category` attribute: a type provided by a platform header.
    External,
    Include,
    Define,
    Basetype,
    Bitmask,
    Handle,
    Enum,
    FuncPointer,
    Struct,
    Union,
}

impl TypeCategory {
    pub(crate) fn from_attribute(value: Option<&str>) -> Option<Self> {
        Some(match value {
            None => TypeCategory::External,
            Some("include") => TypeCategory::Include,
            Some("define") => TypeCategory::Define,
            Some("basetype") => TypeCategory::Basetype,
            Some("bitmask") => TypeCategory::Bitmask,
            Some("handle") => TypeCategory::Handle,
            Some("enum") => TypeCategory::Enum,
            Some("funcpointer") => TypeCategory::FuncPointer,
            Some("struct") => TypeCategory::Struct,
            Some("union") => TypeCategory::Union,
            Some(_) => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum HandleKind {
    Dispatch,
    NoDispatch,
}

/// One `<type>` element of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Type {
    pub name: String,
    pub category: TypeCategory,

    /// APIs this type is restricted to; empty when unrestricted.
    pub api: Vec<String>,

    /// When set, every other structural field is meaningless.
    pub alias: Option<Link<TypeId>>,

    /// Include or type this definition depends on.
    pub requires: Option<Link<TypeId>>,

    /// `*FlagBits` enum type holding the values of a bitmask.
    pub bitvalues: Option<Link<TypeId>>,

    /// Owning handles. The first entry is the primary owner.
    pub parents: Vec<Link<TypeId>>,

    /// Underlying type of a basetype or bitmask typedef.
    pub subtype: Option<Link<TypeId>>,
    /// Pointer/const shape of the typedef target, e.g. `typedef void* VkRemoteAddressNV`.
    pub subtype_declarator: Declarator,

    /// Values block of an enum-category type, if the registry has one.
    pub enumeration: Option<EnumId>,

    pub members: Vec<Member>,
    pub struct_extends: Vec<Link<TypeId>>,
    pub returned_only: bool,
    pub allow_duplicate: bool,

    pub handle_kind: Option<HandleKind>,
    pub objtypeenum: Option<String>,

    pub proto: Option<FuncProto>,

    /// Body of a preprocessor define, as written.
    pub define: Option<String>,

    pub comment: Option<String>,
    pub node: NodeId,
}

impl Type {
    pub(crate) fn new(name: String, category: TypeCategory, node: NodeId) -> Self {
        Type {
            name,
            category,
            api: Vec::new(),
            alias: None,
            requires: None,
            bitvalues: None,
            parents: Vec::new(),
            subtype: None,
            subtype_declarator: Declarator::default(),
            enumeration: None,
            members: Vec::new(),
            struct_extends: Vec::new(),
            returned_only: false,
            allow_duplicate: false,
            handle_kind: None,
            objtypeenum: None,
            proto: None,
            define: None,
            comment: None,
            node,
        }
    }

    /// The primary owner of a handle.
    pub fn parent(&self) -> Option<&Link<TypeId>> {
        self.parents.first()
    }
}

/// Return type and parameters of a function pointer typedef.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FuncProto {
    pub return_type: Link<TypeId>,
    pub return_declarator: Declarator,
    pub params: Vec<Member>,
}

/// Shape of a C declarator, as written in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Declarator {
    pub is_const: bool,
    pub is_struct: bool,
    /// Number of `*` in the declaration.
    pub pointers: u8,
    /// Fixed array dimensions, outermost first.
    pub array: Vec<ArrayLength>,
    pub bitfield: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ArrayLength {
    Static(u32),
    Constant(String),
}

/// How the element count of one indirection level is expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum LengthHint {
    NullTerminated,
    /// Another member or parameter of the same aggregate.
    Sibling(Link<usize>),
    /// `param->field`
    SiblingField { sibling: Link<usize>, field: String },
    Literal(u32),
    /// An API constant such as `VK_UUID_SIZE`.
    Constant(String),
    /// A math expression only meaningful to the specification text.
    Latexmath {
        latex: String,
        c_expr: Option<String>,
    },
    Expression(String),
}

/// A struct/union member or a command/funcpointer parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Member {
    pub name: String,
    pub ty: Link<TypeId>,
    pub declarator: Declarator,
    pub len: Vec<LengthHint>,
    pub altlen: Option<String>,
    pub optional: Vec<bool>,
    pub externsync: Option<String>,
    pub noautovalidity: bool,
    pub selector: Option<Link<usize>>,
    pub selection: Vec<String>,
    pub values: Vec<String>,
    pub api: Vec<String>,
    pub comment: Option<String>,
}

impl Member {
    pub(crate) fn new(name: String, ty: String) -> Self {
        Member {
            name,
            ty: Link::new(ty),
            declarator: Declarator::default(),
            len: Vec::new(),
            altlen: None,
            optional: Vec::new(),
            externsync: None,
            noautovalidity: false,
            selector: None,
            selection: Vec::new(),
            values: Vec::new(),
            api: Vec::new(),
            comment: None,
        }
    }

    /// Whether the outermost indirection level points at more than one element.
    pub fn is_array(&self) -> bool {
        match self.len.first() {
            None | Some(LengthHint::NullTerminated) => false,
            Some(_) => true,
        }
    }
}

pub type Param = Member;

//--------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum EnumKind {
    /// Free-standing constants, e.g. "API Constants".
    Constants,
    Enum,
    Bitmask,
}

/// One `<enums>` block, extended by features and extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Enum {
    pub name: String,
    pub kind: EnumKind,
    pub bitwidth: Option<u32>,
    pub fields: IndexMap<String, EnumField>,
    pub comment: Option<String>,
    /// `None` for the synthesized "API Constants" block.
    pub node: Option<NodeId>,
}

impl Enum {
    pub(crate) fn new(name: String, kind: EnumKind, node: Option<NodeId>) -> Self {
        Enum {
            name,
            kind,
            bitwidth: None,
            fields: IndexMap::new(),
            comment: None,
            node,
        }
    }

    pub fn field(&self, index: usize) -> Option<&EnumField> {
        self.fields.get_index(index).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct EnumField {
    pub name: String,
    pub value: EnumValue,
    /// C type suffix of an API constant (`type` attribute).
    pub type_suffix: Option<String>,
    pub origin: Origin,
    pub protect: Option<String>,
    pub deprecated: Option<String>,
    pub comment: Option<String>,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum EnumValue {
    Literal(Literal),
    Bitpos(u32),
    /// Another field of the same enum.
    Alias(Link<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Literal {
    Int(i64),
    /// Kept verbatim: strings, floats and C expressions such as `(~0U)`.
    Text(String),
}

/// Where an enum field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Origin {
    Core,
    Feature(FeatureId),
    Extension(ExtensionId),
}

//--------------------------------------------------------------------------------------------------
bitflags::bitflags! {
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct CommandQueue: u32 {
        const GRAPHICS = 1 << 0;
        const COMPUTE = 1 << 1;
        const TRANSFER = 1 << 2;
        const SPARSE_BINDING = 1 << 3;
        const PROTECTED = 1 << 4;
        const VIDEO_DECODE = 1 << 5;
        const VIDEO_ENCODE = 1 << 6;
        const OPTICAL_FLOW = 1 << 7;
    }
}

impl CommandQueue {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "graphics" => CommandQueue::GRAPHICS,
            "compute" => CommandQueue::COMPUTE,
            "transfer" => CommandQueue::TRANSFER,
            "sparse_binding" => CommandQueue::SPARSE_BINDING,
            "protected" => CommandQueue::PROTECTED,
            "decode" => CommandQueue::VIDEO_DECODE,
            "encode" => CommandQueue::VIDEO_ENCODE,
            "opticalflow" => CommandQueue::OPTICAL_FLOW,
            _ => return None,
        })
    }
}

impl fmt::Display for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(CommandQueue, &str); 8] = [
            (CommandQueue::GRAPHICS, "graphics"),
            (CommandQueue::COMPUTE, "compute"),
            (CommandQueue::TRANSFER, "transfer"),
            (CommandQueue::SPARSE_BINDING, "sparse_binding"),
            (CommandQueue::PROTECTED, "protected"),
            (CommandQueue::VIDEO_DECODE, "decode"),
            (CommandQueue::VIDEO_ENCODE, "encode"),
            (CommandQueue::OPTICAL_FLOW, "opticalflow"),
        ];
        let mut prepend_comma = false;
        for (flag, name) in NAMES.iter() {
            if self.contains(*flag) {
                if prepend_comma {
                    f.write_str(",")?;
                }
                f.write_str(name)?;
                prepend_comma = true;
            }
        }
        Ok(())
    }
}

/// A command is just a Vulkan function.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Command {
    pub name: String,

    /// When set, the prototype must be read from the aliased command.
    pub alias: Option<Link<CommandId>>,

    pub api: Vec<String>,
    pub return_type: Option<Link<TypeId>>,
    pub return_declarator: Declarator,
    pub params: Vec<Param>,
    pub successcodes: Vec<String>,
    pub errorcodes: Vec<String>,
    pub queues: CommandQueue,
    pub renderpass: Option<String>,
    pub cmdbufferlevel: Vec<String>,
    pub comment: Option<String>,
    pub node: NodeId,
}

//--------------------------------------------------------------------------------------------------
/// A `<require>` block of a feature or extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Require {
    pub api: Vec<String>,
    /// Boolean expression over feature and extension names.
    pub depends: Option<String>,
    pub comment: Option<String>,
    pub types: Vec<Link<TypeId>>,
    pub commands: Vec<Link<CommandId>>,
    /// Fields this block added or referenced, filled by the enum patcher.
    pub enums: Vec<FieldRef>,
    /// Enum items awaiting the patcher.
    pub(crate) contributions: Vec<EnumContribution>,
}

/// A `<remove>` block. Only names are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Remove {
    pub api: Vec<String>,
    pub comment: Option<String>,
    pub types: Vec<String>,
    pub commands: Vec<String>,
    pub enums: Vec<String>,
}

/// An `<enum>` inside a `<require>` block, before it is merged into its enum.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub(crate) struct EnumContribution {
    pub name: String,
    pub extends: Option<String>,
    pub kind: ContributionKind,
    pub type_suffix: Option<String>,
    pub protect: Option<String>,
    pub deprecated: Option<String>,
    pub comment: Option<String>,
    pub xpath: String,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub(crate) enum ContributionKind {
    Bitpos(u32),
    Offset {
        offset: i64,
        extnumber: Option<i64>,
        negative: bool,
    },
    Value(String),
    Alias(String),
    /// Only a name: refers to a field defined elsewhere.
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Feature level of the API, such as Vulkan 1.0 or 1.1
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Feature {
    pub name: String,
    pub api: Vec<String>,
    pub version: Version,
    pub depends: Option<String>,
    pub requires: Vec<Require>,
    pub removes: Vec<Remove>,
    pub comment: Option<String>,
    pub node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ExtensionType {
    Instance,
    Device,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Extension {
    pub name: String,

    /// The unique index of this extension, base of its offset enum values.
    pub number: i64,

    pub ext_type: Option<ExtensionType>,
    pub platform: Option<Link<PlatformId>>,
    pub author: Option<String>,
    pub contact: Option<String>,
    pub supported: Vec<String>,
    pub depends: Option<String>,
    pub promotedto: Option<String>,
    pub deprecatedby: Option<String>,
    pub obsoletedby: Option<String>,
    pub provisional: bool,
    pub specialuse: Vec<String>,
    pub sortorder: Option<i64>,
    pub requires: Vec<Require>,
    pub removes: Vec<Remove>,
    pub comment: Option<String>,
    pub node: NodeId,
}

//--------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ComponentBits {
    Compressed,
    Bits(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FormatComponent {
    pub name: String,
    pub bits: ComponentBits,
    pub numeric_format: String,
    pub plane_index: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FormatPlane {
    pub index: u8,
    pub width_divisor: u8,
    pub height_divisor: u8,
    pub compatible: Link<FieldRef>,
}

/// Pixel format metadata, keyed by a field of the `VkFormat` enum.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Format {
    pub field: Link<FieldRef>,
    pub class: String,
    pub block_size: u8,
    pub texels_per_block: u8,
    pub block_extent: [u32; 3],
    pub packed: Option<u8>,
    pub compressed: Option<String>,
    pub chroma: Option<String>,
    pub components: Vec<FormatComponent>,
    pub planes: Vec<FormatPlane>,
    pub spirv_image_formats: Vec<String>,
    pub node: NodeId,
}

/// A platform refers to a windowing system which Vulkan can use.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Platform {
    pub name: String,
    /// C macro name which is used to guard platform-specific definitions.
    pub protect: String,
    pub comment: Option<String>,
}

/// Vendor suffix attached to extension names and items, e.g. "KHR".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Tag {
    pub name: String,
    pub author: String,
    pub contact: String,
}
