use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::FatalError;

/// Generator settings, read from a TOML file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// API the registry is filtered for.
    pub api: String,

    /// Platforms whose extensions are emitted. Extensions without a platform
    /// are always emitted.
    pub platforms: Vec<String>,

    /// Package name written at the top of every generated file.
    pub package: String,

    /// Extension of the generated files.
    pub file_extension: String,

    pub syntax: Syntax,

    /// Template overrides, keyed by output category (`constants`, `enums`,
    /// `types`, `procedures`, `loader`, `formats`) or `header`.
    pub templates: BTreeMap<String, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: String::from("vulkan"),
            platforms: Vec::new(),
            package: String::from("vulkan"),
            file_extension: String::from("odin"),
            syntax: Syntax::default(),
            templates: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, FatalError> {
        let text = std::fs::read_to_string(path)?;
        Config::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Config, FatalError> {
        Ok(toml::from_str(text)?)
    }
}

/// Tokens of the target declaration syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Syntax {
    pub pointer: String,
    pub multi_pointer: String,
    pub opaque_pointer: String,
    pub c_string: String,
    pub byte: String,
    pub boolean: String,

    /// Stripped from type names, `VkInstance` -> `Instance`.
    pub type_prefix: String,
    /// Stripped from command names, `vkCreateInstance` -> `CreateInstance`.
    pub command_prefix: String,
    /// Stripped from constant and enum field names.
    pub constant_prefix: String,
    /// Function pointer typedef prefix and its replacement, `PFN_vkFoo` -> `ProcFoo`.
    pub proc_prefix: String,
    pub proc_replacement: String,

    /// Variable names the pointer heuristic must treat as plain values.
    pub plain_values: Vec<String>,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            pointer: String::from("^"),
            multi_pointer: String::from("[^]"),
            opaque_pointer: String::from("rawptr"),
            c_string: String::from("cstring"),
            byte: String::from("u8"),
            boolean: String::from("b32"),
            type_prefix: String::from("Vk"),
            command_prefix: String::from("vk"),
            constant_prefix: String::from("VK_"),
            proc_prefix: String::from("PFN_vk"),
            proc_replacement: String::from("Proc"),
            plain_values: Vec::new(),
        }
    }
}
