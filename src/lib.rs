//! Resolves the Vulkan API registry (`vk.xml`) into a fully linked model and
//! generates bindings from it.
//!
//! Loading runs in fixed stages: the document is parsed for one target API,
//! every name reference is linked to the entity it designates, feature and
//! extension enum contributions are patched into their enums, and finally the
//! format table is linked to `VkFormat`. Any reference left dangling aborts the
//! load with a [`FatalError`].
//!
//! ```no_run
//! let registry = vk_bindgen::parse_file(std::path::Path::new("vk.xml"), "vulkan")?;
//! let config = vk_bindgen::Config::default();
//! vk_bindgen::emit::Generator::new(&registry, &config)?.write_all(std::path::Path::new("out"))?;
//! # Ok::<(), vk_bindgen::FatalError>(())
//! ```

#[macro_use]
extern crate serde_derive;

pub mod c_parser;
pub mod classify;
pub mod config;
pub mod dom;
pub mod emit;
mod link;
pub mod naming;
#[macro_use]
mod parse;
pub mod patch;
pub mod registry;
mod types;
pub(crate) mod util;

pub use classify::{classify, Dispatch};
pub use config::{Config, Syntax};
pub use registry::{parse_file, parse_stream, Registry};
pub use types::*;
