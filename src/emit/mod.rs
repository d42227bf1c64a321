//! Renders a linked registry into source files through tera templates.

use std::path::{Path, PathBuf};

use tera::{Context, Tera};

use crate::config::Config;
use crate::registry::Registry;
use crate::types::FatalError;

mod select;
mod templates;
mod views;

pub use self::select::Selection;

const HEADER: &str = "header";

/// One generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Constants,
    Enums,
    Types,
    Procedures,
    Loader,
    Formats,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Constants,
        Category::Enums,
        Category::Types,
        Category::Procedures,
        Category::Loader,
        Category::Formats,
    ];

    /// Template name and file stem.
    pub fn name(self) -> &'static str {
        match self {
            Category::Constants => "constants",
            Category::Enums => "enums",
            Category::Types => "types",
            Category::Procedures => "procedures",
            Category::Loader => "loader",
            Category::Formats => "formats",
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            Category::Constants => templates::CONSTANTS,
            Category::Enums => templates::ENUMS,
            Category::Types => templates::TYPES,
            Category::Procedures => templates::PROCEDURES,
            Category::Loader => templates::LOADER,
            Category::Formats => templates::FORMATS,
        }
    }
}

pub struct Generator<'r> {
    registry: &'r Registry,
    config: &'r Config,
    selection: Selection,
    tags: Vec<&'r str>,
    tera: Tera,
}

impl<'r> Generator<'r> {
    pub fn new(registry: &'r Registry, config: &'r Config) -> Result<Self, FatalError> {
        for key in config.templates.keys() {
            if key != HEADER && !Category::ALL.iter().any(|c| c.name() == key) {
                tracing::warn!("ignoring template override for unknown category '{}'", key);
            }
        }

        let source = |name: &str, builtin: &str| -> Result<String, FatalError> {
            match config.templates.get(name) {
                Some(path) => {
                    tracing::info!("using template {} for '{}'", path.display(), name);
                    Ok(std::fs::read_to_string(path)?)
                }
                None => Ok(String::from(builtin)),
            }
        };

        let mut sources = vec![(String::from(HEADER), source(HEADER, templates::HEADER)?)];
        for category in Category::ALL.iter() {
            sources.push((
                String::from(category.name()),
                source(category.name(), category.builtin())?,
            ));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources)?;

        Ok(Generator {
            registry,
            config,
            selection: Selection::new(registry, &config.platforms),
            tags: registry.tags.iter().map(|(_, t)| t.name.as_str()).collect(),
            tera,
        })
    }

    pub fn render(&self, category: Category) -> Result<String, FatalError> {
        let mut context = match category {
            Category::Constants => Context::from_serialize(self.constants_file()?)?,
            Category::Enums => Context::from_serialize(self.enums_file()?)?,
            Category::Types => Context::from_serialize(self.types_file()?)?,
            Category::Procedures => Context::from_serialize(self.procedures_file()?)?,
            Category::Loader => Context::from_serialize(self.loader_file()?)?,
            Category::Formats => Context::from_serialize(self.formats_file()?)?,
        };
        context.insert("package", &self.config.package);
        Ok(self.tera.render(category.name(), &context)?)
    }

    /// Renders every category into `out_dir`, returning the written paths.
    pub fn write_all(&self, out_dir: &Path) -> Result<Vec<PathBuf>, FatalError> {
        std::fs::create_dir_all(out_dir)?;
        let mut written = Vec::new();
        for category in Category::ALL.iter() {
            let text = self.render(*category)?;
            let path = out_dir.join(format!(
                "{}.{}",
                category.name(),
                self.config.file_extension
            ));
            std::fs::write(&path, text)?;
            tracing::info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
