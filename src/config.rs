use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::table::TableSource;

pub const ROOT_ENV: &str = "ALPHA_MCP_ROOT";

/// Where each input lives under an import root, and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLayout {
    pub classes_csv: PathBuf,
    pub classes_header_rows: usize,
    pub fields_csv: PathBuf,
    pub fields_header_rows: usize,
    pub methods_csv: PathBuf,
    pub methods_header_rows: usize,
    pub directives: PathBuf,
    pub game_jar: PathBuf,
    /// Prepended to every renamed class name.
    pub class_prefix: String,
}

impl Default for ImportLayout {
    fn default() -> Self {
        Self {
            classes_csv: PathBuf::from("conf/classes.csv"),
            classes_header_rows: 4,
            fields_csv: PathBuf::from("conf/fields.csv"),
            fields_header_rows: 3,
            methods_csv: PathBuf::from("conf/methods.csv"),
            methods_header_rows: 4,
            directives: PathBuf::from("conf/minecraft.rgs"),
            game_jar: PathBuf::from("jars/Minecraft.jar"),
            class_prefix: "net/minecraft/src/".to_string(),
        }
    }
}

impl ImportLayout {
    pub fn classes(&self, root: &Path) -> TableSource {
        TableSource {
            path: root.join(&self.classes_csv),
            header_rows: self.classes_header_rows,
        }
    }

    pub fn fields(&self, root: &Path) -> TableSource {
        TableSource {
            path: root.join(&self.fields_csv),
            header_rows: self.fields_header_rows,
        }
    }

    pub fn methods(&self, root: &Path) -> TableSource {
        TableSource {
            path: root.join(&self.methods_csv),
            header_rows: self.methods_header_rows,
        }
    }

    pub fn directives(&self, root: &Path) -> PathBuf {
        root.join(&self.directives)
    }

    pub fn game_jar(&self, root: &Path) -> PathBuf {
        root.join(&self.game_jar)
    }
}

pub fn resolve_import_root(cli: &Cli) -> PathBuf {
    if let Some(p) = cli.root.clone() {
        return p;
    }

    if let Ok(p) = env::var(ROOT_ENV) {
        return PathBuf::from(p);
    }

    PathBuf::from(".")
}
