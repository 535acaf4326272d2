use log::debug;
use serde::Serialize;
use std::path::Path;

use crate::config::ImportLayout;
use crate::descriptor::read_field_descriptors;
use crate::directive::{DirectiveProcessor, DirectiveStats};
use crate::error::Result;
use crate::progress::{NoProgress, ProgressListener};
use crate::table::Tables;
use crate::tree::MappingTree;

/// How a mapping tree would later be laid out on disk.
///
/// Importing never writes anything; the value is handed through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingFileNameFormat {
    #[default]
    ByObf,
    ByDeobf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingSaveParameters {
    pub file_name_format: MappingFileNameFormat,
}

/// A mapping format that can be read from a path into a tree.
pub trait MappingsReader {
    fn read(
        &self,
        path: &Path,
        progress: &mut dyn ProgressListener,
        save_parameters: &MappingSaveParameters,
    ) -> Result<MappingTree>;
}

#[derive(Debug, Clone)]
pub struct Import {
    pub tree: MappingTree,
    pub stats: DirectiveStats,
}

/// Reader for alpha-era MCP directories.
#[derive(Debug, Clone, Default)]
pub struct AlphaMcpReader {
    layout: ImportLayout,
}

impl AlphaMcpReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: ImportLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ImportLayout {
        &self.layout
    }

    /// Runs the whole import: tables, then the jar scan, then the directives.
    pub fn import(&self, root: &Path, progress: &mut dyn ProgressListener) -> Result<Import> {
        let layout = &self.layout;
        progress.init(3, "Importing alpha MCP mappings");

        let tables = Tables::load(
            &layout.classes(root),
            &layout.fields(root),
            &layout.methods(root),
        )?;
        progress.step(1, "Loaded class, field and method tables");

        let descriptors = read_field_descriptors(&layout.game_jar(root))?;
        progress.step(2, "Read field descriptors from the game jar");

        let mut processor = DirectiveProcessor::new(&tables, &descriptors, &layout.class_prefix);
        processor.apply_file(&layout.directives(root))?;
        let (tree, stats) = processor.finish();
        progress.step(3, "Applied mapping directives");

        Ok(Import { tree, stats })
    }
}

impl MappingsReader for AlphaMcpReader {
    fn read(
        &self,
        path: &Path,
        progress: &mut dyn ProgressListener,
        save_parameters: &MappingSaveParameters,
    ) -> Result<MappingTree> {
        debug!("save parameters passed through: {save_parameters:?}");
        Ok(self.import(path, progress)?.tree)
    }
}

/// Imports `root` with the standard directory layout and no progress reporting.
pub fn read_mappings(root: &Path) -> Result<MappingTree> {
    AlphaMcpReader::new().read(root, &mut NoProgress, &MappingSaveParameters::default())
}
