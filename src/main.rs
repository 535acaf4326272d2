use alpha_mcp_import::cli::{Cli, Commands, LookupEntry, OutputFormat};
use alpha_mcp_import::config::resolve_import_root;
use alpha_mcp_import::progress::LogProgress;
use alpha_mcp_import::reader::{AlphaMcpReader, Import};
use alpha_mcp_import::tree::{ClassEntry, Entry, EntryMapping, FieldEntry, MethodEntry};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // info on stderr by default, --verbose enables debug; RUST_LOG overrides
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("alpha_mcp_import", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let root = resolve_import_root(&cli);
    let start = Instant::now();
    let import = run_import(&root)?;
    let duration_ms = start.elapsed().as_millis() as u64;

    let content = match cli.command {
        Commands::Summary => render_summary(&summarize(&root, &import, duration_ms), cli.format)?,
        Commands::Lookup { entry } => {
            let entry = lookup_entry(entry);
            let mapping = import
                .tree
                .get(&entry)
                .with_context(|| format!("{entry} is not mapped"))?;
            render_lookup(&entry, mapping, cli.format)?
        }
    };

    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_import(root: &Path) -> Result<Import> {
    AlphaMcpReader::new()
        .import(root, &mut LogProgress::default())
        .with_context(|| format!("failed to import mappings from {}", root.display()))
}

fn lookup_entry(entry: LookupEntry) -> Entry {
    match entry {
        LookupEntry::Class { name } => ClassEntry::new(name).into(),
        LookupEntry::Field {
            owner,
            name,
            descriptor,
        } => FieldEntry::new(&owner, &name, &descriptor).into(),
        LookupEntry::Method {
            owner,
            name,
            descriptor,
        } => MethodEntry::new(&owner, &name, &descriptor).into(),
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    root: String,
    classes: usize,
    fields: usize,
    methods: usize,
    skipped_fields: usize,
    duration_ms: u64,
}

fn summarize(root: &Path, import: &Import, duration_ms: u64) -> Summary {
    Summary {
        root: root.to_string_lossy().to_string(),
        classes: import.tree.class_count(),
        fields: import.tree.field_count(),
        methods: import.tree.method_count(),
        skipped_fields: import.stats.skipped_fields,
        duration_ms,
    }
}

fn render_summary(summary: &Summary, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(summary)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("root: {}\n", summary.root));
            out.push_str(&format!("classes: {}\n", summary.classes));
            out.push_str(&format!("fields: {}\n", summary.fields));
            out.push_str(&format!("methods: {}\n", summary.methods));
            out.push_str(&format!("skipped_fields: {}\n", summary.skipped_fields));
            out.push_str(&format!("duration_ms: {}\n", summary.duration_ms));
            out
        }
    })
}

#[derive(Debug, Serialize)]
struct LookupResult<'a> {
    entry: &'a Entry,
    mapping: &'a EntryMapping,
}

fn render_lookup(entry: &Entry, mapping: &EntryMapping, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&LookupResult { entry, mapping })?,
        OutputFormat::Text => {
            let mut out = format!("{entry} -> {}\n", mapping.target_name);
            if let Some(docs) = &mapping.docs {
                out.push_str(&format!("  {docs}\n"));
            }
            out
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_entry_builds_field_identity() {
        let entry = lookup_entry(LookupEntry::Field {
            owner: "Ab".into(),
            name: "c".into(),
            descriptor: "I".into(),
        });
        assert_eq!(entry, Entry::Field(FieldEntry::new("Ab", "c", "I")));
    }

    #[test]
    fn text_lookup_includes_docs() {
        let entry = Entry::Class(ClassEntry::new("a"));
        let mapping = EntryMapping::new("net/minecraft/src/Foo", Some("a foo class".into()));
        let out = render_lookup(&entry, &mapping, OutputFormat::Text).unwrap();
        assert_eq!(out, "a -> net/minecraft/src/Foo\n  a foo class\n");
    }
}
