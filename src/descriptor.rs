use log::info;
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::classfile::read_class_shape;
use crate::error::{ImportError, ResourceFailure, Result};

/// Field descriptors recovered from a jar, keyed by `owner/name`.
#[derive(Debug, Clone, Default)]
pub struct FieldDescriptors {
    by_member: HashMap<String, String>,
}

impl FieldDescriptors {
    pub fn get(&self, owner: &str, name: &str) -> Option<&str> {
        self.by_member
            .get(&format!("{owner}/{name}"))
            .map(String::as_str)
    }

    /// Lookup by a raw `owner/name` member token.
    pub fn get_member(&self, member: &str) -> Option<&str> {
        self.by_member.get(member).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_member.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }

    pub fn insert(&mut self, owner: &str, name: &str, descriptor: String) {
        self.by_member.insert(format!("{owner}/{name}"), descriptor);
    }
}

pub fn read_field_descriptors(jar_path: &Path) -> Result<FieldDescriptors> {
    let file = File::open(jar_path).map_err(|e| ImportError::resource(jar_path, e))?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ImportError::resource(jar_path, e))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .map_err(|e| ImportError::resource(jar_path, e))?;

    let mut descriptors = FieldDescriptors::default();
    let mut classes = 0usize;
    let mut buf = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ImportError::resource(jar_path, e))?;
        if !entry.name().ends_with(".class") {
            continue;
        }

        buf.clear();
        entry
            .read_to_end(&mut buf)
            .map_err(|e| ImportError::resource(jar_path, e))?;
        let shape = read_class_shape(&buf).map_err(|source| {
            ImportError::resource(
                jar_path,
                ResourceFailure::ClassFile {
                    entry: entry.name().to_string(),
                    source,
                },
            )
        })?;

        for field in shape.fields {
            descriptors.insert(&shape.name, &field.name, field.descriptor);
        }
        classes += 1;
    }

    info!(
        "scanned {classes} classes in {}, {} field descriptors",
        jar_path.display(),
        descriptors.len()
    );
    Ok(descriptors)
}
