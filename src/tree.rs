//! Mapping tree keyed by obfuscated identity.
//!
//! Classes are the roots; fields and methods hang off their owning class.
//! Iteration is sorted so two imports of the same input compare equal.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClassEntry {
    pub name: String,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldEntry {
    pub owner: ClassEntry,
    pub name: String,
    pub descriptor: String,
}

impl FieldEntry {
    pub fn new(owner: &str, name: &str, descriptor: &str) -> Self {
        Self {
            owner: ClassEntry::new(owner),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MethodEntry {
    pub owner: ClassEntry,
    pub name: String,
    pub descriptor: String,
}

impl MethodEntry {
    pub fn new(owner: &str, name: &str, descriptor: &str) -> Self {
        Self {
            owner: ClassEntry::new(owner),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Class(ClassEntry),
    Field(FieldEntry),
    Method(MethodEntry),
}

impl Entry {
    pub fn owner(&self) -> &ClassEntry {
        match self {
            Entry::Class(c) => c,
            Entry::Field(f) => &f.owner,
            Entry::Method(m) => &m.owner,
        }
    }
}

impl From<ClassEntry> for Entry {
    fn from(value: ClassEntry) -> Self {
        Entry::Class(value)
    }
}

impl From<FieldEntry> for Entry {
    fn from(value: FieldEntry) -> Self {
        Entry::Field(value)
    }
}

impl From<MethodEntry> for Entry {
    fn from(value: MethodEntry) -> Self {
        Entry::Method(value)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Class(c) => write!(f, "{}", c.name),
            Entry::Field(e) => write!(f, "{}.{}:{}", e.owner.name, e.name, e.descriptor),
            Entry::Method(e) => write!(f, "{}.{}{}", e.owner.name, e.name, e.descriptor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryMapping {
    pub target_name: String,
    pub docs: Option<String>,
}

impl EntryMapping {
    pub fn new(target_name: impl Into<String>, docs: Option<String>) -> Self {
        Self {
            target_name: target_name.into(),
            docs,
        }
    }
}

/// Member name, then descriptor. Nested so lookups can borrow both keys.
type Members = BTreeMap<String, BTreeMap<String, EntryMapping>>;

fn members(map: &Members) -> impl Iterator<Item = (&str, &str, &EntryMapping)> {
    map.iter().flat_map(|(name, by_descriptor)| {
        by_descriptor
            .iter()
            .map(move |(descriptor, m)| (name.as_str(), descriptor.as_str(), m))
    })
}

fn member_count(map: &Members) -> usize {
    map.values().map(BTreeMap::len).sum()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ClassNode {
    mapping: Option<EntryMapping>,
    fields: Members,
    methods: Members,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTree {
    classes: BTreeMap<String, ClassNode>,
}

impl MappingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the mapping for `entry`, returning the previous one.
    pub fn insert(&mut self, entry: impl Into<Entry>, mapping: EntryMapping) -> Option<EntryMapping> {
        match entry.into() {
            Entry::Class(c) => self.classes.entry(c.name).or_default().mapping.replace(mapping),
            Entry::Field(f) => self
                .classes
                .entry(f.owner.name)
                .or_default()
                .fields
                .entry(f.name)
                .or_default()
                .insert(f.descriptor, mapping),
            Entry::Method(m) => self
                .classes
                .entry(m.owner.name)
                .or_default()
                .methods
                .entry(m.name)
                .or_default()
                .insert(m.descriptor, mapping),
        }
    }

    pub fn get(&self, entry: &Entry) -> Option<&EntryMapping> {
        let node = self.classes.get(entry.owner().name.as_str())?;
        match entry {
            Entry::Class(_) => node.mapping.as_ref(),
            Entry::Field(f) => node.fields.get(f.name.as_str())?.get(f.descriptor.as_str()),
            Entry::Method(m) => node.methods.get(m.name.as_str())?.get(m.descriptor.as_str()),
        }
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.get(entry).is_some()
    }

    /// Fields of `owner` named `name`, whatever their descriptor.
    pub fn fields_named<'a>(
        &'a self,
        owner: &str,
        name: &str,
    ) -> impl Iterator<Item = (&'a str, &'a EntryMapping)> + use<'a> {
        self.classes
            .get(owner)
            .and_then(|node| node.fields.get(name))
            .into_iter()
            .flat_map(|by_descriptor| by_descriptor.iter().map(|(d, m)| (d.as_str(), m)))
    }

    /// All mapped entries: each class followed by its fields, then its methods.
    pub fn iter(&self) -> impl Iterator<Item = (Entry, &EntryMapping)> + '_ {
        self.classes.iter().flat_map(|(class, node)| {
            let own = node
                .mapping
                .as_ref()
                .map(|m| (Entry::Class(ClassEntry::new(class.as_str())), m));
            let fields = members(&node.fields)
                .map(move |(n, d, m)| (Entry::Field(FieldEntry::new(class, n, d)), m));
            let methods = members(&node.methods)
                .map(move |(n, d, m)| (Entry::Method(MethodEntry::new(class, n, d)), m));
            own.into_iter().chain(fields).chain(methods)
        })
    }

    pub fn class_count(&self) -> usize {
        self.classes.values().filter(|n| n.mapping.is_some()).count()
    }

    pub fn field_count(&self) -> usize {
        self.classes.values().map(|n| member_count(&n.fields)).sum()
    }

    pub fn method_count(&self) -> usize {
        self.classes.values().map(|n| member_count(&n.methods)).sum()
    }

    pub fn len(&self) -> usize {
        self.class_count() + self.field_count() + self.method_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
