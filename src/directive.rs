//! RetroGuard script (`.rgs`) directives and their resolution into the tree.

use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::descriptor::FieldDescriptors;
use crate::error::{ImportError, ParseFailure, Result};
use crate::table::Tables;
use crate::tree::{ClassEntry, EntryMapping, FieldEntry, MappingTree, MethodEntry};

pub const CLASS_MAP: &str = ".class_map";
pub const FIELD_MAP: &str = ".field_map";
pub const METHOD_MAP: &str = ".method_map";

/// Names of at least this many characters are taken to be readable already.
pub const OBFUSCATED_NAME_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    Class {
        obf: &'a str,
        short_name: &'a str,
    },
    Field {
        /// The raw `owner/name` token, which is also the descriptor lookup key.
        member: &'a str,
        owner: &'a str,
        name: &'a str,
        key: &'a str,
    },
    Method {
        owner: &'a str,
        name: &'a str,
        descriptor: &'a str,
        key: &'a str,
    },
}

impl<'a> Directive<'a> {
    /// `Ok(None)` for lines that are not mapping directives.
    pub fn parse(line: &'a str) -> std::result::Result<Option<Self>, ParseFailure> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&tag) = tokens.first() else {
            return Ok(None);
        };

        let expected = match tag {
            CLASS_MAP => 3,
            FIELD_MAP => 3,
            METHOD_MAP => 4,
            _ => return Ok(None),
        };
        if tokens.len() < expected {
            return Err(ParseFailure::MissingToken {
                directive: directive_name(tag),
                expected,
                found: tokens.len(),
            });
        }

        let directive = match tag {
            CLASS_MAP => Directive::Class {
                obf: tokens[1],
                short_name: tokens[2],
            },
            FIELD_MAP => {
                let (owner, name) = split_member(tokens[1])?;
                Directive::Field {
                    member: tokens[1],
                    owner,
                    name,
                    key: tokens[2],
                }
            }
            _ => {
                let (owner, name) = split_member(tokens[1])?;
                Directive::Method {
                    owner,
                    name,
                    descriptor: tokens[2],
                    key: tokens[3],
                }
            }
        };
        Ok(Some(directive))
    }
}

fn directive_name(tag: &str) -> &'static str {
    match tag {
        CLASS_MAP => CLASS_MAP,
        FIELD_MAP => FIELD_MAP,
        _ => METHOD_MAP,
    }
}

/// Owner and name are the first two `/` segments; any further segments are
/// ignored. Trailing empty segments do not count.
fn split_member(token: &str) -> std::result::Result<(&str, &str), ParseFailure> {
    let mut segments: Vec<&str> = token.split('/').collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    match segments.as_slice() {
        [owner, name, ..] => Ok((*owner, *name)),
        _ => Err(ParseFailure::MalformedMember(token.to_string())),
    }
}

fn looks_obfuscated(owner: &str, name: &str) -> bool {
    owner.len() < OBFUSCATED_NAME_LIMIT && name.len() < OBFUSCATED_NAME_LIMIT
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectiveStats {
    pub classes: usize,
    pub fields: usize,
    pub methods: usize,
    /// Field directives dropped by the obfuscated-name length filter.
    pub skipped_fields: usize,
}

/// Resolves directives against the lookup tables and fills a tree.
pub struct DirectiveProcessor<'a> {
    tables: &'a Tables,
    descriptors: &'a FieldDescriptors,
    class_prefix: &'a str,
    tree: MappingTree,
    stats: DirectiveStats,
}

impl<'a> DirectiveProcessor<'a> {
    pub fn new(tables: &'a Tables, descriptors: &'a FieldDescriptors, class_prefix: &'a str) -> Self {
        Self {
            tables,
            descriptors,
            class_prefix,
            tree: MappingTree::new(),
            stats: DirectiveStats::default(),
        }
    }

    pub fn apply(&mut self, directive: Directive<'_>) -> std::result::Result<(), ParseFailure> {
        match directive {
            Directive::Class { obf, short_name } => {
                let docs = self.tables.classes.get(obf).map(str::to_string);
                self.tree.insert(
                    ClassEntry::new(obf),
                    EntryMapping::new(format!("{}{short_name}", self.class_prefix), docs),
                );
                self.stats.classes += 1;
            }
            Directive::Field {
                member,
                owner,
                name,
                key,
            } => {
                if !looks_obfuscated(owner, name) {
                    debug!("skipping field {member}: name is not obfuscated");
                    self.stats.skipped_fields += 1;
                    return Ok(());
                }
                let descriptor = self
                    .descriptors
                    .get_member(member)
                    .ok_or_else(|| ParseFailure::UnknownFieldDescriptor(member.to_string()))?;
                let fields = &self.tables.fields;
                self.tree.insert(
                    FieldEntry::new(owner, name, descriptor),
                    EntryMapping::new(fields.name_or_key(key), fields.docs(key).map(str::to_string)),
                );
                self.stats.fields += 1;
            }
            Directive::Method {
                owner,
                name,
                descriptor,
                key,
            } => {
                let methods = &self.tables.methods;
                self.tree.insert(
                    MethodEntry::new(owner, name, descriptor),
                    EntryMapping::new(methods.name_or_key(key), methods.docs(key).map(str::to_string)),
                );
                self.stats.methods += 1;
            }
        }
        Ok(())
    }

    /// Streams `path` line by line, applying every mapping directive in order.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|e| ImportError::resource(path, e))?;
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| ImportError::resource(path, e))?;
            let parsed = Directive::parse(&line).map_err(|f| ImportError::parse(path, idx + 1, f))?;
            if let Some(directive) = parsed {
                self.apply(directive)
                    .map_err(|f| ImportError::parse(path, idx + 1, f))?;
            }
        }

        info!(
            "applied {} class, {} field and {} method directives from {} ({} fields skipped)",
            self.stats.classes,
            self.stats.fields,
            self.stats.methods,
            path.display(),
            self.stats.skipped_fields
        );
        Ok(())
    }

    pub fn stats(&self) -> DirectiveStats {
        self.stats
    }

    pub fn finish(self) -> (MappingTree, DirectiveStats) {
        (self.tree, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ClassDocs, FIELD_COLUMNS, METHOD_COLUMNS, MemberTable, Row};
    use crate::tree::Entry;

    fn tables() -> Tables {
        let p = Path::new("t.csv");
        let classes = ClassDocs::from_rows(p, &[Row::parse(5, "1,x,a,Foo,*,\"a foo class\"")]).unwrap();
        let fields = MemberTable::from_rows(
            p,
            &[
                Row::parse(4, "*,*,someKey,*,*,*,renamedField,*"),
                Row::parse(5, "*,*,ab,*,*,*,*,*"),
            ],
            FIELD_COLUMNS,
        )
        .unwrap();
        let methods = MemberTable::from_rows(
            p,
            &[Row::parse(5, "*,func_1_a,*,*,tick,\"Runs, once\"")],
            METHOD_COLUMNS,
        )
        .unwrap();
        Tables {
            classes,
            fields,
            methods,
        }
    }

    fn run(tables: &Tables, descriptors: &FieldDescriptors, lines: &[&str]) -> MappingTree {
        let mut processor = DirectiveProcessor::new(tables, descriptors, "net/minecraft/src/");
        for line in lines {
            if let Some(d) = Directive::parse(line).unwrap() {
                processor.apply(d).unwrap();
            }
        }
        processor.finish().0
    }

    #[test]
    fn parse_recognises_the_three_tags() {
        assert_eq!(
            Directive::parse(".class_map a Foo").unwrap(),
            Some(Directive::Class {
                obf: "a",
                short_name: "Foo"
            })
        );
        assert_eq!(
            Directive::parse(".field_map Ab/c someKey").unwrap(),
            Some(Directive::Field {
                member: "Ab/c",
                owner: "Ab",
                name: "c",
                key: "someKey"
            })
        );
        assert_eq!(
            Directive::parse(".method_map a/b (I)V func_1_a").unwrap(),
            Some(Directive::Method {
                owner: "a",
                name: "b",
                descriptor: "(I)V",
                key: "func_1_a"
            })
        );
    }

    #[test]
    fn parse_ignores_other_lines() {
        assert_eq!(Directive::parse("").unwrap(), None);
        assert_eq!(Directive::parse("# comment").unwrap(), None);
        assert_eq!(Directive::parse(".option Application").unwrap(), None);
        assert_eq!(Directive::parse(".class_mapping a b").unwrap(), None);
    }

    #[test]
    fn parse_rejects_short_lines() {
        assert_eq!(
            Directive::parse(".method_map a/b (I)V"),
            Err(ParseFailure::MissingToken {
                directive: METHOD_MAP,
                expected: 4,
                found: 3
            })
        );
        assert!(matches!(
            Directive::parse(".class_map a"),
            Err(ParseFailure::MissingToken { .. })
        ));
    }

    #[test]
    fn parse_rejects_member_without_owner() {
        assert_eq!(
            Directive::parse(".field_map abc key"),
            Err(ParseFailure::MalformedMember("abc".into()))
        );
        assert!(Directive::parse(".method_map a/ ()V key").is_err());
        assert!(Directive::parse(".method_map a// ()V key").is_err());
        assert!(Directive::parse(".field_map /a key").is_ok());
    }

    #[test]
    fn parse_takes_first_two_segments_of_nested_members() {
        assert_eq!(
            Directive::parse(".field_map net/minecraft/Foo/a field_1_a").unwrap(),
            Some(Directive::Field {
                member: "net/minecraft/Foo/a",
                owner: "net",
                name: "minecraft",
                key: "field_1_a"
            })
        );
        assert_eq!(
            Directive::parse(".method_map a/b/ ()V key").unwrap(),
            Some(Directive::Method {
                owner: "a",
                name: "b",
                descriptor: "()V",
                key: "key"
            })
        );
    }

    #[test]
    fn nested_field_member_is_length_filtered_on_its_first_segments() {
        let tables = tables();
        let descriptors = FieldDescriptors::default();
        let mut processor = DirectiveProcessor::new(&tables, &descriptors, "");
        processor
            .apply(Directive::parse(".field_map net/minecraft/Foo/a field_1_a").unwrap().unwrap())
            .unwrap();
        assert_eq!(processor.stats().skipped_fields, 1);
        assert_eq!(processor.finish().0.field_count(), 0);
    }

    #[test]
    fn nested_field_member_looks_up_the_whole_token() {
        let tables = tables();
        let mut descriptors = FieldDescriptors::default();
        descriptors.insert("a/b", "c", "J".to_string());
        let tree = run(&tables, &descriptors, &[".field_map a/b/c someKey"]);
        let mapping = tree.get(&FieldEntry::new("a", "b", "J").into()).unwrap();
        assert_eq!(mapping.target_name, "renamedField");
    }

    #[test]
    fn nested_method_member_is_inserted_under_its_first_segments() {
        let tables = tables();
        let tree = run(
            &tables,
            &FieldDescriptors::default(),
            &[".method_map net/minecraft/Foo/a ()V func_1_a"],
        );
        let mapping = tree
            .get(&MethodEntry::new("net", "minecraft", "()V").into())
            .unwrap();
        assert_eq!(mapping.target_name, "tick");
        assert_eq!(tree.method_count(), 1);
    }

    #[test]
    fn class_gets_prefix_and_docs() {
        let tables = tables();
        let tree = run(&tables, &FieldDescriptors::default(), &[".class_map a Foo"]);
        let mapping = tree.get(&Entry::Class(ClassEntry::new("a"))).unwrap();
        assert_eq!(mapping.target_name, "net/minecraft/src/Foo");
        assert_eq!(mapping.docs.as_deref(), Some("a foo class"));
    }

    #[test]
    fn long_field_names_are_skipped_without_descriptor_lookup() {
        // Quirk kept as-is: only owner and name shorter than three characters
        // are mapped. An empty descriptor table proves no lookup happens.
        // Follows the `< 3` rule; the `Xy/ab` example elsewhere contradicts it.
        let tables = tables();
        let descriptors = FieldDescriptors::default();
        let mut processor = DirectiveProcessor::new(&tables, &descriptors, "");
        processor
            .apply(Directive::parse(".field_map Xy/abc someKey").unwrap().unwrap())
            .unwrap();
        processor
            .apply(Directive::parse(".field_map Xyz/a someKey").unwrap().unwrap())
            .unwrap();
        assert_eq!(processor.stats().skipped_fields, 2);
        let (tree, _) = processor.finish();
        assert_eq!(tree.field_count(), 0);
    }

    #[test]
    fn method_without_rename_keeps_key() {
        let tables = tables();
        let tree = run(
            &tables,
            &FieldDescriptors::default(),
            &[".method_map averylongclass/averylongname (I)V func_9_z"],
        );
        let mapping = tree
            .get(&MethodEntry::new("averylongclass", "averylongname", "(I)V").into())
            .unwrap();
        assert_eq!(mapping.target_name, "func_9_z");
        assert_eq!(mapping.docs, None);
    }

    #[test]
    fn method_rename_and_docs() {
        let tables = tables();
        let tree = run(
            &tables,
            &FieldDescriptors::default(),
            &[".method_map a/b ()V func_1_a"],
        );
        let mapping = tree.get(&MethodEntry::new("a", "b", "()V").into()).unwrap();
        assert_eq!(mapping.target_name, "tick");
        assert_eq!(mapping.docs.as_deref(), Some("Runs,  once"));
    }

    #[test]
    fn short_field_resolves_descriptor_and_rename() {
        let tables = tables();
        let mut descriptors = FieldDescriptors::default();
        descriptors.insert("Ab", "c", "I".to_string());
        let tree = run(&tables, &descriptors, &[".field_map Ab/c someKey"]);

        let mapping = tree.get(&FieldEntry::new("Ab", "c", "I").into()).unwrap();
        assert_eq!(mapping.target_name, "renamedField");
        assert_eq!(mapping.docs, None);
    }

    #[test]
    fn field_without_descriptor_fails() {
        let tables = tables();
        let descriptors = FieldDescriptors::default();
        let mut processor = DirectiveProcessor::new(&tables, &descriptors, "");
        let err = processor
            .apply(Directive::parse(".field_map Ab/c someKey").unwrap().unwrap())
            .unwrap_err();
        assert_eq!(err, ParseFailure::UnknownFieldDescriptor("Ab/c".into()));
    }
}
