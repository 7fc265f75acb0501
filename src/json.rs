//! Structural serialization of a tree. Parent links are left out; children
//! are written inline in document order.

use std::path::Path;

use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;

use crate::node::BodyKind;
use crate::node::NodeData;
use crate::node::NodeId;
use crate::node::Root;
use crate::node::Source;

struct NodeRef<'a> {
    root: &'a Root,
    id: NodeId,
}

struct Children<'a> {
    root: &'a Root,
    ids: &'a [NodeId],
}

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids.iter().map(|&id| NodeRef {
            root: self.root,
            id,
        }))
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(file) = &self.file {
            map.serialize_entry("file", &file.to_string_lossy())?;
        }
        map.serialize_entry("line", &self.line)?;
        map.serialize_entry("column", &self.column)?;
        map.end()
    }
}

impl Serialize for Root {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind().as_str())?;
        map.serialize_entry(
            "rules",
            &Children {
                root: self,
                ids: &self.rules,
            },
        )?;
        map.serialize_entry("after", &self.after)?;
        if self.semicolon {
            map.serialize_entry("semicolon", &true)?;
        }
        if let Some(file) = &self.source.file {
            map.serialize_entry("source", &FileSource(file))?;
        }
        map.end()
    }
}

/// A root's source only ever carries the file.
struct FileSource<'a>(&'a Path);

impl Serialize for FileSource<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("file", &self.0.to_string_lossy())?;
        map.end()
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.root.node(self.id);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", node.kind().as_str())?;
        match &node.data {
            NodeData::AtRule(at_rule) => {
                map.serialize_entry("before", &at_rule.before)?;
                map.serialize_entry("name", &at_rule.name)?;
                map.serialize_entry("afterName", &at_rule.after_name)?;
                map.serialize_entry("params", &at_rule.params)?;
                map.serialize_entry("between", &at_rule.between)?;
                if let Some(body) = &at_rule.body {
                    let key = match body.kind {
                        BodyKind::Rules => "rules",
                        BodyKind::Decls => "decls",
                    };
                    map.serialize_entry(
                        key,
                        &Children {
                            root: self.root,
                            ids: &body.children,
                        },
                    )?;
                    map.serialize_entry("after", &body.after)?;
                    if body.semicolon {
                        map.serialize_entry("semicolon", &true)?;
                    }
                }
            }
            NodeData::Rule(rule) => {
                map.serialize_entry("before", &rule.before)?;
                map.serialize_entry("selector", &rule.selector)?;
                map.serialize_entry("between", &rule.between)?;
                map.serialize_entry(
                    "decls",
                    &Children {
                        root: self.root,
                        ids: &rule.decls,
                    },
                )?;
                map.serialize_entry("after", &rule.after)?;
                if rule.semicolon {
                    map.serialize_entry("semicolon", &true)?;
                }
            }
            NodeData::Decl(decl) => {
                map.serialize_entry("before", &decl.before)?;
                map.serialize_entry("prop", &decl.prop)?;
                map.serialize_entry("between", &decl.between)?;
                map.serialize_entry("value", &decl.value)?;
                if decl.important {
                    map.serialize_entry("important", &true)?;
                }
                if !decl.after.is_empty() {
                    map.serialize_entry("after", &decl.after)?;
                }
            }
            NodeData::Comment(comment) => {
                map.serialize_entry("before", &comment.before)?;
                map.serialize_entry("left", &comment.left)?;
                map.serialize_entry("text", &comment.text)?;
                map.serialize_entry("right", &comment.right)?;
            }
        }
        map.serialize_entry("source", &node.source)?;
        map.end()
    }
}
