use std::fmt::Display;

use crate::node::AtRule;
use crate::node::Comment;
use crate::node::Declaration;
use crate::node::NodeData;
use crate::node::NodeId;
use crate::node::Root;
use crate::node::Rule;
use crate::parser::split_important;
use crate::tokenizer::is_white_space;

/// Rebuilds source text from the raw fragments kept on each node.
#[derive(Debug)]
pub struct Stringifier<'a> {
    root: &'a Root,
    result: String,
}

impl<'a> Stringifier<'a> {
    pub fn new(root: &'a Root) -> Self {
        Self {
            root,
            result: String::new(),
        }
    }

    pub fn stringify_root(mut self) -> String {
        let root = self.root;
        self.body(&root.rules, root.semicolon);
        self.result += &root.after;
        self.result
    }

    pub fn stringify_node(mut self, id: NodeId) -> String {
        self.node(id);
        self.result
    }

    fn body(&mut self, children: &[NodeId], semicolon: bool) {
        let last_statement = children
            .iter()
            .rposition(|&id| !self.root.node(id).is_comment());
        for (i, &id) in children.iter().enumerate() {
            self.node(id);
            if self.root.node(id).is_statement() && (Some(i) != last_statement || semicolon) {
                self.result.push(';');
            }
        }
    }

    fn node(&mut self, id: NodeId) {
        let root = self.root;
        match &root.node(id).data {
            NodeData::AtRule(at_rule) => self.at_rule(at_rule),
            NodeData::Rule(rule) => self.rule(rule),
            NodeData::Decl(decl) => self.decl(decl),
            NodeData::Comment(comment) => self.comment(comment),
        }
    }

    fn at_rule(&mut self, at_rule: &AtRule) {
        self.result += &at_rule.before;
        self.result.push('@');
        self.result += &at_rule.name;
        self.result += &at_rule.after_name;
        self.result += &at_rule.params;
        self.result += &at_rule.between;
        if let Some(body) = &at_rule.body {
            self.result.push('{');
            self.body(&body.children, body.semicolon);
            self.result += &body.after;
            self.result.push('}');
        }
    }

    fn rule(&mut self, rule: &Rule) {
        self.result += &rule.before;
        self.result += &rule.selector;
        self.result += &rule.between;
        self.result.push('{');
        self.body(&rule.decls, rule.semicolon);
        self.result += &rule.after;
        self.result.push('}');
    }

    fn decl(&mut self, decl: &Declaration) {
        self.result += &decl.before;
        self.result += &decl.prop;
        self.result += &decl.between;
        self.result += &decl.value;
        let marker = decl.after.trim_end_matches(is_white_space);
        let marked = split_important(marker).is_some();
        if decl.important == marked {
            self.result += &decl.after;
        } else if decl.important {
            self.result += " !important";
            self.result += &decl.after;
        } else {
            self.result += &decl.after[marker.len()..];
        }
    }

    fn comment(&mut self, comment: &Comment) {
        self.result += &comment.before;
        self.result += "/*";
        self.result += &comment.left;
        self.result += &comment.text;
        self.result += &comment.right;
        self.result += "*/";
    }
}

impl Root {
    /// Text of a single node, including its leading raw text.
    pub fn stringify_node(&self, id: NodeId) -> String {
        Stringifier::new(self).stringify_node(id)
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Stringifier::new(self).stringify_root())
    }
}
