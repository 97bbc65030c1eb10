//! Syntax tree walker that collects assertions inside test functions.
//!
//! Python sources are parsed with tree-sitter. The walk is iterative over a
//! `TreeCursor`, so deeply nested expressions cannot exhaust the call stack.
//! Class and function scopes live on an explicit stack that is pushed when a
//! definition node is entered and popped when the cursor leaves it.
//!
//! Only plain `def` opens a function scope. An `async def` is transparent: its
//! body is attributed to whatever function encloses it.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::classify::is_test_function;
use crate::error::{Result, ScanError};
use crate::lines::LineIndex;
use crate::source::normalize_newlines;
use crate::AssertionRecord;

/// Node kinds the walker reacts to. Everything else just gets descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    ClassDef,
    FunctionDef,
    /// `@decorator` wrapper around a class or function definition.
    Decorated,
    Assert,
    Call,
    Other,
}

impl NodeKind {
    fn of(node: &Node) -> Self {
        match node.kind() {
            "class_definition" => NodeKind::ClassDef,
            "function_definition" if !is_async(node) => NodeKind::FunctionDef,
            "decorated_definition" => NodeKind::Decorated,
            "assert_statement" => NodeKind::Assert,
            "call" => NodeKind::Call,
            _ => NodeKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Class,
    Function,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    name: String,
    /// Node id that opened the scope; the frame is popped when it is left.
    owner: usize,
}

/// Lexical class/function nesting at the cursor position.
#[derive(Debug, Default)]
struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    fn push(&mut self, kind: ScopeKind, name: String, owner: usize) {
        self.frames.push(Scope { kind, name, owner });
    }

    fn pop_owned_by(&mut self, owner: usize) {
        while self.frames.last().is_some_and(|frame| frame.owner == owner) {
            self.frames.pop();
        }
    }

    fn innermost(&self, kind: ScopeKind) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.kind == kind)
            .map(|frame| frame.name.as_str())
    }
}

fn is_async(node: &Node) -> bool {
    node.child(0).is_some_and(|first| first.kind() == "async")
}

/// Parse Python source into a tree. Error and missing nodes are syntax errors,
/// and so are the Python 2 `print`/`exec` statements the grammar still accepts.
pub fn parse_python(source: &str, path: &Path) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|err| ScanError::Grammar(err.to_string()))?;
    let tree = parser.parse(source, None).ok_or_else(|| ScanError::Parse {
        path: path.to_path_buf(),
        line: 1,
        message: "parser produced no tree".into(),
    })?;
    if let Some(node) = first_rejected(tree.root_node()) {
        let message = match node.kind() {
            "print_statement" => "missing parentheses in call to 'print'".to_string(),
            "exec_statement" => "missing parentheses in call to 'exec'".to_string(),
            kind if node.is_missing() => format!("missing {kind}"),
            _ => "invalid syntax".to_string(),
        };
        return Err(ScanError::Parse {
            path: path.to_path_buf(),
            line: node.start_position().row + 1,
            message,
        });
    }
    Ok(tree)
}

/// First node, in document order, that Python itself would refuse to parse.
fn first_rejected(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error()
            || node.is_missing()
            || matches!(node.kind(), "print_statement" | "exec_statement")
        {
            return Some(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Walks one parsed file and records every assertion found in a test function.
pub struct AssertionWalker<'a> {
    filepath: &'a str,
    source: &'a [u8],
    lines: &'a LineIndex,
    scopes: ScopeStack,
    records: Vec<AssertionRecord>,
}

impl<'a> AssertionWalker<'a> {
    pub fn new(filepath: &'a str, source: &'a str, lines: &'a LineIndex) -> Self {
        Self {
            filepath,
            source: source.as_bytes(),
            lines,
            scopes: ScopeStack::default(),
            records: Vec::new(),
        }
    }

    /// Visit every node in document order and return the collected records.
    pub fn walk(mut self, tree: &Tree) -> Vec<AssertionRecord> {
        let mut cursor = tree.walk();
        'walk: loop {
            let node = cursor.node();
            self.enter(&node);
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                self.scopes.pop_owned_by(cursor.node().id());
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }
        self.records
    }

    fn enter(&mut self, node: &Node) {
        match NodeKind::of(node) {
            NodeKind::ClassDef => self.open_scope(ScopeKind::Class, node, node.id()),
            NodeKind::FunctionDef => self.open_scope(ScopeKind::Function, node, node.id()),
            NodeKind::Decorated => {
                // Decorators belong to the definition they wrap.
                if let Some(definition) = node.child_by_field_name("definition") {
                    match NodeKind::of(&definition) {
                        NodeKind::ClassDef => {
                            self.open_scope(ScopeKind::Class, &definition, node.id())
                        }
                        NodeKind::FunctionDef => {
                            self.open_scope(ScopeKind::Function, &definition, node.id())
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::Assert => {
                let line = node.start_position().row + 1;
                self.record(line, || format!("Assert at line {line}"));
            }
            NodeKind::Call => {
                if self.is_assertion_method_call(node) {
                    let line = node.start_position().row + 1;
                    self.record(line, || format!("Assertion method at line {line}"));
                }
            }
            NodeKind::Other => {}
        }
    }

    fn open_scope(&mut self, kind: ScopeKind, definition: &Node, owner: usize) {
        let name = definition
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.source).ok())
            .unwrap_or_default()
            .to_string();
        self.scopes.push(kind, name, owner);
    }

    /// `obj.assertSomething(...)`: an attribute call whose name starts with
    /// "assert" in any case.
    fn is_assertion_method_call(&self, node: &Node) -> bool {
        let Some(function) = node.child_by_field_name("function") else {
            return false;
        };
        if function.kind() != "attribute" {
            return false;
        }
        function
            .child_by_field_name("attribute")
            .and_then(|attr| attr.utf8_text(self.source).ok())
            .is_some_and(|name| {
                name.get(..6)
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case("assert"))
            })
    }

    fn record(&mut self, line: usize, placeholder: impl FnOnce() -> String) {
        let Some(test_name) = self
            .scopes
            .innermost(ScopeKind::Function)
            .filter(|name| is_test_function(name))
        else {
            return;
        };
        let assert_string = match self.lines.get(line) {
            Some(text) => text.trim().to_string(),
            None => placeholder(),
        };
        self.records.push(AssertionRecord {
            filepath: self.filepath.to_string(),
            test_class: self
                .scopes
                .innermost(ScopeKind::Class)
                .unwrap_or_default()
                .to_string(),
            test_name: test_name.to_string(),
            line_number: line,
            assert_string,
        });
    }
}

/// Parse `source` and collect its assertion records.
pub fn extract_assertions(
    filepath: &str,
    source: &str,
    path: &Path,
) -> Result<Vec<AssertionRecord>> {
    let source = normalize_newlines(source);
    let tree = parse_python(&source, path)?;
    let lines = LineIndex::from_text(&source);
    Ok(AssertionWalker::new(filepath, &source, &lines).walk(&tree))
}
