//! Scope arena, bindings and traversal utilities.

use std::collections::BTreeMap;

use js2py_diagnostics::Position;
use swc_common::Span;

/// Index of a scope in its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeType {
    Global,
    Function,
    Block,
    Class,
    Catch,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Global => "global",
            ScopeType::Function => "function",
            ScopeType::Block => "block",
            ScopeType::Class => "class",
            ScopeType::Catch => "catch",
        }
    }

    /// Scopes that receive hoisted `var` bindings.
    pub fn is_var_scope(&self) -> bool {
        matches!(self, ScopeType::Global | ScopeType::Function)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Parameter,
    CatchParameter,
    Import,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Var => "var",
            BindingKind::Let => "let",
            BindingKind::Const => "const",
            BindingKind::Function => "function",
            BindingKind::Class => "class",
            BindingKind::Parameter => "parameter",
            BindingKind::CatchParameter => "catch_parameter",
            BindingKind::Import => "import",
        }
    }
}

/// Reference to a syntax node: its ESTree kind name and source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub kind: &'static str,
    pub span: Span,
}

impl NodeRef {
    pub fn new(kind: &'static str, span: Span) -> Self {
        Self { kind, span }
    }
}

/// One declaration occurrence of a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Position of the declared identifier
    pub position: Option<Position>,
    /// Span of the declared identifier
    pub span: Span,
    /// The declaration that introduced the name
    pub node: NodeRef,
}

/// A lexical scope. Built by the analyzer and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Scope {
    id: ScopeId,
    scope_type: ScopeType,
    node: NodeRef,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    bindings: BTreeMap<String, Vec<Binding>>,
}

impl Scope {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn scope_type(&self) -> ScopeType {
        self.scope_type
    }

    /// The syntax node that opened this scope.
    pub fn node(&self) -> NodeRef {
        self.node
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn bindings(&self) -> &BTreeMap<String, Vec<Binding>> {
        &self.bindings
    }

    /// Bindings for `name` declared directly in this scope, in source order.
    pub fn lookup(&self, name: &str) -> &[Binding] {
        self.bindings.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn declares(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn bindings_of_kind(&self, kind: BindingKind) -> impl Iterator<Item = &Binding> {
        self.bindings
            .values()
            .flatten()
            .filter(move |binding| binding.kind == kind)
    }

    /// Sorted, de-duplicated names declared with `kind`.
    pub fn names_of_kind(&self, kind: BindingKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .bindings_of_kind(kind)
            .map(|binding| binding.name.as_str())
            .collect();
        names.dedup();
        names
    }
}

/// Arena of scopes. Index 0 is always the global scope.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub(crate) fn with_root(node: NodeRef) -> Self {
        Self {
            scopes: vec![Scope {
                id: ScopeId(0),
                scope_type: ScopeType::Global,
                node,
                parent: None,
                children: Vec::new(),
                bindings: BTreeMap::new(),
            }],
        }
    }

    pub(crate) fn create_scope(
        &mut self,
        scope_type: ScopeType,
        node: NodeRef,
        parent: ScopeId,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            scope_type,
            node,
            parent: Some(parent),
            children: Vec::new(),
            bindings: BTreeMap::new(),
        });
        if let Some(parent_scope) = self.scopes.get_mut(parent.index()) {
            parent_scope.children.push(id);
        }
        log::trace!("opened {} scope {} under {}", scope_type.as_str(), id, parent);
        id
    }

    pub(crate) fn declare(&mut self, scope: ScopeId, binding: Binding) {
        if let Some(scope) = self.scopes.get_mut(scope.index()) {
            scope
                .bindings
                .entry(binding.name.clone())
                .or_default()
                .push(binding);
        }
    }

    pub fn root(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Nearest Function or Global scope at or above `id`.
    pub fn hoisting_target(&self, id: ScopeId) -> ScopeId {
        let mut current = id;
        while let Some(scope) = self.get(current) {
            if scope.scope_type.is_var_scope() {
                return scope.id;
            }
            match scope.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        ScopeId(0)
    }

    /// Nearest scope at or above `from` that declares `name`.
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<&Scope> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.get(id)?;
            if scope.declares(name) {
                return Some(scope);
            }
            current = scope.parent;
        }
        None
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: ScopeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(Scope::parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).and_then(Scope::parent);
        }
        depth
    }

    /// Depth-first walk with an explicit stack: parent before children,
    /// children in source order.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![ScopeId(0)],
        }
    }

    /// Structure of the tree without scope IDs or positions.
    pub fn shape(&self) -> ScopeShape {
        self.shape_of(self.root())
    }

    fn shape_of(&self, scope: &Scope) -> ScopeShape {
        ScopeShape {
            scope_type: scope.scope_type,
            node_kind: scope.node.kind,
            bindings: scope
                .bindings
                .iter()
                .map(|(name, bindings)| {
                    (name.clone(), bindings.iter().map(|b| b.kind).collect())
                })
                .collect(),
            children: scope
                .children
                .iter()
                .filter_map(|id| self.get(*id))
                .map(|child| self.shape_of(child))
                .collect(),
        }
    }
}

pub struct DepthFirst<'a> {
    tree: &'a ScopeTree,
    stack: Vec<ScopeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let scope = self.tree.get(id)?;
        self.stack.extend(scope.children.iter().rev().copied());
        Some(scope)
    }
}

/// Comparable summary of a scope subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeShape {
    pub scope_type: ScopeType,
    pub node_kind: &'static str,
    pub bindings: Vec<(String, Vec<BindingKind>)>,
    pub children: Vec<ScopeShape>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::DUMMY_SP;

    fn binding(name: &str, kind: BindingKind) -> Binding {
        Binding {
            name: name.to_string(),
            kind,
            position: None,
            span: DUMMY_SP,
            node: NodeRef::new("Identifier", DUMMY_SP),
        }
    }

    fn sample_tree() -> ScopeTree {
        // S0 global
        //   S1 function
        //     S3 block
        //       S4 catch
        //   S2 class
        let mut tree = ScopeTree::with_root(NodeRef::new("Program", DUMMY_SP));
        let function = tree.create_scope(
            ScopeType::Function,
            NodeRef::new("FunctionDeclaration", DUMMY_SP),
            ScopeId(0),
        );
        tree.create_scope(ScopeType::Class, NodeRef::new("ClassBody", DUMMY_SP), ScopeId(0));
        let block = tree.create_scope(
            ScopeType::Block,
            NodeRef::new("BlockStatement", DUMMY_SP),
            function,
        );
        tree.create_scope(ScopeType::Catch, NodeRef::new("CatchClause", DUMMY_SP), block);
        tree
    }

    #[test]
    fn test_depth_first_order() {
        let tree = sample_tree();
        let order: Vec<u32> = tree.iter_depth_first().map(|s| s.id().0).collect();
        assert_eq!(order, vec![0, 1, 3, 4, 2]);
    }

    #[test]
    fn test_hoisting_target_skips_block_and_catch() {
        let tree = sample_tree();
        assert_eq!(tree.hoisting_target(ScopeId(4)), ScopeId(1));
        assert_eq!(tree.hoisting_target(ScopeId(3)), ScopeId(1));
        assert_eq!(tree.hoisting_target(ScopeId(2)), ScopeId(0));
        assert_eq!(tree.depth(ScopeId(4)), 3);
    }

    #[test]
    fn test_resolve_walks_parents() {
        let mut tree = sample_tree();
        tree.declare(ScopeId(0), binding("top", BindingKind::Var));
        tree.declare(ScopeId(3), binding("inner", BindingKind::Let));

        assert_eq!(tree.resolve(ScopeId(4), "top").map(Scope::id), Some(ScopeId(0)));
        assert_eq!(tree.resolve(ScopeId(4), "inner").map(Scope::id), Some(ScopeId(3)));
        assert!(tree.resolve(ScopeId(1), "inner").is_none());
    }

    #[test]
    fn test_redeclaration_keeps_every_binding() {
        let mut tree = sample_tree();
        tree.declare(ScopeId(1), binding("x", BindingKind::Var));
        tree.declare(ScopeId(1), binding("x", BindingKind::Var));

        let scope = tree.get(ScopeId(1)).unwrap();
        assert_eq!(scope.lookup("x").len(), 2);
        assert_eq!(scope.names_of_kind(BindingKind::Var), vec!["x"]);
        assert!(scope.lookup("y").is_empty());
    }
}
