//! Reconstructs a leftmost-derivation parse tree from an accepted run.

use crate::dpda::Dpda;
use crate::error::Ll1Error;
use crate::executor::StepKind;
use crate::symbol::Symbol;

/// A node of the derivation tree: a symbol, its children, and whether it is
/// a leaf.
///
/// Children are a fresh, per-node `Vec` created at construction (Open
/// Question (c)): there is no shared mutable default that could leak state
/// between nodes, unlike the source's `children=[]` constructor default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub symbol: Symbol,
    pub children: Vec<Node>,
    pub is_leaf: bool,
}

impl Node {
    fn new(symbol: Symbol) -> Self {
        Node {
            symbol,
            children: Vec::new(),
            is_leaf: false,
        }
    }

    /// The leaf-yield of this subtree, left to right, ignoring epsilon
    /// leaves (property 7: the yield of an accepted parse equals the
    /// input).
    pub fn leaf_yield(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_yield(&mut out);
        out
    }

    fn collect_yield<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.is_leaf {
            if !self.symbol.is_epsilon() {
                if let Some(name) = self.symbol.name() {
                    out.push(name);
                }
            }
            return;
        }
        for child in &self.children {
            child.collect_yield(out);
        }
    }
}

/// Arena entry used while the tree is under construction; converted to an
/// owned [`Node`] tree once the run finishes.
struct Building {
    symbol: Symbol,
    children: Vec<usize>,
    is_leaf: bool,
}

impl Dpda {
    /// Reconstructs the parse tree for `tokens` (the terminal-name stream
    /// the executor consumed) given `lexemes`, the original surface text
    /// matched for each token, used to label leaves.
    ///
    /// Mirrors the executor's already-computed step list with a parallel
    /// node stack (Design Note "Parallel stacks for tree building"), so the
    /// two can never diverge: each step pops exactly one node, and — for
    /// EXPAND/EPSILON steps — pushes fresh children in the same order the
    /// executor pushed their symbols.
    pub fn reconstruct_tree(&self, tokens: &[Symbol], lexemes: &[String]) -> Result<Node, Ll1Error> {
        let run = self.run(tokens);
        if !run.accepted {
            return Err(self.reject_reasons(tokens, &run));
        }

        let mut arena: Vec<Building> = vec![Building {
            symbol: self.initial_stack_symbol().clone(),
            children: Vec::new(),
            is_leaf: false,
        }];
        let mut node_stack = vec![0usize];
        let mut token_index = 0usize;

        for step in &run.steps {
            let node_id = node_stack
                .pop()
                .expect("node stack mirrors the executor's symbol stack");

            // The terminating (q, ε, Z0) -> (f, []) move pops Z0 with
            // nothing pushed; it has no tree-level effect.
            if step.stack_top == *self.initial_stack_symbol() && step.push.is_empty() {
                continue;
            }

            match step.kind {
                StepKind::MatchConsume => {
                    let lexeme = lexemes.get(token_index).cloned().unwrap_or_default();
                    arena[node_id].symbol = Symbol::Terminal(lexeme);
                    arena[node_id].is_leaf = true;
                    token_index += 1;
                }
                _ if step.push.is_empty() => {
                    let eps_id = arena.len();
                    arena.push(Building {
                        symbol: Symbol::Epsilon,
                        children: Vec::new(),
                        is_leaf: true,
                    });
                    arena[node_id].children.push(eps_id);
                }
                _ => {
                    let mut child_ids = Vec::with_capacity(step.push.len());
                    for symbol in &step.push {
                        let id = arena.len();
                        arena.push(Building {
                            symbol: symbol.clone(),
                            children: Vec::new(),
                            is_leaf: false,
                        });
                        child_ids.push(id);
                    }
                    arena[node_id].children = child_ids.clone();
                    for id in child_ids.into_iter().rev() {
                        node_stack.push(id);
                    }
                }
            }
        }

        fn build(arena: &[Building], id: usize) -> Node {
            let entry = &arena[id];
            let mut node = Node::new(entry.symbol.clone());
            node.is_leaf = entry.is_leaf;
            node.children = entry.children.iter().map(|&c| build(arena, c)).collect();
            node
        }

        let root = build(&arena, 0);
        Ok(root.children.into_iter().next().unwrap_or(root))
    }
}
