//! LALR(1) action and goto tables
//!
//! The tables are derived once per process from [`PRODUCTIONS`] and then only
//! read.  Construction builds LR(1) item sets keyed by their kernel cores, so
//! states whose cores coincide share one entry and merge lookaheads (the
//! LALR(1) collection).  Terminal sets are `u64` bitmasks indexed by
//! [`TokenKind::index`].

use super::grammar::{productions, NonTerminal, Sym, PRODUCTIONS};
use super::token::TokenKind;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, VecDeque};
use std::sync::OnceLock;

/// Parser action for a (state, terminal) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// A resolved table conflict, kept for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub token: TokenKind,
    pub kept: Action,
    pub dropped: Action,
}

#[derive(Debug, Clone)]
pub struct StateRow {
    actions: [Option<Action>; TokenKind::COUNT],
    gotos: [Option<usize>; NonTerminal::COUNT],
    can_recover: bool,
}

/// Immutable parse tables
#[derive(Debug)]
pub struct ParseTables {
    rows: Vec<StateRow>,
    conflicts: Vec<Conflict>,
}

impl ParseTables {
    pub fn action(&self, state: usize, token: TokenKind) -> Option<Action> {
        self.rows[state].actions[token.index()]
    }

    pub fn goto(&self, state: usize, nt: NonTerminal) -> Option<usize> {
        self.rows[state].gotos[nt.index()]
    }

    /// Whether `state` can shift the `error` pseudo-token
    pub fn can_recover(&self, state: usize) -> bool {
        self.rows[state].can_recover
    }

    /// Terminals with an action in `state`, in table order, `error` excluded
    pub fn expected(&self, state: usize) -> Vec<TokenKind> {
        TokenKind::ALL
            .iter()
            .copied()
            .filter(|&k| k != TokenKind::Error && self.action(state, k).is_some())
            .collect()
    }

    pub fn state_count(&self) -> usize {
        self.rows.len()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}

static TABLES: OnceLock<ParseTables> = OnceLock::new();

/// Shared tables, built on first use
pub fn tables() -> &'static ParseTables {
    TABLES.get_or_init(build)
}

/// Build the tables eagerly; later calls are no-ops.
pub fn init() {
    tables();
}

// ===== Construction =====

type TermSet = u64;

fn bit(kind: TokenKind) -> TermSet {
    1u64 << kind.index()
}

/// An LR(0) item: production index and dot position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Item {
    prod: usize,
    dot: usize,
}

impl Item {
    fn next_symbol(self) -> Option<Sym> {
        PRODUCTIONS[self.prod].rhs.get(self.dot).copied()
    }
}

/// An item set under construction: sorted kernel items with their lookaheads
struct ItemSet {
    kernel: Vec<Item>,
    lookaheads: Vec<TermSet>,
}

struct First {
    nullable: [bool; NonTerminal::COUNT],
    first: [TermSet; NonTerminal::COUNT],
}

impl First {
    fn compute() -> Self {
        let mut nullable = [false; NonTerminal::COUNT];
        let mut first = [0u64; NonTerminal::COUNT];
        let mut changed = true;
        while changed {
            changed = false;
            for prod in productions() {
                let lhs = prod.lhs.index();
                let mut set = first[lhs];
                let mut all_nullable = true;
                for sym in prod.rhs {
                    match *sym {
                        Sym::T(k) => {
                            set |= bit(k);
                            all_nullable = false;
                        }
                        Sym::N(nt) => {
                            set |= first[nt.index()];
                            if !nullable[nt.index()] {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if set != first[lhs] {
                    first[lhs] = set;
                    changed = true;
                }
                if all_nullable && !nullable[lhs] {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
        }
        Self { nullable, first }
    }

    /// FIRST of a symbol sequence, and whether the whole sequence is nullable
    fn of_sequence(&self, symbols: &[Sym]) -> (TermSet, bool) {
        let mut set = 0;
        for sym in symbols {
            match *sym {
                Sym::T(k) => return (set | bit(k), false),
                Sym::N(nt) => {
                    set |= self.first[nt.index()];
                    if !self.nullable[nt.index()] {
                        return (set, false);
                    }
                }
            }
        }
        (set, true)
    }
}

/// LR(1) closure of a kernel; returns every item with its lookahead set
fn closure(first: &First, set: &ItemSet) -> Vec<(Item, TermSet)> {
    let mut items: Vec<(Item, TermSet)> = Vec::new();
    let mut position: FxHashMap<Item, usize> = FxHashMap::default();
    let mut work: Vec<usize> = Vec::new();

    for (item, la) in set.kernel.iter().zip(&set.lookaheads) {
        position.insert(*item, items.len());
        work.push(items.len());
        items.push((*item, *la));
    }

    while let Some(i) = work.pop() {
        let (item, la) = items[i];
        let rhs = PRODUCTIONS[item.prod].rhs;
        let Some(Sym::N(nt)) = rhs.get(item.dot).copied() else {
            continue;
        };
        let (mut follow, nullable) = first.of_sequence(&rhs[item.dot + 1..]);
        if nullable {
            follow |= la;
        }
        for (prod, p) in productions().iter().enumerate() {
            if p.lhs != nt {
                continue;
            }
            let new_item = Item { prod, dot: 0 };
            match position.get(&new_item) {
                Some(&j) => {
                    let merged = items[j].1 | follow;
                    if merged != items[j].1 {
                        items[j].1 = merged;
                        work.push(j);
                    }
                }
                None => {
                    position.insert(new_item, items.len());
                    work.push(items.len());
                    items.push((new_item, follow));
                }
            }
        }
    }
    items
}

/// Kernel sets reachable from `items`, grouped by the symbol after the dot
fn successors(items: &[(Item, TermSet)]) -> BTreeMap<Sym, ItemSet> {
    let mut grouped: BTreeMap<Sym, BTreeMap<Item, TermSet>> = BTreeMap::new();
    for (item, la) in items {
        if let Some(sym) = item.next_symbol() {
            let advanced = Item {
                prod: item.prod,
                dot: item.dot + 1,
            };
            *grouped.entry(sym).or_default().entry(advanced).or_insert(0) |= *la;
        }
    }
    grouped
        .into_iter()
        .map(|(sym, kernel)| {
            let (kernel, lookaheads) = kernel.into_iter().unzip();
            (sym, ItemSet { kernel, lookaheads })
        })
        .collect()
}

fn build() -> ParseTables {
    let first = First::compute();

    let mut sets = vec![ItemSet {
        kernel: vec![Item { prod: 0, dot: 0 }],
        lookaheads: vec![bit(TokenKind::Eof)],
    }];
    let mut by_core: FxHashMap<Vec<Item>, usize> = FxHashMap::default();
    by_core.insert(sets[0].kernel.clone(), 0);
    let mut transitions: Vec<BTreeMap<Sym, usize>> = vec![BTreeMap::new()];

    let mut queue = VecDeque::from([0usize]);
    let mut queued = vec![true];

    while let Some(state) = queue.pop_front() {
        queued[state] = false;
        let items = closure(&first, &sets[state]);

        for (sym, next) in successors(&items) {
            let target = match by_core.get(&next.kernel) {
                Some(&existing) => {
                    let mut grew = false;
                    for (la, extra) in sets[existing].lookaheads.iter_mut().zip(&next.lookaheads) {
                        if *la | extra != *la {
                            *la |= extra;
                            grew = true;
                        }
                    }
                    if grew && !queued[existing] {
                        queued[existing] = true;
                        queue.push_back(existing);
                    }
                    existing
                }
                None => {
                    let id = sets.len();
                    by_core.insert(next.kernel.clone(), id);
                    sets.push(next);
                    transitions.push(BTreeMap::new());
                    queued.push(true);
                    queue.push_back(id);
                    id
                }
            };
            transitions[state].insert(sym, target);
        }
    }

    let mut rows = Vec::with_capacity(sets.len());
    let mut conflicts = Vec::new();

    for (state, set) in sets.iter().enumerate() {
        let mut row = StateRow {
            actions: [None; TokenKind::COUNT],
            gotos: [None; NonTerminal::COUNT],
            can_recover: false,
        };

        for (sym, &target) in &transitions[state] {
            match *sym {
                Sym::T(k) => row.actions[k.index()] = Some(Action::Shift(target)),
                Sym::N(nt) => row.gotos[nt.index()] = Some(target),
            }
        }

        for (item, la) in closure(&first, set) {
            if item.next_symbol().is_some() {
                continue;
            }
            if item.prod == 0 {
                row.actions[TokenKind::Eof.index()] = Some(Action::Accept);
                continue;
            }
            for kind in TokenKind::ALL {
                if la & bit(kind) == 0 {
                    continue;
                }
                let incoming = Action::Reduce(item.prod);
                let slot = &mut row.actions[kind.index()];
                match *slot {
                    None => *slot = Some(incoming),
                    Some(existing) => {
                        let kept = resolve(existing, incoming);
                        let dropped = if kept == existing { incoming } else { existing };
                        *slot = Some(kept);
                        conflicts.push(Conflict {
                            state,
                            token: kind,
                            kept,
                            dropped,
                        });
                    }
                }
            }
        }

        row.can_recover = matches!(
            row.actions[TokenKind::Error.index()],
            Some(Action::Shift(_))
        );
        rows.push(row);
    }

    ParseTables { rows, conflicts }
}

/// Shift beats reduce; between reductions the earlier production wins.
fn resolve(existing: Action, incoming: Action) -> Action {
    match (existing, incoming) {
        (Action::Reduce(a), Action::Reduce(b)) => Action::Reduce(a.min(b)),
        (Action::Reduce(_), other) => other,
        (kept, _) => kept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_has_no_conflicts() {
        let tables = tables();
        assert!(
            tables.conflicts().is_empty(),
            "conflicts: {:?}",
            tables.conflicts()
        );
    }

    #[test]
    fn test_initial_state_recovers_and_accepts_empty() {
        let tables = tables();
        assert!(tables.can_recover(0));
        // Empty program: reduce Stmts -> ε on end of input
        assert!(matches!(
            tables.action(0, TokenKind::Eof),
            Some(Action::Reduce(_))
        ));
    }

    #[test]
    fn test_bang_bang_has_no_action() {
        let tables = tables();
        let Some(Action::Shift(after_bang)) = tables.action(0, TokenKind::Bang) else {
            panic!("'!' should shift at statement start");
        };
        assert_eq!(tables.action(after_bang, TokenKind::Bang), None);
        assert!(tables.action(after_bang, TokenKind::LParen).is_some());
    }

    #[test]
    fn test_expected_excludes_error() {
        let tables = tables();
        let expected = tables.expected(0);
        assert!(!expected.contains(&TokenKind::Error));
        assert!(expected.contains(&TokenKind::Var));
        assert!(expected.contains(&TokenKind::Eof));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(Action::Shift(3), Action::Reduce(1)), Action::Shift(3));
        assert_eq!(resolve(Action::Reduce(1), Action::Shift(3)), Action::Shift(3));
        assert_eq!(resolve(Action::Reduce(5), Action::Reduce(2)), Action::Reduce(2));
    }
}
