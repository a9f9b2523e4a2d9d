//! Maps identifier text to declaration metadata and enforces the §4.5
//! semantic rules: a name may be declared once, every use of an
//! identifier must be preceded by its declaration, and assigning into a
//! `CONST` name is rejected.
//!
//! Grounded in the reference codebase's `analyze` module, which builds an
//! `IndexMap`-backed table in one pass over the parse tree before lowering
//! to its typed IR; this keeps the same shape (declare-then-resolve, no
//! mutation of already-declared entries) while swapping in the PARAM/VAR/
//! CONST vocabulary this language actually has. Ids are 1-based and dense;
//! 0 is reserved and never handed out.

use indexmap::IndexMap;

use crate::diagnostic::Diagnostic;
use crate::source::SourceSpan;

/// Where a symbol came from: affects whether it may be assigned to, and
/// whether it is supplied by the caller at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Param,
    Var,
    Const,
}

/// A unique, dense, 1-based handle into a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(crate) std::num::NonZeroU32);

impl SymbolId {
    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn from_index(index: usize) -> Self {
        SymbolId(std::num::NonZeroU32::new(index as u32 + 1).expect("index + 1 is never zero"))
    }

    fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Where the name was declared (the identifier in the PARAM/VAR/CONST
    /// list), for "Original declaration here" notes.
    pub declared_at: SourceSpan,
    /// True at declaration for `Param` and `Const`; false for `Var` until
    /// its first assignment.
    pub initialized: bool,
    pub constant: bool,
}

/// Declare-once, resolve-many table built while walking the declaration
/// sections, then consulted while walking statements.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: IndexMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new name. Fails "Redefinition of identifier!" with a note
    /// at the original declaration if the name is already bound.
    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        span: SourceSpan,
        initialized: bool,
    ) -> Result<SymbolId, Diagnostic> {
        if let Some(&existing) = self.by_name.get(name) {
            let prior = &self.symbols[existing.to_index()];
            return Err(
                Diagnostic::error("Redefinition of identifier!", span)
                    .with_cause(Diagnostic::note("Original declaration here", prior.declared_at)),
            );
        }

        let id = SymbolId::from_index(self.symbols.len());
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            kind,
            declared_at: span,
            initialized,
            constant: kind == SymbolKind::Const,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Resolves a read reference: the identifier must exist and must
    /// already have been initialized.
    pub fn use_read(&self, name: &str, span: SourceSpan) -> Result<SymbolId, Diagnostic> {
        let id = self.lookup(name, span)?;
        let symbol = &self.symbols[id.to_index()];
        if !symbol.initialized {
            return Err(Diagnostic::error(
                "Tried to use uninitialized variable!",
                span,
            ));
        }
        Ok(id)
    }

    /// Resolves an assignment target: the identifier must exist and must
    /// not be `constant`. Marks it initialized on success.
    pub fn use_as_assignment_target(
        &mut self,
        name: &str,
        span: SourceSpan,
    ) -> Result<SymbolId, Diagnostic> {
        let id = self.lookup(name, span)?;
        let symbol = &self.symbols[id.to_index()];
        if symbol.constant {
            return Err(Diagnostic::error("Can't assign to constant!", span));
        }
        self.symbols[id.to_index()].initialized = true;
        Ok(id)
    }

    fn lookup(&self, name: &str, span: SourceSpan) -> Result<SymbolId, Diagnostic> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Diagnostic::error("Using undeclared identifier!", span))
    }

    /// Looks up a symbol's full record by id, for callers that want to
    /// inspect a declaration's kind or initialization state directly.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.to_index()]
    }

    /// Looks up a symbol's full record by name, if declared.
    pub fn symbol_named(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|id| &self.symbols[id.to_index()])
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(n: usize) -> SourceSpan {
        SourceSpan::new(n, n + 1)
    }

    #[test]
    fn ids_are_dense_and_one_based() {
        let mut table = SymbolTable::new();
        let a = table.declare("a", SymbolKind::Param, span(0), true).unwrap();
        let b = table.declare("b", SymbolKind::Param, span(1), true).unwrap();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn redeclaration_is_rejected_with_a_note() {
        let mut table = SymbolTable::new();
        table.declare("a", SymbolKind::Param, span(0), true).unwrap();
        let err = table
            .declare("a", SymbolKind::Var, span(10), false)
            .unwrap_err();
        assert_eq!(err.message(), "Redefinition of identifier!");
        assert_eq!(err.causes()[0].message(), "Original declaration here");
    }

    #[test]
    fn assigning_to_const_is_rejected() {
        let mut table = SymbolTable::new();
        table
            .declare("limit", SymbolKind::Const, span(0), true)
            .unwrap();
        let err = table
            .use_as_assignment_target("limit", span(20))
            .unwrap_err();
        assert_eq!(err.message(), "Can't assign to constant!");
    }

    #[test]
    fn reading_unassigned_var_is_rejected() {
        let mut table = SymbolTable::new();
        table.declare("total", SymbolKind::Var, span(0), false).unwrap();
        let err = table.use_read("total", span(20)).unwrap_err();
        assert_eq!(err.message(), "Tried to use uninitialized variable!");
    }

    #[test]
    fn undeclared_use_is_rejected() {
        let table = SymbolTable::new();
        let err = table.use_read("ghost", span(5)).unwrap_err();
        assert_eq!(err.message(), "Using undeclared identifier!");
    }

    #[test]
    fn assignment_then_read_succeeds() {
        let mut table = SymbolTable::new();
        table.declare("total", SymbolKind::Var, span(0), false).unwrap();
        table.use_as_assignment_target("total", span(20)).unwrap();
        assert!(table.use_read("total", span(30)).is_ok());
    }

    #[test]
    fn symbol_lookup_by_id_and_name_agree() {
        let mut table = SymbolTable::new();
        let id = table
            .declare("width", SymbolKind::Param, span(0), true)
            .unwrap();
        let by_id = table.symbol(id);
        let by_name = table.symbol_named("width").unwrap();
        assert_eq!(by_id.id, by_name.id);
    }
}
