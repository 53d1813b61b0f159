use klang_struct::{Qualifiers, Type};

/// The table of previously mangled components within one name.
///
/// Entries are snapshots of a fully mangled `(type, qualifiers)` pair, in
/// order of first appearance; the position of an entry is its back-reference
/// index. The table lives for exactly one mangle or demangle call.
#[derive(Clone, Debug, Default)]
pub struct Substitutions {
    entries: Vec<(Type, Qualifiers)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The index of a structurally equal entry, if one was registered.
    pub fn find(&self, ty: &Type, quals: &Qualifiers) -> Option<usize> {
        self.entries.iter().position(|(t, q)| t == ty && q == quals)
    }

    pub fn register(&mut self, ty: Type, quals: Qualifiers) {
        self.entries.push((ty, quals));
    }

    pub fn get(&self, index: usize) -> Option<&(Type, Qualifiers)> {
        self.entries.get(index)
    }
}

/// The back-reference token for a table index: `S_` for the first entry,
/// `S0_` for the second, and so on.
pub fn token(index: usize) -> String {
    if index == 0 {
        String::from("S_")
    } else {
        format!("S{}_", index - 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use klang_struct::ScalarType;

    #[test]
    fn test_token_rendering() {
        assert_eq!(token(0), "S_");
        assert_eq!(token(1), "S0_");
        assert_eq!(token(12), "S11_");
    }

    #[test]
    fn test_find_matches_structurally() {
        let mut subs = Substitutions::new();
        let ty = Type::Scalar(ScalarType::int(32, true));
        let quals = Qualifiers::default();
        assert_eq!(subs.find(&ty, &quals), None);
        subs.register(ty.clone(), quals);
        assert_eq!(subs.find(&ty, &quals), Some(0));
        let unsigned = Type::Scalar(ScalarType::int(32, false));
        assert_eq!(subs.find(&unsigned, &quals), None);
    }
}
