use std::fmt;

/// The semantic type of a value an instruction consumes or produces.
///
/// `Void` stands for "none". `Local`, `Global` and `Func` show up as the
/// first segment of mnemonics like `local.get`, or as the kind of index an
/// immediate carries (`call` and `ref.func` take a function index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    I32,
    I64,
    F32,
    F64,
    Local,
    Global,
    Func,
}

impl ValueType {
    /// Resolves a dot-segment of a mnemonic to a value type.
    ///
    /// The match is exact: `"i32"` resolves, `"i32x4"` does not. Unknown
    /// tokens resolve to `Void` rather than failing, so a mnemonic without
    /// a type prefix (`call`, `drop`, ...) classifies fine.
    pub fn from_token(token: &str) -> ValueType {
        match token {
            "i32" => ValueType::I32,
            "i64" => ValueType::I64,
            "f32" => ValueType::F32,
            "f64" => ValueType::F64,
            "local" => ValueType::Local,
            "global" => ValueType::Global,
            "func" => ValueType::Func,
            _ => ValueType::Void,
        }
    }

    /// The variant name as it appears in emitted source code.
    pub fn ident(&self) -> &'static str {
        match self {
            ValueType::Void => "Void",
            ValueType::I32 => "I32",
            ValueType::I64 => "I64",
            ValueType::F32 => "F32",
            ValueType::F64 => "F64",
            ValueType::Local => "Local",
            ValueType::Global => "Global",
            ValueType::Func => "Func",
        }
    }
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::Void
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.ident())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_resolution_is_exact() {
        assert_eq!(ValueType::from_token("i32"), ValueType::I32);
        assert_eq!(ValueType::from_token("f64"), ValueType::F64);
        assert_eq!(ValueType::from_token("local"), ValueType::Local);
        assert_eq!(ValueType::from_token("func"), ValueType::Func);
        // No substring matching: these contain a type token but are not one.
        assert_eq!(ValueType::from_token("i32x4"), ValueType::Void);
        assert_eq!(ValueType::from_token("funcref"), ValueType::Void);
        assert_eq!(ValueType::from_token("ref"), ValueType::Void);
        assert_eq!(ValueType::from_token(""), ValueType::Void);
    }

    #[test]
    fn variants_are_distinct() {
        // The scraped table relies on Local/Global/Func comparing unequal.
        assert_ne!(ValueType::Local, ValueType::Global);
        assert_ne!(ValueType::Global, ValueType::Func);
        assert_ne!(ValueType::Local, ValueType::Func);
    }
}
