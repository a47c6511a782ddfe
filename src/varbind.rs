//! Variable bindings: an OID paired with its value.

use crate::oid::Oid;
use crate::value::Value;

/// One variable binding from a request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// A binding with a NULL value, as sent in requests.
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Integer(3));
        assert_eq!(vb.to_string(), "1.3.6.1.2.1.1.5.0 = 3");
    }

    #[test]
    fn null_binding() {
        assert_eq!(VarBind::null(oid!(1, 3)).value, Value::Null);
    }
}
