use alloc::string::String;
use core::fmt;
use tilck_hal::HalError;

/// The type returned by inspection methods.
pub type InspectResult<T = ()> = Result<T, InspectError>;

/// Everything that can go wrong while reading kernel state.
///
/// A record that simply does not exist (no task with that tid, an empty
/// handle slot) is not an error: lookups report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// A raw read hit memory the target does not provide.
    Memory(HalError),
    /// The symbol is unknown to the symbol table.
    NoSymbol(String),
    /// The layout has no struct with this name.
    NoType(String),
    /// The struct layout has no field with this name.
    NoField { ty: String, field: String },
    /// The field exists but cannot be read the requested way.
    WrongKind {
        ty: String,
        field: String,
        expected: &'static str,
    },
    /// The layout names a known enum value differently, or not at all.
    EnumMismatch { ty: String, name: String },
    /// Kernel state needed by the operation is absent.
    BadState(&'static str),
}

impl From<HalError> for InspectError {
    fn from(e: HalError) -> Self {
        InspectError::Memory(e)
    }
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectError::Memory(e) => write!(f, "{}", e),
            InspectError::NoSymbol(name) => write!(f, "no symbol \"{}\" in current context", name),
            InspectError::NoType(name) => write!(f, "no struct type named {}", name),
            InspectError::NoField { ty, field } => {
                write!(f, "there is no member named {} in struct {}", field, ty)
            }
            InspectError::WrongKind {
                ty,
                field,
                expected,
            } => write!(f, "{}.{} is not {}", ty, field, expected),
            InspectError::EnumMismatch { ty, name } => {
                write!(f, "enum {} does not match {}", ty, name)
            }
            InspectError::BadState(what) => write!(f, "bad kernel state: {}", what),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display() {
        let e: InspectError = HalError::Unmapped {
            vaddr: 0x10,
            len: 4,
        }
        .into();
        assert_eq!(e.to_string(), "cannot access memory at 0x10 (4 bytes)");
        let e = InspectError::NoField {
            ty: "task".into(),
            field: "tid".into(),
        };
        assert_eq!(e.to_string(), "there is no member named tid in struct task");
    }
}
