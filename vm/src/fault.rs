use std::fmt;

/// A recoverable runtime fault (spec §4.4.7/§7): routed through the current
/// frame's exception table before being considered terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Arithmetic,
    NullPointer,
    ArrayIndexOutOfBounds,
    NegativeArraySize,
    /// Operand-stack/local underflow, the spec's `VerifyError` family (§7):
    /// treated as a runtime fault rather than a separate terminal error.
    StackUnderflow,
}

impl Fault {
    /// The exception class name recorded on the heap object allocated for
    /// this fault when a handler is found (spec §4.4.7).
    pub fn exception_class_name(&self) -> &'static str {
        match self {
            Fault::Arithmetic => "java/lang/ArithmeticException",
            Fault::NullPointer => "java/lang/NullPointerException",
            Fault::ArrayIndexOutOfBounds => "java/lang/ArrayIndexOutOfBoundsException",
            Fault::NegativeArraySize => "java/lang/NegativeArraySizeException",
            Fault::StackUnderflow => "java/lang/VerifyError",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.exception_class_name())
    }
}
