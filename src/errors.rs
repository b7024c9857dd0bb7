use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AssemblyError {
    #[error("Syntax Error: {0}")]
    PestError(#[from] pest::error::Error<crate::preprocessor::Rule>),

    #[error("Invalid mnemonic '{mnemonic}' at index {index}: not found in opcode or directive tables")]
    InvalidMnemonic { index: usize, mnemonic: String },

    #[error("Invalid literal format at index {index}: {reason}")]
    InvalidLiteralFormat { index: usize, reason: String },

    #[error("Invalid BYTE constant at index {index}: {reason}")]
    InvalidByteConstant { index: usize, reason: String },

    #[error("{directive} cannot reserve negative space at index {index}: {value}")]
    NegativeReservation {
        index: usize,
        directive: String,
        value: i64,
    },

    #[error("Displacement out of range for {mnemonic} at index {index}: {displacement}")]
    DisplacementOutOfRange {
        index: usize,
        mnemonic: String,
        displacement: i64,
    },

    #[error("Duplicate END directive in section '{section}'")]
    DuplicateEnd { section: String },

    #[error("External definition '{symbol}' is not defined in section '{section}'")]
    UndefinedExternalDefinition { section: String, symbol: String },

    #[error("END references unknown symbol '{symbol}' in section '{section}'")]
    MissingSymbol { section: String, symbol: String },

    #[error("Structural Error at index {index}: {reason}")]
    StructuralError { index: usize, reason: String },

    #[error("Semantic Error at index {index}: {reason}")]
    SemanticError { index: usize, reason: String },

    #[error("Semantic Error: {reason}")]
    SemanticErrorNoLine { reason: String },
}
