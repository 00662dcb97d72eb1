use super::Column;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    column: Column,
    message: &'static str,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, ..$col:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_column($col)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, ..$col:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_column($col)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            column: 0..0,
            message: "",
        }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::from_u16(self.code)
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code as u16
    }

    pub fn column(&self) -> Column {
        self.column.clone()
    }

    pub fn in_column(&self, column: &Column) -> Error {
        debug_assert_eq!(self.column, 0..0);
        Error {
            code: self.code,
            column: column.clone(),
            message: self.message,
        }
    }

    pub fn message(&self, message: &'static str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            code: self.code,
            column: self.column.clone(),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UnmatchedBracket = 1,
    StepLimitExceeded = 2,
    Aborted = 3,
    BufferBudgetExceeded = 4,
    InternalError = 51,
    NotFound = 53,
    DiskIoError = 57,
    NameCollision = 58,
    CapacityExceeded = 61,
    BadName = 64,
    ReadOnlyViolation = 70,
}

impl ErrorCode {
    fn from_u16(code: u16) -> ErrorCode {
        use ErrorCode::*;
        match code {
            1 => UnmatchedBracket,
            2 => StepLimitExceeded,
            3 => Aborted,
            4 => BufferBudgetExceeded,
            53 => NotFound,
            57 => DiskIoError,
            58 => NameCollision,
            61 => CapacityExceeded,
            64 => BadName,
            70 => ReadOnlyViolation,
            _ => InternalError,
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = match self.code {
            1 => "UNMATCHED BRACKET",
            2 => "STEP LIMIT EXCEEDED",
            3 => "ABORTED",
            4 => "BUFFER BUDGET EXCEEDED",
            51 => "INTERNAL ERROR",
            53 => "FILE NOT FOUND",
            57 => "DISK I/O ERROR",
            58 => "FILE ALREADY EXISTS",
            61 => "DISK FULL",
            64 => "BAD FILE NAME",
            70 => "FILE IS READ ONLY",
            _ => "",
        };
        let mut suffix = String::new();
        if (0..0) != self.column {
            suffix.push_str(&format!(" AT {}..{}", self.column.start, self.column.end));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if code_str.is_empty() {
            write!(f, "PROGRAM ERROR {}{}", self.code, suffix)
        } else {
            write!(f, "{}{}", code_str, suffix)
        }
    }
}

impl std::error::Error for Error {}
