use std::fmt;

/// The response code for a command.
///
/// The HTTP Status in a response may only tell if a command could be error free received,
/// but not if it was in any way valid and could be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseCode {
    pub code: u32,
    pub message: &'static str,
}

impl ResponseCode {
    /// Use this function instead of comparing the code to "1000".
    pub fn is_ok(&self) -> bool {
        self.code == OK.code
    }

    pub fn is_error(&self) -> bool {
        !self.is_ok()
    }

    /// Maps a raw code to its known meaning, keeping the number for unknown codes.
    pub fn from_code(code: u32) -> ResponseCode {
        match code {
            1000 => OK,
            1001 => ERROR,
            1101 => ERROR_INVALID_ARGUMENT,
            1102 => ERROR2,
            1103 => ERROR_VALUE_WRONG_MISSING_KEY,
            1104 => ERROR_MALFORMED_JSON_INPUT,
            1105 => ERROR_INVALID_ARGUMENT_KEY,
            1106 => ERROR_DUPLICATE_UNIQUE_ID,
            1107 => OK2,
            1108 => OK3,
            1205 => FIRMWARE_UPGRADE_ERROR,
            code => ResponseCode {
                code,
                message: "Unknown",
            },
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.message)
    }
}

// Errors codes from https://xled-docs.readthedocs.io/en/latest/rest_api.html#http-responses.

/// The OK response code.
pub const OK: ResponseCode = ResponseCode {
    code: 1000,
    message: "Ok",
};
/// An error response code.
pub const ERROR: ResponseCode = ResponseCode {
    code: 1001,
    message: "Error",
};
/// An error response code.
pub const ERROR_INVALID_ARGUMENT: ResponseCode = ResponseCode {
    code: 1101,
    message: "Invalid argument value",
};
/// An error response code.
pub const ERROR2: ResponseCode = ResponseCode {
    code: 1102,
    message: "Error",
};
/// An error response code.
pub const ERROR_VALUE_WRONG_MISSING_KEY: ResponseCode = ResponseCode {
    code: 1103,
    message: "Error - value too long? Or missing required object key?",
};
/// An error response code.
pub const ERROR_MALFORMED_JSON_INPUT: ResponseCode = ResponseCode {
    code: 1104,
    message: "Error - malformed JSON on input?",
};
/// An error response code.
pub const ERROR_INVALID_ARGUMENT_KEY: ResponseCode = ResponseCode {
    code: 1105,
    message: "Invalid argument key",
};
/// Returned by `movies/new` when the unique id is already taken.
pub const ERROR_DUPLICATE_UNIQUE_ID: ResponseCode = ResponseCode {
    code: 1106,
    message: "Duplicate unique id",
};
/// An OK response code?
pub const OK2: ResponseCode = ResponseCode {
    code: 1107,
    message: "OK?",
};
/// An OK response code?
pub const OK3: ResponseCode = ResponseCode {
    code: 1108,
    message: "OK?",
};
/// An error response code.
pub const FIRMWARE_UPGRADE_ERROR: ResponseCode = ResponseCode {
    code: 1205,
    message: "Error with firmware upgrade - SHA1SUM does not match",
};

/// Implemented by every device reply that carries a status code.
pub trait ResponseCodeTrait {
    fn response_code(&self) -> ResponseCode;

    fn is_ok(&self) -> bool {
        self.response_code().is_ok()
    }
}
