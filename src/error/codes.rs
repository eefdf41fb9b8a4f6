/// Error code registry for taskshare
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Input load errors
/// - 3000-3999: Storage errors (per-file reads and writes)
/// - 4000-4999: Schema errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;
    pub const CONFIG_NO_WORKERS: u16 = 1004;
    pub const CONFIG_DUPLICATE_WORKER: u16 = 1005;
    pub const CONFIG_INVALID_DATE: u16 = 1006;

    // Input load errors (2000-2999)
    pub const LOAD_GENERIC: u16 = 2000;
    pub const LOAD_NOT_FOUND: u16 = 2001;
    pub const LOAD_UNREADABLE: u16 = 2002;
    pub const LOAD_NO_WORKSHEET: u16 = 2003;
    pub const LOAD_UNSUPPORTED_FORMAT: u16 = 2004;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_READ_FAILED: u16 = 3002;
    pub const STORAGE_WRITE_FAILED: u16 = 3003;
    pub const STORAGE_TOO_LARGE: u16 = 3004;
    pub const STORAGE_DIR_FAILED: u16 = 3005;

    // Schema errors (4000-4999)
    pub const SCHEMA_GENERIC: u16 = 4000;
    pub const SCHEMA_MISSING_COLUMN: u16 = 4001;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_PARSE_ERROR => "Configuration file could not be parsed",
        ErrorCode::CONFIG_INVALID_VALUE => "Invalid configuration value",
        ErrorCode::CONFIG_NO_WORKERS => "No workers configured",
        ErrorCode::CONFIG_DUPLICATE_WORKER => "Worker alias or name configured twice",
        ErrorCode::CONFIG_INVALID_DATE => "Run date is not a valid YYYYMMDD date",

        ErrorCode::LOAD_GENERIC => "General input load error",
        ErrorCode::LOAD_NOT_FOUND => "Input file not found",
        ErrorCode::LOAD_UNREADABLE => "Input file is unreadable or malformed",
        ErrorCode::LOAD_NO_WORKSHEET => "Spreadsheet has no worksheet",
        ErrorCode::LOAD_UNSUPPORTED_FORMAT => "Unsupported table file format",

        ErrorCode::STORAGE_GENERIC => "General storage error",
        ErrorCode::STORAGE_IO_ERROR => "Storage I/O error",
        ErrorCode::STORAGE_READ_FAILED => "Failed to read table file",
        ErrorCode::STORAGE_WRITE_FAILED => "Failed to write table file",
        ErrorCode::STORAGE_TOO_LARGE => "Table exceeds spreadsheet limits",
        ErrorCode::STORAGE_DIR_FAILED => "Failed to create output directory",

        ErrorCode::SCHEMA_GENERIC => "General schema error",
        ErrorCode::SCHEMA_MISSING_COLUMN => "Required column missing from dataset",

        _ => "Unknown error code",
    }
}
