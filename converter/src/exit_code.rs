//! OfficeToPDF exit codes.

/// Reason used for any non-zero code the table does not know.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

const EXIT_CODES: &[(i32, &str)] = &[
    (0, "Success"),
    (1, "Failure"),
    (2, UNKNOWN_ERROR),
    (4, "File protected by password"),
    (8, "Invalid arguments"),
    (16, "Unable to open the source file"),
    (32, "Unsupported file format"),
    (64, "Source file not found"),
    (128, "Output directory not found"),
    (256, "The requested worksheet was not found"),
    (512, "Unable to use an empty worksheet"),
    (1024, "Unable to modify or open a protected PDF"),
    (2048, "There is a problem calling an Office application"),
    (
        4096,
        "There are no printers installed, so Office conversion can not proceed",
    ),
];

/// Human readable reason for a converter exit code.
pub fn describe_exit_code(code: i32) -> &'static str {
    EXIT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(UNKNOWN_ERROR, |(_, reason)| reason)
}
