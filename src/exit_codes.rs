//! Exit code standardization for awscost
//!
//! Gives scripts a stable way to tell bad input from a broken environment.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User error (bad descriptor or ARN, no price for the SKU)
//! - `2` = System error (I/O, serialization)
//! - `3` = Configuration error (unreadable or invalid config / price file, region mismatch)

use crate::error::{CostError, ErrorCode};

/// Standard exit codes for awscost
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// User error (invalid input, nothing to price)
    pub const USER_ERROR: i32 = 1;
    /// System error (I/O, serialization)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error (config or price file)
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a CostError to an appropriate exit code
pub fn exit_code_for_error(error: &CostError) -> i32 {
    match error {
        CostError::Config(_) | CostError::Toml(_) => codes::CONFIG_ERROR,
        _ => match error.code() {
            ErrorCode::InvalidArgument | ErrorCode::NotFound | ErrorCode::Unimplemented => {
                codes::USER_ERROR
            }
            // Region mismatch: the estimator is pointed at the wrong region
            ErrorCode::FailedPrecondition => codes::CONFIG_ERROR,
            ErrorCode::Internal => codes::SYSTEM_ERROR,
        },
    }
}

/// Exit code for a top-level `anyhow` error.
///
/// Walks the chain for a `CostError`; anything else is a system error.
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CostError>())
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}
