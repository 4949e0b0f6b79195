//! Error type shared by the persistence ports.

use super::define_port_error;

define_port_error! {
    /// Failures raised by repository adapters.
    pub enum RepositoryError {
        /// Connection could not be obtained or was lost.
        Connection { message: String } => "repository connection failed: {message}" as unavailable,
        /// The operation exceeded its time budget.
        Timeout { operation: String } => "repository operation timed out: {operation}" as unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}" as internal,
        /// Stored data could not be mapped back into the domain.
        Corrupt { message: String } => "stored record is invalid: {message}" as internal,
    }
}
