//! Export pipeline integration tests
//!
//! Records read back from a scope, rendered by each formatter and parsed again.
