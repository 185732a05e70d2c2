//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `precedence`: Layer precedence tests
//! - `loading`: Environment and CLI loading tests
//! - `validation`: Conversion into engine options
