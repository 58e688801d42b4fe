//! Library half of the `notepad` binary, split out so commands can be
//! exercised from integration tests.

pub mod cli;
