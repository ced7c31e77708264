//! `@@`-delimited template substitution
//!
//! Templates follow the conventions of shell-style string templates, with a
//! two-character sentinel so that `$VAR` references in the same document are
//! left for the container build to expand.
//!
//! # Example
//!
//! ```text
//! FROM ubuntu:22.04 AS build
//! @@ARGUMENTS
//! RUN echo "literal @@@@ sign"   # `@@@@` becomes `@@`
//! @@{INSTALL}
//! ```

pub mod lexer;
mod substitute;

pub use substitute::Template;
