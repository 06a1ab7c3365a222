// Copyright 2026 Quarry Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Predicate read-back parsing
//!
//! - [`lexer`] - tokenizer for inline-bound predicate text
//! - [`predicate`] - parser producing an [`Expression`](crate::expr::Expression)
//!
//! The parser exists to close the loop on compilation: a predicate
//! compiled under the ANSI dialect and inline-bound can be parsed back
//! and compared (after flattening) against the expression it came from.

pub mod lexer;
pub mod predicate;

pub use lexer::{Lexer, Token, TokenType};
pub use predicate::parse_predicate;
