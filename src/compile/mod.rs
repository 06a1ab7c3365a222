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

//! SQL compilation: dialects and the clause-set compiler
//!
//! - [`dialect`] - the [`Dialect`] trait and the [`Ansi`], [`Postgres`]
//!   and [`Sqlite`] implementations
//! - [`compiler`] - [`compile`] and [`CompiledQuery`]

pub mod compiler;
pub mod dialect;

pub use compiler::{compile, CompiledQuery};
pub use dialect::{Ansi, Dialect, Postgres, Sqlite};
