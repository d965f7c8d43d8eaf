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
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # cilbridge
//!
//! Lowers .NET type metadata into a uniform, JVM-style intermediate
//! representation. An external collaborator parses assembly metadata and hands
//! this crate one [`descriptor::TypeDescriptor`] per type; the lowering core
//! turns each descriptor into an [`ir::IrClass`] with linked hierarchy,
//! lowered members, synthesized value-type plumbing and converted attribute
//! annotations.
//!
//! ## Features
//!
//! - **Placeholder-based resolution** - Cross references between types never
//!   block on lowering order; referenced names resolve to shells that later
//!   lowering fills in
//! - **Value-type semantics** - Every struct gets a synthesized deep-copy
//!   method so assignment copies can be expressed in a reference-only IR
//! - **By-reference emulation** - `in`/`out`/`ref` parameters are bridged
//!   through a synthetic singleton wrapper class
//! - **Checked arithmetic** - Overflow-checked operations share the plain
//!   binary expression shape and stay structurally interchangeable
//! - **Parallel batches** - Whole descriptor sets lower concurrently over a
//!   shared registry
//!
//! ## Quick Start
//!
//! ```rust
//! use cilbridge::prelude::*;
//!
//! let descriptor = TypeDescriptor {
//!     namespace: "My.App".to_string(),
//!     name: "Point".to_string(),
//!     kind: TypeKind::Struct,
//!     ..TypeDescriptor::default()
//! };
//!
//! let loader = Loader::new();
//! let lowered = loader.lower(&descriptor)?;
//! assert!(lowered.class.is_struct());
//! # Ok::<(), cilbridge::Error>(())
//! ```

/// Foreign type descriptors, the structured input consumed by lowering.
pub mod descriptor;
/// The lowered intermediate representation: classes, members, bodies, tags.
pub mod ir;
/// Batch lowering driver over a shared registry.
pub mod loader;
/// The per-type lowering pipeline and its passes.
pub mod lowering;
/// Commonly used types, importable in one line.
pub mod prelude;
/// The shared class namespace of one lowering run.
pub mod registry;

mod error;

pub use error::Error;
pub use loader::Loader;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
