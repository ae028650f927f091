//! Filesystem path resolver
//!
//! Resolves request paths such as `/dir1/dir2/file3/arg1` against a
//! directory tree, producing one of:
//! - a [`Resolution::Found`] file plus the parameters bound on the way
//! - a [`Resolution::Redirect`] to the canonical form of the path
//! - [`Resolution::NotFound`]
//!
//! ```no_run
//! use fsroute::{Resolution, ResolveOptions, Resolver};
//!
//! let resolver = Resolver::new("views", ResolveOptions::default());
//! match resolver.resolve("/dir1/dir2/file3/arg1")? {
//!     Resolution::Found(found) => println!("{} {:?}", found.filename, found.param_map()),
//!     Resolution::Redirect(redirect) => println!("-> {}", redirect.location),
//!     Resolution::NotFound => println!("not found"),
//! }
//! # Ok::<(), fsroute::ResolveError>(())
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod logger;
pub mod resolver;

pub use error::ResolveError;
pub use fs::{EntryKind, FileSystem, LocalFs, MemoryFs};
pub use resolver::{
    resolve, Found, Param, Redirect, RequestPath, Resolution, ResolveOptions, Resolver,
    TargetKind,
};
