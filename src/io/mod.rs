pub mod paths;

pub use paths::{ExplorerPaths, PathUtils};
