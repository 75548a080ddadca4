//! webpack-helper: programmatic webpack configuration
//!
//! A [`Helper`] owns a JSON configuration tree. Sections read and write it
//! through dotted paths, statements (`output`, `entry`, `module`, or your
//! own) find each other through the helper's registry, and lifecycle
//! handlers run when the build tool asks for the finished configuration.

pub mod addressing;
pub mod cli;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod events;
pub mod helper;
pub mod loader;
pub mod logging;
pub mod output;
pub mod rules;
pub mod section;
pub mod statement;

pub use addressing::{ConfPath, ReadOptions, WriteMode, WriteOptions};
pub use constants::Constants;
pub use error::{HelperError, PathError};
pub use helper::{Helper, HelperOptions};
pub use section::Section;
pub use statement::{Statement, TopHandle};

/// Everything needed to configure a build
pub mod prelude {
    pub use crate::addressing::{ConfPath, ReadOptions, WriteOptions};
    pub use crate::entry::{DependOn, EntryOptions};
    pub use crate::error::{HelperError, PathError};
    pub use crate::helper::{Helper, HelperOptions};
    pub use crate::loader::{Export, ModuleTable};
    pub use crate::rules::{RuleOptions, RuleSpec};
    pub use crate::section::Section;
    pub use crate::statement::{Statement, TopHandle};
}
