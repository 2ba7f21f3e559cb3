//! pairfile - create and rename paired C/C++ header and source files
//!
//! This library provides the pieces behind the `pairfile` command: extension
//! classification, include-guard and include-directive rewriting, counterpart
//! search, journaled pair renames with undo, and TOML configuration.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod creator;
pub mod error;
pub mod filesystem;
pub mod guard;
pub mod history;
pub mod include;
pub mod logging;
pub mod matcher;
pub mod output;
pub mod prompt;
pub mod rename;

pub use config::{ConfigError, GuardStyle, GuardSuffix, PairConfig, Settings};
pub use creator::{FileOutcome, PairFileCreator};
pub use error::{PairError, PairResult};
pub use filesystem::{FileSystem, MemoryFs, RealFs};
pub use history::{RenameLog, UndoManager, UndoReport};
pub use matcher::{ExtensionSets, FileClass};
pub use prompt::{Prompter, TerminalPrompter};
pub use rename::{PairRenamer, RenameOutcome};

pub use cli::{PairCommand, run_cli};
