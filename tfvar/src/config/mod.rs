//! Variable declarations read from a configuration directory.
//!
//! [`parse_config_file`] decodes one file, [`Module`] merges the files of a
//! directory and [`load_config_dir`] ties the two together.

mod loader;
mod module;
mod parser;
mod variable;

pub use loader::{ConfigDirFiles, config_dir_files, load, load_config_dir};
pub use module::Module;
pub(crate) use parser::is_json;
pub use parser::{ConfigFile, parse_config_file, parse_config_source};
pub use variable::{ParsingMode, VariableDeclaration};
