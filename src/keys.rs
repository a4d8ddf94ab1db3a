//! Well-known [`Blackboard`]( crate::Blackboard ) keys.
//!
//! The embedding host writes these before calling
//! [`Environment::initialize`]( crate::Environment::initialize ), which fills in
//! defaults for anything left unset.

use std::path::PathBuf ;

use crate::Key ;



/// Whether the host runs in a development environment.
///
/// Locators and services may interpret this flag however they see fit.
pub const DEVELOPMENT: Key<bool> = Key::of( "development" );

/// Version of the host the plugins are loaded into.
pub const VERSION: Key<String> = Key::of( "version" );

/// Directory the host runs from. Relative plugin directories are not resolved
/// against it; it only seeds the default for [`PLUGIN_DIRECTORIES`].
pub const BASE_DIRECTORY: Key<PathBuf> = Key::of( "base_directory" );

/// Roots walked by the [`DirectoryLocator`]( crate::DirectoryLocator ).
pub const PLUGIN_DIRECTORIES: Key<Vec<PathBuf>> = Key::of( "plugin_directories" );

/// Entries the host already loads code from. Probed by the
/// [`SearchPathLocator`]( crate::SearchPathLocator ) and consulted when
/// resolving paths inside directory resources.
pub const SEARCH_PATH: Key<Vec<PathBuf>> = Key::of( "search_path" );

/// Relative path of the plugin descriptor inside a bundle.
pub const METADATA_FILE_PATH: Key<String> = Key::of( "metadata_file_path" );

/// File extensions (without the dot) recognised as plugin archives.
pub const ARCHIVE_EXTENSIONS: Key<Vec<String>> = Key::of( "archive_extensions" );

pub const DEFAULT_METADATA_FILE_PATH: &str = "META-INF/plugins.json" ;
pub const DEFAULT_ARCHIVE_EXTENSIONS: [&str; 2] = [ "zip", "jar" ];
pub const DEFAULT_PLUGINS_DIRECTORY: &str = "plugins" ;
