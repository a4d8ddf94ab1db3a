//! Finding plugin bundles on disk.
//!
//! A [`PluginResourceLocator`] turns configuration held in the
//! [`Blackboard`]( crate::Blackboard ) into a set of [`PluginResource`]s. It never
//! parses descriptors; it only checks that one is present, so that the language
//! services decide what a bundle actually contains.
//!
//! Two locators ship with the crate:
//! - [`DirectoryLocator`] walks the configured plugin directories.
//! - [`SearchPathLocator`] probes the entries the host already loads code from.
//!
//! Both classify candidate paths through a shared [`ResourceProbe`], which
//! custom locators can reuse.

mod directory ;
mod search_path ;

pub use directory::DirectoryLocator ;
pub use search_path::SearchPathLocator ;

use std::collections::BTreeSet ;
use std::path::{ Path, PathBuf };
use thiserror::Error ;

use crate::{ keys, BlackboardError, Environment, PartialSuccess };
use crate::manifest::{ Manifest, MANIFEST_PATH };
use crate::resource::{ self, PluginResource, ResourceError, ResourceKind };



/// A source of plugin bundles.
pub trait PluginResourceLocator {

	/// Unique name, recorded on every resource this locator produces.
	fn name( &self ) -> &str ;

	/// Scans for bundles carrying a plugin descriptor.
	///
	/// Problems with individual candidates are returned next to the resources
	/// that were found; only configuration problems abort the scan.
	///
	/// # Errors
	/// A [`DiscoveryFailure`] when the scan cannot proceed at all.
	fn locate_plugin_resources( &self, environment: &Environment )
		-> Result<PartialSuccess<BTreeSet<PluginResource>, ResourceError>, DiscoveryFailure> ;

	/// Lets a locator veto bundles based on their manifest. Accepts everything by default.
	fn is_valid_manifest( &self, _environment: &Environment, _manifest: &Manifest ) -> bool { true }

}

/// Failures that abort discovery altogether.
#[derive( Error, Debug )]
pub enum DiscoveryFailure {
	/// A configured search root exists but cannot be enumerated.
	#[error( "Plugin directory '{}' cannot be read: {source}", .path.display() )]
	SearchRootUnreadable { path: PathBuf, #[source] source: std::io::Error },
	/// A configuration value is missing, typically because the environment was not initialised.
	#[error( transparent )] Blackboard( #[from] BlackboardError ),
	/// A locator failed for a reason of its own.
	#[error( "Locator '{locator}' failed: {message}" )]
	Locator { locator: String, message: String },
}

/// Classifies single paths on behalf of a locator.
///
/// A directory becomes a [`ResourceKind::Directory`] resource and a regular file
/// with one of the configured archive extensions a [`ResourceKind::Archive`]
/// resource, provided the bundle contains the descriptor. Everything else is
/// ignored.
pub struct ResourceProbe<'a> {
	locator: &'a dyn PluginResourceLocator,
	environment: &'a Environment,
	metadata_file_path: &'a str,
	archive_extensions: &'a [String],
	search_path: &'a [PathBuf],
}

impl<'a> ResourceProbe<'a> {

	/// # Errors
	/// If the environment is missing one of the discovery keys.
	pub fn new( environment: &'a Environment, locator: &'a dyn PluginResourceLocator ) -> Result<Self, DiscoveryFailure> {
		let blackboard = environment.blackboard();
		Ok( Self {
			locator,
			environment,
			metadata_file_path: blackboard.get( &keys::METADATA_FILE_PATH )?,
			archive_extensions: blackboard.get( &keys::ARCHIVE_EXTENSIONS )?,
			search_path: blackboard.find( &keys::SEARCH_PATH ).map_or( &[][..], Vec::as_slice ),
		})
	}

	pub fn classify( &self, path: &Path ) -> Option<ResourceKind> {
		if path.is_dir() { return Some( ResourceKind::Directory ) }
		let extension = path.extension()?.to_str()?;
		match path.is_file() && self.archive_extensions.iter().any(| known | known.eq_ignore_ascii_case( extension )) {
			true => Some( ResourceKind::Archive ),
			false => None,
		}
	}

	/// Turns `path` into a resource if it is a bundle carrying a descriptor.
	///
	/// # Errors
	/// If the path looks like a bundle but has to be excluded.
	pub fn probe( &self, path: &Path ) -> Result<Option<PluginResource>, ResourceError> {
		match self.classify( path ) {
			Some( ResourceKind::Archive ) => self.probe_archive( path ),
			Some( ResourceKind::Directory ) => self.probe_directory( path ),
			None => Ok( None ),
		}
	}

	fn probe_archive( &self, path: &Path ) -> Result<Option<PluginResource>, ResourceError> {

		let mut archive = resource::open_archive( path )
			.map_err(| source | ResourceError::UnreadableArchive { path: path.to_path_buf(), source })?;

		if archive.index_for_name( self.metadata_file_path ).is_none() {
			tracing::debug!( path = %path.display(), descriptor = self.metadata_file_path, "Archive has no plugin descriptor" );
			return Ok( None );
		}

		let manifest = resource::read_entry( &mut archive, MANIFEST_PATH )
			.map_err(| source | ResourceError::Io { path: path.to_path_buf(), source })?
			.map(| bytes | Manifest::parse( &bytes ))
			.transpose()
			.map_err(| source | ResourceError::MalformedManifest { path: path.to_path_buf(), source })?;

		self.validate_manifest( path, manifest.as_ref() )?;
		Ok( Some( PluginResource::new( self.locator.name(), ResourceKind::Archive, path, manifest )))

	}

	fn probe_directory( &self, path: &Path ) -> Result<Option<PluginResource>, ResourceError> {

		if !path.join( self.metadata_file_path ).is_file() {
			tracing::debug!( path = %path.display(), descriptor = self.metadata_file_path, "Directory has no plugin descriptor" );
			return Ok( None );
		}

		let manifest_path = path.join( MANIFEST_PATH );
		let manifest = match manifest_path.is_file() {
			false => None,
			true => std::fs::read( &manifest_path )
				.map_err(| err | err.to_string() )
				.and_then(| bytes | Manifest::parse( &bytes ).map_err(| err | err.to_string() ))
				.inspect_err(| err | tracing::warn!( path = %manifest_path.display(), error = %err, "Ignoring unusable manifest" ))
				.ok(),
		};

		self.validate_manifest( path, manifest.as_ref() )?;
		Ok( Some(
			PluginResource::new( self.locator.name(), ResourceKind::Directory, path, manifest )
				.with_search_path( self.search_path.iter().cloned() )
		))

	}

	fn validate_manifest( &self, path: &Path, manifest: Option<&Manifest> ) -> Result<(), ResourceError> {
		match manifest {
			Some( manifest ) if !self.locator.is_valid_manifest( self.environment, manifest ) => Err( ResourceError::InvalidManifest {
				path: path.to_path_buf(),
				locator: self.locator.name().to_string(),
			}),
			_ => Ok(()),
		}
	}

}

impl std::fmt::Debug for ResourceProbe<'_> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ResourceProbe" )
			.field( "locator", &self.locator.name() )
			.field( "metadata_file_path", &self.metadata_file_path )
			.field( "archive_extensions", &self.archive_extensions )
			.finish_non_exhaustive()
	}
}

/// Logs and records a probe failure.
pub(crate) fn record( locator: &str, error: ResourceError, errors: &mut Vec<ResourceError> ) {
	tracing::error!( locator, path = %error.path().display(), error = %error, "Excluding resource" );
	errors.push( error );
}
