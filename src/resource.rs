//! Located plugin bundles.
//!
//! A [`PluginResource`] is a directory or an archive that a
//! [`PluginResourceLocator`]( crate::PluginResourceLocator ) found to carry a
//! plugin descriptor. It resolves paths relative to its root; archives are
//! mounted the first time anything inside them is requested and stay mounted
//! until [`PluginResource::unmount`] is called or the resource is dropped.

use std::fs::File ;
use std::io::{ BufReader, Cursor, Read };
use std::path::{ Path, PathBuf };
use std::sync::{ Mutex, MutexGuard, PoisonError };
use thiserror::Error ;
use zip::ZipArchive ;
use zip::result::ZipError ;

use crate::manifest::{ Manifest, ManifestError };



/// How a resource is laid out on disk.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub enum ResourceKind {
	/// A regular file in zip format.
	Archive,
	/// A plain directory.
	Directory,
}

impl std::fmt::Display for ResourceKind {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { write!( f, "{:?}", self )}
}

/// Absolute location of a path resolved inside a resource.
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub enum ResourceLocation {
	/// A file on disk, either under the resource root or on the host search path.
	File( PathBuf ),
	/// An entry inside an archive.
	ArchiveEntry { archive: PathBuf, entry: String },
}

impl std::fmt::Display for ResourceLocation {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::File( path ) => write!( f, "{}", path.display() ),
			Self::ArchiveEntry { archive, entry } => write!( f, "{}!/{}", archive.display(), entry ),
		}
	}
}

/// Errors that exclude a single resource from discovery.
#[derive( Error, Debug )]
pub enum ResourceError {
	/// The archive could not be opened or is not a valid zip file.
	#[error( "Failed to open archive '{}': {source}", .path.display() )]
	UnreadableArchive { path: PathBuf, #[source] source: ZipError },
	/// Reading the resource failed.
	#[error( "Failed to read '{}': {source}", .path.display() )]
	Io { path: PathBuf, #[source] source: std::io::Error },
	/// The archive's manifest could not be parsed.
	#[error( "Malformed manifest in '{}': {source}", .path.display() )]
	MalformedManifest { path: PathBuf, #[source] source: ManifestError },
	/// The locator refused the resource's manifest.
	#[error( "Manifest of '{}' is not valid for locator '{locator}'", .path.display() )]
	InvalidManifest { path: PathBuf, locator: String },
	/// An entry below a search root could not be visited.
	#[error( "Failed to walk '{}': {source}", .path.display() )]
	Walk { path: PathBuf, #[source] source: walkdir::Error },
}

impl ResourceError {
	/// The filesystem path the error refers to.
	pub fn path( &self ) -> &Path {
		match self {
			Self::UnreadableArchive { path, .. }
			| Self::Io { path, .. }
			| Self::MalformedManifest { path, .. }
			| Self::InvalidManifest { path, .. }
			| Self::Walk { path, .. } => path,
		}
	}
}

/// A bundle located by a [`PluginResourceLocator`]( crate::PluginResourceLocator ).
///
/// Identity is the pair (locator name, path): two resources found by the same
/// locator at the same path are equal no matter what else they carry.
pub struct PluginResource {
	locator: String,
	kind: ResourceKind,
	path: PathBuf,
	manifest: Option<Manifest>,
	search_path: Vec<PathBuf>,
	archive: Mutex<Option<ZipArchive<File>>>,
}

impl PluginResource {

	pub fn new(
		locator: impl Into<String>,
		kind: ResourceKind,
		path: impl Into<PathBuf>,
		manifest: Option<Manifest>,
	) -> Self {
		Self {
			locator: locator.into(),
			kind,
			path: path.into(),
			manifest,
			search_path: Vec::with_capacity( 0 ),
			archive: Mutex::new( None ),
		}
	}

	/// Sets the host search path consulted by [`Self::locate_resource`] for
	/// directory resources when a path is missing under the resource root.
	pub fn with_search_path( mut self, search_path: impl IntoIterator<Item = PathBuf> ) -> Self {
		self.search_path = search_path.into_iter().collect();
		self
	}

	/// Name of the locator that found this resource.
	#[inline] pub fn locator( &self ) -> &str { &self.locator }
	#[inline] pub fn kind( &self ) -> ResourceKind { self.kind }
	#[inline] pub fn path( &self ) -> &Path { &self.path }
	#[inline] pub fn manifest( &self ) -> Option<&Manifest> { self.manifest.as_ref() }
	#[inline] pub fn search_path( &self ) -> &[PathBuf] { &self.search_path }

	/// Looks up a manifest property.
	#[inline] pub fn property( &self, key: &str ) -> Option<&str> {
		self.manifest.as_ref().and_then(| manifest | manifest.get( key ))
	}

	/// Resolves `relative` against this resource.
	///
	/// Leading slashes are ignored and backslashes are treated as separators.
	/// Paths that try to climb out of the resource (`..`) never resolve.
	pub fn locate_resource( &self, relative: &str ) -> Option<ResourceLocation> {
		let relative = normalise( relative )?;
		match self.kind {
			ResourceKind::Directory => std::iter::once( &self.path )
				.chain( self.search_path.iter() )
				.map(| root | root.join( &relative ))
				.find(| candidate | candidate.exists() )
				.map( ResourceLocation::File ),
			ResourceKind::Archive => {
				let mut archive = match self.mount() {
					Ok( archive ) => archive,
					Err( err ) => {
						tracing::debug!( path = %self.path.display(), error = %err, "Failed to mount archive" );
						return None ;
					}
				};
				archive.as_mut()?.index_for_name( &relative )?;
				Some( ResourceLocation::ArchiveEntry { archive: self.path.clone(), entry: relative })
			}
		}
	}

	/// Opens a location previously returned by [`Self::locate_resource`].
	///
	/// # Errors
	/// Any I/O failure, including a location that belongs to a different archive.
	pub fn open_location( &self, location: &ResourceLocation ) -> std::io::Result<Box<dyn Read + Send>> {
		match location {
			ResourceLocation::File( path ) => Ok( Box::new( BufReader::new( File::open( path )? ))),
			ResourceLocation::ArchiveEntry { archive, entry } => {
				if *archive != self.path {
					return Err( std::io::Error::new(
						std::io::ErrorKind::InvalidInput,
						format!( "'{}' is not part of '{}'", location, self.path.display() ),
					));
				}
				let mut guard = self.mount()?;
				let archive = guard.as_mut().ok_or_else(|| std::io::Error::other( "archive is not mounted" ))?;
				let bytes = read_entry( archive, entry )?
					.ok_or_else(|| std::io::Error::new( std::io::ErrorKind::NotFound, location.to_string() ))?;
				Ok( Box::new( Cursor::new( bytes )))
			}
		}
	}

	/// Opens `relative` for reading. Absence and I/O failures both yield `None`.
	pub fn open_resource( &self, relative: &str ) -> Option<Box<dyn Read + Send>> {
		let location = self.locate_resource( relative )?;
		self.open_location( &location )
			.inspect_err(| err | tracing::debug!( location = %location, error = %err, "Failed to open resource" ))
			.ok()
	}

	/// Reads `relative` in full, telling absence (`Ok( None )`) apart from failure.
	///
	/// # Errors
	/// If the path resolves but cannot be read.
	pub fn read_resource( &self, relative: &str ) -> std::io::Result<Option<Vec<u8>>> {
		let Some( location ) = self.locate_resource( relative ) else { return Ok( None )};
		let mut buffer = Vec::new();
		self.open_location( &location )?.read_to_end( &mut buffer )?;
		Ok( Some( buffer ))
	}

	/// Whether the archive handle is currently open. Always `false` for directories.
	pub fn is_mounted( &self ) -> bool {
		self.archive.lock().unwrap_or_else( PoisonError::into_inner ).is_some()
	}

	/// Releases the archive handle. The next lookup mounts the archive again.
	pub fn unmount( &self ) {
		if self.archive.lock().unwrap_or_else( PoisonError::into_inner ).take().is_some() {
			tracing::trace!( path = %self.path.display(), "Unmounted archive" );
		}
	}

	fn mount( &self ) -> std::io::Result<MutexGuard<'_, Option<ZipArchive<File>>>> {
		let mut guard = self.archive.lock().unwrap_or_else( PoisonError::into_inner );
		if guard.is_none() && self.kind == ResourceKind::Archive {
			*guard = Some( open_archive( &self.path )?);
			tracing::trace!( path = %self.path.display(), "Mounted archive" );
		}
		Ok( guard )
	}

}

impl PartialEq for PluginResource {
	fn eq( &self, other: &Self ) -> bool { self.locator == other.locator && self.path == other.path }
}
impl Eq for PluginResource {}

impl std::hash::Hash for PluginResource {
	fn hash<H: std::hash::Hasher>( &self, state: &mut H ) {
		self.locator.hash( state );
		self.path.hash( state );
	}
}

impl PartialOrd for PluginResource {
	fn partial_cmp( &self, other: &Self ) -> Option<std::cmp::Ordering> { Some( self.cmp( other )) }
}
impl Ord for PluginResource {
	fn cmp( &self, other: &Self ) -> std::cmp::Ordering {
		self.locator.cmp( &other.locator ).then_with(|| self.path.cmp( &other.path ))
	}
}

impl std::fmt::Debug for PluginResource {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginResource" )
			.field( "locator", &self.locator )
			.field( "kind", &self.kind )
			.field( "path", &self.path )
			.field( "manifest", &self.manifest.as_ref().map(| manifest | format!( "Manifest[len={}]", manifest.len() )))
			.field( "mounted", &self.is_mounted() )
			.finish_non_exhaustive()
	}
}

impl std::fmt::Display for PluginResource {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "{} ({})", self.path.display(), self.locator )
	}
}

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: usize = 1 << 20 ;

pub(crate) fn open_archive( path: &Path ) -> Result<ZipArchive<File>, ZipError> {
	ZipArchive::new( File::open( path )? )
}

/// Reads an archive entry, `Ok( None )` if there is no such entry.
pub(crate) fn read_entry( archive: &mut ZipArchive<File>, name: &str ) -> std::io::Result<Option<Vec<u8>>> {
	let Some( index ) = archive.index_for_name( name ) else { return Ok( None )};
	let mut file = archive.by_index( index )?;
	let declared = usize::try_from( file.size() ).unwrap_or( usize::MAX );
	let mut buffer = Vec::with_capacity( declared.min( MAX_PREALLOCATION ));
	file.read_to_end( &mut buffer )?;
	Ok( Some( buffer ))
}

fn normalise( relative: &str ) -> Option<String> {
	let relative = relative.replace( '\\', "/" );
	let segments = relative.split( '/' )
		.filter(| segment | !segment.is_empty() && *segment != "." )
		.collect::<Vec<_>>();
	match segments.is_empty() || segments.contains( &".." ) {
		true => None,
		false => Some( segments.join( "/" )),
	}
}
