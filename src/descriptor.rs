//! The JSON plugin descriptor.
//!
//! ```json
//! {
//! 	"loader": "wasm",
//! 	"plugins": [
//! 		{ "id": "demo", "name": "Demo", "version": "1.0.0", "entrypoint": "demo.wasm",
//! 		  "links": { "homepage": "https://example.org" } }
//! 	]
//! }
//! ```
//!
//! Every field is optional at this stage; [`RawMetadata::validate`] decides
//! which entries are usable. Unknown fields are ignored.

use std::path::{ Path, PathBuf };
use serde::Deserialize ;
use thiserror::Error ;

use crate::resource::PluginResource ;



#[derive( Debug, Clone, Default, PartialEq, Eq, Deserialize )]
#[serde( default )]
pub struct Descriptor {
	/// Name of the language service the entries are meant for.
	pub loader: Option<String>,
	pub plugins: Vec<RawMetadata>,
}

/// A descriptor entry as written, before validation.
#[derive( Debug, Clone, Default, PartialEq, Eq, Deserialize )]
#[serde( default )]
pub struct RawMetadata {
	pub id: Option<String>,
	pub name: Option<String>,
	pub version: Option<String>,
	pub description: Option<String>,
	pub author: Option<String>,
	pub entrypoint: Option<String>,
	pub links: Option<RawLinks>,
}

#[derive( Debug, Clone, Default, PartialEq, Eq, Deserialize )]
#[serde( default )]
pub struct RawLinks {
	pub homepage: Option<String>,
	pub source: Option<String>,
	pub issues: Option<String>,
}

/// Errors reading a descriptor. The resource is skipped by the service that hit it.
#[derive( Error, Debug )]
pub enum DescriptorError {
	#[error( "Failed to read descriptor of '{}': {source}", .path.display() )]
	Io { path: PathBuf, #[source] source: std::io::Error },
	#[error( "Malformed descriptor in '{}': {source}", .path.display() )]
	Json { path: PathBuf, #[source] source: serde_json::Error },
}

impl DescriptorError {
	/// Path of the resource carrying the descriptor.
	pub fn path( &self ) -> &Path {
		match self {
			Self::Io { path, .. } | Self::Json { path, .. } => path,
		}
	}
}

impl Descriptor {

	/// Parses descriptor bytes belonging to the resource at `path`.
	///
	/// # Errors
	/// [`DescriptorError::Json`] if the bytes are not a valid descriptor.
	pub fn parse( path: &Path, bytes: &[u8] ) -> Result<Self, DescriptorError> {
		serde_json::from_slice( bytes ).map_err(| source | DescriptorError::Json { path: path.to_path_buf(), source })
	}

	/// Reads and parses the descriptor at `relative` inside `resource`.
	/// `Ok( None )` if the resource has no such file.
	///
	/// # Errors
	/// If the descriptor exists but cannot be read or parsed.
	pub fn read( resource: &PluginResource, relative: &str ) -> Result<Option<Self>, DescriptorError> {
		resource.read_resource( relative )
			.map_err(| source | DescriptorError::Io { path: resource.path().to_path_buf(), source })?
			.map(| bytes | Self::parse( resource.path(), &bytes ))
			.transpose()
	}

}
