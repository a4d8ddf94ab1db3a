//! Validated plugin metadata.

use std::path::{ Path, PathBuf };
use thiserror::Error ;
use url::Url ;

use crate::descriptor::{ RawLinks, RawMetadata };



/// Unique identifier of a plugin.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct PluginId( String );

impl PluginId {
	pub fn new( id: impl Into<String> ) -> Self { Self( id.into() )}
	#[inline] pub fn as_str( &self ) -> &str { &self.0 }
}

impl std::fmt::Display for PluginId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { f.write_str( &self.0 )}
}

impl AsRef<str> for PluginId {
	fn as_ref( &self ) -> &str { &self.0 }
}

impl std::borrow::Borrow<str> for PluginId {
	fn borrow( &self ) -> &str { &self.0 }
}

impl From<&str> for PluginId {
	fn from( id: &str ) -> Self { Self( id.to_string() )}
}

impl From<String> for PluginId {
	fn from( id: String ) -> Self { Self( id )}
}

impl PartialEq<str> for PluginId {
	fn eq( &self, other: &str ) -> bool { self.0 == other }
}

impl PartialEq<&str> for PluginId {
	fn eq( &self, other: &&str ) -> bool { self.0 == *other }
}

#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct Links {
	pub homepage: Option<Url>,
	pub source: Option<Url>,
	pub issues: Option<Url>,
}

/// Describes one plugin. Immutable once built.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct PluginMetadata {
	id: PluginId,
	name: String,
	version: String,
	description: Option<String>,
	author: Option<String>,
	entrypoint: Option<String>,
	links: Links,
}

impl PluginMetadata {

	/// Creates metadata whose display name is the id.
	pub fn new( id: impl Into<PluginId>, version: impl Into<String> ) -> Self {
		let id = id.into();
		Self {
			name: id.to_string(),
			id,
			version: version.into(),
			description: None,
			author: None,
			entrypoint: None,
			links: Links::default(),
		}
	}

	pub fn with_name( mut self, name: impl Into<String> ) -> Self {
		self.name = name.into();
		self
	}

	pub fn with_description( mut self, description: impl Into<String> ) -> Self {
		self.description = Some( description.into() );
		self
	}

	pub fn with_author( mut self, author: impl Into<String> ) -> Self {
		self.author = Some( author.into() );
		self
	}

	/// Path of the code to instantiate, relative to the plugin's resource.
	pub fn with_entrypoint( mut self, entrypoint: impl Into<String> ) -> Self {
		self.entrypoint = Some( entrypoint.into() );
		self
	}

	pub fn with_links( mut self, links: Links ) -> Self {
		self.links = links ;
		self
	}

	#[inline] pub fn id( &self ) -> &PluginId { &self.id }
	#[inline] pub fn name( &self ) -> &str { &self.name }
	#[inline] pub fn version( &self ) -> &str { &self.version }
	#[inline] pub fn description( &self ) -> Option<&str> { self.description.as_deref() }
	#[inline] pub fn author( &self ) -> Option<&str> { self.author.as_deref() }
	#[inline] pub fn entrypoint( &self ) -> Option<&str> { self.entrypoint.as_deref() }
	#[inline] pub fn links( &self ) -> &Links { &self.links }

}

impl std::fmt::Display for PluginMetadata {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "{} ({}) {}", self.name, self.id, self.version )
	}
}

/// A descriptor entry that cannot become a plugin.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum InvalidMetadata {
	#[error( "Plugin #{index} in '{}' has no id", .resource.display() )]
	MissingId { resource: PathBuf, index: usize },
	#[error( "Plugin '{id}' in '{}' has no version", .resource.display() )]
	MissingVersion { resource: PathBuf, id: String },
	#[error( "Plugin '{id}' in '{}' was rejected by language service '{service}'", .resource.display() )]
	Rejected { resource: PathBuf, id: String, service: String },
}

impl InvalidMetadata {
	pub fn resource( &self ) -> &Path {
		match self {
			Self::MissingId { resource, .. }
			| Self::MissingVersion { resource, .. }
			| Self::Rejected { resource, .. } => resource,
		}
	}
}

impl RawMetadata {

	/// Checks the required fields and fills in defaults.
	///
	/// Blank values count as missing. A missing name falls back to the id and
	/// malformed link URLs are dropped.
	///
	/// # Errors
	/// If the id or the version is missing.
	pub fn validate( self, resource: &Path, index: usize ) -> Result<PluginMetadata, InvalidMetadata> {

		let id = present( self.id ).ok_or_else(|| InvalidMetadata::MissingId { resource: resource.to_path_buf(), index })?;
		let version = present( self.version ).ok_or_else(|| InvalidMetadata::MissingVersion {
			resource: resource.to_path_buf(),
			id: id.clone(),
		})?;

		let name = present( self.name ).unwrap_or_else(|| {
			tracing::info!( id = %id, resource = %resource.display(), "Plugin has no name, using its id" );
			id.clone()
		});
		let links = self.links.map(| links | parse_links( &id, links )).unwrap_or_default();

		let mut metadata = PluginMetadata::new( id, version ).with_name( name ).with_links( links );
		metadata.description = present( self.description );
		metadata.author = present( self.author );
		metadata.entrypoint = present( self.entrypoint );
		Ok( metadata )

	}

}

fn present( value: Option<String> ) -> Option<String> {
	value.filter(| value | !value.trim().is_empty() )
}

fn parse_links( id: &str, links: RawLinks ) -> Links {
	let parse = | field: &str, value: Option<String> | present( value ).and_then(| value | Url::parse( &value )
		.inspect_err(| err | tracing::warn!( id, field, value = %value, error = %err, "Dropping malformed link" ))
		.ok()
	);
	Links {
		homepage: parse( "homepage", links.homepage ),
		source: parse( "source", links.source ),
		issues: parse( "issues", links.issues ),
	}
}
