//! Instantiating candidates.
//!
//! A [`PluginLoader`] wraps an [`Instantiate`] implementation, the part of a
//! backend that knows how to turn a candidate into a running instance. The
//! `Target` is whatever the backend needs from the host to do so, for the
//! wasm backend a [`Linker`]( crate::Linker ).

use std::path::PathBuf ;
use thiserror::Error ;

use crate::Environment ;
use crate::candidate::PluginCandidate ;
use crate::container::PluginContainer ;



/// Creates plugin instances for a backend.
///
/// Implemented for every closure of the matching shape, so simple backends
/// need no type of their own.
pub trait Instantiate<Target: ?Sized> {

	type Instance ;

	/// # Errors
	/// An [`InstantiationError`] if the candidate cannot be brought up.
	fn instantiate( &self, environment: &Environment, candidate: &PluginCandidate, target: &Target )
		-> Result<Self::Instance, InstantiationError> ;

}

impl<Target, Instance, F> Instantiate<Target> for F
where
	Target: ?Sized,
	F: Fn( &Environment, &PluginCandidate, &Target ) -> Result<Instance, InstantiationError>,
{
	type Instance = Instance ;
	fn instantiate( &self, environment: &Environment, candidate: &PluginCandidate, target: &Target )
		-> Result<Instance, InstantiationError>
	{
		self( environment, candidate, target )
	}
}

#[derive( Error, Debug )]
pub enum InstantiationError {
	/// The resource does not contain the code the plugin points at.
	#[error( "Missing entry point '{0}'" )] MissingEntryPoint( String ),
	/// The instance reports a different id than its metadata.
	#[error( "Instance identifies as '{found}' but was declared as '{declared}'" )]
	IdMismatch { declared: String, found: String },
	#[error( "Wasm error: {0}" )] Wasm( wasmtime::Error ),
	#[error( "I/O error: {0}" )] Io( #[from] std::io::Error ),
	#[error( "{0}" )] Other( String ),
}

impl From<wasmtime::Error> for InstantiationError {
	fn from( error: wasmtime::Error ) -> Self { Self::Wasm( error )}
}

/// A candidate that could not be loaded.
#[derive( Error, Debug )]
#[error( "Failed to load plugin '{id}' from '{}': {source}", .resource.display() )]
pub struct InvalidPlugin {
	pub id: String,
	pub resource: PathBuf,
	#[source] pub source: InstantiationError,
}

/// Creates containers and fills them through a backend.
pub struct PluginLoader<I> {
	instantiator: I,
}

impl<I> PluginLoader<I> {

	pub fn new( instantiator: I ) -> Self { Self { instantiator }}

	#[inline] pub fn instantiator( &self ) -> &I { &self.instantiator }

	/// Wraps a candidate in an empty container.
	pub fn create_container<Target>( &self, candidate: PluginCandidate ) -> PluginContainer<I::Instance>
	where
		Target: ?Sized,
		I: Instantiate<Target>,
	{
		PluginContainer::new( candidate )
	}

	/// Instantiates the container's candidate and stores the instance in it.
	///
	/// # Errors
	/// [`InvalidPlugin`] if instantiation fails; the container is left empty.
	///
	/// # Panics
	/// If the container was already loaded.
	pub fn load_plugin<Target>(
		&self,
		environment: &Environment,
		container: &mut PluginContainer<I::Instance>,
		target: &Target,
	) -> Result<(), InvalidPlugin>
	where
		Target: ?Sized,
		I: Instantiate<Target>,
	{
		assert!( !container.is_loaded(), "Plugin '{}' is already loaded", container.metadata().id() );
		let _guard = container.logger().clone().entered();
		tracing::debug!( "Loading plugin" );

		let instance = self.instantiator.instantiate( environment, container.candidate(), target )
			.map_err(| source | InvalidPlugin {
				id: container.metadata().id().to_string(),
				resource: container.resource().path().to_path_buf(),
				source,
			})?;

		container.initialize_instance( instance );
		tracing::info!( version = container.metadata().version(), "Loaded plugin" );
		Ok(())
	}

}

impl<I> std::fmt::Debug for PluginLoader<I> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginLoader" )
			.field( "instantiator", &std::any::type_name::<I>() )
			.finish()
	}
}
