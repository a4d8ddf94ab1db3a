use std::io::Read ;
use std::sync::Arc ;
use tracing::Span ;

use crate::candidate::PluginCandidate ;
use crate::metadata::PluginMetadata ;
use crate::resource::{ PluginResource, ResourceLocation };



/// A loaded, or loading, plugin.
///
/// Pairs a [`PluginCandidate`] with a dedicated logger and, once
/// [`PluginLoader::load_plugin`]( crate::PluginLoader::load_plugin ) succeeds,
/// the instance produced by the backend. Two containers are equal when their
/// plugin ids are.
pub struct PluginContainer<T> {
	candidate: PluginCandidate,
	logger: Span,
	instance: Option<T>,
}

impl<T> PluginContainer<T> {

	pub fn new( candidate: PluginCandidate ) -> Self {
		let logger = tracing::info_span!( "plugin", id = %candidate.metadata().id() );
		Self { candidate, logger, instance: None }
	}

	#[inline] pub fn candidate( &self ) -> &PluginCandidate { &self.candidate }
	#[inline] pub fn metadata( &self ) -> &PluginMetadata { self.candidate.metadata() }
	#[inline] pub fn resource( &self ) -> &Arc<PluginResource> { self.candidate.resource() }

	/// Span carrying the plugin id. Enter it to attribute events to the plugin.
	#[inline] pub fn logger( &self ) -> &Span { &self.logger }

	#[inline] pub fn instance( &self ) -> Option<&T> { self.instance.as_ref() }
	#[inline] pub fn instance_mut( &mut self ) -> Option<&mut T> { self.instance.as_mut() }
	#[inline] pub fn is_loaded( &self ) -> bool { self.instance.is_some() }
	#[inline] pub fn into_instance( self ) -> Option<T> { self.instance }

	/// Stores the plugin instance.
	///
	/// # Panics
	/// If an instance was already stored. The first instance is kept.
	pub fn initialize_instance( &mut self, instance: T ) {
		if self.instance.is_some() {
			panic!( "Plugin '{}' already has an instance", self.metadata().id() );
		}
		self.instance = Some( instance );
	}

	/// Resolves a path relative to the plugin's resource.
	pub fn locate_resource( &self, relative: &str ) -> Option<ResourceLocation> {
		self.resource().locate_resource( relative )
	}

	/// Opens a path relative to the plugin's resource.
	pub fn open_resource( &self, relative: &str ) -> Option<Box<dyn Read + Send>> {
		self.resource().open_resource( relative )
	}

}

impl<T> PartialEq for PluginContainer<T> {
	fn eq( &self, other: &Self ) -> bool { self.metadata().id() == other.metadata().id() }
}
impl<T> Eq for PluginContainer<T> {}

impl<T> std::hash::Hash for PluginContainer<T> {
	fn hash<H: std::hash::Hasher>( &self, state: &mut H ) { self.metadata().id().hash( state ) }
}

impl<T> std::fmt::Debug for PluginContainer<T> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginContainer" )
			.field( "id", self.metadata().id() )
			.field( "resource", self.resource() )
			.field( "loaded", &self.is_loaded() )
			.finish_non_exhaustive()
	}
}
