//! The plugin environment.
//!
//! An [`Environment`] owns the [`Blackboard`], the registered locators and the
//! registered language services, and drives the pipeline:
//!
//! 1. [`Environment::initialize`] fills in configuration defaults.
//! 2. [`Environment::locate_resources`] asks every locator for bundles.
//! 3. [`Environment::create_candidates`] lets every service claim bundles.
//! 4. [`Environment::load_plugins`] instantiates candidates through a [`PluginLoader`].
//!
//! Each phase keeps going past problems with individual bundles, plugins or
//! entries and reports them as [`Rejection`]s next to its result.

use std::collections::{ BTreeMap, BTreeSet, HashMap };
use std::path::PathBuf ;
use std::sync::Arc ;
use itertools::Itertools ;
use pipe_trait::Pipe ;
use thiserror::Error ;

use crate::{ keys, Blackboard, PartialSuccess };
use crate::candidate::PluginCandidate ;
use crate::container::PluginContainer ;
use crate::descriptor::DescriptorError ;
use crate::language_service::LanguageService ;
use crate::loader::{ Instantiate, InvalidPlugin, PluginLoader };
use crate::locator::{ DirectoryLocator, DiscoveryFailure, PluginResourceLocator, SearchPathLocator };
use crate::metadata::{ InvalidMetadata, PluginId };
use crate::resource::{ PluginResource, ResourceError };



/// Errors registering locators and services.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ConfigurationError {
	#[error( "A locator named '{0}' is already registered" )] DuplicateLocator( String ),
	#[error( "A language service named '{0}' is already registered" )] DuplicateLanguageService( String ),
}

/// Something the pipeline skipped while carrying on with the rest.
#[derive( Error, Debug )]
pub enum Rejection {
	/// A locator excluded a bundle.
	#[error( transparent )] Resource( #[from] ResourceError ),
	/// A service could not read a bundle's descriptor.
	#[error( "Language service '{service}': {error}" )]
	Descriptor { service: String, #[source] error: DescriptorError },
	/// A descriptor entry failed validation.
	#[error( transparent )] Metadata( #[from] InvalidMetadata ),
	/// No service claimed a bundle.
	#[error( "No language service claimed '{}'", .0.display() )] Unclaimed( PathBuf ),
	/// A candidate failed to load.
	#[error( transparent )] Plugin( #[from] InvalidPlugin ),
	/// A candidate reused the id of one loaded before it.
	#[error( "Plugin '{id}' from '{}' is already provided by '{}'", .resource.display(), .existing.display() )]
	DuplicateId { id: String, resource: PathBuf, existing: PathBuf },
}

/// What discovery found.
#[derive( Debug, Default )]
pub struct Discovery {
	pub resources: BTreeSet<Arc<PluginResource>>,
	/// Candidates keyed by the name of the service that claimed them.
	pub candidates: BTreeMap<String, Vec<PluginCandidate>>,
	pub rejections: Vec<Rejection>,
}

impl Discovery {
	/// Candidates claimed by the service called `name`.
	pub fn candidates_for( &self, name: &str ) -> &[PluginCandidate] {
		self.candidates.get( name ).map_or( &[][..], Vec::as_slice )
	}

	/// Takes the candidates claimed by the service called `name`.
	pub fn take_candidates( &mut self, name: &str ) -> Vec<PluginCandidate> {
		self.candidates.remove( name ).unwrap_or_default()
	}

	pub fn candidate_count( &self ) -> usize { self.candidates.values().map( Vec::len ).sum() }
}

/// Owns the configuration and the pluggable parts of the pipeline.
///
/// The blackboard can only be written through `&mut Environment`; every
/// pipeline phase takes `&self`.
#[derive( Default )]
pub struct Environment {
	blackboard: Blackboard,
	locators: Vec<Box<dyn PluginResourceLocator>>,
	language_services: BTreeMap<String, Box<dyn LanguageService>>,
	initialized: bool,
}

impl Environment {

	/// An environment with nothing registered.
	pub fn new() -> Self { Self::default() }

	/// An environment with the [`DirectoryLocator`] and the [`SearchPathLocator`] registered.
	pub fn standard() -> Self {
		let mut environment = Self::new();
		environment.locators.push( Box::new( DirectoryLocator ));
		environment.locators.push( Box::new( SearchPathLocator ));
		environment
	}

	#[inline] pub fn blackboard( &self ) -> &Blackboard { &self.blackboard }
	#[inline] pub fn blackboard_mut( &mut self ) -> &mut Blackboard { &mut self.blackboard }
	#[inline] pub fn is_initialized( &self ) -> bool { self.initialized }

	pub fn with_base_directory( mut self, directory: impl Into<PathBuf> ) -> Self {
		self.blackboard.get_or_create( &keys::BASE_DIRECTORY, || directory.into() );
		self
	}

	pub fn with_plugin_directories( mut self, directories: impl IntoIterator<Item = impl Into<PathBuf>> ) -> Self {
		self.blackboard.get_or_create( &keys::PLUGIN_DIRECTORIES, || directories.into_iter().map( Into::into ).collect() );
		self
	}

	pub fn with_search_path( mut self, entries: impl IntoIterator<Item = impl Into<PathBuf>> ) -> Self {
		self.blackboard.get_or_create( &keys::SEARCH_PATH, || entries.into_iter().map( Into::into ).collect() );
		self
	}

	pub fn with_version( mut self, version: impl Into<String> ) -> Self {
		self.blackboard.get_or_create( &keys::VERSION, || version.into() );
		self
	}

	pub fn with_development( mut self, development: bool ) -> Self {
		self.blackboard.get_or_create( &keys::DEVELOPMENT, || development );
		self
	}

	/// # Errors
	/// If a locator with the same name is already registered.
	pub fn register_locator( &mut self, locator: impl PluginResourceLocator + 'static ) -> Result<(), ConfigurationError> {
		if self.locators.iter().any(| registered | registered.name() == locator.name() ) {
			return Err( ConfigurationError::DuplicateLocator( locator.name().to_string() ));
		}
		tracing::debug!( locator = locator.name(), "Registered locator" );
		self.locators.push( Box::new( locator ));
		Ok(())
	}

	/// Registers a service. If the environment is already initialised, the
	/// service's hook runs right away.
	///
	/// # Errors
	/// If a service with the same name is already registered.
	pub fn register_language_service( &mut self, service: impl LanguageService + 'static ) -> Result<(), ConfigurationError> {
		let name = service.name().to_string();
		if self.language_services.contains_key( &name ) {
			return Err( ConfigurationError::DuplicateLanguageService( name ));
		}
		if self.initialized { service.initialize( &mut self.blackboard ); }
		tracing::debug!( service = %name, "Registered language service" );
		self.language_services.insert( name, Box::new( service ));
		Ok(())
	}

	pub fn locator_names( &self ) -> Vec<&str> {
		self.locators.iter().map(| locator | locator.name() ).collect()
	}

	pub fn language_service_names( &self ) -> Vec<&str> {
		self.language_services.keys().map( String::as_str ).collect()
	}

	pub fn language_service( &self, name: &str ) -> Option<&dyn LanguageService> {
		self.language_services.get( name ).map(| service | &**service )
	}

	/// Fills every unset configuration key with its default and runs each
	/// language service's hook. Calling it again does nothing.
	pub fn initialize( &mut self ) {

		if self.initialized {
			tracing::debug!( "Environment already initialised" );
			return ;
		}

		let base_directory = self.blackboard.get_or_create( &keys::BASE_DIRECTORY, || PathBuf::from( "." )).clone();
		self.blackboard.get_or_create( &keys::PLUGIN_DIRECTORIES, || vec![ base_directory.join( keys::DEFAULT_PLUGINS_DIRECTORY )]);
		self.blackboard.get_or_create( &keys::SEARCH_PATH, Vec::new );
		self.blackboard.get_or_create( &keys::VERSION, || env!( "CARGO_PKG_VERSION" ).to_string() );
		self.blackboard.get_or_create( &keys::DEVELOPMENT, || false );
		self.blackboard.get_or_create( &keys::METADATA_FILE_PATH, || keys::DEFAULT_METADATA_FILE_PATH.to_string() );
		self.blackboard.get_or_create( &keys::ARCHIVE_EXTENSIONS, || keys::DEFAULT_ARCHIVE_EXTENSIONS.map( String::from ).to_vec() );

		for service in self.language_services.values() {
			service.initialize( &mut self.blackboard );
		}
		self.initialized = true ;

		tracing::info!(
			base_directory = %base_directory.display(),
			locators = self.locators.len(),
			language_services = self.language_services.len(),
			"Initialised plugin environment"
		);

	}

	/// Descriptor path inside a bundle.
	pub fn metadata_file_path( &self ) -> &str {
		self.blackboard.find( &keys::METADATA_FILE_PATH ).map_or( keys::DEFAULT_METADATA_FILE_PATH, String::as_str )
	}

	/// Runs every registered locator.
	///
	/// # Errors
	/// The first [`DiscoveryFailure`] any locator reports.
	pub fn locate_resources( &self ) -> Result<PartialSuccess<BTreeSet<Arc<PluginResource>>, Rejection>, DiscoveryFailure> {
		let mut resources = BTreeSet::new();
		let mut rejections = Vec::new();
		for locator in &self.locators {
			let ( found, errors ) = locator.locate_plugin_resources( self )?;
			resources.extend( found.into_iter().map( Arc::new ));
			rejections.extend( errors.into_iter().map( Rejection::Resource ));
		}
		Ok(( resources, rejections ))
	}

	/// Offers every resource to every language service.
	///
	/// Resources no service claims are reported with a single warning. A
	/// descriptor that cannot be read is reported once, by the first service
	/// that tried it.
	pub fn create_candidates<'a>( &self, resources: impl IntoIterator<Item = &'a Arc<PluginResource>> )
		-> PartialSuccess<BTreeMap<String, Vec<PluginCandidate>>, Rejection>
	{

		let mut candidates = self.language_services.keys()
			.map(| name | ( name.clone(), Vec::new() ))
			.collect::<BTreeMap<_, _>>();
		let mut rejections = Vec::new();
		let mut unclaimed = Vec::new();

		for resource in resources {
			let mut claimed = false ;
			let mut unreadable = false ;
			for ( name, service ) in &self.language_services {
				match service.create_candidates( self, resource ) {
					Ok( Some(( found, invalid ))) => {
						claimed = true ;
						candidates.entry( name.clone() ).or_insert_with( Vec::new ).extend( found );
						rejections.extend( invalid.into_iter().map( Rejection::Metadata ));
					}
					Ok( None ) => {}
					Err( error ) if unreadable => {
						tracing::debug!( service = %name, error = %error, "Descriptor already reported" );
					}
					Err( error ) => {
						claimed = true ;
						unreadable = true ;
						tracing::error!( service = %name, error = %error, "Skipping resource" );
						rejections.push( Rejection::Descriptor { service: name.clone(), error });
					}
				}
			}
			if !claimed { unclaimed.push( resource.path().to_path_buf() ); }
		}

		if !unclaimed.is_empty() {
			tracing::warn!(
				"No language service claimed [{}] resource(s): {}",
				unclaimed.len(),
				unclaimed.iter().map(| path | path.display() ).join( ", " )
			);
			rejections.extend( unclaimed.into_iter().map( Rejection::Unclaimed ));
		}

		for ( name, found ) in &candidates {
			tracing::info!( service = %name, "Created [{}] candidate(s)", found.len() );
		}

		( candidates, rejections )

	}

	/// Locates resources and creates candidates from them.
	///
	/// # Errors
	/// If locating resources fails outright.
	pub fn discover( &self ) -> Result<Discovery, DiscoveryFailure> {
		self.locate_resources()?
			.pipe(|( resources, mut rejections )| {
				let ( candidates, errors ) = self.create_candidates( &resources );
				rejections.extend( errors );
				Ok( Discovery { resources, candidates, rejections })
			})
	}

	/// Creates a container per candidate and loads it through `loader`.
	///
	/// Candidates are taken in order. If a candidate fails to load, the next
	/// one with the same id gets its turn. Once an id is loaded, later
	/// candidates with it are rejected without being instantiated.
	pub fn load_plugins<I, Target>(
		&self,
		loader: &PluginLoader<I>,
		candidates: impl IntoIterator<Item = PluginCandidate>,
		target: &Target,
	) -> PartialSuccess<Vec<PluginContainer<I::Instance>>, Rejection>
	where
		Target: ?Sized,
		I: Instantiate<Target>,
	{

		let mut loaded = HashMap::<PluginId, PathBuf>::new();
		let mut containers = Vec::new();
		let mut rejections = Vec::new();

		for candidate in candidates {

			if let Some( existing ) = loaded.get( candidate.metadata().id() ) {
				let duplicate = Rejection::DuplicateId {
					id: candidate.metadata().id().to_string(),
					resource: candidate.resource().path().to_path_buf(),
					existing: existing.clone(),
				};
				tracing::error!( error = %duplicate, "Skipping duplicate plugin" );
				rejections.push( duplicate );
				continue ;
			}

			let mut container = loader.create_container::<Target>( candidate );
			match loader.load_plugin( self, &mut container, target ) {
				Ok(()) => {
					loaded.insert( container.metadata().id().clone(), container.resource().path().to_path_buf() );
					containers.push( container );
				}
				Err( err ) => {
					tracing::error!( error = %err, "Failed to load plugin" );
					rejections.push( Rejection::Plugin( err ));
				}
			}

		}

		tracing::info!( "Loaded [{}] plugin(s)", containers.len() );
		( containers, rejections )

	}

}

impl std::fmt::Debug for Environment {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Environment" )
			.field( "blackboard", &self.blackboard )
			.field( "locators", &self.locator_names() )
			.field( "language_services", &self.language_service_names() )
			.field( "initialized", &self.initialized )
			.finish()
	}
}
