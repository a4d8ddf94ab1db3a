//! Turning resources into plugin candidates.
//!
//! A [`LanguageService`] reads the descriptor of every located resource and
//! claims those whose `loader` field names it. Each valid entry of a claimed
//! descriptor becomes a [`PluginCandidate`]. Services never see each other's
//! plugins: a descriptor written for one backend is skipped by all others.

use std::sync::Arc ;
use itertools::Itertools ;

use crate::{ Blackboard, Environment, PartialSuccess };
use crate::candidate::PluginCandidate ;
use crate::descriptor::{ Descriptor, DescriptorError };
use crate::metadata::{ InvalidMetadata, PluginMetadata };
use crate::resource::PluginResource ;



/// A plugin backend.
pub trait LanguageService {

	/// Unique name, matched against the descriptor's `loader` field.
	fn name( &self ) -> &str ;

	/// Runs once during [`Environment::initialize`], after the defaults are in
	/// place. Services may read or seed configuration here.
	fn initialize( &self, _blackboard: &mut Blackboard ) {}

	/// Extra validation applied to entries that passed the required-field check.
	/// Refused entries are reported as [`InvalidMetadata::Rejected`].
	fn is_valid_metadata( &self, _environment: &Environment, _metadata: &PluginMetadata ) -> bool { true }

	/// Reads the descriptor of `resource` and builds one candidate per valid entry.
	///
	/// Returns `Ok( None )` if the resource has no descriptor or the descriptor
	/// is meant for another service. `Ok( Some( .. ))` means the resource was
	/// claimed, even if none of its entries turned out usable.
	///
	/// # Errors
	/// If the descriptor exists but cannot be read or parsed.
	fn create_candidates( &self, environment: &Environment, resource: &Arc<PluginResource> )
		-> Result<Option<PartialSuccess<Vec<PluginCandidate>, InvalidMetadata>>, DescriptorError>
	{

		let Some( descriptor ) = Descriptor::read( resource, environment.metadata_file_path() )? else {
			tracing::debug!( service = self.name(), resource = %resource, "Resource has no plugin descriptor" );
			return Ok( None );
		};

		match descriptor.loader.as_deref() {
			Some( loader ) if loader == self.name() => {},
			loader => {
				tracing::debug!( service = self.name(), resource = %resource, loader, "Descriptor is meant for another service" );
				return Ok( None );
			}
		}

		let declared = descriptor.plugins.len();
		let ( metadata, mut errors ): ( Vec<_>, Vec<_> ) = descriptor.plugins.into_iter()
			.enumerate()
			.map(|( index, raw )| raw.validate( resource.path(), index ))
			.partition_result();

		let ( accepted, refused ): ( Vec<_>, Vec<_> ) = metadata.into_iter()
			.map(| metadata | match self.is_valid_metadata( environment, &metadata ) {
				true => Ok( metadata ),
				false => Err( InvalidMetadata::Rejected {
					resource: resource.path().to_path_buf(),
					id: metadata.id().to_string(),
					service: self.name().to_string(),
				}),
			})
			.partition_result();
		errors.extend( refused );

		errors.iter().for_each(| err | tracing::error!( service = self.name(), error = %err, "Skipping invalid plugin metadata" ));

		let candidates = accepted.into_iter()
			.map(| metadata | PluginCandidate::new( metadata, Arc::clone( resource )))
			.collect::<Vec<_>>();

		if declared > 0 && candidates.is_empty() {
			tracing::info!( service = self.name(), resource = %resource, "Resource declared plugins but none usable" );
		}

		Ok( Some(( candidates, errors )))

	}

}

/// Claims resources whose descriptor names it and performs no extra validation.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct StandardLanguageService {
	name: String,
}

impl StandardLanguageService {
	pub fn new( name: impl Into<String> ) -> Self { Self { name: name.into() }}
}

impl LanguageService for StandardLanguageService {
	fn name( &self ) -> &str { &self.name }
}
