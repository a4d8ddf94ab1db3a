use std::collections::BTreeSet ;

use crate::{ keys, Environment, PartialSuccess };
use crate::resource::{ PluginResource, ResourceError };
use super::{ record, DiscoveryFailure, PluginResourceLocator, ResourceProbe };



/// Probes each entry of [`keys::SEARCH_PATH`] as a bundle of its own.
///
/// Unlike the [`DirectoryLocator`]( super::DirectoryLocator ) it does not
/// recurse: an entry either is a bundle or is ignored.
#[derive( Debug, Clone, Copy, Default )]
pub struct SearchPathLocator ;

impl SearchPathLocator {
	pub const NAME: &'static str = "search_path" ;
}

impl PluginResourceLocator for SearchPathLocator {

	fn name( &self ) -> &str { Self::NAME }

	fn locate_plugin_resources( &self, environment: &Environment )
		-> Result<PartialSuccess<BTreeSet<PluginResource>, ResourceError>, DiscoveryFailure>
	{

		tracing::info!( "Locating '{}' resources", Self::NAME );

		let probe = ResourceProbe::new( environment, self )?;
		let entries = environment.blackboard().find( &keys::SEARCH_PATH ).map_or( &[][..], Vec::as_slice );

		let mut resources = BTreeSet::new();
		let mut errors = Vec::new();

		for entry in entries {
			if !entry.exists() {
				tracing::debug!( entry = %entry.display(), "Skipping missing search path entry" );
				continue ;
			}
			match probe.probe( entry ) {
				Ok( Some( resource )) => { resources.insert( resource ); }
				Ok( None ) => {}
				Err( err ) => record( Self::NAME, err, &mut errors ),
			}
		}

		tracing::info!( locator = Self::NAME, "Located [{}] resource(s)", resources.len() );
		Ok(( resources, errors ))

	}

}
