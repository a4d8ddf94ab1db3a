use std::collections::BTreeSet ;
use walkdir::WalkDir ;

use crate::{ keys, Environment, PartialSuccess };
use crate::resource::{ PluginResource, ResourceError, ResourceKind };
use super::{ record, DiscoveryFailure, PluginResourceLocator, ResourceProbe };



/// Walks every directory listed under [`keys::PLUGIN_DIRECTORIES`].
///
/// Roots that do not exist are skipped. A bundle directory is not descended
/// into, so nested bundles are not discovered twice.
#[derive( Debug, Clone, Copy, Default )]
pub struct DirectoryLocator ;

impl DirectoryLocator {
	pub const NAME: &'static str = "directory" ;
}

impl PluginResourceLocator for DirectoryLocator {

	fn name( &self ) -> &str { Self::NAME }

	fn locate_plugin_resources( &self, environment: &Environment )
		-> Result<PartialSuccess<BTreeSet<PluginResource>, ResourceError>, DiscoveryFailure>
	{

		let probe = ResourceProbe::new( environment, self )?;
		let roots = environment.blackboard().get( &keys::PLUGIN_DIRECTORIES )?;

		let mut resources = BTreeSet::new();
		let mut errors = Vec::new();

		for root in roots {

			if !root.exists() {
				tracing::debug!( root = %root.display(), "Skipping missing plugin directory" );
				continue ;
			}

			tracing::info!( root = %root.display(), "Locating '{}' resources", Self::NAME );

			std::fs::read_dir( root ).map_err(| source | DiscoveryFailure::SearchRootUnreadable { path: root.clone(), source })?;

			let mut walker = WalkDir::new( root ).min_depth( 1 ).sort_by_file_name().into_iter();
			while let Some( entry ) = walker.next() {
				let entry = match entry {
					Ok( entry ) => entry,
					Err( source ) => {
						let path = source.path().unwrap_or( root ).to_path_buf();
						tracing::warn!( path = %path.display(), error = %source, "Skipping unreadable entry" );
						errors.push( ResourceError::Walk { path, source });
						continue ;
					}
				};
				match probe.probe( entry.path() ) {
					Ok( Some( resource )) => {
						// Links are not followed, so a linked bundle was never pushed onto the walk.
						if resource.kind() == ResourceKind::Directory && entry.file_type().is_dir() { walker.skip_current_dir(); }
						resources.insert( resource );
					}
					Ok( None ) => {}
					Err( err ) => record( Self::NAME, err, &mut errors ),
				}
			}

		}

		tracing::info!( locator = Self::NAME, "Located [{}] resource(s)", resources.len() );
		Ok(( resources, errors ))

	}

}
