use std::sync::Arc ;

use crate::metadata::PluginMetadata ;
use crate::resource::PluginResource ;



/// A plugin that was declared and validated but not yet loaded.
///
/// Candidates from the same resource share it.
#[derive( Debug, Clone )]
pub struct PluginCandidate {
	metadata: Arc<PluginMetadata>,
	resource: Arc<PluginResource>,
}

impl PluginCandidate {

	pub fn new( metadata: PluginMetadata, resource: Arc<PluginResource> ) -> Self {
		Self { metadata: Arc::new( metadata ), resource }
	}

	#[inline] pub fn metadata( &self ) -> &PluginMetadata { &self.metadata }
	#[inline] pub fn resource( &self ) -> &Arc<PluginResource> { &self.resource }

}

impl std::fmt::Display for PluginCandidate {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		write!( f, "{} from {}", self.metadata.id(), self.resource )
	}
}
