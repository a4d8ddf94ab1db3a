//! Discovery and loading of plugins packaged as directories or archives.
//!
//! A host describes where plugins live, and this crate finds the bundles,
//! reads their descriptors, validates what they declare and hands every
//! surviving plugin to a backend for instantiation. Problems with single
//! bundles or plugins never stop the pipeline; they are collected and
//! returned next to whatever did work.
//!
//! # Core Concepts
//!
//! - [`Blackboard`]: A typed store addressed by [`Key`]s that carries configuration
//! 	through every phase. Well-known keys live in [`keys`].
//!
//! - [`PluginResource`]: A located bundle, either a directory or a zip archive,
//! 	that carries a plugin descriptor (`META-INF/plugins.json` by default).
//! 	Archives are only opened once something inside them is needed.
//!
//! - [`PluginResourceLocator`]: Finds resources. [`DirectoryLocator`] walks the
//! 	plugin directories, [`SearchPathLocator`] probes the host's search path.
//!
//! - [`LanguageService`]: A backend. It claims resources whose descriptor names it
//! 	and turns each valid entry into a [`PluginCandidate`]. Backends never see
//! 	each other's plugins.
//!
//! - [`PluginLoader`]: Instantiates candidates through an [`Instantiate`]
//! 	implementation and stores the instance in a [`PluginContainer`].
//!
//! - [`Environment`]: Owns all of the above and runs the phases in order.
//!
//! # Re-exports
//!
//! The wasm backend works with a few `wasmtime` types (`Engine`, `Component`,
//! `Linker`), re-exported for convenience. See the
//! [wasmtime docs](https://docs.rs/wasmtime/latest/wasmtime/) for details.
//!
//! # Example
//!
//! ```
//! use plugin_discovery::{
//! 	Environment, Engine, Linker, PluginLoader, PluginMetadata,
//! 	WasmInstantiator, WasmLanguageService,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut environment = Environment::standard()
//! 	.with_plugin_directories([ "plugins-that-do-not-exist" ]);
//! environment.register_language_service( WasmLanguageService )?;
//! environment.initialize();
//!
//! let mut discovery = environment.discover()?;
//! for rejection in &discovery.rejections {
//! 	eprintln!( "{rejection}" );
//! }
//!
//! let engine = Engine::default();
//! let linker = Linker::<()>::new( &engine );
//! let loader = PluginLoader::new( WasmInstantiator::new(| _: &PluginMetadata | () ));
//! let ( plugins, failures ) = environment.load_plugins(
//! 	&loader,
//! 	discovery.take_candidates( WasmLanguageService::NAME ),
//! 	&linker,
//! );
//! assert!( plugins.is_empty() && failures.is_empty() );
//! # Ok(())
//! # }
//! ```

mod blackboard ;
pub mod keys ;
mod manifest ;
mod resource ;
mod locator ;
mod descriptor ;
mod metadata ;
mod language_service ;
mod candidate ;
mod container ;
mod loader ;
mod wasm ;
mod environment ;
mod utils {
	pub mod partial_success ;
}

#[doc( no_inline )]
pub use wasmtime::Engine ;
#[doc( no_inline )]
pub use wasmtime::component::{ Component, Linker };

pub use blackboard::{ Blackboard, BlackboardError, Key };
pub use manifest::{ Manifest, ManifestError, MANIFEST_PATH };
pub use resource::{ PluginResource, ResourceError, ResourceKind, ResourceLocation };
pub use locator::{ DirectoryLocator, DiscoveryFailure, PluginResourceLocator, ResourceProbe, SearchPathLocator };
pub use descriptor::{ Descriptor, DescriptorError, RawLinks, RawMetadata };
pub use metadata::{ InvalidMetadata, Links, PluginId, PluginMetadata };
pub use language_service::{ LanguageService, StandardLanguageService };
pub use candidate::PluginCandidate ;
pub use container::PluginContainer ;
pub use loader::{ Instantiate, InstantiationError, InvalidPlugin, PluginLoader };
pub use wasm::{ WasmInstantiator, WasmLanguageService, WasmPlugin };
pub use environment::{ ConfigurationError, Discovery, Environment, Rejection };
pub use utils::partial_success::PartialSuccess ;
