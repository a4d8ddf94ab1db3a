//! WebAssembly component backend.
//!
//! Plugins declare `"loader": "wasm"` in their descriptor and point their
//! `entrypoint` at a component inside the bundle (`plugin.wasm` by default).
//! Both the binary and the text format are accepted.

use wasmtime::Store ;
use wasmtime::component::{ Component, Instance, Linker };

use crate::{ Environment, LanguageService };
use crate::candidate::PluginCandidate ;
use crate::loader::{ Instantiate, InstantiationError };
use crate::metadata::PluginMetadata ;



/// Claims descriptors written for the wasm backend.
#[derive( Debug, Clone, Copy, Default )]
pub struct WasmLanguageService ;

impl WasmLanguageService {
	pub const NAME: &'static str = "wasm" ;
}

impl LanguageService for WasmLanguageService {
	fn name( &self ) -> &str { Self::NAME }
}

/// Compiles and instantiates a candidate's component through a host [`Linker`].
///
/// Every plugin gets its own [`Store`], whose data is produced from the
/// plugin's metadata by the context factory.
pub struct WasmInstantiator<F> {
	context: F,
}

impl<F> WasmInstantiator<F> {
	/// Entry point used when the metadata names none.
	pub const DEFAULT_ENTRYPOINT: &'static str = "plugin.wasm" ;

	pub fn new( context: F ) -> Self { Self { context }}
}

impl<Ctx, F> Instantiate<Linker<Ctx>> for WasmInstantiator<F>
where
	Ctx: 'static,
	F: Fn( &PluginMetadata ) -> Ctx,
{
	type Instance = WasmPlugin<Ctx> ;

	fn instantiate( &self, _environment: &Environment, candidate: &PluginCandidate, linker: &Linker<Ctx> )
		-> Result<Self::Instance, InstantiationError>
	{
		let metadata = candidate.metadata();
		let entrypoint = metadata.entrypoint().unwrap_or( Self::DEFAULT_ENTRYPOINT );

		let bytes = candidate.resource().read_resource( entrypoint )?
			.ok_or_else(|| InstantiationError::MissingEntryPoint( entrypoint.to_string() ))?;

		let component = Component::new( linker.engine(), &bytes )?;
		let mut store = Store::new( linker.engine(), ( self.context )( metadata ));
		let instance = linker.instantiate( &mut store, &component )?;

		Ok( WasmPlugin { store, instance })
	}
}

impl<F> std::fmt::Debug for WasmInstantiator<F> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmInstantiator" ).finish_non_exhaustive()
	}
}

/// An instantiated component with its store.
pub struct WasmPlugin<Ctx: 'static> {
	store: Store<Ctx>,
	instance: Instance,
}

impl<Ctx: 'static> WasmPlugin<Ctx> {
	#[inline] pub fn store( &self ) -> &Store<Ctx> { &self.store }
	#[inline] pub fn store_mut( &mut self ) -> &mut Store<Ctx> { &mut self.store }
	#[inline] pub fn instance( &self ) -> Instance { self.instance }
	#[inline] pub fn data( &self ) -> &Ctx { self.store.data() }
	#[inline] pub fn into_parts( self ) -> ( Store<Ctx>, Instance ) { ( self.store, self.instance ) }
}

impl<Ctx: std::fmt::Debug + 'static> std::fmt::Debug for WasmPlugin<Ctx> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmPlugin" )
			.field( "data", self.store.data() )
			.field( "store", &self.store )
			.finish_non_exhaustive()
	}
}
