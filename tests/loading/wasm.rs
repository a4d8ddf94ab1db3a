use plugin_discovery::{
	Engine, Environment, InstantiationError, InvalidPlugin, Linker, PluginLoader, PluginMetadata,
	Rejection, WasmInstantiator, WasmLanguageService,
};
use serde_json::json ;
use crate::fixtures ;

const EMPTY_COMPONENT: &[u8] = b"(component)" ;

fn wasm_environment( plugins: &std::path::Path ) -> Environment {
	fixtures::init_logging();
	let mut environment = Environment::standard().with_plugin_directories([ plugins ]);
	environment.register_language_service( WasmLanguageService ).expect( "Failed to register wasm service" );
	environment.initialize();
	environment
}

fn wasm_descriptor( plugins: serde_json::Value ) -> Vec<u8> {
	fixtures::descriptor( WasmLanguageService::NAME, plugins )
}

#[test]
fn components_are_instantiated_with_their_own_store() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::archive_bundle( &plugins, "packed.zip", &[
		( fixtures::DESCRIPTOR, &wasm_descriptor( json!([{ "id": "packed", "version": "1.0" }]))),
		( "plugin.wasm", EMPTY_COMPONENT ),
	]);
	fixtures::directory_bundle( &plugins, "loose", &[
		( fixtures::DESCRIPTOR, &wasm_descriptor( json!([{ "id": "loose", "version": "1.0", "entrypoint": "bin/loose.wasm" }]))),
		( "bin/loose.wasm", EMPTY_COMPONENT ),
	]);

	let environment = wasm_environment( &plugins );
	let mut discovery = environment.discover().expect( "Failed to discover plugins" );
	assert_no_rejections!( discovery.rejections );

	let engine = Engine::default();
	let linker = Linker::<String>::new( &engine );
	let loader = PluginLoader::new( WasmInstantiator::new(| metadata: &PluginMetadata | metadata.id().to_string() ));

	let ( containers, rejections ) = environment.load_plugins( &loader, discovery.take_candidates( WasmLanguageService::NAME ), &linker );
	assert_no_rejections!( rejections );

	let data = containers.iter()
		.map(| container | container.instance().map(| plugin | plugin.data().clone() ))
		.collect::<Vec<_>>();
	assert_eq!( data, vec![ Some( "loose".to_string() ), Some( "packed".to_string() )]);

}

#[test]
fn missing_and_corrupt_entry_points_are_invalid_plugins() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::directory_bundle( &plugins, "absent", &[
		( fixtures::DESCRIPTOR, &wasm_descriptor( json!([{ "id": "absent", "version": "1.0" }]))),
	]);
	fixtures::directory_bundle( &plugins, "corrupt", &[
		( fixtures::DESCRIPTOR, &wasm_descriptor( json!([{ "id": "corrupt", "version": "1.0" }]))),
		( "plugin.wasm", b"\0asm this is not a component" ),
	]);

	let environment = wasm_environment( &plugins );
	let mut discovery = environment.discover().expect( "Failed to discover plugins" );
	assert_no_rejections!( discovery.rejections );

	let engine = Engine::default();
	let linker = Linker::<()>::new( &engine );
	let loader = PluginLoader::new( WasmInstantiator::new(| _: &PluginMetadata | () ));

	let ( containers, rejections ) = environment.load_plugins( &loader, discovery.take_candidates( WasmLanguageService::NAME ), &linker );
	assert!( containers.is_empty() );

	match rejections.as_slice() {
		[
			Rejection::Plugin( InvalidPlugin { id: absent, source: InstantiationError::MissingEntryPoint( entrypoint ), .. }),
			Rejection::Plugin( InvalidPlugin { id: corrupt, source: InstantiationError::Wasm( _ ), .. }),
		] => {
			assert_eq!( absent, "absent" );
			assert_eq!( entrypoint, "plugin.wasm" );
			assert_eq!( corrupt, "corrupt" );
		}
		value => panic!( "Expected MissingEntryPoint and Wasm rejections, found: {:#?}", value ),
	}

}

#[test]
fn other_backends_do_not_see_wasm_plugins() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::directory_bundle( &plugins, "native", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "native", "1.0" )),
	]);

	let environment = wasm_environment( &plugins );
	let discovery = environment.discover().expect( "Failed to discover plugins" );

	assert!( discovery.candidates_for( WasmLanguageService::NAME ).is_empty() );
	match discovery.rejections.as_slice() {
		[ Rejection::Unclaimed( path )] => assert_eq!( *path, plugins.join( "native" )),
		value => panic!( "Expected a single Unclaimed rejection, found: {:#?}", value ),
	}

}
