use plugin_discovery::{ Environment, InstantiationError, InvalidPlugin, PluginCandidate, PluginLoader, Rejection };
use crate::fixtures ;

#[test]
fn failed_instantiation_is_reported_and_others_still_load() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::directory_bundle( &plugins, "good", &[( fixtures::DESCRIPTOR, &fixtures::single_plugin( "good", "1.0" ))]);
	let bad = fixtures::directory_bundle( &plugins, "bad", &[( fixtures::DESCRIPTOR, &fixtures::single_plugin( "bad", "1.0" ))]);

	let environment = fixtures::environment( &plugins );
	let mut discovery = environment.discover().expect( "Failed to discover plugins" );

	let loader = PluginLoader::new(| _: &Environment, candidate: &PluginCandidate, _: &() | -> Result<(), InstantiationError> {
		match candidate.metadata().id().as_str() {
			"bad" => Err( InstantiationError::Other( "refusing to start".to_string() )),
			_ => Ok(()),
		}
	});
	let ( containers, rejections ) = environment.load_plugins( &loader, discovery.take_candidates( fixtures::BACKEND ), &() );

	assert_eq!( containers.len(), 1 );
	assert_eq!( containers[ 0 ].metadata().id(), "good" );
	assert!( containers[ 0 ].is_loaded() );
	match rejections.as_slice() {
		[ Rejection::Plugin( InvalidPlugin { id, resource, source: InstantiationError::Other( message )})] => {
			assert_eq!( id, "bad" );
			assert_eq!( *resource, bad );
			assert_eq!( message, "refusing to start" );
		}
		value => panic!( "Expected a single Plugin rejection, found: {:#?}", value ),
	}

}

#[test]
fn failed_load_leaves_the_container_empty() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::directory_bundle( &plugins, "mismatch", &[( fixtures::DESCRIPTOR, &fixtures::single_plugin( "declared", "1.0" ))]);

	let environment = fixtures::environment( &plugins );
	let mut discovery = environment.discover().expect( "Failed to discover plugins" );
	let candidate = discovery.take_candidates( fixtures::BACKEND ).pop().expect( "Expected one candidate" );

	let loader = PluginLoader::new(| _: &Environment, candidate: &PluginCandidate, _: &() | -> Result<(), InstantiationError> {
		Err( InstantiationError::IdMismatch { declared: candidate.metadata().id().to_string(), found: "actual".to_string() })
	});
	let mut container = loader.create_container::<()>( candidate );

	match loader.load_plugin( &environment, &mut container, &() ) {
		Err( InvalidPlugin { id, source: InstantiationError::IdMismatch { found, .. }, .. }) => {
			assert_eq!( id, "declared" );
			assert_eq!( found, "actual" );
		}
		value => panic!( "Expected IdMismatch error, found: {:#?}", value ),
	}
	assert!( !container.is_loaded() );

}
