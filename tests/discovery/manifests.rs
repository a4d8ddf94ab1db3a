use plugin_discovery::{ Environment, Manifest, PluginResource, PluginResourceLocator, PartialSuccess, Rejection, ResourceError, ResourceProbe, StandardLanguageService, DiscoveryFailure };
use std::collections::BTreeSet ;
use crate::fixtures ;

const MALFORMED: &[u8] = b" continuation without a property\n" ;

#[test]
fn malformed_archive_manifest_excludes_the_resource() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::archive_bundle( &plugins, "bad.zip", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "bad", "1.0" )),
		( fixtures::MANIFEST, MALFORMED ),
	]);

	let environment = fixtures::environment( &plugins );
	let ( resources, rejections ) = environment.locate_resources().expect( "Failed to locate resources" );

	assert!( resources.is_empty() );
	match rejections.as_slice() {
		[ Rejection::Resource( ResourceError::MalformedManifest { .. })] => {}
		value => panic!( "Expected a single MalformedManifest rejection, found: {:#?}", value ),
	}

}

#[test]
fn malformed_directory_manifest_is_treated_as_absent() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::directory_bundle( &plugins, "lenient", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "lenient", "1.0" )),
		( fixtures::MANIFEST, MALFORMED ),
	]);

	let environment = fixtures::environment( &plugins );
	let ( resources, rejections ) = environment.locate_resources().expect( "Failed to locate resources" );
	assert_no_rejections!( rejections );

	let resource = resources.first().expect( "Expected one resource" );
	assert!( resource.manifest().is_none() );

}

#[test]
fn manifest_properties_are_exposed() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::archive_bundle( &plugins, "props.zip", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "props", "1.0" )),
		( fixtures::MANIFEST, b"Manifest-Version: 1.0\r\nPlugin-Kind: sample\r\n  plugin\r\n\r\n" ),
	]);

	let environment = fixtures::environment( &plugins );
	let ( resources, rejections ) = environment.locate_resources().expect( "Failed to locate resources" );
	assert_no_rejections!( rejections );

	let resource = resources.first().expect( "Expected one resource" );
	assert_eq!( resource.property( "Manifest-Version" ), Some( "1.0" ));
	assert_eq!( resource.property( "Plugin-Kind" ), Some( "sample plugin" ));
	assert_eq!( resource.property( "Missing" ), None );

}

struct SignedOnly ;

impl PluginResourceLocator for SignedOnly {

	fn name( &self ) -> &str { "signed" }

	fn locate_plugin_resources( &self, environment: &Environment )
		-> Result<PartialSuccess<BTreeSet<PluginResource>, ResourceError>, DiscoveryFailure>
	{
		let probe = ResourceProbe::new( environment, self )?;
		let root = environment.blackboard().get( &plugin_discovery::keys::PLUGIN_DIRECTORIES )?[ 0 ].clone();
		let mut resources = BTreeSet::new();
		let mut errors = Vec::new();
		for entry in std::fs::read_dir( &root ).map_err(| source | DiscoveryFailure::SearchRootUnreadable { path: root.clone(), source })? {
			let path = entry.map_err(| source | DiscoveryFailure::SearchRootUnreadable { path: root.clone(), source })?.path();
			match probe.probe( &path ) {
				Ok( Some( resource )) => { resources.insert( resource ); }
				Ok( None ) => {}
				Err( err ) => errors.push( err ),
			}
		}
		Ok(( resources, errors ))
	}

	fn is_valid_manifest( &self, _environment: &Environment, manifest: &Manifest ) -> bool {
		manifest.get( "Signed" ) == Some( "yes" )
	}

}

#[test]
fn locators_can_veto_manifests() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::archive_bundle( &plugins, "signed.zip", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "signed", "1.0" )),
		( fixtures::MANIFEST, b"Signed: yes\n" ),
	]);
	fixtures::archive_bundle( &plugins, "unsigned.zip", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "unsigned", "1.0" )),
		( fixtures::MANIFEST, b"Signed: no\n" ),
	]);

	fixtures::init_logging();
	let mut environment = Environment::new().with_plugin_directories([ &plugins ]);
	environment.register_locator( SignedOnly ).expect( "Failed to register locator" );
	environment.register_language_service( StandardLanguageService::new( fixtures::BACKEND )).expect( "Failed to register service" );
	environment.initialize();

	let ( resources, rejections ) = environment.locate_resources().expect( "Failed to locate resources" );

	assert_eq!( resources.len(), 1 );
	assert!( resources.iter().all(| resource | resource.locator() == "signed" ));
	match rejections.as_slice() {
		[ Rejection::Resource( ResourceError::InvalidManifest { locator, .. })] => assert_eq!( locator, "signed" ),
		value => panic!( "Expected a single InvalidManifest rejection, found: {:#?}", value ),
	}

}
