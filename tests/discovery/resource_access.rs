use std::io::Read ;
use plugin_discovery::{ PluginResource, ResourceKind, ResourceLocation };
use crate::fixtures ;

#[test]
fn archives_are_mounted_lazily_and_released_on_unmount() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	let archive = fixtures::archive_bundle( &plugins, "lazy.zip", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "lazy", "1.0" )),
		( "assets/greeting.txt", b"hello" ),
	]);

	let environment = fixtures::environment( &plugins );
	let ( resources, _ ) = environment.locate_resources().expect( "Failed to locate resources" );
	let resource = resources.first().expect( "Expected one resource" );

	assert_eq!( resource.kind(), ResourceKind::Archive );
	assert!( !resource.is_mounted() );

	let location = resource.locate_resource( "/assets/greeting.txt" ).expect( "Failed to locate entry" );
	assert_eq!( location, ResourceLocation::ArchiveEntry { archive: archive.clone(), entry: "assets/greeting.txt".to_string() });
	assert!( resource.is_mounted() );

	let mut contents = String::new();
	resource.open_location( &location ).expect( "Failed to open entry" )
		.read_to_string( &mut contents ).expect( "Failed to read entry" );
	assert_eq!( contents, "hello" );
	assert!( resource.is_mounted() );

	resource.unmount();
	assert!( !resource.is_mounted() );

	assert_eq!( resource.read_resource( "assets\\greeting.txt" ).expect( "Failed to read entry" ).as_deref(), Some( &b"hello"[..] ));
	assert!( resource.is_mounted() );

}

#[test]
fn missing_and_escaping_paths_do_not_resolve() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	fixtures::directory_bundle( root.path(), "secret", &[( "key.txt", b"private" )]);
	let bundle = fixtures::directory_bundle( &plugins, "bundle", &[( fixtures::DESCRIPTOR, &fixtures::single_plugin( "bundle", "1.0" ))]);

	let resource = PluginResource::new( "directory", ResourceKind::Directory, &bundle, None );

	assert!( resource.locate_resource( "missing.txt" ).is_none() );
	assert!( resource.open_resource( "missing.txt" ).is_none() );
	assert!( resource.read_resource( "missing.txt" ).expect( "Reading an absent path must not fail" ).is_none() );
	assert!( resource.locate_resource( "../../secret/key.txt" ).is_none() );
	assert!( resource.locate_resource( "" ).is_none() );
	assert!( !resource.is_mounted() );

}

#[test]
fn directory_resources_fall_back_to_the_search_path() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let shared = fixtures::directory_bundle( root.path(), "shared", &[( "lib/common.txt", b"shared" )]);
	let bundle = fixtures::directory_bundle( root.path(), "bundle", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "bundle", "1.0" )),
		( "lib/own.txt", b"own" ),
	]);

	let resource = PluginResource::new( "directory", ResourceKind::Directory, &bundle, None )
		.with_search_path([ shared.clone() ]);

	assert_eq!( resource.locate_resource( "lib/own.txt" ), Some( ResourceLocation::File( bundle.join( "lib/own.txt" ))));
	assert_eq!( resource.locate_resource( "lib/common.txt" ), Some( ResourceLocation::File( shared.join( "lib/common.txt" ))));

	let mut contents = String::new();
	resource.open_resource( "lib/common.txt" ).expect( "Failed to open shared file" )
		.read_to_string( &mut contents ).expect( "Failed to read shared file" );
	assert_eq!( contents, "shared" );

}

#[test]
fn resources_compare_by_locator_and_path() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let path = root.path().join( "bundle" );

	let directory = PluginResource::new( "directory", ResourceKind::Directory, &path, None );
	let same = PluginResource::new( "directory", ResourceKind::Archive, &path, None );
	let other_locator = PluginResource::new( "search_path", ResourceKind::Directory, &path, None );

	assert_eq!( directory, same );
	assert_ne!( directory, other_locator );

}

#[test]
fn inflated_entry_size_does_not_change_what_is_read() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let plugins = root.path().join( "plugins" );
	let archive = fixtures::archive_bundle( &plugins, "inflated.zip", &[
		( fixtures::DESCRIPTOR, &fixtures::single_plugin( "inflated", "1.0" )),
		( "payload.bin", b"tiny" ),
	]);

	// Claim close to 2 GiB in the central directory record of `payload.bin`.
	let mut bytes = std::fs::read( &archive ).expect( "Failed to read archive" );
	let records = bytes.windows( 4 )
		.enumerate()
		.filter(|( _, window )| *window == [ 0x50, 0x4b, 0x01, 0x02 ])
		.map(|( offset, _ )| offset )
		.collect::<Vec<_>>();
	let record = records.into_iter()
		.find(| offset | {
			let name_length = usize::from( u16::from_le_bytes([ bytes[ offset + 28 ], bytes[ offset + 29 ]]));
			&bytes[ offset + 46 .. offset + 46 + name_length ] == b"payload.bin"
		})
		.expect( "Missing central directory record" );
	bytes[ record + 24 .. record + 28 ].copy_from_slice( &0x7FFF_FFFF_u32.to_le_bytes() );
	std::fs::write( &archive, &bytes ).expect( "Failed to rewrite archive" );

	let resource = PluginResource::new( "directory", ResourceKind::Archive, &archive, None );
	assert_eq!( resource.read_resource( "payload.bin" ).expect( "Failed to read entry" ).as_deref(), Some( &b"tiny"[..] ));

}
