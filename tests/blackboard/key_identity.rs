use std::collections::HashSet ;
use plugin_discovery::{ Blackboard, Key };

const AS_NUMBER: Key<u64> = Key::of( "x" );
const AS_TEXT: Key<String> = Key::of( "x" );
const OTHER: Key<u64> = Key::of( "y" );

#[test]
fn keys_with_the_same_name_are_equal() {
	assert!( AS_NUMBER == AS_TEXT );
	assert!( AS_NUMBER != OTHER );
	assert_eq!( HashSet::from([ AS_NUMBER, Key::of( "x" ), OTHER ]).len(), 2 );
}

#[test]
fn keys_with_the_same_name_share_a_slot() {

	let mut blackboard = Blackboard::new();
	blackboard.get_or_create( &AS_NUMBER, || 1 );

	assert!( blackboard.contains( &AS_TEXT ));
	assert_eq!( blackboard.len(), 1 );

}

#[test]
#[should_panic( expected = "is not of type" )]
fn reading_a_slot_through_a_key_of_another_type_panics() {

	let mut blackboard = Blackboard::new();
	blackboard.get_or_create( &AS_NUMBER, || 1 );

	let _ = blackboard.find( &AS_TEXT );

}
