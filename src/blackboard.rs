//! Typed heterogeneous context store.
//!
//! The [`Blackboard`] carries configuration through every phase of discovery
//! and loading. It is written while the owning [`Environment`]( crate::Environment )
//! is being set up and read through shared references afterwards.
//!
//! Values are addressed by [`Key`]s. A key's identity is its name alone: the
//! type parameter only drives the downcast on read. Two keys with the same name
//! but different value types therefore address the same slot, and reading a
//! slot through a key of the wrong type panics.

use std::any::Any ;
use std::collections::HashMap ;
use std::marker::PhantomData ;
use thiserror::Error ;



/// A named, typed handle into a [`Blackboard`].
///
/// ```
/// use plugin_discovery::{ Blackboard, Key };
///
/// const GREETING: Key<String> = Key::of( "greeting" );
///
/// let mut blackboard = Blackboard::new();
/// blackboard.get_or_create( &GREETING, || "hello".to_string() );
/// assert_eq!( blackboard.get( &GREETING ).unwrap(), "hello" );
/// ```
pub struct Key<V> {
	name: &'static str,
	_value: PhantomData<fn() -> V>,
}

impl<V> Key<V> {
	/// Creates a key. Keys are meant to be declared once as constants.
	pub const fn of( name: &'static str ) -> Self {
		Self { name, _value: PhantomData }
	}

	#[inline] pub const fn name( &self ) -> &'static str { self.name }
}

impl<V> Clone for Key<V> {
	fn clone( &self ) -> Self { *self }
}
impl<V> Copy for Key<V> {}

impl<A, B> PartialEq<Key<B>> for Key<A> {
	fn eq( &self, other: &Key<B> ) -> bool { self.name == other.name }
}
impl<V> Eq for Key<V> {}

impl<V> std::hash::Hash for Key<V> {
	fn hash<H: std::hash::Hasher>( &self, state: &mut H ) { self.name.hash( state ) }
}

impl<V> PartialOrd for Key<V> {
	fn partial_cmp( &self, other: &Self ) -> Option<std::cmp::Ordering> { Some( self.cmp( other )) }
}
impl<V> Ord for Key<V> {
	fn cmp( &self, other: &Self ) -> std::cmp::Ordering { self.name.cmp( other.name ) }
}

impl<V> std::fmt::Debug for Key<V> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Key" )
			.field( "name", &self.name )
			.field( "type", &std::any::type_name::<V>() )
			.finish()
	}
}

impl<V> std::fmt::Display for Key<V> {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { f.write_str( self.name )}
}

/// Errors returned when reading from a [`Blackboard`].
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum BlackboardError {
	/// Nothing has been stored under the key.
	#[error( "Key '{0}' has no value" )] NoValue( &'static str ),
}

/// Mapping from [`Key`] to value. Values are never replaced or removed.
#[derive( Default )]
pub struct Blackboard {
	values: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl Blackboard {

	pub fn new() -> Self { Self::default() }

	/// Returns the value stored under `key`, computing and storing it through
	/// `factory` first if the slot is empty. The factory runs at most once per
	/// key: later calls return the first value and never invoke their factory.
	///
	/// # Panics
	/// If the slot already holds a value of a type other than `V`.
	pub fn get_or_create<V>( &mut self, key: &Key<V>, factory: impl FnOnce() -> V ) -> &V
	where
		V: Any + Send + Sync,
	{
		let value = self.values.entry( key.name ).or_insert_with(|| Box::new( factory() ));
		downcast( key, &**value )
	}

	/// Returns the value stored under `key`.
	///
	/// # Errors
	/// [`BlackboardError::NoValue`] if the slot is empty.
	///
	/// # Panics
	/// If the slot holds a value of a type other than `V`.
	pub fn get<V: Any>( &self, key: &Key<V> ) -> Result<&V, BlackboardError> {
		self.find( key ).ok_or( BlackboardError::NoValue( key.name ))
	}

	/// Returns the value stored under `key`, if any.
	///
	/// # Panics
	/// If the slot holds a value of a type other than `V`.
	pub fn find<V: Any>( &self, key: &Key<V> ) -> Option<&V> {
		self.values.get( key.name ).map(| value | downcast( key, &**value ))
	}

	#[inline] pub fn contains<V>( &self, key: &Key<V> ) -> bool { self.values.contains_key( key.name ) }

	#[inline] pub fn len( &self ) -> usize { self.values.len() }

	#[inline] pub fn is_empty( &self ) -> bool { self.values.is_empty() }

}

fn downcast<'a, V: Any>( key: &Key<V>, value: &'a ( dyn Any + Send + Sync )) -> &'a V {
	match value.downcast_ref::<V>() {
		Some( value ) => value,
		None => panic!(
			"Key '{}' holds a value that is not of type {}",
			key.name,
			std::any::type_name::<V>(),
		),
	}
}

impl std::fmt::Debug for Blackboard {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let mut keys = self.values.keys().collect::<Vec<_>>();
		keys.sort_unstable();
		f.debug_struct( "Blackboard" )
			.field( "keys", &keys )
			.finish_non_exhaustive()
	}
}
