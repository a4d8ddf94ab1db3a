//! Bundle manifest (`META-INF/MANIFEST.MF`).
//!
//! A manifest is an optional bag of `Key: Value` properties shipped next to the
//! descriptor, e.g. capability flags a locator may check before trusting a bundle.
//! Lines starting with a single space continue the previous value. Blank lines
//! separate sections; all sections are merged, the first occurrence of a key wins.

use std::collections::BTreeMap ;
use thiserror::Error ;



/// Relative path of the manifest inside a bundle.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF" ;

#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct Manifest {
	properties: BTreeMap<String, String>,
}

#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ManifestError {
	#[error( "Manifest is not valid UTF-8" )] NotUtf8,
	#[error( "Line {0} is missing a ': ' separator" )] MissingSeparator( usize ),
	#[error( "Line {0} has an empty key" )] EmptyKey( usize ),
	#[error( "Line {0} continues a value but no property precedes it" )] DanglingContinuation( usize ),
}

impl Manifest {

	/// Parses manifest bytes.
	///
	/// # Errors
	/// Returns a [`ManifestError`] naming the first offending line (1-based).
	pub fn parse( bytes: &[u8] ) -> Result<Self, ManifestError> {

		let text = std::str::from_utf8( bytes ).map_err(| _ | ManifestError::NotUtf8 )?;
		let text = text.strip_prefix( '\u{feff}' ).unwrap_or( text );

		let mut properties = BTreeMap::new();
		let mut current: Option<( String, String )> = None ;

		for ( index, line ) in text.lines().enumerate() {
			let line_number = index + 1 ;

			if let Some( continuation ) = line.strip_prefix( ' ' ) {
				match current.as_mut() {
					Some(( _, value )) => value.push_str( continuation ),
					None => return Err( ManifestError::DanglingContinuation( line_number )),
				}
				continue ;
			}

			if let Some(( key, value )) = current.take() {
				properties.entry( key ).or_insert( value );
			}

			if line.trim().is_empty() { continue }

			let ( key, value ) = line.split_once( ": " )
				.or_else(|| line.strip_suffix( ':' ).map(| key | ( key, "" )))
				.ok_or( ManifestError::MissingSeparator( line_number ))?;
			if key.trim().is_empty() { return Err( ManifestError::EmptyKey( line_number )) }

			current = Some(( key.to_string(), value.to_string() ));
		}

		if let Some(( key, value )) = current {
			properties.entry( key ).or_insert( value );
		}

		Ok( Self { properties })

	}

	#[inline] pub fn get( &self, key: &str ) -> Option<&str> { self.properties.get( key ).map( String::as_str )}

	#[inline] pub fn properties( &self ) -> impl Iterator<Item = ( &str, &str )> {
		self.properties.iter().map(|( key, value )| ( key.as_str(), value.as_str() ))
	}

	#[inline] pub fn len( &self ) -> usize { self.properties.len() }

	#[inline] pub fn is_empty( &self ) -> bool { self.properties.is_empty() }

}
