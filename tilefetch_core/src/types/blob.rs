//! [`Blob`]: an owned, opaque byte payload.
//!
//! Tile payloads travel through the fetch pipeline as `Blob`s. They are never decoded
//! here: a vector tile stays exactly as the backend delivered it (often gzip-compressed
//! protobuf).
//!
//! ```rust
//! use tilefetch_core::Blob;
//!
//! let blob = Blob::from(&[0x1f, 0x8b, 0x08]);
//! assert_eq!(blob.len(), 3);
//! assert!(blob.is_gzip());
//! assert_eq!(blob.into_vec(), vec![0x1f, 0x8b, 0x08]);
//! ```

use std::fmt::Debug;

/// A thin wrapper around [`Vec<u8>`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(Vec<u8>);

impl Blob {
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_slice()
	}

	/// Interprets the payload as UTF-8, replacing invalid sequences.
	#[must_use]
	pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
		String::from_utf8_lossy(&self.0)
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// `true` if the payload starts with the gzip magic bytes, as most MVT archives store them.
	#[must_use]
	pub fn is_gzip(&self) -> bool {
		self.0.starts_with(&[0x1f, 0x8b])
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(item: &[u8; N]) -> Self {
		Blob(item.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(item: &str) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl From<String> for Blob {
	fn from(item: String) -> Self {
		Blob(item.into_bytes())
	}
}

impl AsRef<[u8]> for Blob {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

/// Payloads can be large; only the length and the first bytes are printed.
impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let head: Vec<String> = self.0.iter().take(8).map(|b| format!("{b:02x}")).collect();
		let ellipsis = if self.0.len() > 8 { " .." } else { "" };
		write!(f, "Blob({} bytes: {}{ellipsis})", self.0.len(), head.join(" "))
	}
}
