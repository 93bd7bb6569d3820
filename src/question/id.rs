//! Canonical question identifier.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("Question identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Question identifier cannot contain whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed length.
	#[error("Question identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
	/// The raw record carried neither `_id` nor `id`.
	#[error("Question record carries neither `_id` nor `id`.")]
	Missing,
}

/// Validated, non-empty question identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuestionId(String);
impl QuestionId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Deref for QuestionId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for QuestionId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for QuestionId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<QuestionId> for String {
	fn from(value: QuestionId) -> Self {
		value.0
	}
}
impl TryFrom<String> for QuestionId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for QuestionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "QuestionId({})", self.0)
	}
}
impl Display for QuestionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for QuestionId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.trim().is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
