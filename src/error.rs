//! Crate-wide error type and the `err!`/`Err!` construction helpers.
//!
//! Mirrors the error/result split used throughout the larger homeserver this
//! algorithm was lifted out of: a single `thiserror` enum, a `Result` alias
//! defaulting its error parameter to it, and a macro that builds a variant
//! from a format string so call sites don't repeat `format!(...)` everywhere.

use thiserror::Error;

/// Errors produced by state resolution.
#[derive(Error, Debug)]
pub enum StateResError {
	/// An event loaded during resolution does not belong to the room being
	/// resolved. Fatal; aborts the whole call.
	#[error("event {event_id} does not belong to room {room_id}")]
	WrongRoom { room_id: String, event_id: String },

	/// A required event could not be resolved and absence was not permitted.
	#[error("event not found: {0}")]
	NotFound(String),

	/// Propagated unchanged from the `Store` implementation.
	#[error("store error: {0}")]
	Store(String),

	/// The iterative authorizer rejected a candidate event. Not fatal to the
	/// overall resolution; the authorizer catches this variant and drops the
	/// event instead of propagating it.
	#[error("event rejected by authorization rules: {0}")]
	Authorization(String),
}

/// `Result` with [`StateResError`] as the default error type, matching the
/// `Result<T = (), E = crate::Error>` convention this crate was built from.
pub type Result<T = (), E = StateResError> = std::result::Result<T, E>;

/// Build a [`StateResError`] variant from a format string.
///
/// ```ignore
/// return Err(err!(NotFound("power levels event {event_id}")));
/// ```
macro_rules! err {
	(WrongRoom($room_id:expr, $event_id:expr)) => {
		$crate::error::StateResError::WrongRoom {
			room_id: $room_id.to_string(),
			event_id: $event_id.to_string(),
		}
	};
	(NotFound($($arg:tt)*)) => {
		$crate::error::StateResError::NotFound(format!($($arg)*))
	};
	(Store($($arg:tt)*)) => {
		$crate::error::StateResError::Store(format!($($arg)*))
	};
	(Authorization($($arg:tt)*)) => {
		$crate::error::StateResError::Authorization(format!($($arg)*))
	};
}

/// Build and immediately return an `Err(...)` of the given variant.
macro_rules! Err {
	($($variant:tt)*) => {
		return Err($crate::err!($($variant)*))
	};
}

pub(crate) use {Err, err};
