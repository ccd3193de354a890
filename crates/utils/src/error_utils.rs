// Copyright 2024-2025 Irreducible Inc.

#[doc(hidden)]
pub mod __private {
	pub use tracing;
}

/// Returns early with `$err` converted into the function's error type, logging it at
/// debug level. With the `bail_panic` feature the error panics instead, which gives a
/// backtrace at the point of failure.
#[cfg(feature = "bail_panic")]
#[macro_export]
macro_rules! bail {
	($err:expr) => {
		panic!("{}", $err);
	};
}

#[cfg(not(feature = "bail_panic"))]
#[macro_export]
macro_rules! bail {
	($err:expr) => {{
		let err = $err;
		$crate::error_utils::__private::tracing::debug!(error = %err, "rejecting input");
		return Err(err.into());
	}};
}

#[macro_export]
macro_rules! ensure {
	($cond:expr, $err:expr) => {
		if !$cond {
			$crate::bail!($err);
		}
	};
}
