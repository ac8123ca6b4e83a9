//! Native tdjson library resolution.
//!
//! The library is located in the following order:
//! 1. `TDMUX_TDJSON` environment variable (explicit library path)
//! 2. `TDMUX_LIBDIR` environment variable (directory holding the library)
//! 3. Bare platform file name, left to the system loader's search path
//!
//! Only paths are produced here; loading the library is the engine
//! implementation's job. Hosts without a prebuilt tdjson (Windows, Intel
//! macOS) fail resolution with a pointer at building TDLib from source.

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable overriding the full library path.
pub const TDJSON_ENV: &str = "TDMUX_TDJSON";
/// Environment variable overriding the library directory.
pub const LIBDIR_ENV: &str = "TDMUX_LIBDIR";

/// Resolves the tdjson shared library for the host platform.
pub fn resolve_library() -> Result<PathBuf> {
	// 1. Explicit library path override.
	if let Some(path) = env::var_os(TDJSON_ENV) {
		let path = PathBuf::from(path);
		debug!(target = "tdmux.engine", source = TDJSON_ENV, path = %path.display(), "using tdjson override");
		return Ok(path);
	}

	let file = library_file_name(env::consts::OS, env::consts::ARCH)?;

	// 2. Directory override joined with the platform file name.
	if let Some(dir) = env::var_os(LIBDIR_ENV) {
		let path = PathBuf::from(dir).join(file);
		debug!(target = "tdmux.engine", source = LIBDIR_ENV, path = %path.display(), "using tdjson from library dir");
		return Ok(path);
	}

	// 3. Bare name for the system loader.
	debug!(target = "tdmux.engine", path = file, "using tdjson from loader search path");
	Ok(PathBuf::from(file))
}

/// tdjson file name for a platform, or `UnsupportedPlatform` when no
/// prebuilt library exists for it.
fn library_file_name(os: &'static str, arch: &'static str) -> Result<&'static str> {
	match (os, arch) {
		("linux", "x86_64") | ("linux", "aarch64") => Ok("libtdjson.so"),
		("macos", "aarch64") => Ok("libtdjson.dylib"),
		_ => Err(Error::UnsupportedPlatform { os, arch }),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn linux_and_apple_silicon_resolve() {
		assert_eq!(library_file_name("linux", "x86_64").unwrap(), "libtdjson.so");
		assert_eq!(library_file_name("linux", "aarch64").unwrap(), "libtdjson.so");
		assert_eq!(library_file_name("macos", "aarch64").unwrap(), "libtdjson.dylib");
	}

	#[test]
	fn hosts_without_prebuilts_are_rejected() {
		for (os, arch) in [("windows", "x86_64"), ("macos", "x86_64"), ("freebsd", "x86_64")] {
			let err = library_file_name(os, arch).unwrap_err();
			assert!(matches!(err, Error::UnsupportedPlatform { .. }), "{os}/{arch}: {err}");
			assert!(err.to_string().contains("Build TDLib from source"), "missing remediation: {err}");
		}
	}
}
