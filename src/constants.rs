//! Global constants used throughout the condep codebase.
//!
//! Protocol tags, the cache version that feeds every digest, and the
//! manifest field names the materializer walks. Defining them centrally
//! keeps the wire format in one place.

/// Range prefix routed to the condition resolver and fetcher.
pub const CONDITION_PROTOCOL: &str = "condition:";

/// Internal-only range prefix used for deferred branch ranges.
///
/// Never written to a user manifest; it only appears in descriptors the
/// condition resolver hands back to the host.
pub const CONDITION_PROXY_PROTOCOL: &str = "condition_proxy_internal:";

/// Version of the generated package layout.
///
/// Bump this every time the generated manifest or selector modules change
/// byte-for-byte for a reason the other digest inputs do not capture.
pub const CACHE_VERSION: &str = "4";

/// Number of hex characters kept from the SHA-512 of the digest inputs.
pub const DIGEST_LENGTH: usize = 6;

/// Sentinel hashed in place of an absent branch or list.
pub const ABSENT_SENTINEL: &str = "-";

/// Version prefix of synthetic condition packages.
pub const CONDITION_VERSION_PREFIX: &str = "0.0.0-condition-";

/// Version prefix of synthetic proxy packages.
pub const CONDITION_PROXY_VERSION_PREFIX: &str = "0.0.0-condition-proxy-";

/// Manifest fields that carry dependency ranges.
pub const DEPENDENCY_TYPES: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// Manifest field holding optional dependencies (folded into `dependencies` by the host).
pub const OPTIONAL_DEPENDENCIES: &str = "optionalDependencies";

/// Manifest field holding condition-keyed property overrides.
pub const CONDITIONS_FIELD: &str = "conditions";

/// Default protocol prepended to qualified branch ranges.
pub const DEFAULT_PROTOCOL: &str = "npm:";

/// The only supported condition evaluation source.
pub const ENV_SOURCE: &str = "env";

/// Project configuration file name searched for from the working directory upwards.
pub const RC_FILENAME: &str = ".yarnrc.yml";

/// Workspace manifest file name.
pub const MANIFEST_FILENAME: &str = "package.json";

/// Environment variable overriding the package cache directory.
pub const CACHE_DIR_ENV: &str = "CONDEP_CACHE_DIR";

/// Fixed modification time of generated archive entries (2020-02-01T00:00:00).
///
/// Stored as `(year, month, day, hour, minute, second)`.
pub const ARCHIVE_MTIME: (u16, u8, u8, u8, u8, u8) = (2020, 2, 1, 0, 0, 0);
