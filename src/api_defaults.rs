// Upper bound on a single generation request. Keeps the UI out of an
// indefinite loading state when the remote model hangs.
pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

// Generated content refresh cadence. Each remote call has a real latency and
// monetary cost, so content is reused for an hour before a refetch.
pub const DEFAULT_CONTENT_EXPIRATION: &str = "1h";

// Plantation guides, crop images and translation batches change rarely.
// They live for a whole day before a refresh is attempted.
pub const DEFAULT_SLOW_CONTENT_EXPIRATION: &str = "1d";

// Served when image generation fails and no cached image is available.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/64x64.png";
