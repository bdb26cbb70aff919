//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an entity switch.
#[derive(Clone, Copy, Debug)]
pub struct Switch;

/// Marker type describing an entity update.
#[derive(Clone, Copy, Debug)]
pub struct Update;
