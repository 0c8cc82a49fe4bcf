//! The object-scanning seam.
//!
//! Once the user has sized a box around an object, its region is handed to
//! an [`ObjectScanner`] that builds the platform's reference object. What
//! comes back is opaque to the app.

use reminisc_spatial::ScanRegion;
use reminisc_types::ReminiscError;

/// Turns a finished scan region into a reference object.
pub trait ObjectScanner: Send {
    /// The scanner's reference-object type.
    type Object;

    fn scan(&mut self, region: &ScanRegion) -> Result<Self::Object, ReminiscError>;
}
