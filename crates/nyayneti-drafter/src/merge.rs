//! Merging extracted context fields into form data.

use nyayneti_core::{ExtractedFields, ExtractedValue, FormData, Template};
use tracing::trace;

/// Merge positively extracted values into `form`.
///
/// Sentinel (`NotFound`) and empty (`Unset`) values are discarded, as are
/// fields outside the template schema. Found values overwrite existing
/// entries; other entries are left alone. Returns the number of fields merged.
pub fn merge_extracted(form: &mut FormData, template: &Template, extracted: ExtractedFields) -> usize {
    let mut merged = 0;
    for (name, value) in extracted {
        if !template.has_field(&name) {
            trace!(field = %name, "Dropping extracted field outside template schema");
            continue;
        }
        match value {
            ExtractedValue::Found(v) => {
                trace!(field = %name, "Merging extracted field");
                form.set(name, v);
                merged += 1;
            }
            ExtractedValue::NotFound | ExtractedValue::Unset => {
                trace!(field = %name, "Skipping undetermined field");
            }
        }
    }
    merged
}
