//! Line patterns for the dispensing order layout.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Header signature: order number ... DD/MM/YYYY HH:MM:SS word
    pub static ref HEADER_SIGNATURE: Regex = Regex::new(
        r"^(\d{7,})\s+.+\s+\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}:\d{2}\s+\w+$"
    ).unwrap();

    // Attended item: seq, active ingredient code, name, batch/lot, unit, quantity
    pub static ref ITEM_LINE: Regex = Regex::new(
        r"^(\d+)\s+(\d+)\s+(.+?)\s+([A-Z0-9\-/\.]+)\s+([A-ZÇÀ-Úa-zçà-ú0-9º\.\-/]+)\s+(\d+)$"
    ).unwrap();
}
