//! Manual "postal-code,house-number" input
//!
//! Cheap client-side guard: anything that doesn't look like a Dutch postcode
//! (4 digits + 2 letters) followed by a house number never reaches the
//! geocoder.

use crate::clients::PostcodeQuery;
use once_cell::sync::Lazy;
use regex::Regex;

static MANUAL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\s*([0-9]{4})\s?([A-Za-z]{2})\s*,\s*([0-9]{1,5})",
        // Digit additions need a hyphen so "123456" isn't split into 12345-6
        r"(?:\s*-\s*([0-9]{1,4})|\s?-?\s?([A-Za-z][A-Za-z0-9]{0,3}))?\s*$",
    ))
    .expect("manual address pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAddress {
    /// Normalized as `1012AB`
    pub postcode: String,
    /// Normalized as `5`, `12a` or `7-2`
    pub house_number: String,
}

impl ManualAddress {
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = MANUAL_ADDRESS.captures(raw)?;

        let postcode = format!("{}{}", &caps[1], caps[2].to_ascii_uppercase());
        let house_number = match (caps.get(4), caps.get(5)) {
            (Some(number), _) => format!("{}-{}", &caps[3], number.as_str()),
            (None, Some(letters)) => {
                format!("{}{}", &caps[3], letters.as_str().to_ascii_lowercase())
            }
            (None, None) => caps[3].to_string(),
        };

        Some(Self {
            postcode,
            house_number,
        })
    }

    pub fn to_query(&self) -> PostcodeQuery {
        PostcodeQuery {
            postcode: self.postcode.clone(),
            house_number: self.house_number.clone(),
        }
    }
}
