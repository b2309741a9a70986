//! GSTIN detection and offline validation.
//!
//! A GSTIN is 15 characters: 2-digit state code, 10-character PAN
//! (5 letters, 4 digits, 1 letter), 1 entity code, a literal `Z`, and a
//! check character. Matching is done on text that has been upper-cased and
//! stripped of whitespace, so OCR spacing inside the number does not matter.

use std::sync::LazyLock;

use regex::Regex;

/// Anchored format check for a single, already cleaned GSTIN.
static GSTIN_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}$")
        .expect("Invalid GSTIN format pattern")
});

/// Unanchored variant used to find a GSTIN inside a cleaned line.
static GSTIN_SEARCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}")
        .expect("Invalid GSTIN search pattern")
});

/// Labels printed next to a GSTIN on Indian bills (matched lowercase).
const GST_KEYWORDS: &[&str] = &[
    "gstin",
    "gst no",
    "gst number",
    "gst reg",
    "gst in",
    "gst#",
    "tax id",
];

const KEYWORD_LOOKAHEAD: usize = 2;

const CHECKSUM_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Upper-case and remove all whitespace.
pub fn clean_gst_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Format-only GSTIN check.
pub fn validate_gst_format(gst_number: &str) -> bool {
    GSTIN_FORMAT.is_match(&clean_gst_number(gst_number))
}

/// Find the GSTIN printed on a bill.
///
/// Lines carrying a GST label (and the two lines after each) are searched
/// first; otherwise the first GSTIN-shaped run anywhere in the text wins.
pub fn extract_gst_from_bill(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !GST_KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }
        let end = (idx + KEYWORD_LOOKAHEAD + 1).min(lines.len());
        for candidate in &lines[idx..end] {
            if let Some(m) = GSTIN_SEARCH.find(&clean_gst_number(candidate)) {
                tracing::debug!(source = "keyword", "GSTIN found on bill");
                return Some(m.as_str().to_string());
            }
        }
    }

    let found = GSTIN_SEARCH
        .find(&clean_gst_number(text))
        .map(|m| m.as_str().to_string());
    if found.is_some() {
        tracing::debug!(source = "full_text", "GSTIN found on bill");
    }
    found
}

/// Verify the mod-36 check character (15th) of a GSTIN.
///
/// Informational only: registry verification, not this, decides validity.
pub fn gst_checksum_valid(gst_number: &str) -> bool {
    let cleaned = clean_gst_number(gst_number);
    if !GSTIN_FORMAT.is_match(&cleaned) {
        return false;
    }
    let bytes = cleaned.as_bytes();

    let mut sum: u32 = 0;
    for (i, b) in bytes[..14].iter().enumerate() {
        let Some(value) = CHECKSUM_ALPHABET.iter().position(|c| c == b) else {
            return false;
        };
        let factor = if i % 2 == 0 { 1 } else { 2 };
        let product = value as u32 * factor;
        sum += product / 36 + product % 36;
    }
    let check = ((36 - sum % 36) % 36) as usize;
    CHECKSUM_ALPHABET[check] == bytes[14]
}

/// State or union territory registered in the GSTIN's first two digits.
pub fn gst_state_name(gst_number: &str) -> Option<&'static str> {
    let cleaned = clean_gst_number(gst_number);
    let code = cleaned.get(..2)?;
    let name = match code {
        "01" => "Jammu and Kashmir",
        "02" => "Himachal Pradesh",
        "03" => "Punjab",
        "04" => "Chandigarh",
        "05" => "Uttarakhand",
        "06" => "Haryana",
        "07" => "Delhi",
        "08" => "Rajasthan",
        "09" => "Uttar Pradesh",
        "10" => "Bihar",
        "11" => "Sikkim",
        "12" => "Arunachal Pradesh",
        "13" => "Nagaland",
        "14" => "Manipur",
        "15" => "Mizoram",
        "16" => "Tripura",
        "17" => "Meghalaya",
        "18" => "Assam",
        "19" => "West Bengal",
        "20" => "Jharkhand",
        "21" => "Odisha",
        "22" => "Chhattisgarh",
        "23" => "Madhya Pradesh",
        "24" => "Gujarat",
        "26" => "Dadra and Nagar Haveli and Daman and Diu",
        "27" => "Maharashtra",
        "29" => "Karnataka",
        "30" => "Goa",
        "31" => "Lakshadweep",
        "32" => "Kerala",
        "33" => "Tamil Nadu",
        "34" => "Puducherry",
        "35" => "Andaman and Nicobar Islands",
        "36" => "Telangana",
        "37" => "Andhra Pradesh",
        "38" => "Ladakh",
        "97" => "Other Territory",
        "99" => "Centre Jurisdiction",
        _ => return None,
    };
    Some(name)
}
