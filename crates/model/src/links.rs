//! Url builders for the actions offered on a row.

use crate::row::Row;

pub const CHECKLIST_BASE_URL: &str = "https://fmvending.web.app/refill-service/M";
const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Public path of a shared custom table.
pub fn share_path(share_id: &str, preview: bool) -> String {
    if preview {
        format!("/custom/{}?preview=true", share_id)
    } else {
        format!("/custom/{}", share_id)
    }
}

pub fn google_maps_directions(row: &Row) -> Option<String> {
    let (latitude, longitude) = row.coordinates()?;
    Some(format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        latitude, longitude
    ))
}

pub fn waze_navigation(row: &Row) -> Option<String> {
    let (latitude, longitude) = row.coordinates()?;
    Some(format!(
        "https://waze.com/ul?ll={},{}&navigate=yes",
        latitude, longitude
    ))
}

/// The machine number of a code: its digits, at least four wide.
/// `"A-12"` becomes `0012`, a code without digits `0000`.
pub fn machine_number(code: &str) -> String {
    let digits = code
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|c| *c == '0')
        .collect::<String>();
    let digits = if digits.is_empty() { "0".to_owned() } else { digits };
    format!("{:0>4}", digits)
}

/// Refill checklist of the machine at a row.
pub fn checklist_url(code: &str) -> String {
    format!("{}{}", CHECKLIST_BASE_URL, machine_number(code))
}

fn has_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Trims a user supplied url and adds `https://` if it has no scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if has_scheme(url) {
        url.to_owned()
    } else {
        format!("https://{}", url)
    }
}

/// Where to go for the text decoded from a QR code: urls as they are,
/// things that look like a domain over https, anything else as a search.
pub fn scan_target(text: &str) -> String {
    if has_scheme(text) {
        text.to_owned()
    } else if text.contains('.') && !text.contains(' ') {
        format!("https://{}", text)
    } else {
        format!("{}{}", GOOGLE_SEARCH_URL, urlencoding::encode(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::tests::located;

    #[test]
    fn share_paths() {
        assert_eq!(share_path("ko58de", false), "/custom/ko58de");
        assert_eq!(share_path("ko58de", true), "/custom/ko58de?preview=true");
    }

    #[test]
    fn navigation_needs_coordinates() {
        let row = located("a", 3.5, 101.25);
        assert_eq!(
            google_maps_directions(&row.content).unwrap(),
            "https://www.google.com/maps/dir/?api=1&destination=3.5,101.25"
        );
        assert_eq!(
            waze_navigation(&row.content).unwrap(),
            "https://waze.com/ul?ll=3.5,101.25&navigate=yes"
        );

        let mut row = row.content;
        row.latitude = None;
        assert_eq!(google_maps_directions(&row), None);
        assert_eq!(waze_navigation(&row), None);
    }

    #[test]
    fn checklist_urls() {
        assert_eq!(
            checklist_url("12"),
            "https://fmvending.web.app/refill-service/M0012"
        );
        assert_eq!(machine_number("A-7b"), "0007");
        assert_eq!(machine_number("00123"), "0123");
        assert_eq!(machine_number("123456"), "123456");
        assert_eq!(machine_number(""), "0000");
        assert_eq!(machine_number("HQ"), "0000");
    }

    #[test]
    fn normalizes_urls() {
        assert_eq!(normalize_url(" example.com/a "), "https://example.com/a");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
    }

    #[test]
    fn scan_targets() {
        assert_eq!(scan_target("https://a.b/c"), "https://a.b/c");
        assert_eq!(scan_target("shop.example.com"), "https://shop.example.com");
        assert_eq!(
            scan_target("machine 42"),
            "https://www.google.com/search?q=machine%2042"
        );
    }
}
