use scraper::{Html, Selector};

/// Embedded challenge widgets load through iframes with these sources.
const CHALLENGE_FRAME_SELECTOR: &str = "iframe[src*='recaptcha'], iframe[src*='hcaptcha']";

/// Elements the site names after the challenge itself.
const CHALLENGE_WIDGET_SELECTOR: &str =
    "[id*='captcha'], [class*='captcha'], [id*='recaptcha'], [class*='recaptcha'], input[name='captcha']";

/// Verification phrases shown to the visitor, Vietnamese and English.
const CHALLENGE_PHRASES: [&str; 4] = ["vui lòng xác minh", "xác minh", "please verify", "verify"];

/// Heuristic check for an anti-bot challenge in the current page markup.
///
/// Reads the page state only; no waiting, no mutation, no retry. False
/// negatives fail open to a skipped page, false positives only cost an
/// unnecessary long wait.
pub fn looks_challenged(html: &str) -> bool {
    let doc = Html::parse_document(html);

    let frames = Selector::parse(CHALLENGE_FRAME_SELECTOR).unwrap();
    if doc.select(&frames).next().is_some() {
        ::log::debug!("challenge frame present");
        return true;
    }

    let widgets = Selector::parse(CHALLENGE_WIDGET_SELECTOR).unwrap();
    if doc.select(&widgets).next().is_some() {
        ::log::debug!("challenge-named element present");
        return true;
    }

    let body = Selector::parse("body").unwrap();
    let text = doc
        .select(&body)
        .flat_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if CHALLENGE_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        ::log::debug!("verification phrase present in body text");
        return true;
    }

    false
}
