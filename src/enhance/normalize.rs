const MOJIBAKE: &[(&str, &str)] = &[
    ("â€¢", "•"),
    ("â\u{80}¢", "•"),
    ("â€™", "’"),
    ("â€˜", "‘"),
    ("â€œ", "“"),
    ("â€\u{9d}", "”"),
    ("â€”", "—"),
    ("â€“", "–"),
    ("â€¦", "…"),
    ("Â\u{a0}", " "),
];

pub fn normalize_text(raw: &str) -> String {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    MOJIBAKE
        .iter()
        .fold(text, |text, (broken, fixed)| text.replace(broken, fixed))
}
