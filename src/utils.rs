/// Checks a string against the semantic-version grammar (`major.minor.patch`
/// with optional `-pre` and `+build` parts). Version-valued attributes are
/// validated with this at parse time so a bad version fails with the
/// attribute's own range instead of surfacing later in a renderer.
pub fn is_valid_semver(s: &str) -> bool {
    fn ident_ok(part: &str) -> bool {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    }

    let s = match s.split_once('+') {
        Some((head, build)) => {
            if !ident_ok(build) {
                return false;
            }
            head
        }
        None => s,
    };

    let (core, pre) = match s.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (s, None),
    };

    if let Some(pre) = pre {
        if !ident_ok(pre) {
            return false;
        }
    }

    let mut parts = core.split('.');
    let ok = (0..3).all(|_| {
        parts
            .next()
            .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    });
    ok && parts.next().is_none()
}
