//! Web address heuristic.
//!
//! Browsers and users type addresses without a scheme, with raw IPv6 hosts,
//! with credentials. The check therefore does not follow the WHATWG URL
//! standard: it extracts the authority the way an HTTP request target is
//! parsed, then applies shape checks to the host.

/// Whether `value` looks like a web address.
///
/// ```
/// use formcheck_validation::is_url;
///
/// assert!(is_url("example.com"));
/// assert!(is_url("http://user:pass@[::1]:9093/a?b=c"));
/// assert!(!is_url("ex ample.com"));
/// ```
pub fn is_url(value: &str) -> bool {
    if value.len() < 4 {
        return false;
    }

    let mut url = value.replacen("127.0.0.1", "localhost", 1);
    if let Some(i) = url.find('#') {
        url.truncate(i);
    }
    if !url.contains("://") {
        url.insert_str(0, "http://");
    }

    let Some(host) = request_host(&url) else {
        return false;
    };

    if host.is_empty() || host.starts_with('-') || host.contains(".-") || host.contains("-.") {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let last = labels[labels.len() - 1];
    if labels[0].is_empty() || !(2..=63).contains(&last.len()) {
        return false;
    }

    let domain = if labels.len() > 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.clone()
    };

    if domain.contains(['_', ',', '!', '&']) {
        return false;
    }
    // one `::` elision at most
    if domain.matches("::").count() > 1 {
        return false;
    }

    match domain.rsplit(':').next().map(str::parse::<i64>) {
        Some(Ok(port)) => (1..=65535).contains(&port),
        _ => true,
    }
}

/// Host (with port) of an absolute request target, `None` when the target
/// is malformed. Opaque and path-only targets yield an empty host.
fn request_host(raw: &str) -> Option<String> {
    if raw.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return None;
    }

    let (scheme, rest) = split_scheme(raw)?;
    let rest = rest.split_once('?').map_or(rest, |(before, _)| before);

    if !rest.starts_with('/') {
        // `mailto:x` style targets have no host
        return scheme.map(|_| String::new());
    }

    let (host, path) = match (scheme, rest.strip_prefix("//")) {
        (Some(_), Some(after)) => {
            let end = after.find('/').unwrap_or(after.len());
            (parse_authority(&after[..end])?, &after[end..])
        }
        _ => (String::new(), rest),
    };

    unescape(path)?;
    Some(host)
}

/// Split `scheme:rest`. `None` only when the target starts with `:`.
fn split_scheme(raw: &str) -> Option<(Option<&str>, &str)> {
    for (i, b) in raw.bytes().enumerate() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' => {}
            b'0'..=b'9' | b'+' | b'-' | b'.' if i > 0 => {}
            b':' if i == 0 => return None,
            b':' => return Some((Some(&raw[..i]), &raw[i + 1..])),
            _ => return Some((None, raw)),
        }
    }
    Some((None, raw))
}

fn parse_authority(authority: &str) -> Option<String> {
    let host = match authority.rfind('@') {
        Some(i) => {
            if !authority[..i].bytes().all(is_userinfo_byte) {
                return None;
            }
            &authority[i + 1..]
        }
        None => authority,
    };

    parse_host(host)
}

fn parse_host(host: &str) -> Option<String> {
    if host.starts_with('[') {
        let end = host.rfind(']')?;
        if !is_optional_port(&host[end + 1..]) {
            return None;
        }
    } else if let Some(i) = host.rfind(':') {
        if !is_optional_port(&host[i..]) {
            return None;
        }
    }

    if host.bytes().any(|b| b < 0x80 && b != b'%' && !is_host_byte(b)) {
        return None;
    }

    let decoded = unescape(host)?;
    String::from_utf8(decoded).ok()
}

/// Empty, or `:` followed by digits.
fn is_optional_port(port: &str) -> bool {
    port.is_empty()
        || port
            .strip_prefix(':')
            .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
}

fn is_userinfo_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._:~!$&'()*+,;=%@".contains(&b)
}

fn is_host_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-_.~!$&'()*+,;=:[]<>\"".contains(&b)
}

/// Decode `%XX` escapes; `None` on a truncated or non-hex escape.
fn unescape(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    Some(out)
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
